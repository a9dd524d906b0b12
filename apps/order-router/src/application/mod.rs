//! Application Layer
//!
//! The application layer orchestrates domain logic through use cases.
//! It defines:
//!
//! - **Ports**: Interfaces for interacting with external systems
//! - **Services**: The broker registry and the per-account token cache
//! - **Use Cases**: Application-specific business rules
//! - **DTOs**: Data transfer objects for API boundaries

pub mod dto;
pub mod ports;
pub mod services;
pub mod use_cases;

#[cfg(test)]
pub(crate) mod test_support;

pub use dto::*;
pub use ports::*;
pub use services::*;
pub use use_cases::*;
