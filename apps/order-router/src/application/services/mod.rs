//! Application services shared by the use cases and broker adapters.

mod broker_registry;
mod token_cache;

pub use broker_registry::{BrokerDescriptor, BrokerRegistry};
pub use token_cache::{AuthState, TokenCache};
