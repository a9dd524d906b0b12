//! Broker Adapters
//!
//! One module per vendor, each implementing [`BrokerAdapter`] over the
//! vendor's REST API.
//!
//! [`BrokerAdapter`]: crate::application::ports::BrokerAdapter

pub mod angel_one;
pub mod dhan;
mod json_fields;
mod retry;

pub use angel_one::{ANGEL_ONE_BROKER_ID, AngelOneAdapter, AngelOneConfig, AngelOneError};
pub use dhan::{DHAN_BROKER_ID, DhanAdapter, DhanConfig, DhanError};
pub use retry::RetryConfig;
