//! Shared Domain Types
//!
//! Value objects shared across bounded contexts.

pub mod value_objects;

pub use value_objects::{AccountId, BrokerId, BrokerOrderId, JobKey, OrderId, UserId};
