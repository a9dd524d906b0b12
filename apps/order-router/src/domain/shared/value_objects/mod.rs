//! Shared value objects.

mod identifiers;

pub use identifiers::{AccountId, BrokerId, BrokerOrderId, JobKey, OrderId, UserId};
