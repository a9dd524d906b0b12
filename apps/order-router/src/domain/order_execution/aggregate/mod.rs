//! Order execution aggregates.

mod order;
mod scheduled_order;

pub use order::{CreateOrderCommand, Order};
pub use scheduled_order::ScheduledOrder;
