//! Order Execution Bounded Context
//!
//! Manages the order lifecycle from intake to a single terminal outcome.
//!
//! # Key Concepts
//!
//! - **Order Aggregate**: PENDING until an execution attempt claims it, then
//!   exactly one of PLACED or FAILED. CANCELLED is reachable only from PENDING.
//! - **Scheduled Order**: A one-shot trigger for an order at a future instant.

pub mod aggregate;
pub mod errors;
pub mod repository;
pub mod services;
pub mod value_objects;

pub use aggregate::{CreateOrderCommand, Order, ScheduledOrder};
pub use errors::OrderError;
pub use repository::{OrderRepository, ScheduledOrderRepository};
pub use services::OrderStateMachine;
pub use value_objects::{OrderSide, OrderStatus, OrderType};
