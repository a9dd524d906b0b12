//! Order Repository Traits
//!
//! Persistence abstractions for orders and their schedules.
//! Implemented by adapters in the infrastructure layer.

use async_trait::async_trait;

use super::aggregate::{Order, ScheduledOrder};
use super::errors::OrderError;
use crate::domain::shared::{JobKey, OrderId, UserId};

/// Repository trait for Order persistence.
#[async_trait]
pub trait OrderRepository: Send + Sync {
    /// Save an order (insert or update).
    async fn save(&self, order: &Order) -> Result<(), OrderError>;

    /// Find an order by its internal ID.
    async fn find_by_id(&self, id: &OrderId) -> Result<Option<Order>, OrderError>;

    /// Find all orders owned by a user, oldest first.
    async fn find_by_user(&self, user_id: &UserId) -> Result<Vec<Order>, OrderError>;

    /// Atomically claim a PENDING order for execution.
    ///
    /// The stored status moves PENDING -> EXECUTING in one step and the claimed
    /// order is returned. A concurrent second claim fails with
    /// [`OrderError::AlreadyExecuting`]; a terminal order fails with
    /// [`OrderError::InvalidStateTransition`].
    async fn try_begin_execution(&self, id: &OrderId) -> Result<Order, OrderError>;

    /// Atomically cancel an order that is still PENDING.
    async fn try_cancel(&self, id: &OrderId) -> Result<Order, OrderError>;
}

/// Repository trait for ScheduledOrder persistence.
#[async_trait]
pub trait ScheduledOrderRepository: Send + Sync {
    /// Save a schedule (insert or update), keyed by order ID.
    async fn save(&self, scheduled: &ScheduledOrder) -> Result<(), OrderError>;

    /// Find the schedule attached to an order.
    async fn find_by_order_id(&self, id: &OrderId) -> Result<Option<ScheduledOrder>, OrderError>;

    /// Find the schedule registered under a job key.
    async fn find_by_job_key(&self, key: &JobKey) -> Result<Option<ScheduledOrder>, OrderError>;
}
