//! Scheduler Port (Driven Port)
//!
//! One-shot deferral of an order's execution to a future instant.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use super::JobStoreError;
use crate::domain::shared::{JobKey, OrderId};

/// Logical namespace of order jobs.
pub const ORDER_JOB_GROUP: &str = "orders";

/// Deterministic job key for an order within [`ORDER_JOB_GROUP`].
#[must_use]
pub fn job_key_for(order_id: &OrderId) -> JobKey {
    JobKey::new(format!("execOrder-{order_id}"))
}

/// Scheduler error. Always propagated to the caller.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SchedulerError {
    /// Durable store failure.
    #[error(transparent)]
    Store(#[from] JobStoreError),

    /// The scheduler no longer accepts jobs.
    #[error("Scheduler is shut down")]
    ShutDown,
}

/// Port for scheduling one-shot order executions.
#[async_trait]
pub trait SchedulerPort: Send + Sync {
    /// Register a job that executes `order_id` at `trigger_time`.
    ///
    /// Scheduling the same order twice replaces the first registration.
    async fn schedule_once(
        &self,
        order_id: &OrderId,
        trigger_time: DateTime<Utc>,
    ) -> Result<JobKey, SchedulerError>;

    /// Remove a job before it fires; returns false if no such job exists.
    async fn cancel(&self, job_key: &JobKey) -> Result<bool, SchedulerError>;
}
