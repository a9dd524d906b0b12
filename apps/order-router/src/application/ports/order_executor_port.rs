//! Order Executor Port (Driver Port)
//!
//! Entry point the scheduler calls when a job fires.

use async_trait::async_trait;

use super::{AccountStoreError, BrokerError, SchedulerError, VaultError};
use crate::domain::order_execution::{OrderError, OrderStatus};
use crate::domain::shared::OrderId;

/// Error at the execution use-case boundary.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ExecutionError {
    /// Order lookup, validation or state transition failed.
    #[error(transparent)]
    Order(#[from] OrderError),

    /// Broker call failed.
    #[error(transparent)]
    Broker(#[from] BrokerError),

    /// The order's broker account does not exist.
    #[error("Broker account not found: {account_id}")]
    AccountNotFound {
        /// Account ID.
        account_id: String,
    },

    /// The account belongs to another user.
    #[error("Access to broker account {account_id} denied")]
    AccessDenied {
        /// Account ID.
        account_id: String,
    },

    /// Account storage failure.
    #[error(transparent)]
    AccountStore(#[from] AccountStoreError),

    /// Scheduling failed; never swallowed.
    #[error(transparent)]
    Scheduler(#[from] SchedulerError),

    /// Credential vault failure.
    #[error(transparent)]
    Vault(#[from] VaultError),

    /// Background task failed to complete.
    #[error("Execution task failed: {0}")]
    Task(String),
}

/// Executes a scheduled order when its job fires.
#[async_trait]
pub trait OrderExecutor: Send + Sync {
    /// Run the order through the execution engine with scheduled-path defaults.
    async fn execute_scheduled(&self, order_id: &OrderId) -> Result<OrderStatus, ExecutionError>;
}
