//! Application Ports (Driver and Driven)
//!
//! Ports define interfaces for interacting with external systems.
//! - **Driver Ports** (Primary/Inbound): How the world uses our application
//! - **Driven Ports** (Secondary/Outbound): How our application uses external systems

mod broker_account_port;
mod broker_port;
mod credential_vault_port;
mod job_store_port;
mod order_executor_port;
mod scheduler_port;

pub use broker_account_port::{AccountStoreError, BrokerAccountRepository};
pub use broker_port::{
    BrokerAdapter, BrokerError, BrokerOrderRequest, OrderMetadata, PlaceOrderResult,
};
#[cfg(test)]
pub use credential_vault_port::MockCredentialVault;
pub use credential_vault_port::{CredentialVault, VaultError};
pub use job_store_port::{JobStore, JobStoreError, StoredJob};
pub use order_executor_port::{ExecutionError, OrderExecutor};
pub use scheduler_port::{ORDER_JOB_GROUP, SchedulerError, SchedulerPort, job_key_for};
