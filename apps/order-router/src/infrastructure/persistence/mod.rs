//! Persistence Adapters
//!
//! JSON-file repositories for orders, schedules and broker accounts, the job
//! stores backing the scheduler, and in-memory repositories for tests.

pub mod file_job_store;
pub mod file_repositories;
pub mod in_memory;
mod json_file;

pub use file_job_store::{FileJobStore, InMemoryJobStore};
pub use file_repositories::{
    FileBrokerAccountRepository, FileOrderRepository, FileScheduledOrderRepository,
};
pub use in_memory::{
    InMemoryBrokerAccountRepository, InMemoryOrderRepository, InMemoryScheduledOrderRepository,
};
pub(crate) use json_file::JsonFileMap;
