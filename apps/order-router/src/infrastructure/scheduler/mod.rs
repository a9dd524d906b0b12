//! Scheduler Adapters
//!
//! Tokio timer implementation of the scheduler port, backed by a durable
//! [`JobStore`](crate::application::ports::JobStore).

mod tokio_scheduler;

pub use tokio_scheduler::TokioOrderScheduler;
