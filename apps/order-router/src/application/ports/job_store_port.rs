//! Job Store Port (Driven Port)
//!
//! Durable record of pending one-shot jobs so they survive a restart.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::shared::{JobKey, OrderId};

/// A registered one-shot job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredJob {
    /// Job name.
    pub job_key: JobKey,
    /// Logical namespace the job belongs to.
    pub group: String,
    /// Order the job executes.
    pub order_id: OrderId,
    /// Instant the job fires.
    pub trigger_time: DateTime<Utc>,
}

/// Job store error.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum JobStoreError {
    /// Reading or writing the backing store failed.
    #[error("Job store I/O error: {0}")]
    Io(String),

    /// The stored data could not be encoded or decoded.
    #[error("Job store serialization error: {0}")]
    Serialization(String),
}

/// Durable job key -> (order, trigger time) store.
#[async_trait]
pub trait JobStore: Send + Sync {
    /// Insert or replace a job.
    async fn put(&self, job: StoredJob) -> Result<(), JobStoreError>;

    /// Remove a job; returns false if it was not stored.
    async fn remove(&self, key: &JobKey) -> Result<bool, JobStoreError>;

    /// All stored jobs.
    async fn list(&self) -> Result<Vec<StoredJob>, JobStoreError>;
}
