//! Job stores.
//!
//! [`FileJobStore`] keeps pending jobs in a JSON file so they survive a
//! restart.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::sync::Mutex;

use super::json_file::JsonFileMap;
use crate::application::ports::{JobStore, JobStoreError, StoredJob};
use crate::domain::shared::JobKey;

/// JSON-file implementation of [`JobStore`].
#[derive(Debug)]
pub struct FileJobStore {
    jobs: JsonFileMap<JobKey, StoredJob>,
}

impl FileJobStore {
    /// Open the store at `path`, loading existing jobs. A missing file is an
    /// empty store; its parent directory is created.
    pub async fn open(path: impl Into<PathBuf>) -> Result<Self, JobStoreError> {
        let jobs = JsonFileMap::open(path, |job: &StoredJob| job.job_key.clone()).await?;
        let count = jobs.read(BTreeMap::len).await;
        tracing::info!(path = %jobs.path().display(), jobs = count, "Job store opened");
        Ok(Self { jobs })
    }

    /// Location of the backing file.
    #[must_use]
    pub fn path(&self) -> &Path {
        self.jobs.path()
    }
}

#[async_trait]
impl JobStore for FileJobStore {
    async fn put(&self, job: StoredJob) -> Result<(), JobStoreError> {
        self.jobs
            .update(|jobs| {
                jobs.insert(job.job_key.clone(), job);
                Ok(())
            })
            .await
    }

    async fn remove(&self, key: &JobKey) -> Result<bool, JobStoreError> {
        self.jobs
            .update(|jobs| Ok(jobs.remove(key).is_some()))
            .await
    }

    async fn list(&self) -> Result<Vec<StoredJob>, JobStoreError> {
        Ok(self.jobs.read(|jobs| jobs.values().cloned().collect()).await)
    }
}

/// Non-durable [`JobStore`] for tests and ephemeral deployments.
#[derive(Debug, Default)]
pub struct InMemoryJobStore {
    jobs: Mutex<BTreeMap<JobKey, StoredJob>>,
}

impl InMemoryJobStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl JobStore for InMemoryJobStore {
    async fn put(&self, job: StoredJob) -> Result<(), JobStoreError> {
        self.jobs.lock().await.insert(job.job_key.clone(), job);
        Ok(())
    }

    async fn remove(&self, key: &JobKey) -> Result<bool, JobStoreError> {
        Ok(self.jobs.lock().await.remove(key).is_some())
    }

    async fn list(&self) -> Result<Vec<StoredJob>, JobStoreError> {
        Ok(self.jobs.lock().await.values().cloned().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::ports::{ORDER_JOB_GROUP, job_key_for};
    use crate::domain::shared::OrderId;
    use chrono::{TimeZone, Utc};

    fn job(order: &str) -> StoredJob {
        let order_id = OrderId::new(order);
        StoredJob {
            job_key: job_key_for(&order_id),
            group: ORDER_JOB_GROUP.to_string(),
            order_id,
            trigger_time: Utc.with_ymd_and_hms(2030, 1, 2, 3, 4, 5).unwrap(),
        }
    }

    #[tokio::test]
    async fn jobs_survive_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("jobs.json");

        let store = FileJobStore::open(&path).await.unwrap();
        store.put(job("1")).await.unwrap();
        store.put(job("2")).await.unwrap();
        assert!(store.remove(&job_key_for(&OrderId::new("1"))).await.unwrap());
        drop(store);

        let reopened = FileJobStore::open(&path).await.unwrap();
        assert_eq!(reopened.list().await.unwrap(), vec![job("2")]);
        assert!(!path.with_extension("json.tmp").exists());
    }

    #[tokio::test]
    async fn put_replaces_same_key() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileJobStore::open(dir.path().join("jobs.json")).await.unwrap();

        let mut later = job("7");
        later.trigger_time = Utc.with_ymd_and_hms(2031, 1, 1, 0, 0, 0).unwrap();
        store.put(job("7")).await.unwrap();
        store.put(later.clone()).await.unwrap();

        assert_eq!(store.list().await.unwrap(), vec![later]);
    }

    #[tokio::test]
    async fn missing_file_and_nested_dir_are_created_lazily() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data").join("jobs.json");

        let store = FileJobStore::open(&path).await.unwrap();
        assert!(store.list().await.unwrap().is_empty());
        assert!(!path.exists());

        store.put(job("1")).await.unwrap();
        assert!(path.exists());
        assert_eq!(store.path(), path.as_path());
    }

    #[tokio::test]
    async fn corrupt_file_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("jobs.json");
        std::fs::write(&path, b"{not json").unwrap();

        let err = FileJobStore::open(&path).await.unwrap_err();
        assert!(matches!(err, JobStoreError::Serialization(_)));
    }

    #[tokio::test]
    async fn removing_unknown_key_is_false() {
        let store = InMemoryJobStore::new();
        assert!(!store.remove(&JobKey::new("execOrder-x")).await.unwrap());
        store.put(job("x")).await.unwrap();
        assert!(store.remove(&JobKey::new("execOrder-x")).await.unwrap());
    }
}
