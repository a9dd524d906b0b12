//! Scheduler configuration.

use serde::{Deserialize, Serialize};

/// Scheduler configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchedulerConfig {
    /// JSON file holding pending jobs across restarts.
    #[serde(default = "default_job_store_path")]
    pub job_store_path: String,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            job_store_path: default_job_store_path(),
        }
    }
}

fn default_job_store_path() -> String {
    "data/scheduled_jobs.json".to_string()
}
