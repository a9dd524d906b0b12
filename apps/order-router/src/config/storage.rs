//! Storage configuration.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Where orders, schedules, linked accounts and credentials are kept.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Directory holding one JSON file per store.
    #[serde(default = "default_data_dir")]
    pub data_dir: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
        }
    }
}

impl StorageConfig {
    /// Order file.
    #[must_use]
    pub fn orders_path(&self) -> PathBuf {
        self.file("orders.json")
    }

    /// Scheduled order file.
    #[must_use]
    pub fn scheduled_orders_path(&self) -> PathBuf {
        self.file("scheduled_orders.json")
    }

    /// Linked broker account file.
    #[must_use]
    pub fn accounts_path(&self) -> PathBuf {
        self.file("broker_accounts.json")
    }

    /// Credential vault file.
    #[must_use]
    pub fn credentials_path(&self) -> PathBuf {
        self.file("credentials.json")
    }

    fn file(&self, name: &str) -> PathBuf {
        PathBuf::from(&self.data_dir).join(name)
    }
}

fn default_data_dir() -> String {
    "data".to_string()
}
