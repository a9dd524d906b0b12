//! Credential vault configuration.

use serde::{Deserialize, Serialize};

/// Credential vault configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct VaultConfig {
    /// JSON file of accounts and their credentials written into the stores
    /// at startup. Meant for development; unset links nothing.
    #[serde(default)]
    pub seed_path: Option<String>,
}
