//! Broker vendor endpoints and request headers.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::infrastructure::broker::{AngelOneConfig, DhanConfig};

/// Per-vendor broker configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct BrokersConfig {
    /// Angel One SmartAPI.
    #[serde(default)]
    pub angelone: AngelOneBrokerConfig,
    /// Dhan trading API.
    #[serde(default)]
    pub dhan: DhanBrokerConfig,
}

/// Angel One configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AngelOneBrokerConfig {
    /// API base URL.
    #[serde(default = "default_angelone_base_url")]
    pub base_url: String,
    /// Per-call timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Value of the `X-ClientLocalIP` header.
    #[serde(default = "default_loopback_ip")]
    pub client_local_ip: String,
    /// Value of the `X-ClientPublicIP` header.
    #[serde(default = "default_loopback_ip")]
    pub client_public_ip: String,
    /// Value of the `X-MACAddress` header.
    #[serde(default = "default_mac_address")]
    pub mac_address: String,
}

impl Default for AngelOneBrokerConfig {
    fn default() -> Self {
        Self {
            base_url: default_angelone_base_url(),
            timeout_secs: default_timeout_secs(),
            client_local_ip: default_loopback_ip(),
            client_public_ip: default_loopback_ip(),
            mac_address: default_mac_address(),
        }
    }
}

impl AngelOneBrokerConfig {
    /// Adapter configuration for these settings.
    #[must_use]
    pub fn adapter_config(&self) -> AngelOneConfig {
        AngelOneConfig {
            client_local_ip: self.client_local_ip.clone(),
            client_public_ip: self.client_public_ip.clone(),
            mac_address: self.mac_address.clone(),
            ..AngelOneConfig::default()
        }
        .with_base_url(&self.base_url)
        .with_timeout(Duration::from_secs(self.timeout_secs))
    }
}

/// Dhan configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DhanBrokerConfig {
    /// API base URL.
    #[serde(default = "default_dhan_base_url")]
    pub base_url: String,
    /// Per-call timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for DhanBrokerConfig {
    fn default() -> Self {
        Self {
            base_url: default_dhan_base_url(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl DhanBrokerConfig {
    /// Adapter configuration for these settings.
    #[must_use]
    pub fn adapter_config(&self) -> DhanConfig {
        DhanConfig::default()
            .with_base_url(&self.base_url)
            .with_timeout(Duration::from_secs(self.timeout_secs))
    }
}

fn default_angelone_base_url() -> String {
    crate::infrastructure::broker::angel_one::DEFAULT_BASE_URL.to_string()
}

fn default_dhan_base_url() -> String {
    crate::infrastructure::broker::dhan::DEFAULT_BASE_URL.to_string()
}

const fn default_timeout_secs() -> u64 {
    30
}

fn default_loopback_ip() -> String {
    "127.0.0.1".to_string()
}

fn default_mac_address() -> String {
    "00:00:00:00:00:00".to_string()
}
