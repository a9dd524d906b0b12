//! Server configuration for the HTTP endpoint.

use serde::{Deserialize, Serialize};

/// Server configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// HTTP server port for REST endpoints (/health, /api/v1/*).
    #[serde(default = "default_http_port")]
    pub http_port: u16,
    /// Bind address.
    #[serde(default = "default_bind_address")]
    pub bind_address: String,
    /// Seconds in-flight requests get to finish after a shutdown signal.
    #[serde(default = "default_shutdown_timeout_secs")]
    pub shutdown_timeout_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            http_port: default_http_port(),
            bind_address: default_bind_address(),
            shutdown_timeout_secs: default_shutdown_timeout_secs(),
        }
    }
}

pub(crate) const fn default_http_port() -> u16 {
    8080
}

pub(crate) fn default_bind_address() -> String {
    "0.0.0.0".to_string()
}

const fn default_shutdown_timeout_secs() -> u64 {
    30
}
