//! Observability configuration for metrics export.

use serde::{Deserialize, Serialize};

/// Observability configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObservabilityConfig {
    /// Start the Prometheus exporter.
    #[serde(default)]
    pub metrics_enabled: bool,
    /// Exporter listen address.
    #[serde(default = "default_metrics_addr")]
    pub metrics_addr: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            metrics_enabled: false,
            metrics_addr: default_metrics_addr(),
        }
    }
}

fn default_metrics_addr() -> String {
    "0.0.0.0:9090".to_string()
}
