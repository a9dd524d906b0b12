//! Prometheus metrics for the order router.
//!
//! # Example
//!
//! ```ignore
//! use order_router::observability::{init_metrics, MetricsConfig};
//!
//! init_metrics(&MetricsConfig::default())?;
//! record_order_execution("angelone", "placed", 0.210);
//! ```

use metrics::{counter, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::{Ipv4Addr, SocketAddr};

/// Configuration for the metrics exporter.
#[derive(Debug, Clone)]
pub struct MetricsConfig {
    /// Address to bind the metrics HTTP listener.
    pub listen_addr: SocketAddr,
    /// Histogram buckets for vendor call latency (in seconds).
    pub latency_buckets: Vec<f64>,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            listen_addr: SocketAddr::from((Ipv4Addr::UNSPECIFIED, 9090)),
            // Broker round trips: 10ms to 30s
            latency_buckets: vec![0.01, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0],
        }
    }
}

impl MetricsConfig {
    /// Create a new metrics configuration with custom address.
    #[must_use]
    pub fn with_addr(addr: SocketAddr) -> Self {
        Self {
            listen_addr: addr,
            ..Default::default()
        }
    }
}

/// Initialize the Prometheus metrics exporter.
///
/// This starts an HTTP server that exposes metrics at `/metrics`.
pub fn init_metrics(config: &MetricsConfig) -> Result<(), MetricsError> {
    PrometheusBuilder::new()
        .with_http_listener(config.listen_addr)
        .set_buckets(&config.latency_buckets)
        .map_err(|e| MetricsError::Configuration(e.to_string()))?
        .install()
        .map_err(|e| MetricsError::Installation(e.to_string()))?;

    tracing::info!(
        addr = %config.listen_addr,
        "Prometheus metrics exporter started"
    );

    Ok(())
}

/// Error type for metrics operations.
#[derive(Debug, thiserror::Error)]
pub enum MetricsError {
    /// Failed to configure metrics exporter.
    #[error("metrics configuration error: {0}")]
    Configuration(String),
    /// Failed to install metrics exporter.
    #[error("metrics installation error: {0}")]
    Installation(String),
}

/// Record a vendor login attempt.
///
/// * `broker` - Broker identifier (e.g. "angelone")
/// * `outcome` - "success" or "failure"
pub fn record_broker_login(broker: &str, outcome: &str) {
    counter!(
        "broker_logins_total",
        "broker" => broker.to_string(),
        "outcome" => outcome.to_string()
    )
    .increment(1);
}

/// Record a finished execution attempt.
///
/// * `broker` - Broker identifier
/// * `outcome` - "placed", "failed" or "rejected_concurrent"
/// * `duration_seconds` - Time from claim to persisted outcome
pub fn record_order_execution(broker: &str, outcome: &str, duration_seconds: f64) {
    counter!(
        "order_executions_total",
        "broker" => broker.to_string(),
        "outcome" => outcome.to_string()
    )
    .increment(1);

    histogram!(
        "order_execution_duration_seconds",
        "broker" => broker.to_string()
    )
    .record(duration_seconds);
}

/// Record a scheduler lifecycle event ("scheduled", "cancelled", "fired", "restored").
pub fn record_scheduled_job(event: &str) {
    counter!("scheduled_jobs_total", "event" => event.to_string()).increment(1);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let config = MetricsConfig::default();
        assert_eq!(config.listen_addr.port(), 9090);
        assert!(!config.latency_buckets.is_empty());
    }

    #[test]
    fn recording_without_exporter_is_noop() {
        record_broker_login("angelone", "success");
        record_order_execution("dhan", "placed", 0.1);
        record_scheduled_job("fired");
    }
}
