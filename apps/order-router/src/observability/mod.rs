//! Observability module for metrics and logging.
//!
//! Prometheus metrics export and `tracing` subscriber setup for the order router.

mod logging;
mod metrics;

pub use self::metrics::{
    MetricsConfig, MetricsError, init_metrics, record_broker_login, record_order_execution,
    record_scheduled_job,
};
pub use logging::{DEFAULT_LOG_DIRECTIVE, init_tracing};
