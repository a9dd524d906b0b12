//! Structured logging setup.

use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Directive used when `RUST_LOG` is not set.
pub const DEFAULT_LOG_DIRECTIVE: &str = "order_router=info";

/// Install a `fmt` subscriber filtered by `RUST_LOG` (or the default directive).
///
/// Calling it twice is harmless; the second install is ignored.
pub fn init_tracing() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_DIRECTIVE));

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_target(true))
        .try_init();
}
