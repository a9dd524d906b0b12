//! Dhan adapter configuration.

use std::time::Duration;

use crate::infrastructure::broker::RetryConfig;

/// Production DhanHQ host.
pub const DEFAULT_BASE_URL: &str = "https://api.dhan.co";

/// How long a successful access-token probe is trusted.
pub const DEFAULT_TOKEN_TTL_SECS: i64 = 24 * 60 * 60;

/// Configuration for the Dhan adapter.
#[derive(Debug, Clone)]
pub struct DhanConfig {
    /// API host, without trailing slash.
    pub base_url: String,
    /// HTTP request timeout.
    pub timeout: Duration,
    /// Lifetime of a probed token in the cache.
    pub token_ttl_secs: i64,
    /// Retry policy for read-only calls.
    pub retry: RetryConfig,
}

impl Default for DhanConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: Duration::from_secs(30),
            token_ttl_secs: DEFAULT_TOKEN_TTL_SECS,
            retry: RetryConfig::default(),
        }
    }
}

impl DhanConfig {
    /// Configuration pointing at a different host.
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Set the HTTP timeout.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the retry configuration.
    #[must_use]
    pub const fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }
}
