//! Angel One adapter configuration.

use std::time::Duration;

use crate::infrastructure::broker::RetryConfig;

/// Production SmartAPI host.
pub const DEFAULT_BASE_URL: &str = "https://apiconnect.angelone.in";

/// Session lifetime granted by a password login.
pub const DEFAULT_TOKEN_TTL_SECS: i64 = 8 * 60 * 60;

/// Configuration for the Angel One adapter.
#[derive(Debug, Clone)]
pub struct AngelOneConfig {
    /// API host, without trailing slash.
    pub base_url: String,
    /// HTTP request timeout.
    pub timeout: Duration,
    /// Sent as `X-ClientLocalIP`.
    pub client_local_ip: String,
    /// Sent as `X-ClientPublicIP`.
    pub client_public_ip: String,
    /// Sent as `X-MACAddress`.
    pub mac_address: String,
    /// Lifetime assumed for a fresh session token.
    pub token_ttl_secs: i64,
    /// Retry policy for read-only calls.
    pub retry: RetryConfig,
}

impl Default for AngelOneConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: Duration::from_secs(30),
            client_local_ip: "127.0.0.1".to_string(),
            client_public_ip: "127.0.0.1".to_string(),
            mac_address: "00:00:00:00:00:00".to_string(),
            token_ttl_secs: DEFAULT_TOKEN_TTL_SECS,
            retry: RetryConfig::default(),
        }
    }
}

impl AngelOneConfig {
    /// Configuration pointing at a different host (sandbox or mock server).
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
