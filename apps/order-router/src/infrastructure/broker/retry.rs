//! Retry policy shared by the vendor HTTP clients.
//!
//! Only idempotent reads are retried. Order placement and login go out once:
//! a timed-out POST may already have reached the vendor.

use std::time::Duration;

use reqwest::StatusCode;

/// Retry configuration.
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Maximum number of attempts, including the first.
    pub max_attempts: u32,
    /// Initial backoff duration.
    pub initial_backoff: Duration,
    /// Maximum backoff duration.
    pub max_backoff: Duration,
    /// Backoff multiplier.
    pub multiplier: f64,
}

impl RetryConfig {
    /// A policy that never retries.
    #[must_use]
    pub const fn none() -> Self {
        Self {
            max_attempts: 1,
            initial_backoff: Duration::ZERO,
            max_backoff: Duration::ZERO,
            multiplier: 1.0,
        }
    }
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_backoff: Duration::from_millis(100),
            max_backoff: Duration::from_secs(10),
            multiplier: 2.0,
        }
    }
}

/// Error category for determining retry behavior.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum ErrorCategory {
    RateLimited,
    Retryable,
    NonRetryable,
}

/// Categorize HTTP status code for retry handling.
pub(super) const fn categorize_status(status: StatusCode) -> ErrorCategory {
    match status.as_u16() {
        429 => ErrorCategory::RateLimited,
        408 | 500 | 502 | 503 | 504 => ErrorCategory::Retryable,
        _ => ErrorCategory::NonRetryable,
    }
}

/// Exponential backoff calculator.
pub(super) struct ExponentialBackoff {
    pub(super) attempt: u32,
    max_attempts: u32,
    current_backoff: Duration,
    max_backoff: Duration,
    multiplier: f64,
}

impl ExponentialBackoff {
    pub(super) const fn new(config: &RetryConfig) -> Self {
        Self {
            attempt: 0,
            max_attempts: config.max_attempts,
            current_backoff: config.initial_backoff,
            max_backoff: config.max_backoff,
            multiplier: config.multiplier,
        }
    }

    pub(super) fn next_backoff(&mut self) -> Option<Duration> {
        self.attempt += 1;
        if self.attempt >= self.max_attempts {
            return None;
        }

        let backoff = self.current_backoff;
        self.current_backoff = Duration::from_secs_f64(
            (self.current_backoff.as_secs_f64() * self.multiplier)
                .min(self.max_backoff.as_secs_f64()),
        );

        Some(backoff)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn categorize_rate_limited() {
        assert_eq!(
            categorize_status(StatusCode::TOO_MANY_REQUESTS),
            ErrorCategory::RateLimited
        );
    }

    #[test]
    fn categorize_retryable() {
        for status in [
            StatusCode::REQUEST_TIMEOUT,
            StatusCode::INTERNAL_SERVER_ERROR,
            StatusCode::BAD_GATEWAY,
            StatusCode::SERVICE_UNAVAILABLE,
        ] {
            assert_eq!(categorize_status(status), ErrorCategory::Retryable);
        }
    }

    #[test]
    fn categorize_non_retryable() {
        assert_eq!(
            categorize_status(StatusCode::BAD_REQUEST),
            ErrorCategory::NonRetryable
        );
        assert_eq!(
            categorize_status(StatusCode::UNAUTHORIZED),
            ErrorCategory::NonRetryable
        );
    }

    #[test]
    fn backoff_doubles_until_attempts_run_out() {
        let config = RetryConfig {
            max_attempts: 4,
            initial_backoff: Duration::from_millis(100),
            max_backoff: Duration::from_secs(10),
            multiplier: 2.0,
        };
        let mut backoff = ExponentialBackoff::new(&config);

        assert_eq!(backoff.next_backoff(), Some(Duration::from_millis(100)));
        assert_eq!(backoff.next_backoff(), Some(Duration::from_millis(200)));
        assert_eq!(backoff.next_backoff(), Some(Duration::from_millis(400)));
        assert_eq!(backoff.next_backoff(), None);
    }

    #[test]
    fn backoff_respects_max() {
        let config = RetryConfig {
            max_attempts: 10,
            initial_backoff: Duration::from_secs(1),
            max_backoff: Duration::from_secs(5),
            multiplier: 10.0,
        };
        let mut backoff = ExponentialBackoff::new(&config);
        backoff.next_backoff();
        assert_eq!(backoff.next_backoff(), Some(Duration::from_secs(5)));
    }

    #[test]
    fn none_policy_never_retries() {
        let mut backoff = ExponentialBackoff::new(&RetryConfig::none());
        assert!(backoff.next_backoff().is_none());
    }
}
