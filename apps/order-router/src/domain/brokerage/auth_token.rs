//! Broker session token.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Seconds subtracted from a token's lifetime so it is never used mid-expiry.
pub const EXPIRY_SAFETY_MARGIN_SECS: i64 = 30;

/// Session token issued by a broker login.
///
/// A token without both `obtained_at` and `ttl_seconds` is always treated as
/// expired.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthToken {
    /// Bearer token presented on secured calls.
    pub access_token: String,
    /// Refresh token, when the vendor issues one.
    pub refresh_token: Option<String>,
    /// Secondary session token (market-data feed token for some vendors).
    pub feed_token: Option<String>,
    /// Instant the token was captured.
    pub obtained_at: Option<DateTime<Utc>>,
    /// Validity window in seconds.
    pub ttl_seconds: Option<i64>,
}

impl AuthToken {
    /// Build a token captured at `obtained_at` and valid for `ttl_seconds`.
    #[must_use]
    pub fn new(
        access_token: impl Into<String>,
        obtained_at: DateTime<Utc>,
        ttl_seconds: i64,
    ) -> Self {
        Self {
            access_token: access_token.into(),
            refresh_token: None,
            feed_token: None,
            obtained_at: Some(obtained_at),
            ttl_seconds: Some(ttl_seconds),
        }
    }

    /// Attach a refresh token.
    #[must_use]
    pub fn with_refresh_token(mut self, token: Option<String>) -> Self {
        self.refresh_token = token;
        self
    }

    /// Attach a feed token.
    #[must_use]
    pub fn with_feed_token(mut self, token: Option<String>) -> Self {
        self.feed_token = token;
        self
    }

    /// `now >= obtained_at + ttl - 30s`, or true when either field is unset.
    #[must_use]
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        match (self.obtained_at, self.ttl_seconds) {
            (Some(obtained_at), Some(ttl)) => {
                let deadline = obtained_at + Duration::seconds(ttl - EXPIRY_SAFETY_MARGIN_SECS);
                now >= deadline
            }
            _ => true,
        }
    }

    /// Expiry check against the wall clock.
    #[must_use]
    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Utc::now())
    }
}

impl fmt::Debug for AuthToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthToken")
            .field("access_token", &"[REDACTED]")
            .field("has_refresh_token", &self.refresh_token.is_some())
            .field("has_feed_token", &self.feed_token.is_some())
            .field("obtained_at", &self.obtained_at)
            .field("ttl_seconds", &self.ttl_seconds)
            .finish()
    }
}
