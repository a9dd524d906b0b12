//! Token Cache
//!
//! At most one session token per (broker, account). Logins are single-flight:
//! the first caller for a key performs the vendor login while concurrent
//! callers wait on the same flight and receive its outcome, success or
//! failure. A failed flight is never retried by its waiters.
//!
//! Authentication state per key:
//!
//! ```text
//! NO_TOKEN -> AUTHENTICATING -> VALID -> (time passes) -> EXPIRED -> AUTHENTICATING -> ...
//! ```

use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, PoisonError, RwLock};

use chrono::{DateTime, Utc};
use tokio::sync::OnceCell;

use crate::application::ports::BrokerError;
use crate::domain::brokerage::AuthToken;
use crate::domain::shared::{AccountId, BrokerId};
use crate::observability::record_broker_login;

/// Observable authentication state of one (broker, account) pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthState {
    /// No token cached.
    NoToken,
    /// A login is in flight.
    Authenticating,
    /// A token is cached and inside its validity window.
    Valid,
    /// A token is cached but past its validity window.
    Expired,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct TokenKey {
    broker: BrokerId,
    account: AccountId,
}

impl TokenKey {
    fn new(broker: &BrokerId, account: &AccountId) -> Self {
        Self {
            broker: broker.clone(),
            account: account.clone(),
        }
    }
}

/// Outcome of one login, shared by every caller that joined it.
type LoginFlight = Arc<OnceCell<Result<AuthToken, BrokerError>>>;

/// Keyed token store with per-key single-flight logins.
#[derive(Debug, Default)]
pub struct TokenCache {
    tokens: RwLock<HashMap<TokenKey, AuthToken>>,
    logins: std::sync::Mutex<HashMap<TokenKey, LoginFlight>>,
}

impl TokenCache {
    /// Create an empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Cached token, expired or not.
    #[must_use]
    pub fn get(&self, broker: &BrokerId, account: &AccountId) -> Option<AuthToken> {
        self.tokens
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&TokenKey::new(broker, account))
            .cloned()
    }

    /// Cached token only if still valid at `now`.
    #[must_use]
    pub fn get_valid(
        &self,
        broker: &BrokerId,
        account: &AccountId,
        now: DateTime<Utc>,
    ) -> Option<AuthToken> {
        self.get(broker, account)
            .filter(|token| !token.is_expired_at(now))
    }

    /// Store a token, replacing any previous entry for the key.
    pub fn put(&self, broker: &BrokerId, account: &AccountId, token: AuthToken) {
        self.tokens
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(TokenKey::new(broker, account), token);
    }

    /// Drop the entry for a key.
    pub fn invalidate(&self, broker: &BrokerId, account: &AccountId) {
        self.tokens
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&TokenKey::new(broker, account));
    }

    /// Current authentication state of a key.
    #[must_use]
    pub fn state(&self, broker: &BrokerId, account: &AccountId) -> AuthState {
        let key = TokenKey::new(broker, account);
        let in_flight = self
            .logins
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&key)
            .is_some_and(|flight| !flight.initialized());
        if in_flight {
            return AuthState::Authenticating;
        }

        match self.get(broker, account) {
            None => AuthState::NoToken,
            Some(token) if token.is_expired() => AuthState::Expired,
            Some(_) => AuthState::Valid,
        }
    }

    /// Return a valid cached token or run `login` exactly once per key.
    ///
    /// Callers arriving while a login is in flight wait for it and receive
    /// its outcome. A failed login clears the entry and the same error is
    /// returned to every caller that joined the flight.
    pub async fn get_or_login<F, Fut>(
        &self,
        broker: &BrokerId,
        account: &AccountId,
        login: F,
    ) -> Result<AuthToken, BrokerError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<AuthToken, BrokerError>>,
    {
        if let Some(token) = self.get_valid(broker, account, Utc::now()) {
            return Ok(token);
        }

        let flight = self.join_flight(broker, account);
        let outcome = flight
            .get_or_init(|| async {
                // A flight that finished just before this one started may
                // already have stored a token.
                if let Some(token) = self.get_valid(broker, account, Utc::now()) {
                    return Ok(token);
                }
                self.run_login(broker, account, login).await
            })
            .await
            .clone();

        self.finish_flight(broker, account, &flight);
        outcome
    }

    async fn run_login<F, Fut>(
        &self,
        broker: &BrokerId,
        account: &AccountId,
        login: F,
    ) -> Result<AuthToken, BrokerError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<AuthToken, BrokerError>>,
    {
        tracing::debug!(broker = %broker, account_id = %account, "Performing broker login");
        match login().await {
            Ok(token) => {
                self.put(broker, account, token.clone());
                record_broker_login(broker.as_str(), "success");
                tracing::info!(broker = %broker, account_id = %account, "Broker login succeeded");
                Ok(token)
            }
            Err(err) => {
                self.invalidate(broker, account);
                record_broker_login(broker.as_str(), "failure");
                tracing::warn!(broker = %broker, account_id = %account, error = %err, "Broker login failed");
                Err(err)
            }
        }
    }

    fn join_flight(&self, broker: &BrokerId, account: &AccountId) -> LoginFlight {
        let mut logins = self.logins.lock().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(
            logins
                .entry(TokenKey::new(broker, account))
                .or_insert_with(|| Arc::new(OnceCell::new())),
        )
    }

    /// Forget a completed flight so the next expiry starts a new login.
    fn finish_flight(&self, broker: &BrokerId, account: &AccountId, flight: &LoginFlight) {
        let key = TokenKey::new(broker, account);
        let mut logins = self.logins.lock().unwrap_or_else(PoisonError::into_inner);
        if logins
            .get(&key)
            .is_some_and(|current| Arc::ptr_eq(current, flight))
        {
            logins.remove(&key);
        }
    }
}
