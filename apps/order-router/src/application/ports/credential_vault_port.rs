//! Credential Vault Port (Driven Port)
//!
//! Decrypts per-account broker credentials on demand. Plaintext is handed to
//! the caller for a single use and never cached by the core.

use async_trait::async_trait;
use serde_json::Value;

use crate::domain::shared::AccountId;

/// Vault error.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum VaultError {
    /// The stored blob could not be decrypted or parsed.
    #[error("Credentials for account {account_id} are unreadable: {message}")]
    Unreadable {
        /// Account ID.
        account_id: String,
        /// Error details.
        message: String,
    },

    /// Backing store failure.
    #[error("Vault storage error: {0}")]
    Storage(String),
}

/// Port for reading and storing broker credentials.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CredentialVault: Send + Sync {
    /// Decrypted credential JSON for an account, if any is stored.
    async fn read_decrypted_credentials(
        &self,
        account_id: &AccountId,
    ) -> Result<Option<Value>, VaultError>;

    /// Store (and encrypt) credentials for an account, replacing any previous value.
    async fn store_credentials(
        &self,
        account_id: &AccountId,
        credentials: &Value,
    ) -> Result<(), VaultError>;
}
