//! Angel One-specific error types.

use thiserror::Error;

use crate::application::ports::{BrokerError, VaultError};

/// Errors from the Angel One adapter.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AngelOneError {
    /// Non-2xx response without a parseable vendor message.
    #[error("HTTP error {status}: {body}")]
    Http {
        /// HTTP status code.
        status: u16,
        /// Raw response body.
        body: String,
    },

    /// Non-2xx response carrying a vendor message.
    #[error("API error {status}: {message}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Vendor message.
        message: String,
    },

    /// Login answered `status: false` or came back without a session.
    #[error("Login rejected: {0}")]
    LoginRejected(String),

    /// Order answered `status: false`.
    #[error("Order rejected: {0}")]
    OrderRejected(String),

    /// No trading symbol available for the order.
    #[error("Missing tradingSymbol in order metadata")]
    MissingTradingSymbol,

    /// No credentials stored for the account.
    #[error("No credentials found for account {account_id}")]
    CredentialsMissing {
        /// Account ID.
        account_id: String,
    },

    /// Stored credentials are not the expected shape.
    #[error("Invalid Angel One credentials: {0}")]
    InvalidCredentials(String),

    /// TOTP seed could not be used.
    #[error("TOTP generation failed: {0}")]
    Totp(String),

    /// Vault failure while reading credentials.
    #[error("Credential vault error: {0}")]
    Vault(String),

    /// Network error.
    #[error("Network error: {0}")]
    Network(String),

    /// JSON parsing error.
    #[error("JSON parsing error: {0}")]
    JsonParse(String),

    /// Max retries exceeded.
    #[error("Max retries exceeded after {attempts} attempts")]
    MaxRetriesExceeded {
        /// Number of attempts made before giving up.
        attempts: u32,
    },
}

impl From<VaultError> for AngelOneError {
    fn from(err: VaultError) -> Self {
        Self::Vault(err.to_string())
    }
}

impl From<AngelOneError> for BrokerError {
    fn from(err: AngelOneError) -> Self {
        match err {
            AngelOneError::Http { .. }
            | AngelOneError::Network(_)
            | AngelOneError::JsonParse(_)
            | AngelOneError::MaxRetriesExceeded { .. } => Self::Transport {
                message: err.to_string(),
            },
            AngelOneError::Api { message, .. } | AngelOneError::OrderRejected(message) => {
                Self::VendorRejected { message }
            }
            AngelOneError::LoginRejected(message)
            | AngelOneError::InvalidCredentials(message)
            | AngelOneError::Totp(message)
            | AngelOneError::Vault(message) => Self::AuthenticationFailed { message },
            AngelOneError::MissingTradingSymbol => {
                Self::mapping("tradingSymbol", "Missing tradingSymbol in order metadata")
            }
            AngelOneError::CredentialsMissing { account_id } => {
                Self::CredentialsMissing { account_id }
            }
        }
    }
}
