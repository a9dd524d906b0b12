//! Dhan-specific error types.

use thiserror::Error;

use crate::application::ports::{BrokerError, VaultError};

/// Errors from the Dhan adapter.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DhanError {
    /// Non-2xx response without a parseable vendor error.
    #[error("HTTP error {status}: {body}")]
    Http {
        /// HTTP status code.
        status: u16,
        /// Raw response body.
        body: String,
    },

    /// Non-2xx response carrying `errorMessage`.
    #[error("API error {code}: {message}")]
    Api {
        /// Vendor error code, or the HTTP status when absent.
        code: String,
        /// Vendor message.
        message: String,
    },

    /// Access token refused (401/403).
    #[error("Access token rejected: {0}")]
    Unauthorized(String),

    /// Quantity Dhan cannot accept.
    #[error("Invalid quantity: {0}")]
    InvalidQuantity(String),

    /// No credentials stored for the account.
    #[error("No credentials found for account {account_id}")]
    CredentialsMissing {
        /// Account ID.
        account_id: String,
    },

    /// Stored credentials are not the expected shape.
    #[error("Invalid Dhan credentials: {0}")]
    InvalidCredentials(String),

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

impl From<VaultError> for DhanError {
    fn from(err: VaultError) -> Self {
        Self::Vault(err.to_string())
    }
}

impl From<DhanError> for BrokerError {
    fn from(err: DhanError) -> Self {
        match err {
            DhanError::Http { .. }
            | DhanError::Network(_)
            | DhanError::JsonParse(_)
            | DhanError::MaxRetriesExceeded { .. } => Self::Transport {
                message: err.to_string(),
            },
            DhanError::Api { message, .. } => Self::VendorRejected { message },
            DhanError::Unauthorized(message)
            | DhanError::InvalidCredentials(message)
            | DhanError::Vault(message) => Self::AuthenticationFailed { message },
            DhanError::InvalidQuantity(message) => Self::mapping("quantity", message),
            DhanError::CredentialsMissing { account_id } => Self::CredentialsMissing { account_id },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_error_is_vendor_rejection() {
        let err: BrokerError = DhanError::Api {
            code: "DH-906".to_string(),
            message: "Insufficient funds".to_string(),
        }
        .into();
        assert_eq!(
            err,
            BrokerError::VendorRejected {
                message: "Insufficient funds".to_string()
            }
        );
    }

    #[test]
    fn unauthorized_is_authentication_failure() {
        let err: BrokerError = DhanError::Unauthorized("expired".to_string()).into();
        assert!(matches!(err, BrokerError::AuthenticationFailed { .. }));
    }

    #[test]
    fn quantity_is_mapping_error() {
        let err: BrokerError = DhanError::InvalidQuantity("2.5".to_string()).into();
        assert!(matches!(err, BrokerError::Mapping { ref field, .. } if field == "quantity"));
    }

    #[test]
    fn network_is_transport() {
        let err: BrokerError = DhanError::MaxRetriesExceeded { attempts: 3 }.into();
        assert!(matches!(err, BrokerError::Transport { .. }));
    }
}
