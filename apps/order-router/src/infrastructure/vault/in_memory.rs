//! Development credential vault.
//!
//! Holds plaintext credential JSON in process memory. An optional seed file
//! provides linked accounts together with their credentials:
//!
//! ```json
//! { "accounts": [
//!     { "id": "acct-1", "userId": "user-1", "brokerId": "dhan",
//!       "metadata": {}, "credentials": { "accessToken": "...", "clientId": "..." } }
//! ] }
//! ```

use std::collections::HashMap;
use std::path::Path;
use std::sync::{PoisonError, RwLock};

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;

use crate::application::ports::{CredentialVault, VaultError};
use crate::domain::brokerage::BrokerAccount;
use crate::domain::shared::AccountId;

/// One seeded account with its credentials.
#[derive(Debug, Clone, Deserialize)]
pub struct AccountSeed {
    /// Account record.
    #[serde(flatten)]
    pub account: BrokerAccount,
    /// Vendor credential JSON.
    pub credentials: Value,
}

#[derive(Debug, Deserialize)]
struct SeedFile {
    #[serde(default)]
    accounts: Vec<AccountSeed>,
}

/// Read account seeds from a JSON file.
pub fn load_account_seeds(path: &Path) -> Result<Vec<AccountSeed>, VaultError> {
    let bytes = std::fs::read(path)
        .map_err(|e| VaultError::Storage(format!("{}: {e}", path.display())))?;
    let file: SeedFile = serde_json::from_slice(&bytes)
        .map_err(|e| VaultError::Storage(format!("{}: {e}", path.display())))?;
    Ok(file.accounts)
}

/// In-memory implementation of [`CredentialVault`].
#[derive(Debug, Default)]
pub struct InMemoryCredentialVault {
    credentials: RwLock<HashMap<AccountId, Value>>,
}

impl InMemoryCredentialVault {
    /// Create an empty vault.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Vault pre-filled from seeds.
    #[must_use]
    pub fn with_seeds<'a>(seeds: impl IntoIterator<Item = &'a AccountSeed>) -> Self {
        Self {
            credentials: RwLock::new(
                seeds
                    .into_iter()
                    .map(|seed| (seed.account.id.clone(), seed.credentials.clone()))
                    .collect(),
            ),
        }
    }
}

#[async_trait]
impl CredentialVault for InMemoryCredentialVault {
    async fn read_decrypted_credentials(
        &self,
        account_id: &AccountId,
    ) -> Result<Option<Value>, VaultError> {
        Ok(self
            .credentials
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(account_id)
            .cloned())
    }

    async fn store_credentials(
        &self,
        account_id: &AccountId,
        credentials: &Value,
    ) -> Result<(), VaultError> {
        if !credentials.is_object() {
            return Err(VaultError::Unreadable {
                account_id: account_id.to_string(),
                message: "credentials must be a JSON object".to_string(),
            });
        }
        self.credentials
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(account_id.clone(), credentials.clone());
        Ok(())
    }
}
