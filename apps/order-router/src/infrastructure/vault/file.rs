//! File-backed development vault.
//!
//! Credentials linked at runtime are kept in a JSON file so they are still
//! readable after a restart. The file holds plaintext and is only protected
//! by its filesystem permissions.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::application::ports::{CredentialVault, VaultError};
use crate::domain::shared::AccountId;
use crate::infrastructure::persistence::JsonFileMap;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoredCredentials {
    account_id: AccountId,
    credentials: Value,
}

/// JSON-file implementation of [`CredentialVault`].
#[derive(Debug)]
pub struct FileCredentialVault {
    entries: JsonFileMap<AccountId, StoredCredentials>,
}

impl FileCredentialVault {
    /// Open the vault file at `path`.
    pub async fn open(path: impl Into<PathBuf>) -> Result<Self, VaultError> {
        let entries =
            JsonFileMap::open(path, |stored: &StoredCredentials| stored.account_id.clone()).await?;
        Ok(Self { entries })
    }

    /// Location of the backing file.
    #[must_use]
    pub fn path(&self) -> &Path {
        self.entries.path()
    }
}

#[async_trait]
impl CredentialVault for FileCredentialVault {
    async fn read_decrypted_credentials(
        &self,
        account_id: &AccountId,
    ) -> Result<Option<Value>, VaultError> {
        Ok(self
            .entries
            .read(|entries| entries.get(account_id).map(|stored| stored.credentials.clone()))
            .await)
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
        self.entries
            .update(|entries| {
                entries.insert(
                    account_id.clone(),
                    StoredCredentials {
                        account_id: account_id.clone(),
                        credentials: credentials.clone(),
                    },
                );
                Ok(())
            })
            .await
    }
}
