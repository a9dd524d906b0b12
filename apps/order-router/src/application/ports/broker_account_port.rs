//! Broker Account Port (Driven Port)

use async_trait::async_trait;

use crate::domain::brokerage::BrokerAccount;
use crate::domain::shared::{AccountId, UserId};

/// Broker account storage error.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Broker account storage error: {0}")]
pub struct AccountStoreError(pub String);

/// Persistence for linked broker accounts.
#[async_trait]
pub trait BrokerAccountRepository: Send + Sync {
    /// Save an account (insert or update).
    async fn save(&self, account: &BrokerAccount) -> Result<(), AccountStoreError>;

    /// Find an account by ID.
    async fn find_by_id(&self, id: &AccountId) -> Result<Option<BrokerAccount>, AccountStoreError>;

    /// List accounts linked by a user.
    async fn find_by_user(&self, user_id: &UserId) -> Result<Vec<BrokerAccount>, AccountStoreError>;
}
