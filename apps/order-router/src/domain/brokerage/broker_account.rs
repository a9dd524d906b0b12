//! Linked broker account.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::domain::shared::{AccountId, BrokerId, UserId};

/// A user's link to one broker vendor.
///
/// Credentials are held by the credential vault, never on this record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BrokerAccount {
    /// Account identifier.
    pub id: AccountId,
    /// Owning user.
    pub user_id: UserId,
    /// Vendor identifier used for adapter lookup.
    pub broker_id: BrokerId,
    /// Free-form metadata supplied at link time.
    #[serde(default)]
    pub metadata: Value,
}

impl BrokerAccount {
    /// Returns true if `user_id` owns this account.
    #[must_use]
    pub fn is_owned_by(&self, user_id: &UserId) -> bool {
        &self.user_id == user_id
    }
}
