//! Strongly-typed identifiers for domain entities.
//!
//! These prevent mixing up IDs from different contexts.

use serde::{Deserialize, Serialize};
use std::fmt;

macro_rules! define_id {
    ($name:ident, $doc:expr) => {
        #[doc = $doc]
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Create a new identifier from a string.
            #[must_use]
            pub fn new(value: impl Into<String>) -> Self {
                Self(value.into())
            }

            /// Get the inner string value.
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Consume and return the inner string.
            #[must_use]
            pub fn into_inner(self) -> String {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }

        impl From<String> for $name {
            fn from(value: String) -> Self {
                Self(value)
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self(value.to_string())
            }
        }
    };
}

define_id!(OrderId, "Unique identifier for an order (internal).");
define_id!(UserId, "Identifier of the user owning orders and broker accounts.");
define_id!(AccountId, "Identifier of a linked broker account.");
define_id!(
    BrokerId,
    "Broker vendor identifier used for adapter lookup (e.g. `angelone`, `dhan`)."
);
define_id!(BrokerOrderId, "Vendor-assigned order identifier.");
define_id!(JobKey, "Name of a scheduled job, derived from the order it fires.");

impl OrderId {
    /// Generate a new unique identifier using UUID v4.
    #[must_use]
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }
}

impl AccountId {
    /// Generate a new unique identifier using UUID v4.
    #[must_use]
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }
}
