//! Order status in the lifecycle.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Order status.
///
/// `Executing` is internal: it marks an order claimed by one execution attempt
/// so a concurrent attempt can be rejected before any vendor call is made.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    /// Created, waiting for an execution attempt.
    Pending,
    /// Claimed by an in-flight execution attempt.
    Executing,
    /// Accepted by the broker.
    Placed,
    /// Execution attempt failed.
    Failed,
    /// Withdrawn before execution.
    Cancelled,
}

impl OrderStatus {
    /// Returns true if the order is in a terminal state.
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Placed | Self::Failed | Self::Cancelled)
    }

    /// Returns true if an execution attempt may still claim the order.
    #[must_use]
    pub const fn is_executable(&self) -> bool {
        matches!(self, Self::Pending)
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pending => write!(f, "PENDING"),
            Self::Executing => write!(f, "EXECUTING"),
            Self::Placed => write!(f, "PLACED"),
            Self::Failed => write!(f, "FAILED"),
            Self::Cancelled => write!(f, "CANCELLED"),
        }
    }
}
