//! Order type.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Order type.
///
/// Vendors spell the stop variants differently; adapters own that mapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderType {
    /// Execute at the best available price.
    Market,
    /// Execute at the limit price or better.
    Limit,
    /// Stop-loss that becomes a limit order when triggered.
    StopLossLimit,
    /// Stop-loss that becomes a market order when triggered.
    StopLossMarket,
}

impl OrderType {
    /// Returns true if this order type carries a price.
    #[must_use]
    pub const fn requires_price(&self) -> bool {
        matches!(self, Self::Limit | Self::StopLossLimit)
    }
}

impl fmt::Display for OrderType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Market => write!(f, "MARKET"),
            Self::Limit => write!(f, "LIMIT"),
            Self::StopLossLimit => write!(f, "STOP_LOSS_LIMIT"),
            Self::StopLossMarket => write!(f, "STOP_LOSS_MARKET"),
        }
    }
}
