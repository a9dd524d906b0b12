//! Canonical open position.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::order_execution::OrderSide;

/// Vendor-neutral position built by an adapter's normaliser.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BrokerPosition {
    /// Vendor trading symbol.
    pub symbol: String,
    /// Vendor product type.
    pub product_type: String,
    /// Net quantity (negative for short).
    pub net_qty: Decimal,
    /// Average price.
    pub avg_price: Decimal,
    /// Last traded price.
    pub ltp: Decimal,
    /// Profit and loss.
    pub pnl: Decimal,
    /// Bought quantity.
    pub buy_qty: Decimal,
    /// Sold quantity.
    pub sell_qty: Decimal,
}

/// Direction of a position being closed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum PositionDirection {
    /// Net long.
    Long,
    /// Net short.
    Short,
}

impl PositionDirection {
    /// Parse `LONG`/`SHORT` case-insensitively; anything else is short.
    #[must_use]
    pub fn parse_lenient(value: &str) -> Self {
        if value.eq_ignore_ascii_case("LONG") {
            Self::Long
        } else {
            Self::Short
        }
    }

    /// Side of the market order that flattens the position.
    #[must_use]
    pub const fn exit_side(&self) -> OrderSide {
        match self {
            Self::Long => OrderSide::Sell,
            Self::Short => OrderSide::Buy,
        }
    }
}
