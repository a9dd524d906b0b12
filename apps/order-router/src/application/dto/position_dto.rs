//! Position DTOs

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::brokerage::PositionDirection;

/// Request to flatten an open position with an opposite-side market order.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClosePositionDto {
    /// Vendor security identifier.
    pub security_id: String,
    /// Trading symbol.
    #[serde(default)]
    pub symbol: Option<String>,
    /// Quantity to close.
    pub quantity: Decimal,
    /// `LONG`; anything else closes as a short position.
    pub position_type: String,
    /// Exchange or segment.
    #[serde(default)]
    pub exchange: Option<String>,
    /// Product type.
    #[serde(default)]
    pub product_type: Option<String>,
}

impl ClosePositionDto {
    /// Direction of the position being closed.
    #[must_use]
    pub fn direction(&self) -> PositionDirection {
        PositionDirection::parse_lenient(&self.position_type)
    }
}
