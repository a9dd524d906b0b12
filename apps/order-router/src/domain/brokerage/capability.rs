//! Operations a broker adapter can declare support for.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Named operation an adapter supports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BrokerCapability {
    /// Place a new order.
    PlaceOrder,
    /// Cancel an open order.
    CancelOrder,
    /// Modify an open order.
    ModifyOrder,
    /// One-cancels-other orders.
    Oco,
    /// Margin trading.
    MarginTrading,
    /// Instrument search.
    InstrumentSearch,
    /// Vendor order book.
    OrderBook,
    /// Live market-data stream.
    MarketDataStream,
    /// Historical candles.
    HistoricalData,
    /// Open positions.
    GetPositions,
}

impl BrokerCapability {
    /// Wire name of the capability.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::PlaceOrder => "PLACE_ORDER",
            Self::CancelOrder => "CANCEL_ORDER",
            Self::ModifyOrder => "MODIFY_ORDER",
            Self::Oco => "OCO",
            Self::MarginTrading => "MARGIN_TRADING",
            Self::InstrumentSearch => "INSTRUMENT_SEARCH",
            Self::OrderBook => "ORDER_BOOK",
            Self::MarketDataStream => "MARKET_DATA_STREAM",
            Self::HistoricalData => "HISTORICAL_DATA",
            Self::GetPositions => "GET_POSITIONS",
        }
    }
}

impl fmt::Display for BrokerCapability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
