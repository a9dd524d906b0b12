//! Historical candles.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One OHLCV candle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Candle {
    /// Candle start time.
    pub timestamp: DateTime<Utc>,
    /// Open price.
    pub open: Decimal,
    /// High price.
    pub high: Decimal,
    /// Low price.
    pub low: Decimal,
    /// Close price.
    pub close: Decimal,
    /// Traded volume.
    pub volume: i64,
}

impl Candle {
    /// Candle start as epoch milliseconds, the unit charting clients expect.
    #[must_use]
    pub fn time_millis(&self) -> i64 {
        self.timestamp.timestamp_millis()
    }
}

/// Candle granularity.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CandleInterval {
    /// One minute.
    OneMinute,
    /// Five minutes.
    #[default]
    FiveMinutes,
    /// Fifteen minutes.
    FifteenMinutes,
    /// One hour.
    OneHour,
    /// One day.
    OneDay,
}

impl CandleInterval {
    /// Parse a caller interval (`1M`, `5M`, `15M`, `1H`, `1D`, case-insensitive).
    ///
    /// Unrecognised values fall back to five minutes.
    #[must_use]
    pub fn parse_lenient(value: &str) -> Self {
        match value.trim().to_ascii_uppercase().as_str() {
            "1M" | "ONE_MINUTE" => Self::OneMinute,
            "15M" | "FIFTEEN_MINUTE" => Self::FifteenMinutes,
            "1H" | "ONE_HOUR" => Self::OneHour,
            "1D" | "ONE_DAY" => Self::OneDay,
            _ => Self::FiveMinutes,
        }
    }
}

/// Outcome of a historical-data request.
///
/// Keeps "no candles in range" distinct from "the vendor reported a failure".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum HistoricalData {
    /// Candles returned by the vendor (possibly none).
    Candles {
        /// Candles in chronological order.
        candles: Vec<Candle>,
    },
    /// The vendor answered with a failure status.
    VendorFailure {
        /// Vendor message.
        message: String,
    },
}

impl HistoricalData {
    /// Candles, or an empty slice when the vendor failed.
    #[must_use]
    pub fn candles(&self) -> &[Candle] {
        match self {
            Self::Candles { candles } => candles,
            Self::VendorFailure { .. } => &[],
        }
    }
}
