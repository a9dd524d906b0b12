//! HTTP request DTOs.

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::application::dto::{ClosePositionDto, CreateOrderDto};
use crate::application::ports::OrderMetadata;
use crate::domain::brokerage::CandleInterval;

/// Request to create an order and execute it now.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaceOrderRequest {
    /// Order fields.
    #[serde(flatten)]
    pub order: CreateOrderDto,
    /// Free-form execution metadata (`tradingSymbol`, `exchange`, `productType`).
    #[serde(default)]
    pub meta: Option<Value>,
}

impl PlaceOrderRequest {
    /// Execution metadata carried alongside the order.
    #[must_use]
    pub fn metadata(&self) -> OrderMetadata {
        OrderMetadata::from_json(self.meta.as_ref())
    }
}

/// Request to create an order that executes at `trigger_time`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleOrderRequest {
    /// Order fields.
    #[serde(flatten)]
    pub order: CreateOrderDto,
    /// Instant the order executes.
    pub trigger_time: DateTime<Utc>,
}

/// Query naming the calling user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserQuery {
    /// Calling user.
    pub user_id: String,
}

/// Request to link a broker account.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LinkBrokerRequest {
    /// Owning user.
    pub user_id: String,
    /// Registered broker identifier.
    pub broker_id: String,
    /// Vendor credentials, probed before they are stored.
    pub credentials: Value,
    /// Free-form account metadata.
    #[serde(default)]
    pub metadata: Value,
}

/// Request to flatten a position.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClosePositionRequest {
    /// Calling user.
    pub user_id: String,
    /// Position to close.
    #[serde(flatten)]
    pub position: ClosePositionDto,
}

/// Query of the historical data endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryQuery {
    /// Calling user.
    pub user_id: String,
    /// `1M`, `5M`, `15M`, `1H` or `1D`.
    #[serde(default = "default_interval")]
    pub interval: String,
    /// Range start, epoch seconds or RFC 3339.
    pub from: String,
    /// Range end, epoch seconds or RFC 3339.
    pub to: String,
}

fn default_interval() -> String {
    "5M".to_string()
}

impl HistoryQuery {
    /// Candle interval, falling back to five minutes.
    #[must_use]
    pub fn interval(&self) -> CandleInterval {
        CandleInterval::parse_lenient(&self.interval)
    }

    /// Parsed `(from, to)` range.
    pub fn range(&self) -> Result<(DateTime<Utc>, DateTime<Utc>), String> {
        Ok((parse_timestamp(&self.from)?, parse_timestamp(&self.to)?))
    }
}

/// Parse epoch seconds or an RFC 3339 timestamp.
pub fn parse_timestamp(value: &str) -> Result<DateTime<Utc>, String> {
    let value = value.trim();
    if let Ok(secs) = value.parse::<i64>() {
        return Utc
            .timestamp_opt(secs, 0)
            .single()
            .ok_or_else(|| format!("timestamp out of range: {value}"));
    }
    DateTime::parse_from_rfc3339(value)
        .map(|t| t.with_timezone(&Utc))
        .map_err(|e| format!("invalid timestamp '{value}': {e}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::order_execution::{OrderSide, OrderType};
    use rust_decimal_macros::dec;

    #[test]
    fn place_request_reads_flattened_order_and_meta() {
        let json = r#"{
            "userId": "user-1",
            "brokerAccountId": "acct-1",
            "symbol": "3045",
            "side": "BUY",
            "quantity": 10,
            "meta": {"tradingSymbol": "RELIANCE", "exchange": "NSE", "lotSize": 1}
        }"#;

        let req: PlaceOrderRequest = serde_json::from_str(json).unwrap();
        assert_eq!(req.order.symbol, "3045");
        assert_eq!(req.order.side, OrderSide::Buy);
        assert_eq!(req.order.quantity, dec!(10));
        assert_eq!(req.order.order_type, OrderType::Market);

        let meta = req.metadata();
        assert_eq!(meta.trading_symbol.as_deref(), Some("RELIANCE"));
        assert_eq!(meta.exchange.as_deref(), Some("NSE"));
        assert!(meta.product_type.is_none());
    }

    #[test]
    fn missing_meta_is_empty_metadata() {
        let json = r#"{
            "userId": "user-1",
            "brokerAccountId": "acct-1",
            "symbol": "3045",
            "side": "SELL",
            "quantity": "2",
            "orderType": "LIMIT",
            "price": "2500.5"
        }"#;

        let req: PlaceOrderRequest = serde_json::from_str(json).unwrap();
        assert_eq!(req.metadata(), OrderMetadata::default());
        assert_eq!(req.order.price, Some(dec!(2500.5)));
    }

    #[test]
    fn schedule_request_parses_trigger_time() {
        let json = r#"{
            "userId": "user-1",
            "brokerAccountId": "acct-1",
            "symbol": "3045",
            "side": "BUY",
            "quantity": 1,
            "triggerTime": "2026-01-05T03:45:00Z"
        }"#;

        let req: ScheduleOrderRequest = serde_json::from_str(json).unwrap();
        assert_eq!(req.trigger_time.to_rfc3339(), "2026-01-05T03:45:00+00:00");
    }

    #[test]
    fn timestamps_accept_epoch_and_rfc3339() {
        assert_eq!(parse_timestamp("0").unwrap(), DateTime::<Utc>::UNIX_EPOCH);
        assert_eq!(
            parse_timestamp("2026-01-05T09:15:00+05:30").unwrap(),
            parse_timestamp("2026-01-05T03:45:00Z").unwrap()
        );
        assert!(parse_timestamp("yesterday").is_err());
    }

    #[test]
    fn history_query_defaults_interval() {
        let query: HistoryQuery =
            serde_json::from_str(r#"{"user_id": "user-1", "from": "0", "to": "60"}"#).unwrap();
        assert_eq!(query.interval(), CandleInterval::FiveMinutes);
        let (from, to) = query.range().unwrap();
        assert!(from < to);
    }
}
