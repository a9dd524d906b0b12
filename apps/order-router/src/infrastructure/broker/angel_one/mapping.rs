//! Canonical request -> SmartAPI payload mapping.

use chrono::{DateTime, FixedOffset, Utc};
use rust_decimal::prelude::ToPrimitive;
use serde_json::Value;

use super::api_types::{CandleRequest, CandleRows, PlaceOrderPayload};
use super::error::AngelOneError;
use crate::application::ports::BrokerOrderRequest;
use crate::domain::brokerage::{Candle, CandleInterval};
use crate::domain::order_execution::OrderType;
use crate::infrastructure::broker::json_fields::decimal_from_value;

const DEFAULT_SEGMENT: &str = "NSE_EQ";
const DEFAULT_PRODUCT_TYPE: &str = "INTRADAY";
const EQUITY_SUFFIX: &str = "-EQ";
const ORDER_EXCHANGE: &str = "NSE";
const IST_OFFSET_SECS: i32 = 5 * 3600 + 30 * 60;

/// Build the `placeOrder` body.
///
/// The trading symbol is mandatory. For NSE equity (`NSE` or `NSE_EQ`, the
/// default) an `-EQ` suffix is appended unless already present.
pub fn to_place_order_payload(
    request: &BrokerOrderRequest,
) -> Result<PlaceOrderPayload, AngelOneError> {
    let meta = &request.metadata;
    let symbol = meta
        .trading_symbol
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or(AngelOneError::MissingTradingSymbol)?;

    let segment = meta.exchange.as_deref().unwrap_or(DEFAULT_SEGMENT);
    let tradingsymbol = if is_nse_equity(segment) && !symbol.ends_with(EQUITY_SUFFIX) {
        format!("{symbol}{EQUITY_SUFFIX}")
    } else {
        symbol.to_string()
    };

    Ok(PlaceOrderPayload {
        variety: "NORMAL".to_string(),
        tradingsymbol,
        symboltoken: request.symbol.clone(),
        transactiontype: request.side.as_str().to_string(),
        exchange: ORDER_EXCHANGE.to_string(),
        ordertype: order_type_code(request.order_type).to_string(),
        producttype: meta
            .product_type
            .clone()
            .unwrap_or_else(|| DEFAULT_PRODUCT_TYPE.to_string()),
        duration: "DAY".to_string(),
        price: request
            .price
            .map_or_else(|| "0".to_string(), |p| p.normalize().to_string()),
        quantity: request.quantity.normalize().to_string(),
        squareoff: "0".to_string(),
        stoploss: "0".to_string(),
    })
}

fn is_nse_equity(segment: &str) -> bool {
    segment.eq_ignore_ascii_case("NSE") || segment.eq_ignore_ascii_case("NSE_EQ")
}

/// SmartAPI spelling of an order type.
pub const fn order_type_code(order_type: OrderType) -> &'static str {
    match order_type {
        OrderType::Market => "MARKET",
        OrderType::Limit => "LIMIT",
        OrderType::StopLossLimit => "STOPLOSS_LIMIT",
        OrderType::StopLossMarket => "STOPLOSS_MARKET",
    }
}

/// SmartAPI spelling of a candle interval.
pub const fn interval_code(interval: CandleInterval) -> &'static str {
    match interval {
        CandleInterval::OneMinute => "ONE_MINUTE",
        CandleInterval::FiveMinutes => "FIVE_MINUTE",
        CandleInterval::FifteenMinutes => "FIFTEEN_MINUTE",
        CandleInterval::OneHour => "ONE_HOUR",
        CandleInterval::OneDay => "ONE_DAY",
    }
}

/// `yyyy-MM-dd HH:mm` in India Standard Time.
pub fn format_ist(instant: DateTime<Utc>) -> String {
    FixedOffset::east_opt(IST_OFFSET_SECS).map_or_else(
        || instant.format("%Y-%m-%d %H:%M").to_string(),
        |ist| instant.with_timezone(&ist).format("%Y-%m-%d %H:%M").to_string(),
    )
}

/// Build the `getCandleData` body.
pub fn to_candle_request(
    symbol_token: &str,
    interval: CandleInterval,
    from: DateTime<Utc>,
    to: DateTime<Utc>,
) -> CandleRequest {
    CandleRequest {
        exchange: ORDER_EXCHANGE.to_string(),
        symboltoken: symbol_token.to_string(),
        interval: interval_code(interval).to_string(),
        fromdate: format_ist(from),
        todate: format_ist(to),
    }
}

/// Parse candle rows, skipping malformed ones.
pub fn parse_candles(rows: &CandleRows) -> Vec<Candle> {
    rows.iter()
        .filter_map(|row| {
            let candle = parse_candle(row);
            if candle.is_none() {
                tracing::warn!(row = ?row, "Skipping malformed candle");
            }
            candle
        })
        .collect()
}

fn parse_candle(row: &[Value]) -> Option<Candle> {
    if row.len() < 6 {
        return None;
    }
    let timestamp = DateTime::parse_from_rfc3339(row[0].as_str()?)
        .ok()?
        .with_timezone(&Utc);
    let volume = decimal_from_value(&row[5])?;
    Some(Candle {
        timestamp,
        open: decimal_from_value(&row[1])?,
        high: decimal_from_value(&row[2])?,
        low: decimal_from_value(&row[3])?,
        close: decimal_from_value(&row[4])?,
        volume: volume.trunc().to_i64()?,
    })
}
