//! `GET /v2/positions` rows -> canonical positions.
//!
//! Closed rows (net quantity zero) are dropped. Average price depends on the
//! side: buy average for longs, sell average for shorts, then the generic
//! average, then day buy value over day buy quantity.

use rust_decimal::Decimal;

use super::api_types::DhanPositionRecord;
use crate::domain::brokerage::BrokerPosition;

fn non_zero(value: Option<Decimal>) -> Option<Decimal> {
    value.filter(|v| !v.is_zero())
}

fn average_price(record: &DhanPositionRecord, net_qty: Decimal) -> Decimal {
    let side_avg = if net_qty > Decimal::ZERO {
        record.buy_avg
    } else {
        record.sell_avg
    };
    non_zero(side_avg)
        .or_else(|| non_zero(record.avg_price))
        .or_else(|| {
            let qty = record.day_buy_qty.filter(|q| *q > Decimal::ZERO)?;
            record.day_buy_value.map(|value| value / qty)
        })
        .unwrap_or(Decimal::ZERO)
}

/// Normalise one row; `None` for a closed position.
pub fn normalize_position(record: &DhanPositionRecord) -> Option<BrokerPosition> {
    let net_qty = non_zero(record.net_qty)?;
    let pnl = record.realized_profit.unwrap_or(Decimal::ZERO)
        + record.unrealized_profit.unwrap_or(Decimal::ZERO);

    Some(BrokerPosition {
        symbol: record
            .trading_symbol
            .clone()
            .unwrap_or_else(|| "Unknown".to_string()),
        product_type: record
            .product_type
            .clone()
            .unwrap_or_else(|| "INTRADAY".to_string()),
        net_qty,
        avg_price: average_price(record, net_qty),
        ltp: non_zero(record.last_traded_price)
            .or(record.ltp)
            .unwrap_or(Decimal::ZERO),
        pnl,
        buy_qty: record.buy_qty.unwrap_or(Decimal::ZERO),
        sell_qty: record.sell_qty.unwrap_or(Decimal::ZERO),
    })
}

/// Normalise all rows, dropping closed positions.
pub fn normalize_positions(records: &[DhanPositionRecord]) -> Vec<BrokerPosition> {
    records.iter().filter_map(normalize_position).collect()
}
