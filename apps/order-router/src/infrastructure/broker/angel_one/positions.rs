//! `getPosition` rows -> canonical positions.
//!
//! Angel reports every position touched today, including flat ones, and the
//! rows are passed through as-is.

use rust_decimal::Decimal;

use super::api_types::AngelPositionRecord;
use crate::domain::brokerage::BrokerPosition;

/// Normalise one row. Missing numbers read as zero.
pub fn normalize_position(record: &AngelPositionRecord) -> BrokerPosition {
    BrokerPosition {
        symbol: record.tradingsymbol.clone().unwrap_or_default(),
        product_type: record.producttype.clone().unwrap_or_default(),
        net_qty: record.netqty.unwrap_or(Decimal::ZERO),
        avg_price: record.avgnetprice.unwrap_or(Decimal::ZERO),
        ltp: record.ltp.unwrap_or(Decimal::ZERO),
        pnl: record.pnl.unwrap_or(Decimal::ZERO),
        buy_qty: record.buyqty.unwrap_or(Decimal::ZERO),
        sell_qty: record.sellqty.unwrap_or(Decimal::ZERO),
    }
}

/// Normalise all rows, keeping flat positions.
pub fn normalize_positions(records: &[AngelPositionRecord]) -> Vec<BrokerPosition> {
    records.iter().map(normalize_position).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use serde_json::json;

    fn records(value: serde_json::Value) -> Vec<AngelPositionRecord> {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn string_numbers_are_parsed() {
        let rows = records(json!([{
            "tradingsymbol": "SBIN-EQ",
            "producttype": "INTRADAY",
            "netqty": "-5",
            "avgnetprice": "612.40",
            "ltp": "610.00",
            "pnl": "12.00",
            "buyqty": "0",
            "sellqty": "5"
        }]));
        let position = normalize_position(&rows[0]);
        assert_eq!(position.symbol, "SBIN-EQ");
        assert_eq!(position.net_qty, dec!(-5));
        assert_eq!(position.avg_price, dec!(612.40));
        assert_eq!(position.pnl, dec!(12));
        assert_eq!(position.sell_qty, dec!(5));
    }

    #[test]
    fn flat_positions_are_kept() {
        let rows = records(json!([
            {"tradingsymbol": "SBIN-EQ", "netqty": "0"},
            {"tradingsymbol": "INFY-EQ", "netqty": "3"}
        ]));
        let positions = normalize_positions(&rows);
        assert_eq!(positions.len(), 2);
        assert_eq!(positions[0].net_qty, Decimal::ZERO);
    }

    #[test]
    fn missing_fields_default_to_zero() {
        let rows = records(json!([{}]));
        let position = normalize_position(&rows[0]);
        assert_eq!(position.symbol, "");
        assert_eq!(position.ltp, Decimal::ZERO);
    }
}
