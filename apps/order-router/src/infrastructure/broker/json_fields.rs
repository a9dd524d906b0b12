//! Lenient numeric fields.
//!
//! Vendors send the same field as a JSON string on one endpoint and a number
//! on another (`"netqty": "10"` vs `"netQty": 10`). These helpers accept
//! either and treat anything unparseable as absent.

use std::str::FromStr;

use rust_decimal::Decimal;
use rust_decimal::prelude::FromPrimitive;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Decimal from a JSON number or numeric string.
pub(super) fn decimal_from_value(value: &Value) -> Option<Decimal> {
    match value {
        Value::Number(n) => Decimal::from_str(&n.to_string())
            .ok()
            .or_else(|| n.as_f64().and_then(Decimal::from_f64)),
        Value::String(s) => {
            let trimmed = s.trim();
            Decimal::from_str(trimmed)
                .or_else(|_| Decimal::from_scientific(trimmed))
                .ok()
        }
        _ => None,
    }
}

/// Serde adapter for `Option<Decimal>` fields that may be strings or numbers.
pub(super) fn lenient_decimal<'de, D>(deserializer: D) -> Result<Option<Decimal>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(decimal_from_value))
}

/// Serde adapter for `Option<String>` fields that may arrive as numbers.
pub(super) fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::String(s)) => Some(s),
        Some(Value::Number(n)) => Some(n.to_string()),
        Some(Value::Bool(b)) => Some(b.to_string()),
        _ => None,
    })
}
