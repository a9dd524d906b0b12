//! Dhan API request/response types.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::infrastructure::broker::json_fields::{lenient_decimal, lenient_string};

/// Credential blob stored in the vault for a Dhan account.
#[derive(Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DhanCredentials {
    pub access_token: String,
    #[serde(deserialize_with = "required_string")]
    pub client_id: String,
}

impl DhanCredentials {
    /// Access token as sent in the `access-token` header.
    pub fn token(&self) -> &str {
        self.access_token.trim()
    }
}

impl std::fmt::Debug for DhanCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DhanCredentials")
            .field("client_id", &self.client_id)
            .finish_non_exhaustive()
    }
}

fn required_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: serde::Deserializer<'de>,
{
    lenient_string(deserializer)?.ok_or_else(|| serde::de::Error::custom("expected a string or number"))
}

/// Body of `POST /v2/orders`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DhanOrderRequest {
    pub dhan_client_id: String,
    pub transaction_type: String,
    pub exchange_segment: String,
    pub product_type: String,
    pub order_type: String,
    pub validity: String,
    pub security_id: String,
    pub quantity: u64,
    #[serde(
        skip_serializing_if = "Option::is_none",
        with = "rust_decimal::serde::float_option"
    )]
    pub price: Option<Decimal>,
}

/// Response of order placement and cancellation.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DhanOrderResponse {
    #[serde(default, deserialize_with = "lenient_string")]
    pub order_id: Option<String>,
    #[serde(default)]
    pub order_status: Option<String>,
}

/// Error body of a non-2xx response.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DhanErrorResponse {
    #[serde(default)]
    pub error_code: Option<String>,
    #[serde(default)]
    pub error_message: Option<String>,
}

/// One row of `GET /v2/positions`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DhanPositionRecord {
    #[serde(default)]
    pub trading_symbol: Option<String>,
    #[serde(default)]
    pub product_type: Option<String>,
    #[serde(default, deserialize_with = "lenient_decimal")]
    pub net_qty: Option<Decimal>,
    #[serde(default, deserialize_with = "lenient_decimal")]
    pub buy_avg: Option<Decimal>,
    #[serde(default, deserialize_with = "lenient_decimal")]
    pub sell_avg: Option<Decimal>,
    #[serde(default, deserialize_with = "lenient_decimal")]
    pub avg_price: Option<Decimal>,
    #[serde(default, deserialize_with = "lenient_decimal")]
    pub day_buy_value: Option<Decimal>,
    #[serde(default, deserialize_with = "lenient_decimal")]
    pub day_buy_qty: Option<Decimal>,
    #[serde(default, deserialize_with = "lenient_decimal")]
    pub last_traded_price: Option<Decimal>,
    #[serde(default, deserialize_with = "lenient_decimal")]
    pub ltp: Option<Decimal>,
    #[serde(default, deserialize_with = "lenient_decimal")]
    pub realized_profit: Option<Decimal>,
    #[serde(default, deserialize_with = "lenient_decimal")]
    pub unrealized_profit: Option<Decimal>,
    #[serde(default, deserialize_with = "lenient_decimal")]
    pub buy_qty: Option<Decimal>,
    #[serde(default, deserialize_with = "lenient_decimal")]
    pub sell_qty: Option<Decimal>,
}
