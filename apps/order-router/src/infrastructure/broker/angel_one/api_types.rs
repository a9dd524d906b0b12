//! Angel One API request/response types.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::infrastructure::broker::json_fields::{lenient_decimal, lenient_string};

/// Credential blob stored in the vault for an Angel One account.
#[derive(Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AngelCredentials {
    pub client_code: String,
    pub password: String,
    pub totp_key: String,
    pub api_key: String,
}

impl std::fmt::Debug for AngelCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AngelCredentials")
            .field("client_code", &self.client_code)
            .finish_non_exhaustive()
    }
}

/// Standard SmartAPI envelope.
///
/// Every endpoint answers `{status, message, errorcode, data}`; business
/// failures come back with HTTP 200 and `status: false`.
#[derive(Debug, Deserialize)]
pub struct AngelEnvelope<T> {
    #[serde(default)]
    pub status: bool,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub errorcode: Option<String>,
    pub data: Option<T>,
}

impl<T> AngelEnvelope<T> {
    /// Vendor message, falling back to the error code.
    pub fn reason(&self) -> String {
        if self.message.trim().is_empty() {
            self.errorcode
                .clone()
                .unwrap_or_else(|| "no message".to_string())
        } else {
            self.message.clone()
        }
    }
}

/// Body of `loginByPassword`.
#[derive(Debug, Serialize)]
pub struct LoginRequest<'a> {
    pub clientcode: &'a str,
    pub password: &'a str,
    pub totp: &'a str,
}

/// Session returned by `loginByPassword`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginData {
    #[serde(default)]
    pub jwt_token: Option<String>,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub feed_token: Option<String>,
}

/// Body of `placeOrder`. Angel expects numbers as strings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlaceOrderPayload {
    pub variety: String,
    pub tradingsymbol: String,
    pub symboltoken: String,
    pub transactiontype: String,
    pub exchange: String,
    pub ordertype: String,
    pub producttype: String,
    pub duration: String,
    pub price: String,
    pub quantity: String,
    pub squareoff: String,
    pub stoploss: String,
}

/// `data` of a `placeOrder` response.
#[derive(Debug, Deserialize)]
pub struct PlaceOrderData {
    #[serde(default, deserialize_with = "lenient_string")]
    pub orderid: Option<String>,
}

/// One row of `getPosition`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AngelPositionRecord {
    #[serde(default)]
    pub tradingsymbol: Option<String>,
    #[serde(default)]
    pub producttype: Option<String>,
    #[serde(default, deserialize_with = "lenient_decimal")]
    pub netqty: Option<Decimal>,
    #[serde(default, deserialize_with = "lenient_decimal")]
    pub avgnetprice: Option<Decimal>,
    #[serde(default, deserialize_with = "lenient_decimal")]
    pub ltp: Option<Decimal>,
    #[serde(default, deserialize_with = "lenient_decimal")]
    pub pnl: Option<Decimal>,
    #[serde(default, deserialize_with = "lenient_decimal")]
    pub buyqty: Option<Decimal>,
    #[serde(default, deserialize_with = "lenient_decimal")]
    pub sellqty: Option<Decimal>,
}

/// Body of `getCandleData`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CandleRequest {
    pub exchange: String,
    pub symboltoken: String,
    pub interval: String,
    pub fromdate: String,
    pub todate: String,
}

/// `data` of a `getCandleData` response: `[timestamp, o, h, l, c, v]` rows.
pub type CandleRows = Vec<Vec<Value>>;
