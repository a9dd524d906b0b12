//! Broker Port (Driven Port)
//!
//! Uniform contract every broker vendor implements:
//! authenticate, map, place/query/cancel, normalize.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::domain::brokerage::{
    AuthToken, BrokerCapability, BrokerPosition, CandleInterval, HistoricalData,
};
use crate::domain::order_execution::{Order, OrderSide, OrderType};
use crate::domain::shared::{AccountId, BrokerId, BrokerOrderId, OrderId};

/// Caller-supplied execution metadata.
///
/// Never persisted: the stored order keeps only the vendor-neutral symbol.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderMetadata {
    /// Human-readable vendor trading symbol (e.g. `RELIANCE`).
    #[serde(default)]
    pub trading_symbol: Option<String>,
    /// Exchange or exchange segment (e.g. `NSE`, `NSE_EQ`).
    #[serde(default)]
    pub exchange: Option<String>,
    /// Product type (e.g. `INTRADAY`, `CNC`).
    #[serde(default)]
    pub product_type: Option<String>,
}

impl OrderMetadata {
    /// Read metadata from a free-form JSON object, ignoring unknown keys.
    ///
    /// Non-string values are ignored rather than rejected.
    #[must_use]
    pub fn from_json(value: Option<&Value>) -> Self {
        let field = |key: &str| {
            value
                .and_then(|v| v.get(key))
                .and_then(Value::as_str)
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
        };
        Self {
            trading_symbol: field("tradingSymbol"),
            exchange: field("exchange"),
            product_type: field("productType"),
        }
    }
}

/// Canonical order request handed to an adapter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BrokerOrderRequest {
    /// Internal order this request was built from, if any.
    pub client_order_id: Option<OrderId>,
    /// Vendor-neutral security identifier.
    pub symbol: String,
    /// Order side.
    pub side: OrderSide,
    /// Quantity.
    pub quantity: Decimal,
    /// Price; absent or zero for market orders.
    pub price: Option<Decimal>,
    /// Order type.
    pub order_type: OrderType,
    /// Trading symbol, exchange and product type.
    pub metadata: OrderMetadata,
}

impl BrokerOrderRequest {
    /// Merge a persisted order with call-time metadata.
    ///
    /// The trading-symbol override wins over `metadata.trading_symbol`, and
    /// metadata product type wins over the order's own.
    #[must_use]
    pub fn from_order(
        order: &Order,
        trading_symbol_override: Option<&str>,
        metadata: OrderMetadata,
    ) -> Self {
        let trading_symbol = trading_symbol_override
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .or(metadata.trading_symbol);
        let product_type = metadata
            .product_type
            .or_else(|| order.product_type().map(str::to_string));

        Self {
            client_order_id: Some(order.id().clone()),
            symbol: order.symbol().to_string(),
            side: order.side(),
            quantity: order.quantity(),
            price: order.price(),
            order_type: order.order_type(),
            metadata: OrderMetadata {
                trading_symbol,
                exchange: metadata.exchange,
                product_type,
            },
        }
    }

    /// Market order with no backing internal order (used to close positions).
    #[must_use]
    pub const fn market(
        symbol: String,
        side: OrderSide,
        quantity: Decimal,
        metadata: OrderMetadata,
    ) -> Self {
        Self {
            client_order_id: None,
            symbol,
            side,
            quantity,
            price: None,
            order_type: OrderType::Market,
            metadata,
        }
    }
}

/// Normalised result of a successful placement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaceOrderResult {
    /// Vendor-assigned order ID.
    pub broker_order_id: BrokerOrderId,
    /// Vendor status string.
    pub status: String,
    /// Vendor message, if any.
    pub message: Option<String>,
}

/// Broker port error.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BrokerError {
    /// No stored credentials for the account.
    #[error("No credentials found for account {account_id}")]
    CredentialsMissing {
        /// Account ID.
        account_id: String,
    },

    /// Vendor rejected the login.
    #[error("Authentication failed: {message}")]
    AuthenticationFailed {
        /// Error details.
        message: String,
    },

    /// Required field absent or malformed while building the vendor payload.
    #[error("Mapping error on '{field}': {message}")]
    Mapping {
        /// Offending field.
        field: String,
        /// Error details.
        message: String,
    },

    /// Vendor answered with a failure status.
    #[error("Rejected by broker: {message}")]
    VendorRejected {
        /// Vendor message.
        message: String,
    },

    /// Network failure, timeout, or unparseable non-2xx response.
    #[error("Broker transport error: {message}")]
    Transport {
        /// Error details.
        message: String,
    },

    /// Operation not implemented for this broker.
    #[error("{capability} is not implemented for broker {broker}")]
    Unsupported {
        /// Broker ID.
        broker: String,
        /// Requested capability.
        capability: BrokerCapability,
    },

    /// No adapter registered under the identifier.
    #[error("Unknown broker: {broker_id}")]
    UnknownBroker {
        /// Requested broker ID.
        broker_id: String,
    },
}

impl BrokerError {
    /// Shorthand for [`BrokerError::Mapping`].
    pub fn mapping(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Mapping {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Shorthand for [`BrokerError::Unsupported`].
    pub fn unsupported(broker: &BrokerId, capability: BrokerCapability) -> Self {
        Self::Unsupported {
            broker: broker.to_string(),
            capability,
        }
    }

    /// Stable label for metrics and logs.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::CredentialsMissing { .. } => "credentials_missing",
            Self::AuthenticationFailed { .. } => "authentication_failed",
            Self::Mapping { .. } => "mapping",
            Self::VendorRejected { .. } => "vendor_rejected",
            Self::Transport { .. } => "transport",
            Self::Unsupported { .. } => "unsupported",
            Self::UnknownBroker { .. } => "unknown_broker",
        }
    }
}

/// Port implemented once per broker vendor.
///
/// Callers check [`BrokerAdapter::supports`] before invoking optional
/// operations; the defaults answer [`BrokerError::Unsupported`].
#[async_trait]
pub trait BrokerAdapter: Send + Sync {
    /// Vendor identifier used for registry lookup.
    fn broker_id(&self) -> &BrokerId;

    /// Declared capabilities.
    fn capabilities(&self) -> &[BrokerCapability];

    /// Returns true if the adapter declares `capability`.
    fn supports(&self, capability: BrokerCapability) -> bool {
        self.capabilities().contains(&capability)
    }

    /// Return a valid token, reusing the cache or logging in.
    async fn authenticate(&self, account_id: &AccountId) -> Result<AuthToken, BrokerError>;

    /// Place an order.
    async fn place_order(
        &self,
        account_id: &AccountId,
        request: &BrokerOrderRequest,
    ) -> Result<PlaceOrderResult, BrokerError>;

    /// Cancel an open order.
    async fn cancel_order(
        &self,
        _account_id: &AccountId,
        _broker_order_id: &BrokerOrderId,
    ) -> Result<(), BrokerError> {
        Err(BrokerError::unsupported(
            self.broker_id(),
            BrokerCapability::CancelOrder,
        ))
    }

    /// Fetch normalised open positions.
    async fn get_positions(&self, _account_id: &AccountId) -> Result<Vec<BrokerPosition>, BrokerError> {
        Err(BrokerError::unsupported(
            self.broker_id(),
            BrokerCapability::GetPositions,
        ))
    }

    /// Fetch historical candles.
    async fn get_historical_data(
        &self,
        _account_id: &AccountId,
        _symbol: &str,
        _interval: CandleInterval,
        _from: DateTime<Utc>,
        _to: DateTime<Utc>,
    ) -> Result<HistoricalData, BrokerError> {
        Err(BrokerError::unsupported(
            self.broker_id(),
            BrokerCapability::HistoricalData,
        ))
    }

    /// Best-effort probe of raw credentials at link time.
    ///
    /// Parsing, mapping and network failures all answer `false`.
    async fn validate_credentials(&self, raw_credentials: &Value) -> bool;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::order_execution::CreateOrderCommand;
    use crate::domain::shared::UserId;
    use rust_decimal_macros::dec;
    use serde_json::json;

    fn order(product_type: Option<&str>) -> Order {
        Order::new(CreateOrderCommand {
            user_id: UserId::new("user-1"),
            broker_account_id: AccountId::new("acct-1"),
            symbol: "3045".to_string(),
            side: OrderSide::Buy,
            quantity: dec!(10),
            price: None,
            order_type: OrderType::Market,
            product_type: product_type.map(str::to_string),
        })
        .unwrap()
    }

    #[test]
    fn metadata_from_json_ignores_blank_and_unknown() {
        let meta = OrderMetadata::from_json(Some(&json!({
            "tradingSymbol": "RELIANCE",
            "exchange": "  ",
            "productType": 5,
            "other": "x"
        })));
        assert_eq!(meta.trading_symbol.as_deref(), Some("RELIANCE"));
        assert!(meta.exchange.is_none());
        assert!(meta.product_type.is_none());

        assert_eq!(OrderMetadata::from_json(None), OrderMetadata::default());
    }

    #[test]
    fn override_wins_over_metadata_symbol() {
        let meta = OrderMetadata {
            trading_symbol: Some("FROM-META".to_string()),
            ..OrderMetadata::default()
        };
        let request = BrokerOrderRequest::from_order(&order(None), Some("RELIANCE"), meta);
        assert_eq!(request.metadata.trading_symbol.as_deref(), Some("RELIANCE"));
        assert_eq!(request.symbol, "3045");
    }

    #[test]
    fn product_type_falls_back_to_order() {
        let request =
            BrokerOrderRequest::from_order(&order(Some("CNC")), None, OrderMetadata::default());
        assert_eq!(request.metadata.product_type.as_deref(), Some("CNC"));
        assert!(request.metadata.trading_symbol.is_none());
    }

    #[test]
    fn unsupported_names_capability() {
        let err = BrokerError::unsupported(&BrokerId::new("dhan"), BrokerCapability::HistoricalData);
        assert_eq!(
            err.to_string(),
            "HISTORICAL_DATA is not implemented for broker dhan"
        );
        assert_eq!(err.kind(), "unsupported");
    }
}
