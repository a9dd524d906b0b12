//! Angel One broker adapter implementation.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::Value;

use super::api_types::{
    AngelCredentials, AngelEnvelope, AngelPositionRecord, CandleRows, LoginData, LoginRequest,
    PlaceOrderData,
};
use super::config::AngelOneConfig;
use super::error::AngelOneError;
use super::http_client::{
    AngelOneHttpClient, CANDLE_DATA_PATH, Idempotency, PLACE_ORDER_PATH, POSITIONS_PATH,
};
use super::mapping::{parse_candles, to_candle_request, to_place_order_payload};
use super::positions::normalize_positions;
use super::totp::generate_totp;
use crate::application::ports::{
    BrokerAdapter, BrokerError, BrokerOrderRequest, CredentialVault, PlaceOrderResult,
};
use crate::application::services::TokenCache;
use crate::domain::brokerage::{
    AuthToken, BrokerCapability, BrokerPosition, CandleInterval, HistoricalData,
};
use crate::domain::shared::{AccountId, BrokerId, BrokerOrderId};

/// Broker identifier under which the adapter registers.
pub const ANGEL_ONE_BROKER_ID: &str = "angelone";

const CAPABILITIES: [BrokerCapability; 4] = [
    BrokerCapability::PlaceOrder,
    BrokerCapability::MarketDataStream,
    BrokerCapability::GetPositions,
    BrokerCapability::HistoricalData,
];

/// Angel One adapter implementing [`BrokerAdapter`].
pub struct AngelOneAdapter {
    client: AngelOneHttpClient,
    vault: Arc<dyn CredentialVault>,
    tokens: Arc<TokenCache>,
    broker_id: BrokerId,
    token_ttl_secs: i64,
}

impl AngelOneAdapter {
    /// Create a new adapter.
    pub fn new(
        config: &AngelOneConfig,
        vault: Arc<dyn CredentialVault>,
        tokens: Arc<TokenCache>,
    ) -> Result<Self, AngelOneError> {
        Ok(Self {
            client: AngelOneHttpClient::new(config)?,
            vault,
            tokens,
            broker_id: BrokerId::new(ANGEL_ONE_BROKER_ID),
            token_ttl_secs: config.token_ttl_secs,
        })
    }

    async fn credentials(&self, account_id: &AccountId) -> Result<AngelCredentials, AngelOneError> {
        let raw = self
            .vault
            .read_decrypted_credentials(account_id)
            .await?
            .ok_or_else(|| AngelOneError::CredentialsMissing {
                account_id: account_id.to_string(),
            })?;
        parse_credentials(raw)
    }

    async fn login(&self, credentials: &AngelCredentials) -> Result<AuthToken, AngelOneError> {
        let totp = generate_totp(&credentials.totp_key, Utc::now().timestamp())?;
        let body = LoginRequest {
            clientcode: &credentials.client_code,
            password: &credentials.password,
            totp: &totp,
        };
        let envelope = self
            .client
            .login(&credentials.api_key, &body)
            .await
            .map_err(|err| match err {
                AngelOneError::Api { message, .. } => AngelOneError::LoginRejected(message),
                other => other,
            })?;
        session_from_login(envelope, self.token_ttl_secs)
    }

    /// Valid session and the account's API key.
    async fn session(&self, account_id: &AccountId) -> Result<(AuthToken, String), BrokerError> {
        let credentials = self.credentials(account_id).await?;
        let token = self
            .tokens
            .get_or_login(&self.broker_id, account_id, || async {
                self.login(&credentials).await.map_err(BrokerError::from)
            })
            .await?;
        Ok((token, credentials.api_key))
    }
}

fn parse_credentials(raw: Value) -> Result<AngelCredentials, AngelOneError> {
    serde_json::from_value(raw).map_err(|e| AngelOneError::InvalidCredentials(e.to_string()))
}

fn session_from_login(
    envelope: AngelEnvelope<LoginData>,
    ttl_secs: i64,
) -> Result<AuthToken, AngelOneError> {
    if !envelope.status {
        return Err(AngelOneError::LoginRejected(envelope.reason()));
    }
    let data = envelope
        .data
        .ok_or_else(|| AngelOneError::LoginRejected("Missing 'data' in login response".to_string()))?;
    let jwt = data
        .jwt_token
        .filter(|t| !t.is_empty())
        .ok_or_else(|| AngelOneError::LoginRejected("Missing jwtToken in login response".to_string()))?;

    Ok(AuthToken::new(jwt, Utc::now(), ttl_secs)
        .with_refresh_token(data.refresh_token)
        .with_feed_token(data.feed_token))
}

#[async_trait]
impl BrokerAdapter for AngelOneAdapter {
    fn broker_id(&self) -> &BrokerId {
        &self.broker_id
    }

    fn capabilities(&self) -> &[BrokerCapability] {
        &CAPABILITIES
    }

    #[tracing::instrument(skip(self), fields(broker = ANGEL_ONE_BROKER_ID))]
    async fn authenticate(&self, account_id: &AccountId) -> Result<AuthToken, BrokerError> {
        let (token, _api_key) = self.session(account_id).await?;
        Ok(token)
    }

    async fn place_order(
        &self,
        account_id: &AccountId,
        request: &BrokerOrderRequest,
    ) -> Result<PlaceOrderResult, BrokerError> {
        let payload = to_place_order_payload(request)?;
        let (token, api_key) = self.session(account_id).await?;

        tracing::debug!(
            account_id = %account_id,
            tradingsymbol = %payload.tradingsymbol,
            symboltoken = %payload.symboltoken,
            "Submitting Angel One order"
        );
        let envelope: AngelEnvelope<PlaceOrderData> = self
            .client
            .post_secured(
                PLACE_ORDER_PATH,
                &token.access_token,
                &api_key,
                &payload,
                Idempotency::SendOnce,
            )
            .await?;

        if !envelope.status {
            return Err(AngelOneError::OrderRejected(envelope.reason()).into());
        }
        let order_id = envelope
            .data
            .and_then(|data| data.orderid)
            .filter(|id| !id.is_empty())
            .ok_or_else(|| BrokerError::VendorRejected {
                message: "Order response carried no order id".to_string(),
            })?;

        Ok(PlaceOrderResult {
            broker_order_id: BrokerOrderId::new(order_id),
            status: "PLACED".to_string(),
            message: Some(envelope.message).filter(|m| !m.is_empty()),
        })
    }

    async fn get_positions(&self, account_id: &AccountId) -> Result<Vec<BrokerPosition>, BrokerError> {
        let (token, api_key) = self.session(account_id).await?;
        let envelope: AngelEnvelope<Vec<AngelPositionRecord>> = self
            .client
            .get_secured(POSITIONS_PATH, &token.access_token, &api_key)
            .await?;

        if !envelope.status {
            return Err(AngelOneError::Api {
                status: 200,
                message: envelope.reason(),
            }
            .into());
        }
        Ok(normalize_positions(&envelope.data.unwrap_or_default()))
    }

    async fn get_historical_data(
        &self,
        account_id: &AccountId,
        symbol: &str,
        interval: CandleInterval,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<HistoricalData, BrokerError> {
        let (token, api_key) = self.session(account_id).await?;
        let body = to_candle_request(symbol, interval, from, to);
        let envelope: AngelEnvelope<CandleRows> = self
            .client
            .post_secured(
                CANDLE_DATA_PATH,
                &token.access_token,
                &api_key,
                &body,
                Idempotency::Idempotent,
            )
            .await?;

        if !envelope.status {
            let message = envelope.reason();
            tracing::warn!(account_id = %account_id, symbol, message = %message, "Historical data fetch failed");
            return Ok(HistoricalData::VendorFailure { message });
        }
        Ok(HistoricalData::Candles {
            candles: parse_candles(&envelope.data.unwrap_or_default()),
        })
    }

    async fn validate_credentials(&self, raw_credentials: &Value) -> bool {
        let Ok(credentials) = parse_credentials(raw_credentials.clone()) else {
            return false;
        };
        match self.login(&credentials).await {
            Ok(_) => true,
            Err(err) => {
                tracing::warn!(error = %err, "Angel One credential probe failed");
                false
            }
        }
    }
}
