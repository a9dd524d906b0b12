//! Dhan broker adapter implementation.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use serde_json::Value;

use super::api_types::{DhanCredentials, DhanOrderResponse, DhanPositionRecord};
use super::config::DhanConfig;
use super::error::DhanError;
use super::http_client::{DhanHttpClient, ORDERS_PATH, POSITIONS_PATH};
use super::mapping::to_order_request;
use super::positions::normalize_positions;
use crate::application::ports::{
    BrokerAdapter, BrokerError, BrokerOrderRequest, CredentialVault, PlaceOrderResult,
};
use crate::application::services::TokenCache;
use crate::domain::brokerage::{AuthToken, BrokerCapability, BrokerPosition};
use crate::domain::shared::{AccountId, BrokerId, BrokerOrderId};

/// Broker identifier under which the adapter registers.
pub const DHAN_BROKER_ID: &str = "dhan";

const CAPABILITIES: [BrokerCapability; 3] = [
    BrokerCapability::PlaceOrder,
    BrokerCapability::CancelOrder,
    BrokerCapability::GetPositions,
];

/// Dhan adapter implementing [`BrokerAdapter`].
pub struct DhanAdapter {
    client: DhanHttpClient,
    vault: Arc<dyn CredentialVault>,
    tokens: Arc<TokenCache>,
    broker_id: BrokerId,
    token_ttl_secs: i64,
}

impl DhanAdapter {
    /// Create a new adapter.
    pub fn new(
        config: &DhanConfig,
        vault: Arc<dyn CredentialVault>,
        tokens: Arc<TokenCache>,
    ) -> Result<Self, DhanError> {
        Ok(Self {
            client: DhanHttpClient::new(config)?,
            vault,
            tokens,
            broker_id: BrokerId::new(DHAN_BROKER_ID),
            token_ttl_secs: config.token_ttl_secs,
        })
    }

    async fn credentials(&self, account_id: &AccountId) -> Result<DhanCredentials, DhanError> {
        let raw = self
            .vault
            .read_decrypted_credentials(account_id)
            .await?
            .ok_or_else(|| DhanError::CredentialsMissing {
                account_id: account_id.to_string(),
            })?;
        parse_credentials(raw)
    }

    /// Probed session token and the account's credentials.
    async fn session(&self, account_id: &AccountId) -> Result<(AuthToken, DhanCredentials), BrokerError> {
        let credentials = self.credentials(account_id).await?;
        let token = self
            .tokens
            .get_or_login(&self.broker_id, account_id, || async {
                self.client
                    .probe(credentials.token())
                    .await
                    .map_err(BrokerError::from)?;
                Ok::<_, BrokerError>(AuthToken::new(
                    credentials.token(),
                    Utc::now(),
                    self.token_ttl_secs,
                ))
            })
            .await?;
        Ok((token, credentials))
    }
}

fn parse_credentials(raw: Value) -> Result<DhanCredentials, DhanError> {
    let credentials: DhanCredentials =
        serde_json::from_value(raw).map_err(|e| DhanError::InvalidCredentials(e.to_string()))?;
    if credentials.token().is_empty() {
        return Err(DhanError::InvalidCredentials("accessToken is empty".to_string()));
    }
    Ok(credentials)
}

#[async_trait]
impl BrokerAdapter for DhanAdapter {
    fn broker_id(&self) -> &BrokerId {
        &self.broker_id
    }

    fn capabilities(&self) -> &[BrokerCapability] {
        &CAPABILITIES
    }

    #[tracing::instrument(skip(self), fields(broker = DHAN_BROKER_ID))]
    async fn authenticate(&self, account_id: &AccountId) -> Result<AuthToken, BrokerError> {
        let (token, _credentials) = self.session(account_id).await?;
        Ok(token)
    }

    async fn place_order(
        &self,
        account_id: &AccountId,
        request: &BrokerOrderRequest,
    ) -> Result<PlaceOrderResult, BrokerError> {
        let (token, credentials) = self.session(account_id).await?;
        let body = to_order_request(request, &credentials.client_id)?;

        tracing::debug!(
            account_id = %account_id,
            security_id = %body.security_id,
            segment = %body.exchange_segment,
            "Submitting Dhan order"
        );
        let response: DhanOrderResponse = self
            .client
            .post(ORDERS_PATH, &token.access_token, &body)
            .await?;

        let order_id = response
            .order_id
            .filter(|id| !id.is_empty())
            .ok_or_else(|| BrokerError::VendorRejected {
                message: "Order response carried no orderId".to_string(),
            })?;

        Ok(PlaceOrderResult {
            broker_order_id: BrokerOrderId::new(order_id),
            status: response.order_status.unwrap_or_else(|| "UNKNOWN".to_string()),
            message: Some("Placed via Dhan".to_string()),
        })
    }

    async fn cancel_order(
        &self,
        account_id: &AccountId,
        broker_order_id: &BrokerOrderId,
    ) -> Result<(), BrokerError> {
        let (token, _credentials) = self.session(account_id).await?;
        self.client
            .delete(&format!("{ORDERS_PATH}/{broker_order_id}"), &token.access_token)
            .await?;
        tracing::info!(account_id = %account_id, broker_order_id = %broker_order_id, "Dhan order cancelled");
        Ok(())
    }

    async fn get_positions(&self, account_id: &AccountId) -> Result<Vec<BrokerPosition>, BrokerError> {
        let (token, _credentials) = self.session(account_id).await?;
        let records: Vec<DhanPositionRecord> = self
            .client
            .get(POSITIONS_PATH, &token.access_token)
            .await?;
        Ok(normalize_positions(&records))
    }

    async fn validate_credentials(&self, raw_credentials: &Value) -> bool {
        let Ok(credentials) = parse_credentials(raw_credentials.clone()) else {
            return false;
        };
        match self.client.probe(credentials.token()).await {
            Ok(()) => true,
            Err(err) => {
                tracing::warn!(error = %err, "Dhan credential probe failed");
                false
            }
        }
    }
}
