//! Broker Account Use Cases
//!
//! Linking accounts and account-scoped broker queries: positions, closing a
//! position, historical candles, and the list of available brokers.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde_json::Value;

use crate::application::dto::ClosePositionDto;
use crate::application::ports::{
    BrokerAccountRepository, BrokerAdapter, BrokerError, BrokerOrderRequest, CredentialVault,
    ExecutionError, OrderMetadata, PlaceOrderResult,
};
use crate::application::services::{BrokerDescriptor, BrokerRegistry};
use crate::domain::brokerage::{
    BrokerAccount, BrokerCapability, BrokerPosition, CandleInterval, HistoricalData,
};
use crate::domain::order_execution::OrderError;
use crate::domain::shared::{AccountId, BrokerId, UserId};

/// Use case for account linking and account-scoped broker queries.
pub struct BrokerAccountsUseCase<A, V>
where
    A: BrokerAccountRepository,
    V: CredentialVault,
{
    account_repo: Arc<A>,
    vault: Arc<V>,
    registry: Arc<BrokerRegistry>,
}

impl<A, V> BrokerAccountsUseCase<A, V>
where
    A: BrokerAccountRepository,
    V: CredentialVault,
{
    /// Create a new BrokerAccountsUseCase.
    pub const fn new(account_repo: Arc<A>, vault: Arc<V>, registry: Arc<BrokerRegistry>) -> Self {
        Self {
            account_repo,
            vault,
            registry,
        }
    }

    /// Registered brokers and their capabilities.
    #[must_use]
    pub fn available_brokers(&self) -> Vec<BrokerDescriptor> {
        self.registry.describe()
    }

    /// Accounts linked by a user.
    pub async fn linked_accounts(&self, user_id: &UserId) -> Result<Vec<BrokerAccount>, ExecutionError> {
        Ok(self.account_repo.find_by_user(user_id).await?)
    }

    /// Probe credentials with the vendor, then store the account and its
    /// credentials. A failed probe rejects the link.
    #[tracing::instrument(skip(self, credentials, metadata), fields(user_id = %user_id, broker = %broker_id))]
    pub async fn link_account(
        &self,
        user_id: &UserId,
        broker_id: &BrokerId,
        credentials: &Value,
        metadata: Value,
    ) -> Result<BrokerAccount, ExecutionError> {
        let adapter = self.registry.get(broker_id)?;
        if !adapter.validate_credentials(credentials).await {
            tracing::warn!(user_id = %user_id, broker = %broker_id, "Credential validation failed");
            return Err(BrokerError::AuthenticationFailed {
                message: "Credential validation failed".to_string(),
            }
            .into());
        }

        let account = BrokerAccount {
            id: AccountId::generate(),
            user_id: user_id.clone(),
            broker_id: broker_id.clone(),
            metadata,
        };
        self.vault.store_credentials(&account.id, credentials).await?;
        self.account_repo.save(&account).await?;

        tracing::info!(account_id = %account.id, broker = %broker_id, "Broker account linked");
        Ok(account)
    }

    /// Normalised open positions of an owned account.
    pub async fn positions(
        &self,
        user_id: &UserId,
        account_id: &AccountId,
    ) -> Result<Vec<BrokerPosition>, ExecutionError> {
        let (account, adapter) = self.owned(user_id, account_id).await?;
        Self::require(adapter.as_ref(), BrokerCapability::GetPositions)?;
        Ok(adapter.get_positions(&account.id).await?)
    }

    /// Flatten a position with an opposite-side market order.
    ///
    /// LONG closes with SELL and SHORT with BUY. No internal order is created.
    pub async fn close_position(
        &self,
        user_id: &UserId,
        account_id: &AccountId,
        dto: &ClosePositionDto,
    ) -> Result<PlaceOrderResult, ExecutionError> {
        if dto.quantity <= rust_decimal::Decimal::ZERO {
            return Err(OrderError::invalid("quantity", "Quantity must be greater than zero").into());
        }
        let (account, adapter) = self.owned(user_id, account_id).await?;
        Self::require(adapter.as_ref(), BrokerCapability::PlaceOrder)?;

        let side = dto.direction().exit_side();
        let request = BrokerOrderRequest::market(
            dto.security_id.clone(),
            side,
            dto.quantity,
            OrderMetadata {
                trading_symbol: dto.symbol.clone(),
                exchange: dto.exchange.clone(),
                product_type: dto.product_type.clone(),
            },
        );

        tracing::info!(account_id = %account.id, security_id = %dto.security_id, side = %side, "Closing position");
        Ok(adapter.place_order(&account.id, &request).await?)
    }

    /// Historical candles for a security through an owned account.
    pub async fn historical_data(
        &self,
        user_id: &UserId,
        account_id: &AccountId,
        symbol: &str,
        interval: CandleInterval,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<HistoricalData, ExecutionError> {
        if from > to {
            return Err(OrderError::invalid("from", "Start must not be after end").into());
        }
        let (account, adapter) = self.owned(user_id, account_id).await?;
        Self::require(adapter.as_ref(), BrokerCapability::HistoricalData)?;
        Ok(adapter
            .get_historical_data(&account.id, symbol, interval, from, to)
            .await?)
    }

    async fn owned(
        &self,
        user_id: &UserId,
        account_id: &AccountId,
    ) -> Result<(BrokerAccount, Arc<dyn BrokerAdapter>), ExecutionError> {
        let account = self
            .account_repo
            .find_by_id(account_id)
            .await?
            .ok_or_else(|| ExecutionError::AccountNotFound {
                account_id: account_id.to_string(),
            })?;
        if !account.is_owned_by(user_id) {
            return Err(ExecutionError::AccessDenied {
                account_id: account_id.to_string(),
            });
        }
        let adapter = self.registry.get(&account.broker_id)?;
        Ok((account, adapter))
    }

    fn require(adapter: &dyn BrokerAdapter, capability: BrokerCapability) -> Result<(), BrokerError> {
        if adapter.supports(capability) {
            Ok(())
        } else {
            Err(BrokerError::unsupported(adapter.broker_id(), capability))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::ports::MockCredentialVault;
    use crate::application::test_support::{ScriptedBroker, accounts, registry_with};
    use crate::domain::order_execution::OrderSide;
    use mockall::predicate::always;
    use rust_decimal_macros::dec;
    use serde_json::json;

    fn close_dto(position_type: &str) -> ClosePositionDto {
        ClosePositionDto {
            security_id: "3045".to_string(),
            symbol: Some("RELIANCE".to_string()),
            quantity: dec!(5),
            position_type: position_type.to_string(),
            exchange: Some("NSE".to_string()),
            product_type: Some("INTRADAY".to_string()),
        }
    }

    #[tokio::test]
    async fn link_stores_credentials_after_probe() {
        let broker = Arc::new(ScriptedBroker::accepting("X1"));
        let mut vault = MockCredentialVault::new();
        vault
            .expect_store_credentials()
            .with(always(), always())
            .times(1)
            .returning(|_, _| Ok(()));
        let use_case = BrokerAccountsUseCase::new(accounts(), Arc::new(vault), registry_with(&broker));

        let account = use_case
            .link_account(
                &UserId::new("user-2"),
                &BrokerId::new("scripted"),
                &json!({"accessToken": "abc", "clientId": "100"}),
                Value::Null,
            )
            .await
            .unwrap();
        assert_eq!(account.user_id, UserId::new("user-2"));

        let linked = use_case.linked_accounts(&UserId::new("user-2")).await.unwrap();
        assert_eq!(linked, vec![account]);
    }

    #[tokio::test]
    async fn failed_probe_rejects_link() {
        let broker = Arc::new(ScriptedBroker::accepting("X1"));
        let mut vault = MockCredentialVault::new();
        vault.expect_store_credentials().times(0);
        let use_case = BrokerAccountsUseCase::new(accounts(), Arc::new(vault), registry_with(&broker));

        let err = use_case
            .link_account(
                &UserId::new("user-2"),
                &BrokerId::new("scripted"),
                &json!({"clientId": "100"}),
                Value::Null,
            )
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            ExecutionError::Broker(BrokerError::AuthenticationFailed { .. })
        ));
    }

    #[tokio::test]
    async fn positions_require_ownership() {
        let broker = Arc::new(ScriptedBroker::accepting("X1"));
        let use_case = BrokerAccountsUseCase::new(
            accounts(),
            Arc::new(MockCredentialVault::new()),
            registry_with(&broker),
        );

        let positions = use_case
            .positions(&UserId::new("user-1"), &AccountId::new("acct-1"))
            .await
            .unwrap();
        assert_eq!(positions.len(), 1);

        let err = use_case
            .positions(&UserId::new("user-2"), &AccountId::new("acct-1"))
            .await
            .unwrap_err();
        assert!(matches!(err, ExecutionError::AccessDenied { .. }));
    }

    #[tokio::test]
    async fn close_long_sells_at_market() {
        let broker = Arc::new(ScriptedBroker::accepting("EXIT1"));
        let use_case = BrokerAccountsUseCase::new(
            accounts(),
            Arc::new(MockCredentialVault::new()),
            registry_with(&broker),
        );

        let result = use_case
            .close_position(&UserId::new("user-1"), &AccountId::new("acct-1"), &close_dto("LONG"))
            .await
            .unwrap();
        assert_eq!(result.broker_order_id.as_str(), "EXIT1");

        let request = broker.last_request.lock().unwrap().clone().unwrap();
        assert_eq!(request.side, OrderSide::Sell);
        assert_eq!(request.symbol, "3045");
        assert_eq!(request.metadata.trading_symbol.as_deref(), Some("RELIANCE"));
        assert!(request.client_order_id.is_none());
    }

    #[tokio::test]
    async fn close_short_buys() {
        let broker = Arc::new(ScriptedBroker::accepting("EXIT2"));
        let use_case = BrokerAccountsUseCase::new(
            accounts(),
            Arc::new(MockCredentialVault::new()),
            registry_with(&broker),
        );

        use_case
            .close_position(&UserId::new("user-1"), &AccountId::new("acct-1"), &close_dto("short"))
            .await
            .unwrap();
        let request = broker.last_request.lock().unwrap().clone().unwrap();
        assert_eq!(request.side, OrderSide::Buy);
    }

    #[tokio::test]
    async fn historical_data_requires_capability() {
        let broker = Arc::new(ScriptedBroker::accepting("X1"));
        let use_case = BrokerAccountsUseCase::new(
            accounts(),
            Arc::new(MockCredentialVault::new()),
            registry_with(&broker),
        );
        let now = Utc::now();

        let err = use_case
            .historical_data(
                &UserId::new("user-1"),
                &AccountId::new("acct-1"),
                "3045",
                CandleInterval::FiveMinutes,
                now - chrono::Duration::hours(1),
                now,
            )
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            ExecutionError::Broker(BrokerError::Unsupported {
                capability: BrokerCapability::HistoricalData,
                ..
            })
        ));
    }
}
