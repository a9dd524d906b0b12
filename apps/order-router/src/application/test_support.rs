//! Shared fixtures for application-layer unit tests.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use rust_decimal_macros::dec;
use serde_json::Value;

use crate::application::ports::{
    BrokerAdapter, BrokerError, BrokerOrderRequest, PlaceOrderResult,
};
use crate::application::services::BrokerRegistry;
use crate::domain::brokerage::{AuthToken, BrokerAccount, BrokerCapability, BrokerPosition};
use crate::domain::order_execution::{CreateOrderCommand, OrderSide, OrderType};
use crate::domain::shared::{AccountId, BrokerId, BrokerOrderId, UserId};
use crate::infrastructure::persistence::InMemoryBrokerAccountRepository;

/// Adapter answering every placement with a fixed outcome.
pub struct ScriptedBroker {
    id: BrokerId,
    outcome: Result<String, BrokerError>,
    delay: Duration,
    pub place_calls: AtomicUsize,
    pub last_request: std::sync::Mutex<Option<BrokerOrderRequest>>,
}

impl ScriptedBroker {
    pub fn accepting(order_id: &str) -> Self {
        Self::with_outcome(Ok(order_id.to_string()))
    }

    pub fn rejecting(message: &str) -> Self {
        Self::with_outcome(Err(BrokerError::VendorRejected {
            message: message.to_string(),
        }))
    }

    pub fn with_outcome(outcome: Result<String, BrokerError>) -> Self {
        Self {
            id: BrokerId::new("scripted"),
            outcome,
            delay: Duration::ZERO,
            place_calls: AtomicUsize::new(0),
            last_request: std::sync::Mutex::new(None),
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn calls(&self) -> usize {
        self.place_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl BrokerAdapter for ScriptedBroker {
    fn broker_id(&self) -> &BrokerId {
        &self.id
    }

    fn capabilities(&self) -> &[BrokerCapability] {
        &[BrokerCapability::PlaceOrder, BrokerCapability::GetPositions]
    }

    async fn authenticate(&self, _account_id: &AccountId) -> Result<AuthToken, BrokerError> {
        Ok(AuthToken::new("token", Utc::now(), 3600))
    }

    async fn place_order(
        &self,
        _account_id: &AccountId,
        request: &BrokerOrderRequest,
    ) -> Result<PlaceOrderResult, BrokerError> {
        self.place_calls.fetch_add(1, Ordering::SeqCst);
        *self.last_request.lock().unwrap() = Some(request.clone());
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        self.outcome.clone().map(|id| PlaceOrderResult {
            broker_order_id: BrokerOrderId::new(id),
            status: "PLACED".to_string(),
            message: None,
        })
    }

    async fn get_positions(&self, _account_id: &AccountId) -> Result<Vec<BrokerPosition>, BrokerError> {
        Ok(vec![BrokerPosition {
            symbol: "RELIANCE-EQ".to_string(),
            product_type: "INTRADAY".to_string(),
            net_qty: dec!(10),
            avg_price: dec!(2500),
            ltp: dec!(2510),
            pnl: dec!(100),
            buy_qty: dec!(10),
            sell_qty: dec!(0),
        }])
    }

    async fn validate_credentials(&self, raw_credentials: &Value) -> bool {
        raw_credentials.get("accessToken").is_some()
    }
}

pub fn registry_with(broker: &Arc<ScriptedBroker>) -> Arc<BrokerRegistry> {
    let adapter: Arc<dyn BrokerAdapter> = broker.clone();
    Arc::new(BrokerRegistry::new().with(adapter))
}

pub fn account() -> BrokerAccount {
    BrokerAccount {
        id: AccountId::new("acct-1"),
        user_id: UserId::new("user-1"),
        broker_id: BrokerId::new("scripted"),
        metadata: Value::Null,
    }
}

pub fn accounts() -> Arc<InMemoryBrokerAccountRepository> {
    Arc::new(InMemoryBrokerAccountRepository::with_accounts([account()]))
}

pub fn market_buy() -> CreateOrderCommand {
    CreateOrderCommand {
        user_id: UserId::new("user-1"),
        broker_account_id: AccountId::new("acct-1"),
        symbol: "3045".to_string(),
        side: OrderSide::Buy,
        quantity: dec!(10),
        price: None,
        order_type: OrderType::Market,
        product_type: None,
    }
}
