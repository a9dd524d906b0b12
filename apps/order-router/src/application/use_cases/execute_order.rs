//! Execute Order Use Case
//!
//! The execution engine: claim the order, resolve account and adapter, build
//! the vendor request, place it, and persist exactly one terminal outcome.

use std::sync::Arc;
use std::time::Instant;

use chrono::Utc;
use tokio::task::JoinHandle;

use crate::application::ports::{
    BrokerAccountRepository, BrokerAdapter, BrokerError, BrokerOrderRequest, ExecutionError,
    OrderMetadata, PlaceOrderResult,
};
use crate::application::services::BrokerRegistry;
use crate::domain::brokerage::{BrokerAccount, BrokerCapability};
use crate::domain::order_execution::{Order, OrderError, OrderRepository, OrderStatus};
use crate::domain::shared::OrderId;
use crate::observability::record_order_execution;

/// Completion signal of an asynchronous execution.
pub type ExecutionHandle = JoinHandle<Result<Order, ExecutionError>>;

/// Use case running one execution attempt for an order.
pub struct ExecuteOrderUseCase<O, A>
where
    O: OrderRepository,
    A: BrokerAccountRepository,
{
    order_repo: Arc<O>,
    account_repo: Arc<A>,
    registry: Arc<BrokerRegistry>,
}

impl<O, A> ExecuteOrderUseCase<O, A>
where
    O: OrderRepository,
    A: BrokerAccountRepository,
{
    /// Create a new ExecuteOrderUseCase.
    pub const fn new(order_repo: Arc<O>, account_repo: Arc<A>, registry: Arc<BrokerRegistry>) -> Self {
        Self {
            order_repo,
            account_repo,
            registry,
        }
    }

    /// Run one execution attempt.
    ///
    /// The order is claimed (PENDING -> EXECUTING) before any vendor work, so a
    /// concurrent attempt fails with [`OrderError::AlreadyExecuting`] and never
    /// reaches the broker. Once claimed, every failure becomes a FAILED order
    /// with the reason kept; the returned order carries the outcome. There is
    /// no automatic retry.
    #[tracing::instrument(skip(self, metadata), fields(order_id = %order_id))]
    pub async fn execute(
        &self,
        order_id: &OrderId,
        trading_symbol_override: Option<&str>,
        metadata: OrderMetadata,
    ) -> Result<Order, ExecutionError> {
        let started = Instant::now();

        let mut order = match self.order_repo.try_begin_execution(order_id).await {
            Ok(order) => order,
            Err(err @ OrderError::AlreadyExecuting { .. }) => {
                tracing::warn!(order_id = %order_id, "Execution rejected, order already claimed");
                record_order_execution("unresolved", "rejected_concurrent", 0.0);
                return Err(err.into());
            }
            Err(err) => return Err(err.into()),
        };

        let (broker, outcome) = match self.resolve(&order).await {
            Ok((account, adapter)) => {
                let request = BrokerOrderRequest::from_order(&order, trading_symbol_override, metadata);
                let outcome = Self::place(&account, adapter.as_ref(), &request).await;
                (adapter.broker_id().to_string(), outcome)
            }
            Err(err) => ("unresolved".to_string(), Err(err)),
        };

        match outcome {
            Ok(result) => {
                tracing::info!(
                    order_id = %order_id,
                    broker = %broker,
                    broker_order_id = %result.broker_order_id,
                    "Order placed"
                );
                order.mark_placed(result.broker_order_id, Utc::now())?;
            }
            Err(err) => {
                let error_kind = match &err {
                    ExecutionError::Broker(broker_err) => broker_err.kind(),
                    _ => "execution",
                };
                tracing::warn!(
                    order_id = %order_id,
                    broker = %broker,
                    error_kind,
                    reason = %err,
                    "Order execution failed"
                );
                order.mark_failed(err.to_string())?;
            }
        }

        if let Err(err) = self.order_repo.save(&order).await {
            tracing::error!(order_id = %order_id, error = %err, "Failed to persist execution outcome");
            return Err(err.into());
        }

        let outcome_label = if order.status() == OrderStatus::Placed {
            "placed"
        } else {
            "failed"
        };
        record_order_execution(&broker, outcome_label, started.elapsed().as_secs_f64());

        Ok(order)
    }

    async fn resolve(
        &self,
        order: &Order,
    ) -> Result<(BrokerAccount, Arc<dyn BrokerAdapter>), ExecutionError> {
        let account = self
            .account_repo
            .find_by_id(order.broker_account_id())
            .await?
            .ok_or_else(|| ExecutionError::AccountNotFound {
                account_id: order.broker_account_id().to_string(),
            })?;
        let adapter = self.registry.get(&account.broker_id)?;
        Ok((account, adapter))
    }

    async fn place(
        account: &BrokerAccount,
        adapter: &dyn BrokerAdapter,
        request: &BrokerOrderRequest,
    ) -> Result<PlaceOrderResult, ExecutionError> {
        if !adapter.supports(BrokerCapability::PlaceOrder) {
            return Err(BrokerError::unsupported(adapter.broker_id(), BrokerCapability::PlaceOrder).into());
        }
        Ok(adapter.place_order(&account.id, request).await?)
    }
}

impl<O, A> ExecuteOrderUseCase<O, A>
where
    O: OrderRepository + 'static,
    A: BrokerAccountRepository + 'static,
{
    /// Dispatch [`ExecuteOrderUseCase::execute`] onto its own task.
    ///
    /// The handle resolves once the outcome is persisted.
    pub fn spawn_execute(
        self: &Arc<Self>,
        order_id: OrderId,
        trading_symbol_override: Option<String>,
        metadata: OrderMetadata,
    ) -> ExecutionHandle {
        let engine = Arc::clone(self);
        tokio::spawn(async move {
            engine
                .execute(&order_id, trading_symbol_override.as_deref(), metadata)
                .await
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::test_support::{ScriptedBroker, accounts, market_buy, registry_with};
    use crate::domain::order_execution::Order;
    use crate::infrastructure::persistence::{
        InMemoryBrokerAccountRepository, InMemoryOrderRepository,
    };
    use std::time::Duration;

    type Engine = ExecuteOrderUseCase<InMemoryOrderRepository, InMemoryBrokerAccountRepository>;

    async fn setup(broker: ScriptedBroker) -> (Arc<Engine>, Arc<InMemoryOrderRepository>, Arc<ScriptedBroker>, Order) {
        let broker = Arc::new(broker);
        let orders = Arc::new(InMemoryOrderRepository::new());
        let order = Order::new(market_buy()).unwrap();
        orders.save(&order).await.unwrap();
        let engine = Arc::new(ExecuteOrderUseCase::new(
            Arc::clone(&orders),
            accounts(),
            registry_with(&broker),
        ));
        (engine, orders, broker, order)
    }

    #[tokio::test]
    async fn placed_order_records_broker_id() {
        let (engine, orders, _broker, order) = setup(ScriptedBroker::accepting("X1")).await;

        let result = engine
            .execute(order.id(), Some("RELIANCE"), OrderMetadata::default())
            .await
            .unwrap();
        assert_eq!(result.status(), OrderStatus::Placed);

        let stored = orders.find_by_id(order.id()).await.unwrap().unwrap();
        assert_eq!(stored.status(), OrderStatus::Placed);
        assert_eq!(stored.broker_order_id().map(|id| id.as_str()), Some("X1"));
        assert!(stored.executed_at().is_some());
    }

    #[tokio::test]
    async fn override_and_metadata_reach_the_adapter() {
        let (engine, _orders, broker, order) = setup(ScriptedBroker::accepting("X1")).await;
        let meta = OrderMetadata {
            trading_symbol: None,
            exchange: Some("NSE".to_string()),
            product_type: Some("CNC".to_string()),
        };

        engine.execute(order.id(), Some("RELIANCE"), meta).await.unwrap();

        let request = broker.last_request.lock().unwrap().clone().unwrap();
        assert_eq!(request.symbol, "3045");
        assert_eq!(request.metadata.trading_symbol.as_deref(), Some("RELIANCE"));
        assert_eq!(request.metadata.exchange.as_deref(), Some("NSE"));
        assert_eq!(request.metadata.product_type.as_deref(), Some("CNC"));
    }

    #[tokio::test]
    async fn vendor_rejection_marks_failed_with_reason() {
        let (engine, orders, _broker, order) = setup(ScriptedBroker::rejecting("insufficient funds")).await;

        let result = engine
            .execute(order.id(), None, OrderMetadata::default())
            .await
            .unwrap();
        assert_eq!(result.status(), OrderStatus::Failed);

        let stored = orders.find_by_id(order.id()).await.unwrap().unwrap();
        assert_eq!(stored.status(), OrderStatus::Failed);
        assert!(stored.failure_reason().unwrap().contains("insufficient funds"));
        assert!(stored.broker_order_id().is_none());
    }

    #[tokio::test]
    async fn missing_account_marks_failed() {
        let broker = Arc::new(ScriptedBroker::accepting("X1"));
        let orders = Arc::new(InMemoryOrderRepository::new());
        let order = Order::new(market_buy()).unwrap();
        orders.save(&order).await.unwrap();
        let engine = ExecuteOrderUseCase::new(
            Arc::clone(&orders),
            Arc::new(InMemoryBrokerAccountRepository::new()),
            registry_with(&broker),
        );

        let result = engine
            .execute(order.id(), None, OrderMetadata::default())
            .await
            .unwrap();
        assert_eq!(result.status(), OrderStatus::Failed);
        assert_eq!(broker.calls(), 0);
    }

    #[tokio::test]
    async fn terminal_order_is_not_re_executed() {
        let (engine, orders, broker, order) = setup(ScriptedBroker::accepting("X1")).await;
        engine.execute(order.id(), None, OrderMetadata::default()).await.unwrap();

        let err = engine
            .execute(order.id(), None, OrderMetadata::default())
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            ExecutionError::Order(OrderError::InvalidStateTransition { .. })
        ));
        assert_eq!(broker.calls(), 1);
        let stored = orders.find_by_id(order.id()).await.unwrap().unwrap();
        assert_eq!(stored.broker_order_id().map(|id| id.as_str()), Some("X1"));
    }

    #[tokio::test]
    async fn concurrent_attempts_reach_broker_once() {
        let (engine, orders, broker, order) =
            setup(ScriptedBroker::accepting("X1").with_delay(Duration::from_millis(50))).await;

        let first = engine.spawn_execute(order.id().clone(), None, OrderMetadata::default());
        let second = engine.spawn_execute(order.id().clone(), None, OrderMetadata::default());
        let results = [first.await.unwrap(), second.await.unwrap()];

        let rejected = results
            .iter()
            .filter(|r| matches!(r, Err(ExecutionError::Order(OrderError::AlreadyExecuting { .. }))))
            .count();
        assert_eq!(rejected, 1);
        assert_eq!(broker.calls(), 1);

        let stored = orders.find_by_id(order.id()).await.unwrap().unwrap();
        assert_eq!(stored.status(), OrderStatus::Placed);
    }

    #[tokio::test]
    async fn handle_resolves_after_persist() {
        let (engine, orders, _broker, order) = setup(ScriptedBroker::accepting("X9")).await;

        let handle = engine.spawn_execute(order.id().clone(), None, OrderMetadata::default());
        let executed = handle.await.unwrap().unwrap();
        assert_eq!(executed.status(), OrderStatus::Placed);

        let stored = orders.find_by_id(order.id()).await.unwrap().unwrap();
        assert_eq!(stored, executed);
    }
}
