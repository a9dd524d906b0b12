//! Schedule Order Use Case
//!
//! Creates an order together with a one-shot schedule, cancels schedules,
//! and runs scheduled orders when their job fires.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use super::ExecuteOrderUseCase;
use crate::application::ports::{
    BrokerAccountRepository, ExecutionError, OrderExecutor, OrderMetadata, SchedulerPort,
};
use crate::domain::order_execution::{
    CreateOrderCommand, Order, OrderError, OrderRepository, OrderStatus, ScheduledOrder,
    ScheduledOrderRepository,
};
use crate::domain::shared::{JobKey, OrderId};

/// Product type used by the scheduled path when the order has none.
pub const SCHEDULED_DEFAULT_PRODUCT_TYPE: &str = "INTRADAY";
/// Exchange segment used by the scheduled path.
pub const SCHEDULED_DEFAULT_EXCHANGE: &str = "NSE_EQ";

/// Use case for creating and cancelling scheduled orders.
pub struct ScheduleOrderUseCase<O, S, T>
where
    O: OrderRepository,
    S: ScheduledOrderRepository,
    T: SchedulerPort,
{
    order_repo: Arc<O>,
    scheduled_repo: Arc<S>,
    scheduler: Arc<T>,
}

impl<O, S, T> ScheduleOrderUseCase<O, S, T>
where
    O: OrderRepository,
    S: ScheduledOrderRepository,
    T: SchedulerPort,
{
    /// Create a new ScheduleOrderUseCase.
    pub const fn new(order_repo: Arc<O>, scheduled_repo: Arc<S>, scheduler: Arc<T>) -> Self {
        Self {
            order_repo,
            scheduled_repo,
            scheduler,
        }
    }

    /// Create a PENDING order and register its one-shot job.
    ///
    /// Scheduler failures propagate; the order and an active schedule without
    /// a job key remain stored so the caller can retry.
    pub async fn create_and_schedule(
        &self,
        command: CreateOrderCommand,
        trigger_time: DateTime<Utc>,
    ) -> Result<(Order, ScheduledOrder), ExecutionError> {
        let order = Order::new(command)?;
        self.order_repo.save(&order).await?;
        let scheduled = self.schedule_existing(order.id(), trigger_time).await?;
        Ok((order, scheduled))
    }

    /// Register (or re-register) the job for an existing order.
    #[tracing::instrument(skip(self), fields(order_id = %order_id))]
    pub async fn schedule_existing(
        &self,
        order_id: &OrderId,
        trigger_time: DateTime<Utc>,
    ) -> Result<ScheduledOrder, ExecutionError> {
        let mut scheduled = ScheduledOrder::new(order_id.clone(), trigger_time);
        self.scheduled_repo.save(&scheduled).await?;

        let job_key = self.scheduler.schedule_once(order_id, trigger_time).await?;
        scheduled.assign_job_key(job_key);
        self.scheduled_repo.save(&scheduled).await?;

        tracing::info!(
            order_id = %order_id,
            job_key = ?scheduled.job_key(),
            trigger_time = %trigger_time,
            "Order scheduled"
        );
        Ok(scheduled)
    }

    /// Cancel a job before it fires.
    ///
    /// Deactivates the schedule and cancels the order if it is still PENDING.
    /// Returns true if the job was removed or the order was cancelled, even
    /// when a firing timer took the stored job first.
    pub async fn cancel(&self, job_key: &JobKey) -> Result<bool, ExecutionError> {
        let removed = self.scheduler.cancel(job_key).await?;
        let mut order_cancelled = false;

        if let Some(mut scheduled) = self.scheduled_repo.find_by_job_key(job_key).await? {
            scheduled.deactivate();
            self.scheduled_repo.save(&scheduled).await?;

            match self.order_repo.try_cancel(scheduled.order_id()).await {
                Ok(_) => order_cancelled = true,
                Err(OrderError::InvalidStateTransition { .. } | OrderError::AlreadyExecuting { .. }) => {
                    tracing::debug!(order_id = %scheduled.order_id(), "Order already past PENDING, left unchanged");
                }
                Err(err) => return Err(err.into()),
            }
        }

        tracing::info!(job_key = %job_key, removed, order_cancelled, "Schedule cancelled");
        Ok(removed || order_cancelled)
    }
}

/// Runs scheduled orders through the execution engine when their job fires.
///
/// The scheduled path carries no trading-symbol override: it uses the order's
/// stored identifier with the order's product type (default INTRADAY) and the
/// NSE_EQ segment.
pub struct ScheduledOrderRunner<O, A, S>
where
    O: OrderRepository,
    A: BrokerAccountRepository,
    S: ScheduledOrderRepository,
{
    engine: Arc<ExecuteOrderUseCase<O, A>>,
    order_repo: Arc<O>,
    scheduled_repo: Arc<S>,
}

impl<O, A, S> ScheduledOrderRunner<O, A, S>
where
    O: OrderRepository,
    A: BrokerAccountRepository,
    S: ScheduledOrderRepository,
{
    /// Create a new ScheduledOrderRunner.
    pub const fn new(
        engine: Arc<ExecuteOrderUseCase<O, A>>,
        order_repo: Arc<O>,
        scheduled_repo: Arc<S>,
    ) -> Self {
        Self {
            engine,
            order_repo,
            scheduled_repo,
        }
    }

    /// Metadata the scheduled path sends for an order.
    #[must_use]
    pub fn scheduled_metadata(order: &Order) -> OrderMetadata {
        OrderMetadata {
            trading_symbol: None,
            exchange: Some(SCHEDULED_DEFAULT_EXCHANGE.to_string()),
            product_type: Some(
                order
                    .product_type()
                    .unwrap_or(SCHEDULED_DEFAULT_PRODUCT_TYPE)
                    .to_string(),
            ),
        }
    }
}

#[async_trait]
impl<O, A, S> OrderExecutor for ScheduledOrderRunner<O, A, S>
where
    O: OrderRepository,
    A: BrokerAccountRepository,
    S: ScheduledOrderRepository,
{
    async fn execute_scheduled(&self, order_id: &OrderId) -> Result<OrderStatus, ExecutionError> {
        if let Some(mut scheduled) = self.scheduled_repo.find_by_order_id(order_id).await? {
            scheduled.deactivate();
            self.scheduled_repo.save(&scheduled).await?;
        }

        let order = self
            .order_repo
            .find_by_id(order_id)
            .await?
            .ok_or_else(|| OrderError::NotFound {
                order_id: order_id.to_string(),
            })?;

        let executed = self
            .engine
            .execute(order_id, None, Self::scheduled_metadata(&order))
            .await?;
        Ok(executed.status())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::ports::{SchedulerError, job_key_for};
    use crate::application::test_support::{ScriptedBroker, accounts, market_buy, registry_with};
    use crate::infrastructure::persistence::{
        InMemoryOrderRepository, InMemoryScheduledOrderRepository,
    };
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingScheduler {
        scheduled: Mutex<Vec<(OrderId, DateTime<Utc>)>>,
        fail: bool,
    }

    #[async_trait]
    impl SchedulerPort for RecordingScheduler {
        async fn schedule_once(
            &self,
            order_id: &OrderId,
            trigger_time: DateTime<Utc>,
        ) -> Result<JobKey, SchedulerError> {
            if self.fail {
                return Err(SchedulerError::ShutDown);
            }
            self.scheduled
                .lock()
                .unwrap()
                .push((order_id.clone(), trigger_time));
            Ok(job_key_for(order_id))
        }

        async fn cancel(&self, job_key: &JobKey) -> Result<bool, SchedulerError> {
            let mut scheduled = self.scheduled.lock().unwrap();
            let before = scheduled.len();
            scheduled.retain(|(id, _)| &job_key_for(id) != job_key);
            Ok(scheduled.len() != before)
        }
    }

    fn use_case(
        scheduler: RecordingScheduler,
    ) -> (
        ScheduleOrderUseCase<InMemoryOrderRepository, InMemoryScheduledOrderRepository, RecordingScheduler>,
        Arc<InMemoryOrderRepository>,
        Arc<InMemoryScheduledOrderRepository>,
    ) {
        let orders = Arc::new(InMemoryOrderRepository::new());
        let schedules = Arc::new(InMemoryScheduledOrderRepository::new());
        let use_case = ScheduleOrderUseCase::new(
            Arc::clone(&orders),
            Arc::clone(&schedules),
            Arc::new(scheduler),
        );
        (use_case, orders, schedules)
    }

    #[tokio::test]
    async fn schedule_assigns_job_key() {
        let (use_case, orders, schedules) = use_case(RecordingScheduler::default());
        let (order, scheduled) = use_case
            .create_and_schedule(market_buy(), Utc::now())
            .await
            .unwrap();

        assert_eq!(scheduled.job_key(), Some(&job_key_for(order.id())));
        assert!(scheduled.is_active());
        assert_eq!(
            orders.find_by_id(order.id()).await.unwrap().unwrap().status(),
            OrderStatus::Pending
        );
        assert!(schedules.find_by_order_id(order.id()).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn scheduler_failure_propagates() {
        let (use_case, orders, schedules) = use_case(RecordingScheduler {
            fail: true,
            ..RecordingScheduler::default()
        });
        let err = use_case
            .create_and_schedule(market_buy(), Utc::now())
            .await
            .unwrap_err();
        assert!(matches!(err, ExecutionError::Scheduler(SchedulerError::ShutDown)));

        let stored = orders
            .find_by_user(&crate::domain::shared::UserId::new("user-1"))
            .await
            .unwrap();
        assert_eq!(stored.len(), 1);
        let scheduled = schedules
            .find_by_order_id(stored[0].id())
            .await
            .unwrap()
            .unwrap();
        assert!(scheduled.is_active());
        assert!(scheduled.job_key().is_none());
    }

    #[tokio::test]
    async fn cancel_deactivates_and_cancels_pending_order() {
        let (use_case, orders, schedules) = use_case(RecordingScheduler::default());
        let (order, scheduled) = use_case
            .create_and_schedule(market_buy(), Utc::now())
            .await
            .unwrap();
        let key = scheduled.job_key().unwrap().clone();

        assert!(use_case.cancel(&key).await.unwrap());
        assert!(!use_case.cancel(&key).await.unwrap());

        let stored = schedules.find_by_order_id(order.id()).await.unwrap().unwrap();
        assert!(!stored.is_active());
        assert_eq!(
            orders.find_by_id(order.id()).await.unwrap().unwrap().status(),
            OrderStatus::Cancelled
        );
    }

    #[tokio::test]
    async fn cancel_after_job_left_scheduler_still_reports_cancelled_order() {
        let (use_case, orders, _) = use_case(RecordingScheduler::default());
        let (order, scheduled) = use_case
            .create_and_schedule(market_buy(), Utc::now())
            .await
            .unwrap();
        let key = scheduled.job_key().unwrap().clone();

        // The timer fired and took the job, but has not claimed the order yet.
        assert!(use_case.scheduler.cancel(&key).await.unwrap());

        assert!(use_case.cancel(&key).await.unwrap());
        assert_eq!(
            orders.find_by_id(order.id()).await.unwrap().unwrap().status(),
            OrderStatus::Cancelled
        );
    }

    #[tokio::test]
    async fn runner_uses_scheduled_defaults_and_deactivates() {
        let broker = Arc::new(ScriptedBroker::accepting("S1"));
        let orders = Arc::new(InMemoryOrderRepository::new());
        let schedules = Arc::new(InMemoryScheduledOrderRepository::new());
        let engine = Arc::new(ExecuteOrderUseCase::new(
            Arc::clone(&orders),
            accounts(),
            registry_with(&broker),
        ));
        let runner = ScheduledOrderRunner::new(engine, Arc::clone(&orders), Arc::clone(&schedules));

        let order = Order::new(market_buy()).unwrap();
        orders.save(&order).await.unwrap();
        schedules
            .save(&ScheduledOrder::new(order.id().clone(), Utc::now()))
            .await
            .unwrap();

        let status = runner.execute_scheduled(order.id()).await.unwrap();
        assert_eq!(status, OrderStatus::Placed);

        let request = broker.last_request.lock().unwrap().clone().unwrap();
        assert!(request.metadata.trading_symbol.is_none());
        assert_eq!(request.metadata.exchange.as_deref(), Some("NSE_EQ"));
        assert_eq!(request.metadata.product_type.as_deref(), Some("INTRADAY"));

        let scheduled = schedules.find_by_order_id(order.id()).await.unwrap().unwrap();
        assert!(!scheduled.is_active());
    }
}
