//! Dependency Injection Container
//!
//! Manages creation and wiring of all application components.

use std::sync::Arc;

use crate::application::ports::{BrokerAccountRepository, CredentialVault, SchedulerPort};
use crate::application::services::BrokerRegistry;
use crate::application::use_cases::{
    BrokerAccountsUseCase, ExecuteOrderUseCase, PlaceOrderUseCase, ScheduleOrderUseCase,
    ScheduledOrderRunner,
};
use crate::domain::order_execution::{OrderRepository, ScheduledOrderRepository};

/// Dependency injection container.
///
/// Holds the repositories, the vault and the broker registry. Every use case
/// built from one container shares them, so an order placed through one use
/// case is visible to the others.
pub struct Container<O, S, A, V>
where
    O: OrderRepository + 'static,
    S: ScheduledOrderRepository + 'static,
    A: BrokerAccountRepository + 'static,
    V: CredentialVault + 'static,
{
    order_repo: Arc<O>,
    scheduled_repo: Arc<S>,
    account_repo: Arc<A>,
    vault: Arc<V>,
    registry: Arc<BrokerRegistry>,
}

impl<O, S, A, V> Container<O, S, A, V>
where
    O: OrderRepository + 'static,
    S: ScheduledOrderRepository + 'static,
    A: BrokerAccountRepository + 'static,
    V: CredentialVault + 'static,
{
    /// Create a new container with all dependencies.
    pub const fn new(
        order_repo: Arc<O>,
        scheduled_repo: Arc<S>,
        account_repo: Arc<A>,
        vault: Arc<V>,
        registry: Arc<BrokerRegistry>,
    ) -> Self {
        Self {
            order_repo,
            scheduled_repo,
            account_repo,
            vault,
            registry,
        }
    }

    /// Get the order repository.
    pub fn order_repo(&self) -> Arc<O> {
        Arc::clone(&self.order_repo)
    }

    /// Get the scheduled order repository.
    pub fn scheduled_repo(&self) -> Arc<S> {
        Arc::clone(&self.scheduled_repo)
    }

    /// Get the broker account repository.
    pub fn account_repo(&self) -> Arc<A> {
        Arc::clone(&self.account_repo)
    }

    /// Get the broker registry.
    pub fn registry(&self) -> Arc<BrokerRegistry> {
        Arc::clone(&self.registry)
    }

    /// Create an `ExecuteOrderUseCase`.
    pub fn execute_order_use_case(&self) -> ExecuteOrderUseCase<O, A> {
        ExecuteOrderUseCase::new(
            Arc::clone(&self.order_repo),
            Arc::clone(&self.account_repo),
            Arc::clone(&self.registry),
        )
    }

    /// Create a `PlaceOrderUseCase` around a shared engine.
    pub fn place_order_use_case(
        &self,
        engine: Arc<ExecuteOrderUseCase<O, A>>,
    ) -> PlaceOrderUseCase<O, A> {
        PlaceOrderUseCase::new(
            engine,
            Arc::clone(&self.order_repo),
            Arc::clone(&self.account_repo),
        )
    }

    /// Create the `ScheduledOrderRunner` the scheduler fires into.
    pub fn scheduled_order_runner(
        &self,
        engine: Arc<ExecuteOrderUseCase<O, A>>,
    ) -> ScheduledOrderRunner<O, A, S> {
        ScheduledOrderRunner::new(
            engine,
            Arc::clone(&self.order_repo),
            Arc::clone(&self.scheduled_repo),
        )
    }

    /// Create a `ScheduleOrderUseCase` over a scheduler.
    pub fn schedule_order_use_case<T: SchedulerPort>(
        &self,
        scheduler: Arc<T>,
    ) -> ScheduleOrderUseCase<O, S, T> {
        ScheduleOrderUseCase::new(
            Arc::clone(&self.order_repo),
            Arc::clone(&self.scheduled_repo),
            scheduler,
        )
    }

    /// Create a `BrokerAccountsUseCase`.
    pub fn broker_accounts_use_case(&self) -> BrokerAccountsUseCase<A, V> {
        BrokerAccountsUseCase::new(
            Arc::clone(&self.account_repo),
            Arc::clone(&self.vault),
            Arc::clone(&self.registry),
        )
    }
}
