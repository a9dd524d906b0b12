//! Place Order Use Case
//!
//! Order intake for immediate execution plus order queries.

use std::sync::Arc;

use super::{ExecuteOrderUseCase, ExecutionHandle};
use crate::application::dto::{CreateOrderDto, OrderDto, PlaceOrderAckDto};
use crate::application::ports::{BrokerAccountRepository, ExecutionError, OrderMetadata};
use crate::domain::order_execution::{Order, OrderError, OrderRepository};
use crate::domain::shared::{OrderId, UserId};

/// Use case for placing orders now and reading them back.
pub struct PlaceOrderUseCase<O, A>
where
    O: OrderRepository,
    A: BrokerAccountRepository,
{
    engine: Arc<ExecuteOrderUseCase<O, A>>,
    order_repo: Arc<O>,
    account_repo: Arc<A>,
}

impl<O, A> PlaceOrderUseCase<O, A>
where
    O: OrderRepository + 'static,
    A: BrokerAccountRepository + 'static,
{
    /// Create a new PlaceOrderUseCase.
    pub const fn new(
        engine: Arc<ExecuteOrderUseCase<O, A>>,
        order_repo: Arc<O>,
        account_repo: Arc<A>,
    ) -> Self {
        Self {
            engine,
            order_repo,
            account_repo,
        }
    }

    /// Create a PENDING order and dispatch its execution.
    ///
    /// Returns as soon as the order is stored; the acknowledgement does not
    /// depend on the placement outcome. The trading symbol from `metadata` is
    /// passed as the execution-time override.
    pub async fn place_now(
        &self,
        dto: &CreateOrderDto,
        metadata: OrderMetadata,
    ) -> Result<(PlaceOrderAckDto, ExecutionHandle), ExecutionError> {
        let command = dto.to_command();
        let account = self
            .account_repo
            .find_by_id(&command.broker_account_id)
            .await?
            .ok_or_else(|| ExecutionError::AccountNotFound {
                account_id: command.broker_account_id.to_string(),
            })?;
        if !account.is_owned_by(&command.user_id) {
            return Err(ExecutionError::AccessDenied {
                account_id: account.id.to_string(),
            });
        }

        let order = Order::new(command)?;
        self.order_repo.save(&order).await?;

        if metadata.trading_symbol.is_none() {
            tracing::warn!(order_id = %order.id(), "No trading symbol supplied in order metadata");
        }
        let trading_symbol = metadata.trading_symbol.clone();
        let handle = self
            .engine
            .spawn_execute(order.id().clone(), trading_symbol, metadata);

        tracing::info!(order_id = %order.id(), account_id = %account.id, "Order accepted for execution");
        Ok((PlaceOrderAckDto::created(&order), handle))
    }

    /// Orders owned by a user, oldest first.
    pub async fn list_orders(&self, user_id: &UserId) -> Result<Vec<OrderDto>, ExecutionError> {
        let orders = self.order_repo.find_by_user(user_id).await?;
        Ok(orders.iter().map(OrderDto::from_order).collect())
    }

    /// One order by ID.
    pub async fn get_order(&self, order_id: &OrderId) -> Result<OrderDto, ExecutionError> {
        let order = self
            .order_repo
            .find_by_id(order_id)
            .await?
            .ok_or_else(|| OrderError::NotFound {
                order_id: order_id.to_string(),
            })?;
        Ok(OrderDto::from_order(&order))
    }
}
