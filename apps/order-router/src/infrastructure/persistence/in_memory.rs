//! In-memory repositories.
//!
//! Used by tests and embedded setups. State is lost on restart; the binary
//! wires the file-backed repositories instead.

use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

use async_trait::async_trait;

use crate::application::ports::{AccountStoreError, BrokerAccountRepository};
use crate::domain::brokerage::BrokerAccount;
use crate::domain::order_execution::{
    Order, OrderError, OrderRepository, ScheduledOrder, ScheduledOrderRepository,
};
use crate::domain::shared::{AccountId, JobKey, OrderId, UserId};

/// In-memory implementation of `OrderRepository`.
///
/// The claim and cancel transitions run under the write lock, which makes
/// them atomic with respect to each other and to `save`.
#[derive(Debug, Default)]
pub struct InMemoryOrderRepository {
    orders: RwLock<HashMap<OrderId, Order>>,
}

impl InMemoryOrderRepository {
    /// Create a new empty repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the number of orders in the repository.
    #[must_use]
    pub fn len(&self) -> usize {
        self.orders.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    /// Check if the repository is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn transition(
        &self,
        id: &OrderId,
        apply: impl FnOnce(&mut Order) -> Result<(), OrderError>,
    ) -> Result<Order, OrderError> {
        let mut orders = self.orders.write().unwrap_or_else(PoisonError::into_inner);
        let stored = orders.get_mut(id).ok_or_else(|| OrderError::NotFound {
            order_id: id.to_string(),
        })?;
        let mut updated = stored.clone();
        apply(&mut updated)?;
        *stored = updated.clone();
        Ok(updated)
    }
}

#[async_trait]
impl OrderRepository for InMemoryOrderRepository {
    async fn save(&self, order: &Order) -> Result<(), OrderError> {
        self.orders
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(order.id().clone(), order.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: &OrderId) -> Result<Option<Order>, OrderError> {
        Ok(self
            .orders
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(id)
            .cloned())
    }

    async fn find_by_user(&self, user_id: &UserId) -> Result<Vec<Order>, OrderError> {
        let orders = self.orders.read().unwrap_or_else(PoisonError::into_inner);
        let mut owned: Vec<Order> = orders
            .values()
            .filter(|o| o.user_id() == user_id)
            .cloned()
            .collect();
        owned.sort_by_key(Order::created_at);
        Ok(owned)
    }

    async fn try_begin_execution(&self, id: &OrderId) -> Result<Order, OrderError> {
        self.transition(id, Order::begin_execution)
    }

    async fn try_cancel(&self, id: &OrderId) -> Result<Order, OrderError> {
        self.transition(id, Order::cancel)
    }
}

/// In-memory implementation of `ScheduledOrderRepository`.
#[derive(Debug, Default)]
pub struct InMemoryScheduledOrderRepository {
    schedules: RwLock<HashMap<OrderId, ScheduledOrder>>,
}

impl InMemoryScheduledOrderRepository {
    /// Create a new empty repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ScheduledOrderRepository for InMemoryScheduledOrderRepository {
    async fn save(&self, scheduled: &ScheduledOrder) -> Result<(), OrderError> {
        self.schedules
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(scheduled.order_id().clone(), scheduled.clone());
        Ok(())
    }

    async fn find_by_order_id(&self, id: &OrderId) -> Result<Option<ScheduledOrder>, OrderError> {
        Ok(self
            .schedules
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(id)
            .cloned())
    }

    async fn find_by_job_key(&self, key: &JobKey) -> Result<Option<ScheduledOrder>, OrderError> {
        Ok(self
            .schedules
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .values()
            .find(|s| s.job_key() == Some(key))
            .cloned())
    }
}

/// In-memory implementation of `BrokerAccountRepository`.
#[derive(Debug, Default)]
pub struct InMemoryBrokerAccountRepository {
    accounts: RwLock<HashMap<AccountId, BrokerAccount>>,
}

impl InMemoryBrokerAccountRepository {
    /// Create a new empty repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed accounts, e.g. from configuration.
    #[must_use]
    pub fn with_accounts(accounts: impl IntoIterator<Item = BrokerAccount>) -> Self {
        Self {
            accounts: RwLock::new(accounts.into_iter().map(|a| (a.id.clone(), a)).collect()),
        }
    }
}

#[async_trait]
impl BrokerAccountRepository for InMemoryBrokerAccountRepository {
    async fn save(&self, account: &BrokerAccount) -> Result<(), AccountStoreError> {
        self.accounts
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(account.id.clone(), account.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: &AccountId) -> Result<Option<BrokerAccount>, AccountStoreError> {
        Ok(self
            .accounts
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(id)
            .cloned())
    }

    async fn find_by_user(&self, user_id: &UserId) -> Result<Vec<BrokerAccount>, AccountStoreError> {
        let accounts = self.accounts.read().unwrap_or_else(PoisonError::into_inner);
        let mut owned: Vec<BrokerAccount> = accounts
            .values()
            .filter(|a| a.is_owned_by(user_id))
            .cloned()
            .collect();
        owned.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(owned)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::order_execution::{CreateOrderCommand, OrderSide, OrderStatus, OrderType};
    use crate::domain::shared::BrokerId;
    use chrono::Utc;
    use rust_decimal_macros::dec;

    fn pending(user: &str) -> Order {
        Order::new(CreateOrderCommand {
            user_id: UserId::new(user),
            broker_account_id: AccountId::new("acct-1"),
            symbol: "3045".to_string(),
            side: OrderSide::Buy,
            quantity: dec!(1),
            price: None,
            order_type: OrderType::Market,
            product_type: None,
        })
        .unwrap()
    }

    #[tokio::test]
    async fn claim_is_compare_and_set() {
        let repo = InMemoryOrderRepository::new();
        let order = pending("user-1");
        repo.save(&order).await.unwrap();

        let claimed = repo.try_begin_execution(order.id()).await.unwrap();
        assert_eq!(claimed.status(), OrderStatus::Executing);

        let second = repo.try_begin_execution(order.id()).await.unwrap_err();
        assert!(matches!(second, OrderError::AlreadyExecuting { .. }));

        let stored = repo.find_by_id(order.id()).await.unwrap().unwrap();
        assert_eq!(stored.status(), OrderStatus::Executing);
    }

    #[tokio::test]
    async fn claim_missing_order_is_not_found() {
        let repo = InMemoryOrderRepository::new();
        let err = repo
            .try_begin_execution(&OrderId::new("nope"))
            .await
            .unwrap_err();
        assert!(matches!(err, OrderError::NotFound { .. }));
    }

    #[tokio::test]
    async fn cancel_after_claim_fails() {
        let repo = InMemoryOrderRepository::new();
        let order = pending("user-1");
        repo.save(&order).await.unwrap();
        repo.try_begin_execution(order.id()).await.unwrap();

        assert!(repo.try_cancel(order.id()).await.is_err());
    }

    #[tokio::test]
    async fn find_by_user_filters() {
        let repo = InMemoryOrderRepository::new();
        repo.save(&pending("user-1")).await.unwrap();
        repo.save(&pending("user-1")).await.unwrap();
        repo.save(&pending("user-2")).await.unwrap();

        assert_eq!(repo.find_by_user(&UserId::new("user-1")).await.unwrap().len(), 2);
        assert_eq!(repo.len(), 3);
    }

    #[tokio::test]
    async fn scheduled_lookup_by_job_key() {
        let repo = InMemoryScheduledOrderRepository::new();
        let mut scheduled = ScheduledOrder::new(OrderId::new("ord-1"), Utc::now());
        scheduled.assign_job_key(JobKey::new("execOrder-ord-1"));
        repo.save(&scheduled).await.unwrap();

        let found = repo
            .find_by_job_key(&JobKey::new("execOrder-ord-1"))
            .await
            .unwrap();
        assert_eq!(found, Some(scheduled));
    }

    #[tokio::test]
    async fn accounts_by_user() {
        let repo = InMemoryBrokerAccountRepository::with_accounts([BrokerAccount {
            id: AccountId::new("acct-1"),
            user_id: UserId::new("user-1"),
            broker_id: BrokerId::new("dhan"),
            metadata: serde_json::Value::Null,
        }]);

        assert_eq!(repo.find_by_user(&UserId::new("user-1")).await.unwrap().len(), 1);
        assert!(repo.find_by_user(&UserId::new("user-2")).await.unwrap().is_empty());
    }
}
