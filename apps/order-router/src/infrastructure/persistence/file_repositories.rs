//! File-backed repositories.
//!
//! Orders, schedules and linked accounts each live in their own JSON file, so
//! a job restored after a restart still finds its order and account. Claim
//! and cancel transitions run under the file's lock and are written before
//! they are returned.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use async_trait::async_trait;

use super::json_file::JsonFileMap;
use crate::application::ports::{AccountStoreError, BrokerAccountRepository};
use crate::domain::brokerage::BrokerAccount;
use crate::domain::order_execution::{
    Order, OrderError, OrderRepository, ScheduledOrder, ScheduledOrderRepository,
};
use crate::domain::shared::{AccountId, JobKey, OrderId, UserId};

/// JSON-file implementation of `OrderRepository`.
#[derive(Debug)]
pub struct FileOrderRepository {
    orders: JsonFileMap<OrderId, Order>,
}

impl FileOrderRepository {
    /// Open the repository at `path`.
    pub async fn open(path: impl Into<PathBuf>) -> Result<Self, OrderError> {
        let orders = JsonFileMap::open(path, |order: &Order| order.id().clone()).await?;
        let count = orders.read(BTreeMap::len).await;
        tracing::info!(path = %orders.path().display(), orders = count, "Order store opened");
        Ok(Self { orders })
    }

    /// Location of the backing file.
    #[must_use]
    pub fn path(&self) -> &Path {
        self.orders.path()
    }

    async fn transition(
        &self,
        id: &OrderId,
        apply: impl FnOnce(&mut Order) -> Result<(), OrderError>,
    ) -> Result<Order, OrderError> {
        self.orders
            .update(|orders| {
                let stored = orders.get_mut(id).ok_or_else(|| OrderError::NotFound {
                    order_id: id.to_string(),
                })?;
                apply(stored)?;
                Ok(stored.clone())
            })
            .await
    }
}

#[async_trait]
impl OrderRepository for FileOrderRepository {
    async fn save(&self, order: &Order) -> Result<(), OrderError> {
        self.orders
            .update(|orders| {
                orders.insert(order.id().clone(), order.clone());
                Ok(())
            })
            .await
    }

    async fn find_by_id(&self, id: &OrderId) -> Result<Option<Order>, OrderError> {
        Ok(self.orders.read(|orders| orders.get(id).cloned()).await)
    }

    async fn find_by_user(&self, user_id: &UserId) -> Result<Vec<Order>, OrderError> {
        let mut owned: Vec<Order> = self
            .orders
            .read(|orders| {
                orders
                    .values()
                    .filter(|o| o.user_id() == user_id)
                    .cloned()
                    .collect()
            })
            .await;
        owned.sort_by_key(Order::created_at);
        Ok(owned)
    }

    async fn try_begin_execution(&self, id: &OrderId) -> Result<Order, OrderError> {
        self.transition(id, Order::begin_execution).await
    }

    async fn try_cancel(&self, id: &OrderId) -> Result<Order, OrderError> {
        self.transition(id, Order::cancel).await
    }
}

/// JSON-file implementation of `ScheduledOrderRepository`, keyed by order.
#[derive(Debug)]
pub struct FileScheduledOrderRepository {
    schedules: JsonFileMap<OrderId, ScheduledOrder>,
}

impl FileScheduledOrderRepository {
    /// Open the repository at `path`.
    pub async fn open(path: impl Into<PathBuf>) -> Result<Self, OrderError> {
        let schedules =
            JsonFileMap::open(path, |scheduled: &ScheduledOrder| scheduled.order_id().clone()).await?;
        Ok(Self { schedules })
    }
}

#[async_trait]
impl ScheduledOrderRepository for FileScheduledOrderRepository {
    async fn save(&self, scheduled: &ScheduledOrder) -> Result<(), OrderError> {
        self.schedules
            .update(|schedules| {
                schedules.insert(scheduled.order_id().clone(), scheduled.clone());
                Ok(())
            })
            .await
    }

    async fn find_by_order_id(&self, id: &OrderId) -> Result<Option<ScheduledOrder>, OrderError> {
        Ok(self.schedules.read(|schedules| schedules.get(id).cloned()).await)
    }

    async fn find_by_job_key(&self, key: &JobKey) -> Result<Option<ScheduledOrder>, OrderError> {
        Ok(self
            .schedules
            .read(|schedules| {
                schedules
                    .values()
                    .find(|s| s.job_key() == Some(key))
                    .cloned()
            })
            .await)
    }
}

/// JSON-file implementation of `BrokerAccountRepository`.
#[derive(Debug)]
pub struct FileBrokerAccountRepository {
    accounts: JsonFileMap<AccountId, BrokerAccount>,
}

impl FileBrokerAccountRepository {
    /// Open the repository at `path`.
    pub async fn open(path: impl Into<PathBuf>) -> Result<Self, AccountStoreError> {
        let accounts = JsonFileMap::open(path, |account: &BrokerAccount| account.id.clone()).await?;
        Ok(Self { accounts })
    }
}

#[async_trait]
impl BrokerAccountRepository for FileBrokerAccountRepository {
    async fn save(&self, account: &BrokerAccount) -> Result<(), AccountStoreError> {
        self.accounts
            .update(|accounts| {
                accounts.insert(account.id.clone(), account.clone());
                Ok(())
            })
            .await
    }

    async fn find_by_id(&self, id: &AccountId) -> Result<Option<BrokerAccount>, AccountStoreError> {
        Ok(self.accounts.read(|accounts| accounts.get(id).cloned()).await)
    }

    async fn find_by_user(&self, user_id: &UserId) -> Result<Vec<BrokerAccount>, AccountStoreError> {
        // BTreeMap iteration is already ordered by account id.
        Ok(self
            .accounts
            .read(|accounts| {
                accounts
                    .values()
                    .filter(|a| a.is_owned_by(user_id))
                    .cloned()
                    .collect()
            })
            .await)
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
            price: Some(dec!(612.35)),
            order_type: OrderType::Limit,
            product_type: Some("CNC".to_string()),
        })
        .unwrap()
    }

    #[tokio::test]
    async fn orders_and_transitions_survive_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("orders.json");

        let repo = FileOrderRepository::open(&path).await.unwrap();
        let claimed = pending("user-1");
        let cancelled = pending("user-1");
        repo.save(&claimed).await.unwrap();
        repo.save(&cancelled).await.unwrap();
        repo.try_begin_execution(claimed.id()).await.unwrap();
        repo.try_cancel(cancelled.id()).await.unwrap();
        drop(repo);

        let reopened = FileOrderRepository::open(&path).await.unwrap();
        let stored = reopened.find_by_id(claimed.id()).await.unwrap().unwrap();
        assert_eq!(stored.status(), OrderStatus::Executing);
        assert_eq!(stored.price(), Some(dec!(612.35)));
        assert_eq!(stored.product_type(), Some("CNC"));
        assert_eq!(
            reopened.find_by_id(cancelled.id()).await.unwrap().unwrap().status(),
            OrderStatus::Cancelled
        );
        assert_eq!(reopened.find_by_user(&UserId::new("user-1")).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn claim_is_compare_and_set() {
        let dir = tempfile::tempdir().unwrap();
        let repo = FileOrderRepository::open(dir.path().join("orders.json")).await.unwrap();
        let order = pending("user-1");
        repo.save(&order).await.unwrap();

        repo.try_begin_execution(order.id()).await.unwrap();
        let second = repo.try_begin_execution(order.id()).await.unwrap_err();
        assert!(matches!(second, OrderError::AlreadyExecuting { .. }));
        assert!(repo.try_cancel(order.id()).await.is_err());

        let missing = repo
            .try_begin_execution(&OrderId::new("nope"))
            .await
            .unwrap_err();
        assert!(matches!(missing, OrderError::NotFound { .. }));
    }

    #[tokio::test]
    async fn schedules_survive_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scheduled_orders.json");

        let repo = FileScheduledOrderRepository::open(&path).await.unwrap();
        let mut scheduled = ScheduledOrder::new(OrderId::new("ord-1"), Utc::now());
        scheduled.assign_job_key(JobKey::new("execOrder-ord-1"));
        repo.save(&scheduled).await.unwrap();
        drop(repo);

        let reopened = FileScheduledOrderRepository::open(&path).await.unwrap();
        assert_eq!(
            reopened
                .find_by_job_key(&JobKey::new("execOrder-ord-1"))
                .await
                .unwrap(),
            Some(scheduled)
        );
    }

    #[tokio::test]
    async fn accounts_survive_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broker_accounts.json");

        let repo = FileBrokerAccountRepository::open(&path).await.unwrap();
        for id in ["acct-2", "acct-1"] {
            repo.save(&BrokerAccount {
                id: AccountId::new(id),
                user_id: UserId::new("user-1"),
                broker_id: BrokerId::new("dhan"),
                metadata: serde_json::json!({"label": id}),
            })
            .await
            .unwrap();
        }
        drop(repo);

        let reopened = FileBrokerAccountRepository::open(&path).await.unwrap();
        let owned = reopened.find_by_user(&UserId::new("user-1")).await.unwrap();
        let ids: Vec<_> = owned.iter().map(|a| a.id.as_str()).collect();
        assert_eq!(ids, ["acct-1", "acct-2"]);
        assert!(reopened.find_by_user(&UserId::new("user-2")).await.unwrap().is_empty());
    }
}
