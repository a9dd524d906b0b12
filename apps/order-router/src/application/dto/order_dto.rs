//! Order DTOs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::order_execution::{
    CreateOrderCommand, Order, OrderSide, OrderStatus, OrderType, ScheduledOrder,
};
use crate::domain::shared::{AccountId, UserId};

/// DTO for creating an order.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderDto {
    /// Owning user.
    pub user_id: String,
    /// Broker account to route through.
    pub broker_account_id: String,
    /// Vendor-neutral security identifier.
    pub symbol: String,
    /// Side.
    pub side: OrderSide,
    /// Quantity.
    pub quantity: Decimal,
    /// Price (limit-type orders).
    #[serde(default)]
    pub price: Option<Decimal>,
    /// Type.
    #[serde(default = "default_order_type")]
    pub order_type: OrderType,
    /// Product type.
    #[serde(default)]
    pub product_type: Option<String>,
}

const fn default_order_type() -> OrderType {
    OrderType::Market
}

impl CreateOrderDto {
    /// Convert to the domain command.
    #[must_use]
    pub fn to_command(&self) -> CreateOrderCommand {
        CreateOrderCommand {
            user_id: UserId::new(&self.user_id),
            broker_account_id: AccountId::new(&self.broker_account_id),
            symbol: self.symbol.clone(),
            side: self.side,
            quantity: self.quantity,
            price: self.price,
            order_type: self.order_type,
            product_type: self.product_type.clone(),
        }
    }
}

/// DTO representing an order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderDto {
    /// Order ID.
    pub id: String,
    /// Owning user.
    pub user_id: String,
    /// Broker account.
    pub broker_account_id: String,
    /// Security identifier.
    pub symbol: String,
    /// Side.
    pub side: OrderSide,
    /// Quantity.
    pub quantity: Decimal,
    /// Price.
    pub price: Option<Decimal>,
    /// Type.
    pub order_type: OrderType,
    /// Product type.
    pub product_type: Option<String>,
    /// Status.
    pub status: OrderStatus,
    /// Vendor order ID.
    pub broker_order_id: Option<String>,
    /// Placement time.
    pub executed_at: Option<DateTime<Utc>>,
    /// Failure reason.
    pub failure_reason: Option<String>,
    /// Created at.
    pub created_at: DateTime<Utc>,
}

impl OrderDto {
    /// Create from domain Order.
    #[must_use]
    pub fn from_order(order: &Order) -> Self {
        Self {
            id: order.id().to_string(),
            user_id: order.user_id().to_string(),
            broker_account_id: order.broker_account_id().to_string(),
            symbol: order.symbol().to_string(),
            side: order.side(),
            quantity: order.quantity(),
            price: order.price(),
            order_type: order.order_type(),
            product_type: order.product_type().map(str::to_string),
            status: order.status(),
            broker_order_id: order.broker_order_id().map(ToString::to_string),
            executed_at: order.executed_at(),
            failure_reason: order.failure_reason().map(str::to_string),
            created_at: order.created_at(),
        }
    }
}

/// Immediate acknowledgement of an order accepted for processing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaceOrderAckDto {
    /// Order ID to poll.
    pub order_id: String,
    /// Always `CREATED`; the placement outcome arrives later.
    pub status: String,
}

impl PlaceOrderAckDto {
    /// Acknowledge a freshly created order.
    #[must_use]
    pub fn created(order: &Order) -> Self {
        Self {
            order_id: order.id().to_string(),
            status: "CREATED".to_string(),
        }
    }
}

/// DTO representing a schedule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduledOrderDto {
    /// Scheduled order.
    pub order_id: String,
    /// Trigger instant.
    pub trigger_time: DateTime<Utc>,
    /// Active until fired or cancelled.
    pub active: bool,
    /// Scheduler job key.
    pub job_key: Option<String>,
}

impl ScheduledOrderDto {
    /// Create from domain ScheduledOrder.
    #[must_use]
    pub fn from_scheduled(scheduled: &ScheduledOrder) -> Self {
        Self {
            order_id: scheduled.order_id().to_string(),
            trigger_time: scheduled.trigger_time(),
            active: scheduled.is_active(),
            job_key: scheduled.job_key().map(ToString::to_string),
        }
    }
}
