//! Order Aggregate Root
//!
//! The Order carries only vendor-neutral data. The vendor trading symbol
//! and exchange travel out-of-band as execution metadata.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::order_execution::errors::OrderError;
use crate::domain::order_execution::services::OrderStateMachine;
use crate::domain::order_execution::value_objects::{OrderSide, OrderStatus, OrderType};
use crate::domain::shared::{AccountId, BrokerOrderId, OrderId, UserId};

/// Command to create a new order.
#[derive(Debug, Clone)]
pub struct CreateOrderCommand {
    /// Owning user.
    pub user_id: UserId,
    /// Broker account the order is routed through.
    pub broker_account_id: AccountId,
    /// Vendor-neutral security identifier (usually numeric).
    pub symbol: String,
    /// Order side.
    pub side: OrderSide,
    /// Quantity to trade.
    pub quantity: Decimal,
    /// Price (required for limit-type orders).
    pub price: Option<Decimal>,
    /// Order type.
    pub order_type: OrderType,
    /// Free-form product type, interpreted by the vendor (INTRADAY, CNC, ...).
    pub product_type: Option<String>,
}

impl CreateOrderCommand {
    /// Validate the command parameters.
    pub fn validate(&self) -> Result<(), OrderError> {
        if self.symbol.trim().is_empty() {
            return Err(OrderError::invalid("symbol", "Symbol cannot be empty"));
        }

        if self.quantity <= Decimal::ZERO {
            return Err(OrderError::invalid(
                "quantity",
                "Quantity must be greater than zero",
            ));
        }

        match self.price {
            None if self.order_type.requires_price() => Err(OrderError::invalid(
                "price",
                format!("Price required for {} orders", self.order_type),
            )),
            Some(price) if price < Decimal::ZERO => {
                Err(OrderError::invalid("price", "Price cannot be negative"))
            }
            _ => Ok(()),
        }
    }
}

/// Order Aggregate Root.
#[allow(clippy::struct_field_names)]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    id: OrderId,
    user_id: UserId,
    broker_account_id: AccountId,
    symbol: String,
    side: OrderSide,
    quantity: Decimal,
    price: Option<Decimal>,
    order_type: OrderType,
    product_type: Option<String>,
    status: OrderStatus,
    broker_order_id: Option<BrokerOrderId>,
    executed_at: Option<DateTime<Utc>>,
    failure_reason: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl Order {
    /// Create a new PENDING order from a command.
    pub fn new(cmd: CreateOrderCommand) -> Result<Self, OrderError> {
        cmd.validate()?;

        let now = Utc::now();
        Ok(Self {
            id: OrderId::generate(),
            user_id: cmd.user_id,
            broker_account_id: cmd.broker_account_id,
            symbol: cmd.symbol.trim().to_string(),
            side: cmd.side,
            quantity: cmd.quantity,
            price: cmd.price,
            order_type: cmd.order_type,
            product_type: cmd.product_type,
            status: OrderStatus::Pending,
            broker_order_id: None,
            executed_at: None,
            failure_reason: None,
            created_at: now,
            updated_at: now,
        })
    }

    // Accessors

    /// Get the order ID.
    #[must_use]
    pub const fn id(&self) -> &OrderId {
        &self.id
    }

    /// Get the owning user.
    #[must_use]
    pub const fn user_id(&self) -> &UserId {
        &self.user_id
    }

    /// Get the broker account the order routes through.
    #[must_use]
    pub const fn broker_account_id(&self) -> &AccountId {
        &self.broker_account_id
    }

    /// Get the vendor-neutral security identifier.
    #[must_use]
    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    /// Get the order side.
    #[must_use]
    pub const fn side(&self) -> OrderSide {
        self.side
    }

    /// Get the quantity.
    #[must_use]
    pub const fn quantity(&self) -> Decimal {
        self.quantity
    }

    /// Get the price, if any.
    #[must_use]
    pub const fn price(&self) -> Option<Decimal> {
        self.price
    }

    /// Get the order type.
    #[must_use]
    pub const fn order_type(&self) -> OrderType {
        self.order_type
    }

    /// Get the product type, if one was given at creation.
    #[must_use]
    pub fn product_type(&self) -> Option<&str> {
        self.product_type.as_deref()
    }

    /// Get the current status.
    #[must_use]
    pub const fn status(&self) -> OrderStatus {
        self.status
    }

    /// Get the vendor-assigned order ID (set only once PLACED).
    #[must_use]
    pub const fn broker_order_id(&self) -> Option<&BrokerOrderId> {
        self.broker_order_id.as_ref()
    }

    /// Get the placement instant (set only once PLACED).
    #[must_use]
    pub const fn executed_at(&self) -> Option<DateTime<Utc>> {
        self.executed_at
    }

    /// Get the reason recorded when the order FAILED.
    #[must_use]
    pub fn failure_reason(&self) -> Option<&str> {
        self.failure_reason.as_deref()
    }

    /// Get the creation timestamp.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Get the last update timestamp.
    #[must_use]
    pub const fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    // State transitions

    /// Claim the order for one execution attempt (PENDING -> EXECUTING).
    pub fn begin_execution(&mut self) -> Result<(), OrderError> {
        self.transition(OrderStatus::Executing)
    }

    /// Record a successful placement (EXECUTING -> PLACED).
    pub fn mark_placed(
        &mut self,
        broker_order_id: BrokerOrderId,
        at: DateTime<Utc>,
    ) -> Result<(), OrderError> {
        self.transition(OrderStatus::Placed)?;
        self.broker_order_id = Some(broker_order_id);
        self.executed_at = Some(at);
        Ok(())
    }

    /// Record a failed attempt (EXECUTING -> FAILED), keeping the reason.
    pub fn mark_failed(&mut self, reason: impl Into<String>) -> Result<(), OrderError> {
        self.transition(OrderStatus::Failed)?;
        self.failure_reason = Some(reason.into());
        Ok(())
    }

    /// Withdraw the order before any execution attempt (PENDING -> CANCELLED).
    pub fn cancel(&mut self) -> Result<(), OrderError> {
        self.transition(OrderStatus::Cancelled)
    }

    fn transition(&mut self, to: OrderStatus) -> Result<(), OrderError> {
        OrderStateMachine::validate_transition(self.id.as_str(), self.status, to)?;
        self.status = to;
        self.updated_at = Utc::now();
        Ok(())
    }
}
