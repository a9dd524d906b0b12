//! Application Use Cases
//!
//! Use cases orchestrate domain logic to fulfill application requirements.

mod broker_accounts;
mod execute_order;
mod place_order;
mod schedule_order;

pub use broker_accounts::BrokerAccountsUseCase;
pub use execute_order::{ExecuteOrderUseCase, ExecutionHandle};
pub use place_order::PlaceOrderUseCase;
pub use schedule_order::{
    SCHEDULED_DEFAULT_EXCHANGE, SCHEDULED_DEFAULT_PRODUCT_TYPE, ScheduleOrderUseCase,
    ScheduledOrderRunner,
};
