// Allow unwrap/expect in tests - tests should panic on unexpected errors
// Allow test-specific patterns and pedantic lints in test code
#![cfg_attr(
    test,
    allow(
        clippy::unwrap_used,
        clippy::expect_used,
        clippy::significant_drop_tightening,
        clippy::too_many_lines,
        clippy::match_same_arms,
        clippy::needless_pass_by_value,
        clippy::needless_collect,
        clippy::option_if_let_else,
        clippy::default_trait_access,
        clippy::items_after_statements,
        clippy::or_fun_call
    )
)]

//! Order Router - Rust Core Library
//!
//! Routes orders from one internal representation to multiple brokerage APIs,
//! each with its own authentication, payload shape and response format.
//!
//! # Architecture (Clean Architecture + DDD + Hexagonal)
//!
//! ## Layers (inside → outside)
//!
//! - **Domain**: Core business logic (aggregates, value objects)
//!   - `order_execution`: Order and ScheduledOrder aggregates, status lifecycle
//!   - `brokerage`: Broker accounts, tokens, capabilities, positions, candles
//!
//! - **Application**: Use cases and orchestration
//!   - `ports`: Interfaces for external systems (`BrokerAdapter`, `CredentialVault`, `SchedulerPort`)
//!   - `services`: `BrokerRegistry`, `TokenCache`
//!   - `use_cases`: ExecuteOrder, PlaceOrder, ScheduleOrder, BrokerAccounts
//!   - `dto`: Data transfer objects for API boundaries
//!
//! - **Infrastructure**: Adapters (implementations)
//!   - `broker`: Angel One and Dhan adapters
//!   - `persistence`: JSON-file and in-memory repositories, durable job store
//!   - `scheduler`: Tokio timer scheduler
//!   - `vault`: File-backed and in-memory credential vaults
//!   - `http`: REST API
//!   - `config`: Dependency injection container
//!
//! Cross-cutting: `config` (YAML loading) and `observability` (tracing, metrics).

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::pedantic)]

// =============================================================================
// Clean Architecture Layers
// =============================================================================

/// Domain layer - Core business logic with no external dependencies.
pub mod domain;

/// Application layer - Use cases and port definitions.
pub mod application;

/// Infrastructure layer - Adapters and external integrations.
pub mod infrastructure;

// =============================================================================
// Cross-cutting
// =============================================================================

/// Configuration loading and validation.
pub mod config;

/// Logging and metrics.
pub mod observability;

// =============================================================================
// Re-exports from Clean Architecture
// =============================================================================

// Domain re-exports
pub use domain::brokerage::{
    AuthToken, BrokerAccount, BrokerCapability, BrokerPosition, Candle, CandleInterval,
    HistoricalData,
};
pub use domain::order_execution::{Order, OrderSide, OrderStatus, OrderType, ScheduledOrder};
pub use domain::shared::{AccountId, BrokerId, BrokerOrderId, JobKey, OrderId, UserId};

// Application re-exports
pub use application::ports::{
    BrokerAdapter, BrokerError, BrokerOrderRequest, CredentialVault, ExecutionError,
    OrderMetadata, PlaceOrderResult, SchedulerPort,
};
pub use application::services::{BrokerRegistry, TokenCache};
pub use application::use_cases::{
    BrokerAccountsUseCase, ExecuteOrderUseCase, PlaceOrderUseCase, ScheduleOrderUseCase,
    ScheduledOrderRunner,
};

// Infrastructure re-exports
pub use infrastructure::broker::{AngelOneAdapter, AngelOneConfig, DhanAdapter, DhanConfig};
pub use infrastructure::config::Container;
pub use infrastructure::http::{AppState, create_router};
pub use infrastructure::persistence::{
    FileBrokerAccountRepository, FileJobStore, FileOrderRepository, FileScheduledOrderRepository,
    InMemoryOrderRepository,
};
pub use infrastructure::scheduler::TokioOrderScheduler;
