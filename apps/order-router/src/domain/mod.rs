//! Domain Layer
//!
//! The innermost layer containing business logic with zero infrastructure dependencies.
//!
//! # Bounded Contexts
//!
//! - [`order_execution`]: Order lifecycle (PENDING -> PLACED | FAILED | CANCELLED)
//!   and one-shot schedules
//! - [`brokerage`]: Broker accounts, auth tokens, capabilities, positions and candles
//! - [`shared`]: Strongly-typed identifiers

pub mod brokerage;
pub mod order_execution;
pub mod shared;
