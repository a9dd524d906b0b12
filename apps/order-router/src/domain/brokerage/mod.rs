//! Brokerage Bounded Context
//!
//! Vendor-neutral shapes exchanged with broker adapters: linked accounts,
//! session tokens, declared capabilities, positions and candles.

mod auth_token;
mod broker_account;
mod candle;
mod capability;
mod position;

pub use auth_token::{AuthToken, EXPIRY_SAFETY_MARGIN_SECS};
pub use broker_account::BrokerAccount;
pub use candle::{Candle, CandleInterval, HistoricalData};
pub use capability::BrokerCapability;
pub use position::{BrokerPosition, PositionDirection};
