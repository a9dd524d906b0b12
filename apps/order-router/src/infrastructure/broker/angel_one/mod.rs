//! Angel One (SmartAPI) Broker Adapter
//!
//! Implements the broker port over Angel One's REST API.
//!
//! # Session
//!
//! Angel One logs in with client code, password and a TOTP derived from the
//! account's base32 seed. The returned JWT lasts a trading day (8 h) and is
//! cached per account through the shared [`TokenCache`]; every secured call
//! also carries the account's API key.
//!
//! # Symbols
//!
//! Orders need the human-readable trading symbol (`RELIANCE-EQ`) in addition
//! to the numeric security token. A request without a trading symbol fails
//! with a mapping error before any network call.
//!
//! [`TokenCache`]: crate::application::services::TokenCache

mod adapter;
mod api_types;
mod config;
mod error;
mod http_client;
mod mapping;
mod positions;
mod totp;

pub use adapter::{ANGEL_ONE_BROKER_ID, AngelOneAdapter};
pub use config::{AngelOneConfig, DEFAULT_BASE_URL};
pub use error::AngelOneError;
pub use totp::generate_totp;
