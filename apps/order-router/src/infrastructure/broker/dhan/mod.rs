//! Dhan (DhanHQ v2) Broker Adapter
//!
//! Dhan authenticates every call with a long-lived `access-token` header
//! issued from the Dhan console, so "login" is a probe of `GET /v2/positions`
//! whose result is cached for a day like any other session.

mod adapter;
mod api_types;
mod config;
mod error;
mod http_client;
mod mapping;
mod positions;

pub use adapter::{DHAN_BROKER_ID, DhanAdapter};
pub use config::{DEFAULT_BASE_URL, DhanConfig};
pub use error::DhanError;
