//! Infrastructure Layer
//!
//! This module contains all adapters (implementations) for the ports defined
//! in the application layer. Following hexagonal architecture:
//!
//! - **Driven Adapters (Outbound)**: Implement ports for external systems
//!   - `broker/`: Broker API adapters (Angel One, Dhan)
//!   - `persistence/`: JSON-file repositories, job stores, in-memory test repositories
//!   - `scheduler/`: Tokio timer scheduler for one-shot order jobs
//!   - `vault/`: Credential vault
//!
//! - **Driver Adapters (Inbound)**: Expose application to external world
//!   - `http/`: REST API controllers
//!
//! - **Wiring**
//!   - `config/`: Dependency injection container

pub mod broker;
pub mod config;
pub mod http;
pub mod persistence;
pub mod scheduler;
pub mod vault;
