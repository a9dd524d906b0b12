//! Broker Registry
//!
//! Resolves a broker identifier to the adapter implementing it. Built once at
//! startup; adding a vendor means registering one more adapter.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::Serialize;

use crate::application::ports::{BrokerAdapter, BrokerError};
use crate::domain::brokerage::BrokerCapability;
use crate::domain::shared::BrokerId;

/// Public description of a registered adapter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BrokerDescriptor {
    /// Broker identifier.
    pub broker_id: BrokerId,
    /// Declared capabilities.
    pub capabilities: Vec<BrokerCapability>,
}

/// Registry of broker adapters keyed by identifier.
#[derive(Default, Clone)]
pub struct BrokerRegistry {
    adapters: BTreeMap<BrokerId, Arc<dyn BrokerAdapter>>,
}

impl BrokerRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an adapter under its own identifier, replacing any previous one.
    pub fn register(&mut self, adapter: Arc<dyn BrokerAdapter>) {
        let id = adapter.broker_id().clone();
        tracing::info!(broker = %id, capabilities = ?adapter.capabilities(), "Registered broker adapter");
        self.adapters.insert(id, adapter);
    }

    /// Builder-style [`BrokerRegistry::register`].
    #[must_use]
    pub fn with(mut self, adapter: Arc<dyn BrokerAdapter>) -> Self {
        self.register(adapter);
        self
    }

    /// Adapter for a broker identifier.
    pub fn get(&self, broker_id: &BrokerId) -> Result<Arc<dyn BrokerAdapter>, BrokerError> {
        self.adapters
            .get(broker_id)
            .cloned()
            .ok_or_else(|| BrokerError::UnknownBroker {
                broker_id: broker_id.to_string(),
            })
    }

    /// Registered identifiers, sorted.
    #[must_use]
    pub fn broker_ids(&self) -> Vec<BrokerId> {
        self.adapters.keys().cloned().collect()
    }

    /// Registered adapters with their capabilities, sorted by identifier.
    #[must_use]
    pub fn describe(&self) -> Vec<BrokerDescriptor> {
        self.adapters
            .values()
            .map(|adapter| BrokerDescriptor {
                broker_id: adapter.broker_id().clone(),
                capabilities: adapter.capabilities().to_vec(),
            })
            .collect()
    }

    /// Number of registered adapters.
    #[must_use]
    pub fn len(&self) -> usize {
        self.adapters.len()
    }

    /// Returns true if no adapter is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.adapters.is_empty()
    }
}

impl std::fmt::Debug for BrokerRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BrokerRegistry")
            .field("brokers", &self.adapters.keys().collect::<Vec<_>>())
            .finish()
    }
}
