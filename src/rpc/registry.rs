//! Per `(network_id, endpoint)` cache of dialed transports.

use dashmap::DashMap;
use std::sync::Arc;

use super::{HttpTransport, RpcTransport, TransportOptions};
use crate::constants::NO_ENDPOINT_MESSAGE;
use crate::error::{AppError, Result};

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct ClientKey {
    network_id: String,
    endpoint: String,
}

impl ClientKey {
    fn new(network_id: &str, endpoint: &str) -> Self {
        Self {
            network_id: network_id.trim().to_string(),
            endpoint: endpoint.trim().to_string(),
        }
    }
}

/// Thread-safe registry of JSON-RPC handles. Build one at startup and share it.
pub struct ClientRegistry {
    clients: DashMap<ClientKey, Arc<dyn RpcTransport>>,
    options: TransportOptions,
}

impl ClientRegistry {
    pub fn new(options: TransportOptions) -> Self {
        Self {
            clients: DashMap::new(),
            options,
        }
    }

    /// Returns the cached handle for the pair, dialing one on first use.
    ///
    /// Concurrent first uses may each dial; the first insert wins and the
    /// others adopt it.
    pub fn resolve(&self, network_id: &str, endpoint: &str) -> Result<Arc<dyn RpcTransport>> {
        if endpoint.trim().is_empty() {
            return Err(AppError::Configuration(NO_ENDPOINT_MESSAGE.to_string()));
        }

        let key = ClientKey::new(network_id, endpoint);
        if let Some(existing) = self.clients.get(&key) {
            return Ok(Arc::clone(existing.value()));
        }

        let dialed: Arc<dyn RpcTransport> = Arc::new(HttpTransport::new(&key.endpoint, &self.options)?);
        tracing::debug!(
            "Dialed JSON-RPC client for network {} at {}",
            key.network_id,
            key.endpoint
        );
        let entry = self.clients.entry(key).or_insert(dialed);
        Ok(Arc::clone(entry.value()))
    }

    /// Installs a handle for the pair, replacing any cached one.
    pub fn insert(&self, network_id: &str, endpoint: &str, transport: Arc<dyn RpcTransport>) {
        self.clients
            .insert(ClientKey::new(network_id, endpoint), transport);
    }

    /// Drops a stale handle so the next `resolve` dials afresh.
    pub fn evict(&self, network_id: &str, endpoint: &str) -> bool {
        self.clients
            .remove(&ClientKey::new(network_id, endpoint))
            .is_some()
    }

    pub fn len(&self) -> usize {
        self.clients.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clients.is_empty()
    }
}

impl Default for ClientRegistry {
    fn default() -> Self {
        Self::new(TransportOptions::default())
    }
}
