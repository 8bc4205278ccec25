use ethers::types::U256;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SyncState {
    /// No usable JSON-RPC endpoint.
    Configuring,
    Synced,
    Syncing,
}

impl fmt::Display for SyncState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            SyncState::Configuring => "configuring",
            SyncState::Synced => "synced",
            SyncState::Syncing => "syncing",
        };
        f.write_str(label)
    }
}

/// Point-in-time view of a node, rebuilt on every query.
///
/// `height` is present exactly when `syncing` is true. A `configuring`
/// snapshot carries `meta["error"]` and nothing else.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NetworkStatus {
    /// Last block the node has processed.
    pub block: u64,
    /// Chain tip the node reports while catching up.
    pub height: Option<u64>,
    pub chain_id: Option<U256>,
    pub peer_count: u64,
    pub protocol_version: Option<String>,
    pub state: SyncState,
    pub syncing: bool,
    pub meta: Map<String, Value>,
}

impl NetworkStatus {
    pub fn configuring(error: impl Into<String>) -> Self {
        let mut meta = Map::new();
        meta.insert("error".to_string(), Value::String(error.into()));
        Self {
            block: 0,
            height: None,
            chain_id: None,
            peer_count: 0,
            protocol_version: None,
            state: SyncState::Configuring,
            syncing: false,
            meta,
        }
    }

    pub fn is_configuring(&self) -> bool {
        self.state == SyncState::Configuring
    }

    pub fn error(&self) -> Option<&str> {
        self.meta.get("error").and_then(Value::as_str)
    }
}
