use ethers::types::{Block, SyncingStatus, Transaction, TxHash, U256, U64};
use serde_json::{json, Map, Value};
use std::sync::Arc;

use crate::{
    constants::{
        BLOCK_TAG_EARLIEST, BLOCK_TAG_LATEST, ETH_GET_BLOCK_BY_NUMBER, ETH_PROTOCOL_VERSION,
        ETH_SYNCING, NET_PEER_COUNT, NET_VERSION, NO_ENDPOINT_MESSAGE, PARITY_NET_PEERS,
    },
    error::{AppError, Result},
    models::{NetworkStatus, SyncState},
    rpc::{
        self, first_success,
        types::{NetVersion, ParityPeers},
        Attempt, ClientRegistry, FromRpc, RpcError, RpcTransport,
    },
    services::chain_config::ChainConfigResolver,
};

/// Reconciles a node's height, sync state, peers, protocol version and chain id
/// into one `NetworkStatus`.
pub struct NetworkStatusService {
    registry: Arc<ClientRegistry>,
    chain_configs: Arc<ChainConfigResolver>,
}

impl NetworkStatusService {
    pub fn new(registry: Arc<ClientRegistry>, chain_configs: Arc<ChainConfigResolver>) -> Self {
        Self {
            registry,
            chain_configs,
        }
    }

    /// Builds a fresh snapshot for the node behind `rpc_url`.
    ///
    /// An empty or undialable endpoint yields a `configuring` snapshot rather
    /// than an error. A dialed node that cannot answer `eth_syncing`, or a synced
    /// node whose whole header chain fails, is an error. Peer, protocol and chain
    /// id reads degrade into an absent or zero field.
    pub async fn get_status(&self, network_id: &str, rpc_url: &str) -> Result<NetworkStatus> {
        if rpc_url.trim().is_empty() {
            tracing::warn!("No JSON-RPC endpoint configured for network {}", network_id);
            return Ok(NetworkStatus::configuring(NO_ENDPOINT_MESSAGE));
        }

        let client = match self.registry.resolve(network_id, rpc_url) {
            Ok(client) => client,
            Err(err) => {
                tracing::warn!("Failed to dial JSON-RPC host: {}; {}", rpc_url, err);
                return Ok(NetworkStatus::configuring(err.to_string()));
            }
        };
        let client = client.as_ref();

        let (state, block, height) = match sync_status(client).await? {
            SyncingStatus::IsFalse => (SyncState::Synced, latest_block_number(client).await?, None),
            SyncingStatus::IsSyncing(progress) => (
                SyncState::Syncing,
                progress.current_block.as_u64(),
                Some(progress.highest_block.as_u64()),
            ),
        };

        let (chain_id, peer_count, protocol_version) = tokio::join!(
            chain_id(client),
            peer_count(client),
            protocol_version(client)
        );
        self.check_chain_id(network_id, chain_id);

        Ok(NetworkStatus {
            block,
            height,
            chain_id,
            peer_count,
            protocol_version,
            state,
            syncing: state == SyncState::Syncing,
            meta: Map::new(),
        })
    }

    /// Best block known to the node; an unconfigured network is an error here.
    pub async fn get_latest_block(&self, network_id: &str, rpc_url: &str) -> Result<u64> {
        let status = self.get_status(network_id, rpc_url).await?;
        if status.is_configuring() {
            return Err(AppError::Configuration(
                status.error().unwrap_or(NO_ENDPOINT_MESSAGE).to_string(),
            ));
        }
        Ok(status.block)
    }

    fn check_chain_id(&self, network_id: &str, reported: Option<U256>) {
        let Some(reported) = reported else {
            return;
        };
        if !self.chain_configs.contains(network_id) {
            return;
        }
        let config = self.chain_configs.resolve(network_id);
        if reported != U256::from(config.chain_id) {
            tracing::warn!(
                "Network {} reports network id {} but is configured as chain {} ({})",
                network_id,
                reported,
                config.chain_id,
                config.name
            );
        }
    }
}

async fn sync_status(client: &dyn RpcTransport) -> Result<SyncingStatus> {
    match rpc::call::<SyncingStatus>(client, ETH_SYNCING, Vec::new()).await {
        Ok(status) => {
            if let SyncingStatus::IsSyncing(progress) = &status {
                tracing::debug!(
                    "Latest synced block reported by {}: {} [of {}]",
                    client.endpoint(),
                    progress.current_block,
                    progress.highest_block
                );
            }
            Ok(status)
        }
        Err(err) => {
            tracing::warn!(
                "Failed to read sync progress using JSON-RPC host {}; {}",
                client.endpoint(),
                err
            );
            Err(err.into())
        }
    }
}

fn block_height<TX>(block: Block<TX>) -> std::result::Result<u64, RpcError> {
    block
        .number
        .map(|number| number.as_u64())
        .ok_or_else(|| RpcError::Decoding("block without a number".to_string()))
}

fn header_height(value: Value) -> std::result::Result<u64, RpcError> {
    block_height(Block::<TxHash>::from_rpc(value)?)
}

fn full_block_height(value: Value) -> std::result::Result<u64, RpcError> {
    block_height(Block::<Transaction>::from_rpc(value)?)
}

/// Header by number, then the full `latest` block, then `earliest`.
/// Fails only once all three have failed.
async fn latest_block_number(client: &dyn RpcTransport) -> Result<u64> {
    let attempts = vec![
        Attempt::with_decoder(
            ETH_GET_BLOCK_BY_NUMBER,
            vec![json!(BLOCK_TAG_LATEST), json!(false)],
            header_height,
        ),
        Attempt::with_decoder(
            ETH_GET_BLOCK_BY_NUMBER,
            vec![json!(BLOCK_TAG_LATEST), json!(true)],
            full_block_height,
        ),
        Attempt::with_decoder(
            ETH_GET_BLOCK_BY_NUMBER,
            vec![json!(BLOCK_TAG_EARLIEST), json!(true)],
            full_block_height,
        ),
    ];

    match first_success(client, attempts).await {
        Ok((number, _)) => Ok(number),
        Err(err) => {
            tracing::warn!(
                "Failed to read latest block header using JSON-RPC host {}; {}",
                client.endpoint(),
                err
            );
            Err(RpcError::from(err).into())
        }
    }
}

async fn chain_id(client: &dyn RpcTransport) -> Option<U256> {
    match rpc::call::<NetVersion>(client, NET_VERSION, Vec::new()).await {
        Ok(NetVersion(id)) => {
            tracing::debug!("Received chain id from {}: {}", client.endpoint(), id);
            Some(id)
        }
        Err(err) => {
            tracing::warn!("Failed to read network id from {}; {}", client.endpoint(), err);
            None
        }
    }
}

fn peer_count_quantity(value: Value) -> std::result::Result<u64, RpcError> {
    U64::from_rpc(value).map(|count| count.as_u64())
}

fn parity_connected_peers(value: Value) -> std::result::Result<u64, RpcError> {
    ParityPeers::from_rpc(value).map(|peers| peers.connected)
}

/// Missing peer information is reported as zero peers.
async fn peer_count(client: &dyn RpcTransport) -> u64 {
    let attempts = vec![
        Attempt::with_decoder(NET_PEER_COUNT, Vec::new(), peer_count_quantity),
        Attempt::with_decoder(PARITY_NET_PEERS, Vec::new(), parity_connected_peers),
    ];

    match first_success(client, attempts).await {
        Ok((count, method)) => {
            tracing::debug!("Read peer count {} via {}", count, method);
            count
        }
        Err(err) => {
            // `err` lists both the net_peerCount and parity_netPeers failures.
            tracing::warn!(
                "Failed to read peer count from {}; {}",
                client.endpoint(),
                err
            );
            0
        }
    }
}

async fn protocol_version(client: &dyn RpcTransport) -> Option<String> {
    let attempts = vec![
        Attempt::<String>::new(ETH_PROTOCOL_VERSION, Vec::new()),
        Attempt::new(NET_VERSION, Vec::new()),
    ];

    match first_success(client, attempts).await {
        Ok((version, _)) => Some(version),
        Err(err) => {
            tracing::warn!(
                "Failed to read protocol version from {}; {}",
                client.endpoint(),
                err
            );
            None
        }
    }
}
