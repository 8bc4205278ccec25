// src/api/mod.rs
pub mod health;
pub mod network;

use axum::http::Method;
use axum::{routing::get, Router};
use std::sync::Arc;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::config::Config;
use crate::models::ChainConfig;
use crate::rpc::ClientRegistry;
use crate::services::{ChainConfigResolver, ContractReader, NetworkStatusService};

#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub registry: Arc<ClientRegistry>,
    pub chain_configs: Arc<ChainConfigResolver>,
    pub network_status: Arc<NetworkStatusService>,
    pub contract_reader: Arc<ContractReader>,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        let registry = Arc::new(ClientRegistry::new(config.transport_options()));
        let chain_configs = Arc::new(ChainConfigResolver::new());
        if let Some(chain_id) = config.chain_id {
            chain_configs.register(&config.network_id, ChainConfig::from_chain_id(chain_id));
        }
        Self {
            network_status: Arc::new(NetworkStatusService::new(
                registry.clone(),
                chain_configs.clone(),
            )),
            contract_reader: Arc::new(ContractReader::new(registry.clone())),
            registry,
            chain_configs,
            config,
        }
    }

    /// Endpoint for a request: the query override, else the configured URL.
    pub fn rpc_url<'a>(&'a self, requested: Option<&'a str>) -> &'a str {
        match requested.map(str::trim) {
            Some(url) if !url.is_empty() => url,
            _ => self.config.ethereum_rpc_url.trim(),
        }
    }
}

/// Every route is a read, so browsers only need `GET`.
pub fn cors_layer(config: &Config) -> CorsLayer {
    let origins = match config.cors_origins() {
        Some(origins) => AllowOrigin::list(origins),
        None => AllowOrigin::any(),
    };
    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET])
        .allow_headers(Any)
}

pub fn router(state: AppState) -> Router {
    let cors = cors_layer(&state.config);

    Router::new()
        .route("/health", get(health::health_check))
        .route("/api/v1/networks/{network_id}/status", get(network::get_status))
        .route("/api/v1/networks/{network_id}/config", get(network::get_chain_config))
        .route(
            "/api/v1/networks/{network_id}/tokens/{token}/balances/{holder}",
            get(network::get_token_balance),
        )
        .route(
            "/api/v1/networks/{network_id}/accounts/{address}/balance",
            get(network::get_native_balance),
        )
        .route(
            "/api/v1/networks/{network_id}/accounts/{address}/code",
            get(network::get_code),
        )
        .route(
            "/api/v1/networks/{network_id}/block-number",
            get(network::get_block_number),
        )
        .route(
            "/api/v1/networks/{network_id}/transactions/{tx_hash}/receipt",
            get(network::get_transaction_receipt),
        )
        .route(
            "/api/v1/networks/{network_id}/transactions/{tx_hash}/trace",
            get(network::get_transaction_trace),
        )
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

#[cfg(test)]
pub(crate) fn test_config(rpc_url: &str) -> Config {
    Config {
        host: "127.0.0.1".to_string(),
        port: 3000,
        environment: "test".to_string(),
        network_id: "mainnet".to_string(),
        chain_id: None,
        ethereum_rpc_url: rpc_url.to_string(),
        rpc_connect_timeout_secs: 1,
        rpc_timeout_secs: 2,
        receipt_timeout_secs: 5,
        cors_allowed_origins: "*".to_string(),
    }
}
