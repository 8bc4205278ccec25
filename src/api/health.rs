use axum::{extract::State, Json};
use serde::Serialize;

use super::AppState;
use crate::constants::API_VERSION;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub api_version: String,
    pub network_id: String,
    pub rpc_configured: bool,
    pub cached_clients: usize,
}

pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        api_version: API_VERSION.to_string(),
        network_id: state.config.network_id.clone(),
        rpc_configured: !state.config.ethereum_rpc_url.trim().is_empty(),
        cached_clients: state.registry.len(),
    })
}
