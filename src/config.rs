use axum::http::HeaderValue;
use serde::Deserialize;
use std::env;
use std::time::Duration;

use crate::constants::{
    DEFAULT_NETWORK_ID, DEFAULT_RECEIPT_TIMEOUT_SECS, DEFAULT_RPC_CONNECT_TIMEOUT_SECS,
    DEFAULT_RPC_TIMEOUT_SECS,
};
use crate::rpc::TransportOptions;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    // Server
    pub host: String,
    pub port: u16,
    pub environment: String,

    // Network
    pub network_id: String,
    pub chain_id: Option<u64>,
    pub ethereum_rpc_url: String,

    // Transport
    pub rpc_connect_timeout_secs: u64,
    pub rpc_timeout_secs: u64,
    pub receipt_timeout_secs: u64,

    // CORS
    pub cors_allowed_origins: String,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenv::dotenv().ok();

        Ok(Config {
            host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: env::var("PORT")
                .unwrap_or_else(|_| "3000".to_string())
                .parse()?,
            environment: env::var("ENVIRONMENT").unwrap_or_else(|_| "development".to_string()),

            network_id: env::var("NETWORK_ID").unwrap_or_else(|_| DEFAULT_NETWORK_ID.to_string()),
            chain_id: env::var("CHAIN_ID").ok().and_then(|s| s.trim().parse().ok()),
            // An empty URL is allowed; status queries then report `configuring`.
            ethereum_rpc_url: env::var("ETHEREUM_RPC_URL").unwrap_or_default(),

            rpc_connect_timeout_secs: env::var("RPC_CONNECT_TIMEOUT_SECS")
                .unwrap_or_else(|_| DEFAULT_RPC_CONNECT_TIMEOUT_SECS.to_string())
                .parse()?,
            rpc_timeout_secs: env::var("RPC_TIMEOUT_SECS")
                .unwrap_or_else(|_| DEFAULT_RPC_TIMEOUT_SECS.to_string())
                .parse()?,
            receipt_timeout_secs: env::var("RECEIPT_TIMEOUT_SECS")
                .unwrap_or_else(|_| DEFAULT_RECEIPT_TIMEOUT_SECS.to_string())
                .parse()?,

            cors_allowed_origins: env::var("CORS_ALLOWED_ORIGINS")
                .unwrap_or_else(|_| "*".to_string()),
        })
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if self.network_id.trim().is_empty() {
            anyhow::bail!("NETWORK_ID is empty");
        }
        if self.rpc_timeout_secs == 0 {
            anyhow::bail!("RPC_TIMEOUT_SECS must be > 0");
        }
        if self.receipt_timeout_secs == 0 {
            anyhow::bail!("RECEIPT_TIMEOUT_SECS must be > 0");
        }

        if self.ethereum_rpc_url.trim().is_empty() {
            tracing::warn!("ETHEREUM_RPC_URL is empty; network status will report `configuring`");
        }
        if self.rpc_connect_timeout_secs > self.rpc_timeout_secs {
            tracing::warn!("RPC_CONNECT_TIMEOUT_SECS exceeds RPC_TIMEOUT_SECS");
        }
        if self.cors_allowed_origins.trim().is_empty() {
            tracing::warn!("CORS_ALLOWED_ORIGINS is empty; requests may be blocked");
        }

        Ok(())
    }

    pub fn transport_options(&self) -> TransportOptions {
        TransportOptions {
            connect_timeout: Duration::from_secs(self.rpc_connect_timeout_secs),
            request_timeout: Duration::from_secs(self.rpc_timeout_secs),
        }
    }

    pub fn receipt_timeout(&self) -> Duration {
        Duration::from_secs(self.receipt_timeout_secs)
    }

    /// Browser origins allowed to call the API; `None` means any origin.
    ///
    /// Entries are comma separated. Ones that are not valid header values are
    /// skipped, and a list with no valid entry also means any origin.
    pub fn cors_origins(&self) -> Option<Vec<HeaderValue>> {
        let raw = self.cors_allowed_origins.trim();
        if raw.is_empty() || raw == "*" {
            return None;
        }
        let mut origins = Vec::new();
        for origin in raw.split(',').map(str::trim).filter(|s| !s.is_empty()) {
            match HeaderValue::from_str(origin) {
                Ok(value) => origins.push(value),
                Err(_) => tracing::warn!("Ignoring invalid CORS origin {:?}", origin),
            }
        }
        (!origins.is_empty()).then_some(origins)
    }
}
