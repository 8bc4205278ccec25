// src/models/mod.rs
pub mod chain;
pub mod network;

pub use chain::ChainConfig;
pub use network::{NetworkStatus, SyncState};

use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: T,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data,
        }
    }
}
