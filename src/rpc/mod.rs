//! JSON-RPC plumbing: transport handles, their per-endpoint cache, typed result
//! decoding and the ordered fallback combinator used by the status services.

pub mod fallback;
pub mod registry;
pub mod transport;
pub mod types;

#[cfg(test)]
pub mod mock;

pub use fallback::{first_success, Attempt, FallbackError};
pub use registry::ClientRegistry;
pub use transport::{HttpTransport, RpcTransport, TransportOptions};
pub use types::FromRpc;

use serde_json::Value;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum RpcError {
    #[error("transport failure: {0}")]
    Transport(String),

    #[error("remote error {code}: {message}")]
    Remote { code: i64, message: String },

    #[error("unexpected response: {0}")]
    Decoding(String),
}

/// Invokes `method` and decodes the result into `T` at the transport boundary.
pub async fn call<T: FromRpc>(
    transport: &dyn RpcTransport,
    method: &str,
    params: Vec<Value>,
) -> Result<T, RpcError> {
    let raw = transport.request(method, params).await?;
    T::from_rpc(raw)
}
