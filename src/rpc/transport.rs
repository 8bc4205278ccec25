use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use url::Url;

use super::RpcError;
use crate::constants::{DEFAULT_RPC_CONNECT_TIMEOUT_SECS, DEFAULT_RPC_TIMEOUT_SECS};

const ERROR_BODY_EXCERPT: usize = 256;

/// A dialed JSON-RPC endpoint.
#[async_trait]
pub trait RpcTransport: Send + Sync {
    fn endpoint(&self) -> &str;

    /// Sends one request; never retries.
    async fn request(&self, method: &str, params: Vec<Value>) -> Result<Value, RpcError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransportOptions {
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
}

impl Default for TransportOptions {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(DEFAULT_RPC_CONNECT_TIMEOUT_SECS),
            request_timeout: Duration::from_secs(DEFAULT_RPC_TIMEOUT_SECS),
        }
    }
}

fn rpc_request(id: u64, method: &str, params: &[Value]) -> Value {
    serde_json::json!({
        "jsonrpc": "2.0",
        "method": method,
        "params": params,
        "id": id
    })
}

#[derive(Debug, Deserialize)]
struct RpcErrorObject {
    code: i64,
    message: String,
}

/// Splits a JSON-RPC response envelope into its result or error.
fn decode_envelope(body: Value) -> Result<Value, RpcError> {
    let Value::Object(mut envelope) = body else {
        return Err(RpcError::Decoding(
            "response is not a JSON object".to_string(),
        ));
    };

    if let Some(error) = envelope.remove("error").filter(|e| !e.is_null()) {
        let error: RpcErrorObject = serde_json::from_value(error)
            .map_err(|e| RpcError::Decoding(format!("malformed error object: {e}")))?;
        return Err(RpcError::Remote {
            code: error.code,
            message: error.message,
        });
    }

    envelope
        .remove("result")
        .ok_or_else(|| RpcError::Decoding("response carries neither result nor error".to_string()))
}

fn excerpt(body: &str) -> &str {
    match body.char_indices().nth(ERROR_BODY_EXCERPT) {
        Some((idx, _)) => &body[..idx],
        None => body,
    }
}

/// JSON-RPC 2.0 over HTTP(S).
pub struct HttpTransport {
    endpoint: Url,
    client: reqwest::Client,
    next_id: AtomicU64,
}

impl HttpTransport {
    pub fn new(endpoint: &str, options: &TransportOptions) -> Result<Self, RpcError> {
        let endpoint = Url::parse(endpoint.trim())
            .map_err(|e| RpcError::Transport(format!("Invalid RPC URL {endpoint}: {e}")))?;
        match endpoint.scheme() {
            "http" | "https" => {}
            other => {
                return Err(RpcError::Transport(format!(
                    "Unsupported RPC URL scheme: {other}"
                )))
            }
        }

        let client = reqwest::Client::builder()
            .connect_timeout(options.connect_timeout)
            .timeout(options.request_timeout)
            .build()
            .map_err(|e| RpcError::Transport(format!("HTTP client init failed: {e}")))?;

        Ok(Self {
            endpoint,
            client,
            next_id: AtomicU64::new(1),
        })
    }
}

#[async_trait]
impl RpcTransport for HttpTransport {
    fn endpoint(&self) -> &str {
        self.endpoint.as_str()
    }

    async fn request(&self, method: &str, params: Vec<Value>) -> Result<Value, RpcError> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let request = rpc_request(id, method, &params);
        tracing::trace!("JSON-RPC request #{} {} -> {}", id, method, self.endpoint);

        let response = self
            .client
            .post(self.endpoint.clone())
            .json(&request)
            .send()
            .await
            .map_err(|e| RpcError::Transport(format!("{method}: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(RpcError::Transport(format!(
                "{method} returned HTTP {status}: {}",
                excerpt(&body)
            )));
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| RpcError::Decoding(format!("{method}: {e}")))?;

        decode_envelope(body)
    }
}
