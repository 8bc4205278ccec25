use serde_json::Value;
use std::fmt;

use super::{FromRpc, RpcError, RpcTransport};

/// One method to try inside an ordered fallback chain.
pub struct Attempt<T> {
    pub method: &'static str,
    pub params: Vec<Value>,
    decode: fn(Value) -> Result<T, RpcError>,
}

impl<T: FromRpc> Attempt<T> {
    pub fn new(method: &'static str, params: Vec<Value>) -> Self {
        Self {
            method,
            params,
            decode: T::from_rpc,
        }
    }
}

impl<T> Attempt<T> {
    /// Uses a method-specific decoder, for chains whose methods answer in different shapes.
    pub fn with_decoder(
        method: &'static str,
        params: Vec<Value>,
        decode: fn(Value) -> Result<T, RpcError>,
    ) -> Self {
        Self {
            method,
            params,
            decode,
        }
    }
}

/// Every attempt in a chain failed; errors are kept in attempt order.
#[derive(Debug, Clone, PartialEq)]
pub struct FallbackError {
    pub failures: Vec<(&'static str, RpcError)>,
}

impl FallbackError {
    pub fn last(&self) -> Option<&RpcError> {
        self.failures.last().map(|(_, err)| err)
    }
}

impl fmt::Display for FallbackError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.failures.is_empty() {
            return write!(f, "no methods attempted");
        }
        let parts: Vec<String> = self
            .failures
            .iter()
            .map(|(method, err)| format!("{method}: {err}"))
            .collect();
        write!(f, "{}", parts.join("; "))
    }
}

impl std::error::Error for FallbackError {}

impl From<FallbackError> for RpcError {
    fn from(err: FallbackError) -> Self {
        err.last()
            .cloned()
            .unwrap_or_else(|| RpcError::Transport(err.to_string()))
    }
}

/// Tries each attempt in order and returns the first success with the method that produced it.
/// A decoding failure counts as a failed attempt. Later attempts are never sent once one succeeds.
pub async fn first_success<T>(
    transport: &dyn RpcTransport,
    attempts: Vec<Attempt<T>>,
) -> Result<(T, &'static str), FallbackError> {
    let mut failures = Vec::with_capacity(attempts.len());

    for attempt in attempts {
        tracing::debug!(
            "Attempting {} via JSON-RPC on {}",
            attempt.method,
            transport.endpoint()
        );
        let outcome = match transport.request(attempt.method, attempt.params).await {
            Ok(raw) => (attempt.decode)(raw),
            Err(err) => Err(err),
        };
        match outcome {
            Ok(value) => return Ok((value, attempt.method)),
            Err(err) => {
                tracing::debug!("{} failed via JSON-RPC; {}", attempt.method, err);
                failures.push((attempt.method, err));
            }
        }
    }

    Err(FallbackError { failures })
}
