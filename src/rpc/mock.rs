//! Scripted in-memory transport for tests.

use async_trait::async_trait;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::Mutex;

use super::{RpcError, RpcTransport};

type Script = HashMap<String, Result<Value, RpcError>>;

/// Answers by exact `method` + `params`, then by `method` alone; anything
/// unscripted fails the way a node reports an unknown method.
///
/// Scripting a method with `respond_any` or `fail_any` replaces every earlier
/// entry for that method, including exact-params ones.
pub struct MockTransport {
    endpoint: String,
    script: Mutex<Script>,
    calls: Mutex<Vec<(String, Vec<Value>)>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::with_endpoint("http://mock.node:8545")
    }

    pub fn with_endpoint(endpoint: &str) -> Self {
        Self {
            endpoint: endpoint.to_string(),
            script: Mutex::new(HashMap::new()),
            calls: Mutex::new(Vec::new()),
        }
    }

    fn key(method: &str, params: Option<&[Value]>) -> String {
        match params {
            Some(params) => format!("{method}{}", Value::Array(params.to_vec())),
            None => method.to_string(),
        }
    }

    pub fn respond(&self, method: &str, params: Vec<Value>, result: Value) {
        self.script
            .lock()
            .unwrap()
            .insert(Self::key(method, Some(&params)), Ok(result));
    }

    pub fn respond_any(&self, method: &str, result: Value) {
        self.script_any(method, Ok(result));
    }

    pub fn fail(&self, method: &str, params: Vec<Value>, err: RpcError) {
        self.script
            .lock()
            .unwrap()
            .insert(Self::key(method, Some(&params)), Err(err));
    }

    pub fn fail_any(&self, method: &str, err: RpcError) {
        self.script_any(method, Err(err));
    }

    fn script_any(&self, method: &str, outcome: Result<Value, RpcError>) {
        let exact_prefix = format!("{method}[");
        let mut script = self.script.lock().unwrap();
        script.retain(|key, _| !key.starts_with(&exact_prefix));
        script.insert(Self::key(method, None), outcome);
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .map(|(method, _)| method.clone())
            .collect()
    }

    pub fn calls_with_params(&self) -> Vec<(String, Vec<Value>)> {
        self.calls.lock().unwrap().clone()
    }
}

/// A complete `eth_getTransactionReceipt` result for a successful transfer.
pub fn receipt_json(tx_hash: &str, block_number: u64) -> Value {
    json!({
        "transactionHash": tx_hash,
        "transactionIndex": "0x0",
        "blockHash": format!("0x{}", "ab".repeat(32)),
        "blockNumber": format!("{block_number:#x}"),
        "from": "0x00000000000000000000000000000000000000aa",
        "to": "0x00000000000000000000000000000000000000bb",
        "cumulativeGasUsed": "0x5208",
        "gasUsed": "0x5208",
        "contractAddress": null,
        "logs": [],
        "logsBloom": format!("0x{}", "0".repeat(512)),
        "status": "0x1",
        "type": "0x2",
        "effectiveGasPrice": "0x3b9aca00"
    })
}

impl Default for MockTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl RpcTransport for MockTransport {
    fn endpoint(&self) -> &str {
        &self.endpoint
    }

    async fn request(&self, method: &str, params: Vec<Value>) -> Result<Value, RpcError> {
        self.calls
            .lock()
            .unwrap()
            .push((method.to_string(), params.clone()));

        let script = self.script.lock().unwrap();
        script
            .get(&Self::key(method, Some(&params)))
            .or_else(|| script.get(&Self::key(method, None)))
            .cloned()
            .unwrap_or_else(|| {
                Err(RpcError::Remote {
                    code: -32601,
                    message: format!("the method {method} does not exist/is not available"),
                })
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn method_wide_failure_overrides_exact_entries() {
        let mock = MockTransport::new();
        mock.respond("eth_getBlockByNumber", vec![json!("latest"), json!(false)], json!({"number": "0x1"}));
        mock.respond("eth_call", vec![json!({})], json!("0x"));
        mock.fail_any("eth_getBlockByNumber", RpcError::Transport("down".to_string()));

        let header = mock
            .request("eth_getBlockByNumber", vec![json!("latest"), json!(false)])
            .await;
        assert_eq!(header, Err(RpcError::Transport("down".to_string())));
        assert_eq!(mock.request("eth_call", vec![json!({})]).await, Ok(json!("0x")));
    }

    #[tokio::test]
    async fn exact_entry_added_later_still_wins() {
        let mock = MockTransport::new();
        mock.respond_any("eth_blockNumber", json!("0x1"));
        mock.respond("eth_blockNumber", vec![], json!("0x2"));
        assert_eq!(mock.request("eth_blockNumber", vec![]).await, Ok(json!("0x2")));
    }

    #[tokio::test]
    async fn unscripted_method_is_not_found() {
        let mock = MockTransport::new();
        let err = mock.request("debug_traceBlock", vec![]).await.unwrap_err();
        assert!(matches!(err, RpcError::Remote { code: -32601, .. }));
        assert_eq!(mock.calls(), vec!["debug_traceBlock"]);
    }
}
