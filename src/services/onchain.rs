use ethers::types::{Address, Bytes, TransactionReceipt, U256, U64};
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;

use crate::{
    config::Config,
    constants::{
        BLOCK_TAG_LATEST, ETH_BLOCK_NUMBER, ETH_GAS_PRICE, ETH_GET_BALANCE, ETH_GET_CODE,
        ETH_GET_TRANSACTION_RECEIPT, RECEIPT_INITIAL_BACKOFF_MS, RECEIPT_MAX_BACKOFF_MS,
        TRACE_TRANSACTION,
    },
    error::{AppError, Result},
    rpc::{self, ClientRegistry, RpcError, RpcTransport},
    utils::with_hex_prefix,
};

/// JSON-RPC "method not found".
const METHOD_NOT_FOUND: i64 = -32601;

/// How long and how often to poll for a receipt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReceiptPolicy {
    pub timeout: Duration,
    pub initial_backoff: Duration,
    pub max_backoff: Duration,
}

impl ReceiptPolicy {
    pub fn from_config(config: &Config) -> Self {
        Self {
            timeout: config.receipt_timeout(),
            ..Self::default()
        }
    }
}

impl Default for ReceiptPolicy {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(crate::constants::DEFAULT_RECEIPT_TIMEOUT_SECS),
            initial_backoff: Duration::from_millis(RECEIPT_INITIAL_BACKOFF_MS),
            max_backoff: Duration::from_millis(RECEIPT_MAX_BACKOFF_MS),
        }
    }
}

/// Thin typed reads against one node.
pub struct OnchainReader {
    client: Arc<dyn RpcTransport>,
}

impl OnchainReader {
    pub fn new(client: Arc<dyn RpcTransport>) -> Self {
        Self { client }
    }

    pub fn resolve(registry: &ClientRegistry, network_id: &str, rpc_url: &str) -> Result<Self> {
        Ok(Self::new(registry.resolve(network_id, rpc_url)?))
    }

    pub fn endpoint(&self) -> &str {
        self.client.endpoint()
    }

    pub async fn get_block_number(&self) -> Result<u64> {
        match rpc::call::<U64>(self.client.as_ref(), ETH_BLOCK_NUMBER, Vec::new()).await {
            Ok(number) => Ok(number.as_u64()),
            Err(err) => {
                tracing::warn!("Failed to read block number from {}: {}", self.endpoint(), err);
                Err(err.into())
            }
        }
    }

    /// Suggested gas price; `None` when the node does not offer one.
    pub async fn get_gas_price(&self) -> Option<U256> {
        match rpc::call::<U256>(self.client.as_ref(), ETH_GAS_PRICE, Vec::new()).await {
            Ok(price) => Some(price),
            Err(err) => {
                tracing::warn!("Failed to read gas price from {}: {}", self.endpoint(), err);
                None
            }
        }
    }

    pub async fn get_native_balance(&self, address: Address) -> Result<U256> {
        let balance = rpc::call(
            self.client.as_ref(),
            ETH_GET_BALANCE,
            vec![json!(address), json!(BLOCK_TAG_LATEST)],
        )
        .await?;
        Ok(balance)
    }

    /// Deployed bytecode at `address`; empty for externally owned accounts.
    pub async fn get_code(&self, address: Address, scope: &str) -> Result<Bytes> {
        let code = rpc::call(
            self.client.as_ref(),
            ETH_GET_CODE,
            vec![json!(address), json!(scope)],
        )
        .await?;
        Ok(code)
    }

    /// Raw `trace_transaction` output; only tracing-enabled nodes answer.
    pub async fn trace_transaction(&self, tx_hash: &str) -> Result<Value> {
        let result = rpc::call(
            self.client.as_ref(),
            TRACE_TRANSACTION,
            vec![json!(with_hex_prefix(tx_hash))],
        )
        .await;
        match result {
            Ok(traces) => Ok(traces),
            Err(RpcError::Remote { code: METHOD_NOT_FOUND, message }) => Err(AppError::Unsupported(
                format!("{} does not serve {}: {}", self.endpoint(), TRACE_TRANSACTION, message),
            )),
            Err(err) => Err(err.into()),
        }
    }

    pub async fn get_transaction_receipt(&self, tx_hash: &str) -> Result<Option<TransactionReceipt>> {
        let receipt = rpc::call(
            self.client.as_ref(),
            ETH_GET_TRANSACTION_RECEIPT,
            vec![json!(with_hex_prefix(tx_hash))],
        )
        .await?;
        Ok(receipt)
    }

    /// Polls until the node returns a receipt or `policy.timeout` elapses.
    pub async fn wait_for_receipt(&self, tx_hash: &str, policy: ReceiptPolicy) -> Result<TransactionReceipt> {
        let tx_hash = with_hex_prefix(tx_hash);
        let started = Instant::now();

        let outcome = tokio::time::timeout(policy.timeout, self.poll_receipt(&tx_hash, &policy)).await;
        match outcome {
            Ok(result) => result,
            Err(_) => {
                let waited = started.elapsed();
                tracing::warn!("Gave up waiting for receipt of {} after {:?}", tx_hash, waited);
                Err(AppError::ReceiptTimeout { tx_hash, waited })
            }
        }
    }

    async fn poll_receipt(&self, tx_hash: &str, policy: &ReceiptPolicy) -> Result<TransactionReceipt> {
        let mut backoff = policy.initial_backoff;
        loop {
            if let Some(receipt) = self.get_transaction_receipt(tx_hash).await? {
                return Ok(receipt);
            }
            tracing::debug!("Receipt for {} not yet available; retrying in {:?}", tx_hash, backoff);
            tokio::time::sleep(backoff).await;
            backoff = (backoff * 2).min(policy.max_backoff);
        }
    }
}
