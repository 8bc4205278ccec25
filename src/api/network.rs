use axum::{
    extract::{Path, Query, State},
    Json,
};
use ethers::types::{Bytes, TransactionReceipt};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::AppState;
use crate::{
    constants::{BLOCK_TAG_LATEST, NO_ENDPOINT_MESSAGE},
    error::{AppError, Result},
    models::{ApiResponse, ChainConfig, NetworkStatus},
    services::{contract_reader::erc20_abi, OnchainReader, ReceiptPolicy},
    utils::parse_address,
};

#[derive(Debug, Default, Deserialize)]
pub struct RpcQuery {
    pub rpc_url: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct CodeQuery {
    pub rpc_url: Option<String>,
    /// Block tag or hex number; `latest` when absent.
    pub block: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct TokenBalanceResponse {
    pub token: String,
    pub holder: String,
    /// Raw integer amount in the token's smallest unit, base 10.
    pub balance: String,
}

#[derive(Debug, Serialize)]
pub struct NativeBalanceResponse {
    pub address: String,
    /// Wei, base 10.
    pub balance: String,
}

#[derive(Debug, Serialize)]
pub struct CodeResponse {
    pub address: String,
    pub block: String,
    pub code: Bytes,
}

#[derive(Debug, Serialize)]
pub struct BlockNumberResponse {
    pub block_number: u64,
    pub gas_price: Option<String>,
}

/// Reader for the request's endpoint; an unset endpoint is a configuration error.
fn onchain_reader(state: &AppState, network_id: &str, requested: Option<&str>) -> Result<OnchainReader> {
    let rpc_url = state.rpc_url(requested);
    if rpc_url.is_empty() {
        return Err(AppError::Configuration(NO_ENDPOINT_MESSAGE.to_string()));
    }
    OnchainReader::resolve(&state.registry, network_id, rpc_url)
}

/// GET /api/v1/networks/{network_id}/status
pub async fn get_status(
    State(state): State<AppState>,
    Path(network_id): Path<String>,
    Query(query): Query<RpcQuery>,
) -> Result<Json<ApiResponse<NetworkStatus>>> {
    let rpc_url = state.rpc_url(query.rpc_url.as_deref());
    let status = state.network_status.get_status(&network_id, rpc_url).await?;
    Ok(Json(ApiResponse::success(status)))
}

/// GET /api/v1/networks/{network_id}/config
pub async fn get_chain_config(
    State(state): State<AppState>,
    Path(network_id): Path<String>,
) -> Json<ApiResponse<ChainConfig>> {
    let config = state.chain_configs.resolve(&network_id);
    Json(ApiResponse::success(config.as_ref().clone()))
}

/// GET /api/v1/networks/{network_id}/tokens/{token}/balances/{holder}
pub async fn get_token_balance(
    State(state): State<AppState>,
    Path((network_id, token, holder)): Path<(String, String, String)>,
    Query(query): Query<RpcQuery>,
) -> Result<Json<ApiResponse<TokenBalanceResponse>>> {
    let rpc_url = state.rpc_url(query.rpc_url.as_deref());
    let abi = erc20_abi()?;
    let balance = state
        .contract_reader
        .get_token_balance(&network_id, rpc_url, &token, &holder, &abi)
        .await?;

    Ok(Json(ApiResponse::success(TokenBalanceResponse {
        token,
        holder,
        balance: balance.to_string(),
    })))
}

/// GET /api/v1/networks/{network_id}/block-number
pub async fn get_block_number(
    State(state): State<AppState>,
    Path(network_id): Path<String>,
    Query(query): Query<RpcQuery>,
) -> Result<Json<ApiResponse<BlockNumberResponse>>> {
    let reader = onchain_reader(&state, &network_id, query.rpc_url.as_deref())?;
    let block_number = reader.get_block_number().await?;
    let gas_price = reader.get_gas_price().await.map(|price| price.to_string());

    Ok(Json(ApiResponse::success(BlockNumberResponse {
        block_number,
        gas_price,
    })))
}

/// GET /api/v1/networks/{network_id}/accounts/{address}/balance
pub async fn get_native_balance(
    State(state): State<AppState>,
    Path((network_id, address)): Path<(String, String)>,
    Query(query): Query<RpcQuery>,
) -> Result<Json<ApiResponse<NativeBalanceResponse>>> {
    let account = parse_address(&address)?;
    let reader = onchain_reader(&state, &network_id, query.rpc_url.as_deref())?;
    let balance = reader.get_native_balance(account).await?;

    Ok(Json(ApiResponse::success(NativeBalanceResponse {
        address,
        balance: balance.to_string(),
    })))
}

/// GET /api/v1/networks/{network_id}/accounts/{address}/code
pub async fn get_code(
    State(state): State<AppState>,
    Path((network_id, address)): Path<(String, String)>,
    Query(query): Query<CodeQuery>,
) -> Result<Json<ApiResponse<CodeResponse>>> {
    let account = parse_address(&address)?;
    let block = query.block.unwrap_or_else(|| BLOCK_TAG_LATEST.to_string());
    let reader = onchain_reader(&state, &network_id, query.rpc_url.as_deref())?;
    let code = reader.get_code(account, &block).await?;

    Ok(Json(ApiResponse::success(CodeResponse {
        address,
        block,
        code,
    })))
}

/// GET /api/v1/networks/{network_id}/transactions/{tx_hash}/trace
pub async fn get_transaction_trace(
    State(state): State<AppState>,
    Path((network_id, tx_hash)): Path<(String, String)>,
    Query(query): Query<RpcQuery>,
) -> Result<Json<ApiResponse<Value>>> {
    let reader = onchain_reader(&state, &network_id, query.rpc_url.as_deref())?;
    let traces = reader.trace_transaction(&tx_hash).await?;
    Ok(Json(ApiResponse::success(traces)))
}

/// GET /api/v1/networks/{network_id}/transactions/{tx_hash}/receipt
///
/// Waits up to `RECEIPT_TIMEOUT_SECS` for the transaction to be mined.
pub async fn get_transaction_receipt(
    State(state): State<AppState>,
    Path((network_id, tx_hash)): Path<(String, String)>,
    Query(query): Query<RpcQuery>,
) -> Result<Json<ApiResponse<TransactionReceipt>>> {
    let reader = onchain_reader(&state, &network_id, query.rpc_url.as_deref())?;
    let receipt = reader
        .wait_for_receipt(&tx_hash, ReceiptPolicy::from_config(&state.config))
        .await?;
    Ok(Json(ApiResponse::success(receipt)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::test_config;
    use crate::constants::{
        ETH_BLOCK_NUMBER, ETH_CALL, ETH_GAS_PRICE, ETH_GET_BALANCE, ETH_GET_BLOCK_BY_NUMBER,
        ETH_GET_CODE, ETH_GET_TRANSACTION_RECEIPT, ETH_PROTOCOL_VERSION, ETH_SYNCING,
        NET_PEER_COUNT, NET_VERSION, TRACE_TRANSACTION,
    };
    use crate::models::SyncState;
    use crate::rpc::mock::{receipt_json, MockTransport};
    use crate::rpc::RpcError;
    use ethers::abi::Token;
    use ethers::types::{H256, U256, U64};
    use serde_json::json;
    use std::sync::Arc;

    const ENDPOINT: &str = "http://mock.node:8545";

    fn state_with(mock: MockTransport) -> AppState {
        let state = AppState::new(test_config(ENDPOINT));
        state.registry.insert("mainnet", ENDPOINT, Arc::new(mock));
        state
    }

    fn synced_node() -> MockTransport {
        let mock = MockTransport::new();
        mock.respond_any(ETH_SYNCING, json!(false));
        mock.respond_any(ETH_GET_BLOCK_BY_NUMBER, json!({"number": "0x64", "hash": null}));
        mock.respond_any(NET_VERSION, json!("1"));
        mock.respond_any(NET_PEER_COUNT, json!("0x5"));
        mock.respond_any(ETH_PROTOCOL_VERSION, json!("0x41"));
        mock.respond_any(ETH_GAS_PRICE, json!("0x3b9aca00"));
        mock.respond_any(ETH_BLOCK_NUMBER, json!("0x65"));
        mock
    }

    const HOLDER: &str = "0x00000000000000000000000000000000000000aa";

    #[tokio::test]
    async fn status_without_endpoint_reports_configuring() {
        let state = AppState::new(test_config(""));
        let Json(response) = get_status(
            State(state),
            Path("mainnet".to_string()),
            Query(RpcQuery::default()),
        )
        .await
        .unwrap();
        assert!(response.success);
        assert_eq!(response.data.state, SyncState::Configuring);
    }

    #[tokio::test]
    async fn status_reads_configured_node() {
        let state = state_with(synced_node());
        let Json(response) = get_status(
            State(state),
            Path("mainnet".to_string()),
            Query(RpcQuery::default()),
        )
        .await
        .unwrap();
        assert_eq!(response.data.state, SyncState::Synced);
        assert_eq!(response.data.block, 100);
        assert_eq!(response.data.peer_count, 5);
    }

    #[tokio::test]
    async fn chain_config_falls_back_to_mainnet() {
        let state = AppState::new(test_config(""));
        let Json(response) = get_chain_config(State(state), Path("unknown".to_string())).await;
        assert_eq!(response.data, ChainConfig::mainnet());
    }

    #[tokio::test]
    async fn block_number_reads_eth_block_number_with_gas_price() {
        let mock = synced_node();
        mock.fail_any(ETH_SYNCING, RpcError::Transport("not consulted".to_string()));
        let state = state_with(mock);
        let Json(response) = get_block_number(
            State(state),
            Path("mainnet".to_string()),
            Query(RpcQuery::default()),
        )
        .await
        .unwrap();
        assert_eq!(response.data.block_number, 101);
        assert_eq!(response.data.gas_price.as_deref(), Some("1000000000"));
    }

    #[tokio::test]
    async fn block_number_failure_is_an_rpc_error() {
        let mock = synced_node();
        mock.fail_any(ETH_BLOCK_NUMBER, RpcError::Transport("reset".to_string()));
        let state = state_with(mock);
        let err = get_block_number(
            State(state),
            Path("mainnet".to_string()),
            Query(RpcQuery::default()),
        )
        .await
        .expect_err("no height to report");
        assert!(matches!(err, AppError::Rpc(RpcError::Transport(_))));
    }

    #[tokio::test]
    async fn native_balance_is_rendered_in_wei() {
        let mock = synced_node();
        mock.respond_any(ETH_GET_BALANCE, json!("0xde0b6b3a7640000"));
        let state = state_with(mock);

        let Json(response) = get_native_balance(
            State(state),
            Path(("mainnet".to_string(), HOLDER.to_string())),
            Query(RpcQuery::default()),
        )
        .await
        .unwrap();
        assert_eq!(response.data.balance, "1000000000000000000");
        assert_eq!(response.data.address, HOLDER);
    }

    #[tokio::test]
    async fn code_defaults_to_latest_block() {
        let mock = synced_node();
        mock.respond(ETH_GET_CODE, vec![json!(HOLDER), json!("latest")], json!("0x"));
        mock.respond(ETH_GET_CODE, vec![json!(HOLDER), json!("0x10")], json!("0x6080"));
        let state = state_with(mock);

        let Json(latest) = get_code(
            State(state.clone()),
            Path(("mainnet".to_string(), HOLDER.to_string())),
            Query(CodeQuery::default()),
        )
        .await
        .unwrap();
        assert_eq!(latest.data.block, "latest");
        assert!(latest.data.code.is_empty());

        let Json(at_block) = get_code(
            State(state),
            Path(("mainnet".to_string(), HOLDER.to_string())),
            Query(CodeQuery {
                rpc_url: None,
                block: Some("0x10".to_string()),
            }),
        )
        .await
        .unwrap();
        assert_eq!(at_block.data.code.to_vec(), vec![0x60u8, 0x80]);
    }

    #[tokio::test]
    async fn trace_on_node_without_tracing_is_unsupported() {
        let state = state_with(synced_node());
        let err = get_transaction_trace(
            State(state),
            Path(("mainnet".to_string(), "0xabc".to_string())),
            Query(RpcQuery::default()),
        )
        .await
        .expect_err("trace_transaction not scripted");
        assert!(matches!(err, AppError::Unsupported(_)));
    }

    #[tokio::test]
    async fn trace_returns_node_output() {
        let mock = synced_node();
        mock.respond(TRACE_TRANSACTION, vec![json!("0xabc")], json!([{"type": "call"}]));
        let state = state_with(mock);
        let Json(response) = get_transaction_trace(
            State(state),
            Path(("mainnet".to_string(), "abc".to_string())),
            Query(RpcQuery::default()),
        )
        .await
        .unwrap();
        assert_eq!(response.data, json!([{"type": "call"}]));
    }

    #[tokio::test]
    async fn block_number_without_endpoint_is_a_configuration_error() {
        let state = AppState::new(test_config(""));
        let err = get_block_number(
            State(state),
            Path("mainnet".to_string()),
            Query(RpcQuery::default()),
        )
        .await
        .expect_err("nothing to query");
        assert!(matches!(err, AppError::Configuration(_)));
    }

    #[tokio::test]
    async fn token_balance_is_rendered_in_base_ten() {
        let mock = synced_node();
        let encoded = ethers::abi::encode(&[Token::Uint(U256::from(1_500u64))]);
        mock.respond_any(ETH_CALL, json!(format!("0x{}", hex::encode(encoded))));
        let state = state_with(mock);

        let Json(response) = get_token_balance(
            State(state),
            Path((
                "mainnet".to_string(),
                "0x6b175474e89094c44da98b954eedeac495271d0f".to_string(),
                "0x00000000000000000000000000000000000000aa".to_string(),
            )),
            Query(RpcQuery::default()),
        )
        .await
        .unwrap();
        assert_eq!(response.data.balance, "1500");
    }

    #[tokio::test]
    async fn receipt_route_returns_decoded_receipt() {
        let tx_hash = format!("{:?}", H256::repeat_byte(0x11));
        let mock = synced_node();
        mock.respond_any(ETH_GET_TRANSACTION_RECEIPT, receipt_json(&tx_hash, 42));
        let state = state_with(mock);

        let Json(response) = get_transaction_receipt(
            State(state),
            Path(("mainnet".to_string(), tx_hash.clone())),
            Query(RpcQuery::default()),
        )
        .await
        .unwrap();
        assert_eq!(response.data.block_number, Some(U64::from(42u64)));
        assert_eq!(response.data.status, Some(U64::one()));

        let body = serde_json::to_value(&response.data).unwrap();
        assert_eq!(body["transactionHash"], tx_hash);
        assert_eq!(body["blockNumber"], "0x2a");
    }
}
