use ethers::abi::{Abi, Function, Token};
use ethers::types::{Address, Bytes, U256};
use serde::Serialize;
use serde_json::{json, Value};
use std::sync::Arc;

use crate::{
    constants::{BLOCK_TAG_LATEST, ERC20_BALANCE_OF, ERC20_SYMBOL, ETH_CALL, ETH_GAS_PRICE},
    crypto::hash::function_selector,
    error::{AppError, Result},
    rpc::{self, ClientRegistry, RpcTransport},
    utils::parse_address,
};

/// Parameters of an `eth_call`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CallMessage {
    pub from: Address,
    pub to: Address,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gas: Option<U256>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gas_price: Option<U256>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<U256>,
    pub data: Bytes,
}

impl CallMessage {
    /// A zero gas budget is sent as no `gas` field so the node estimates it.
    pub fn read_only(from: Address, to: Address, data: Bytes, gas_price: Option<U256>) -> Self {
        Self {
            from,
            to,
            gas: None,
            gas_price,
            value: None,
            data,
        }
    }
}

/// Selector followed by the ABI-encoded arguments.
pub fn encode_call(method_signature: &str, args: &[Token]) -> Bytes {
    let mut data = function_selector(method_signature).to_vec();
    data.extend(ethers::abi::encode(args));
    Bytes::from(data)
}

/// `balanceOf(address)` -> `balanceOf`.
pub fn method_name(method_signature: &str) -> &str {
    let trimmed = method_signature.trim();
    trimmed.split('(').next().unwrap_or(trimmed)
}

/// Accepts a JSON ABI array, a string holding one, or an artifact with an `abi` field.
pub fn parse_contract_abi(raw: &Value) -> Result<Abi> {
    match raw {
        Value::Array(_) => serde_json::from_value(raw.clone())
            .map_err(|e| AppError::BadRequest(format!("Invalid contract ABI: {e}"))),
        Value::String(text) => serde_json::from_str(text)
            .map_err(|e| AppError::BadRequest(format!("Invalid contract ABI: {e}"))),
        Value::Object(artifact) => match artifact.get("abi") {
            Some(inner) => parse_contract_abi(inner),
            None => Err(AppError::BadRequest(
                "Contract artifact has no `abi` field".to_string(),
            )),
        },
        other => Err(AppError::BadRequest(format!(
            "Unsupported contract ABI representation: {other}"
        ))),
    }
}

/// Minimal ERC-20 read surface.
pub fn erc20_abi() -> Result<Abi> {
    ethers::abi::parse_abi(&[
        "function balanceOf(address) view returns (uint256)",
        "function symbol() view returns (string)",
        "function decimals() view returns (uint8)",
    ])
    .map_err(|e| AppError::Internal(format!("ERC-20 ABI parse failed: {e}")))
}

fn find_function<'a>(abi: &'a Abi, name: &str, selector: [u8; 4]) -> Option<&'a Function> {
    let candidates = abi.functions_by_name(name).ok()?;
    candidates
        .iter()
        .find(|function| function.short_signature() == selector)
        .or_else(|| candidates.first())
}

fn symbol_from_token(token: Token) -> Option<String> {
    let symbol = match token {
        Token::String(symbol) => symbol,
        // Some early tokens return `bytes32` instead of `string`.
        Token::FixedBytes(raw) => {
            let end = raw.iter().position(|b| *b == 0).unwrap_or(raw.len());
            String::from_utf8(raw[..end].to_vec()).ok()?
        }
        _ => return None,
    };
    let symbol = symbol.trim().to_string();
    (!symbol.is_empty()).then_some(symbol)
}

async fn suggest_gas_price(client: &dyn RpcTransport) -> Option<U256> {
    match rpc::call::<U256>(client, ETH_GAS_PRICE, Vec::new()).await {
        Ok(price) => Some(price),
        Err(err) => {
            tracing::debug!("Gas price suggestion unavailable from {}; {}", client.endpoint(), err);
            None
        }
    }
}

/// Read-only contract calls decoded through a caller-supplied ABI.
pub struct ContractReader {
    registry: Arc<ClientRegistry>,
}

impl ContractReader {
    pub fn new(registry: Arc<ClientRegistry>) -> Self {
        Self { registry }
    }

    /// Calls `method_signature` on `contract_addr` and decodes the output.
    ///
    /// A method missing from `abi`, or a call that returns no data, yields an
    /// empty token list instead of an error. Transport failures propagate.
    #[allow(clippy::too_many_arguments)]
    pub async fn read_contract_value(
        &self,
        network_id: &str,
        rpc_url: &str,
        contract_addr: &str,
        caller_addr: &str,
        method_signature: &str,
        args: &[Token],
        abi: &Abi,
    ) -> Result<Vec<Token>> {
        let to = parse_address(contract_addr)?;
        let from = parse_address(caller_addr)?;
        let client = self.registry.resolve(network_id, rpc_url)?;
        let client = client.as_ref();

        let gas_price = suggest_gas_price(client).await;
        let message = CallMessage::read_only(from, to, encode_call(method_signature, args), gas_price);
        let message = serde_json::to_value(&message)
            .map_err(|e| AppError::Internal(format!("Failed to encode call message: {e}")))?;

        tracing::debug!("Calling {} on contract {}", method_signature, contract_addr);
        let output: Bytes = rpc::call(client, ETH_CALL, vec![message, json!(BLOCK_TAG_LATEST)]).await?;

        let name = method_name(method_signature);
        let Some(function) = find_function(abi, name, function_selector(method_signature)) else {
            tracing::warn!(
                "Unable to read {} of unsupported contract address: {}",
                name,
                contract_addr
            );
            return Ok(Vec::new());
        };
        if output.is_empty() {
            tracing::warn!(
                "No data returned for {} from contract address {}; is a contract deployed there?",
                name,
                contract_addr
            );
            return Ok(Vec::new());
        }

        function.decode_output(output.as_ref()).map_err(|e| {
            AppError::Decoding(format!(
                "Failed to decode {} output from {}: {}",
                name, contract_addr, e
            ))
        })
    }

    /// `balanceOf(holder)`; zero when the token does not expose it.
    pub async fn get_token_balance(
        &self,
        network_id: &str,
        rpc_url: &str,
        token_addr: &str,
        holder: &str,
        abi: &Abi,
    ) -> Result<U256> {
        let holder_address = parse_address(holder)?;
        let tokens = self
            .read_contract_value(
                network_id,
                rpc_url,
                token_addr,
                holder,
                ERC20_BALANCE_OF,
                &[Token::Address(holder_address)],
                abi,
            )
            .await?;
        let balance = tokens
            .into_iter()
            .next()
            .and_then(Token::into_uint)
            .unwrap_or_default();

        if !balance.is_zero() {
            let symbol = self
                .get_token_symbol(network_id, rpc_url, holder, token_addr, abi)
                .await
                .ok()
                .flatten();
            tracing::debug!(
                "Read {} token balance ({}) for {} from token contract address: {}",
                symbol.as_deref().unwrap_or("unknown"),
                balance,
                holder,
                token_addr
            );
        }
        Ok(balance)
    }

    pub async fn get_token_symbol(
        &self,
        network_id: &str,
        rpc_url: &str,
        caller: &str,
        token_addr: &str,
        abi: &Abi,
    ) -> Result<Option<String>> {
        let tokens = self
            .read_contract_value(network_id, rpc_url, token_addr, caller, ERC20_SYMBOL, &[], abi)
            .await?;
        Ok(tokens.into_iter().next().and_then(symbol_from_token))
    }
}
