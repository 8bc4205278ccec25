//! Typed views over raw JSON-RPC results, decoded once at the transport boundary.
//!
//! Standard EVM shapes decode through the `ethers` serde types; only replies
//! that ethers does not model are defined here.

use ethers::types::{Block, Bytes, SyncingStatus, TransactionReceipt, U256, U64};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::Value;

use super::RpcError;

pub trait FromRpc: Sized {
    fn from_rpc(value: Value) -> Result<Self, RpcError>;
}

/// Deserializes `value` into `T`, keeping the payload in the error.
pub fn decode<T: DeserializeOwned>(value: Value) -> Result<T, RpcError> {
    T::deserialize(&value)
        .map_err(|e| RpcError::Decoding(format!("{e} (payload: {value})")))
}

macro_rules! from_rpc_via_serde {
    ($($ty:ty),* $(,)?) => {
        $(
            impl FromRpc for $ty {
                fn from_rpc(value: Value) -> Result<Self, RpcError> {
                    decode(value)
                }
            }
        )*
    };
}

from_rpc_via_serde!(U256, U64, Bytes, TransactionReceipt);

/// `null` decodes to `None`; anything else must decode as `T`.
impl<T: FromRpc> FromRpc for Option<T> {
    fn from_rpc(value: Value) -> Result<Self, RpcError> {
        if value.is_null() {
            return Ok(None);
        }
        T::from_rpc(value).map(Some)
    }
}

impl FromRpc for Value {
    fn from_rpc(value: Value) -> Result<Self, RpcError> {
        Ok(value)
    }
}

/// Plain text results such as `eth_protocolVersion`; some nodes answer a number.
impl FromRpc for String {
    fn from_rpc(value: Value) -> Result<Self, RpcError> {
        match value {
            Value::String(text) => Ok(text),
            Value::Number(n) => Ok(n.to_string()),
            other => Err(RpcError::Decoding(format!("expected string, got {other}"))),
        }
    }
}

/// A missing block is a failed read, not an empty one.
impl<TX> FromRpc for Block<TX>
where
    TX: Serialize + DeserializeOwned + Default,
{
    fn from_rpc(value: Value) -> Result<Self, RpcError> {
        if value.is_null() {
            return Err(RpcError::Decoding("block not found".to_string()));
        }
        decode(value)
    }
}

/// Some nodes answer `null` instead of `false` once synced.
impl FromRpc for SyncingStatus {
    fn from_rpc(value: Value) -> Result<Self, RpcError> {
        if value.is_null() {
            return Ok(SyncingStatus::IsFalse);
        }
        decode(value)
    }
}

/// `net_version` is a decimal string (`"1"`, `"11155111"`), not a hex quantity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NetVersion(pub U256);

impl FromRpc for NetVersion {
    fn from_rpc(value: Value) -> Result<Self, RpcError> {
        let text = match value {
            Value::String(text) => text,
            Value::Number(n) => n.to_string(),
            other => return Err(RpcError::Decoding(format!("expected network id, got {other}"))),
        };
        let trimmed = text.trim();
        if trimmed.starts_with("0x") || trimmed.starts_with("0X") {
            return decode(Value::String(trimmed.to_lowercase())).map(NetVersion);
        }
        U256::from_dec_str(trimmed)
            .map(NetVersion)
            .map_err(|e| RpcError::Decoding(format!("invalid network id {text}: {e}")))
    }
}

/// `parity_netPeers` result; counts are plain JSON numbers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct ParityPeers {
    #[serde(default)]
    pub active: u64,
    pub connected: u64,
    #[serde(default)]
    pub max: u64,
}

from_rpc_via_serde!(ParityPeers);
