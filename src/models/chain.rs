use ethers::types::Chain;
use serde::{Deserialize, Serialize};

/// Static parameters of a chain, keyed by network identifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChainConfig {
    pub chain_id: u64,
    pub name: String,
    pub native_symbol: String,
    pub homestead_block: Option<u64>,
    pub byzantium_block: Option<u64>,
    pub london_block: Option<u64>,
    pub eip1559: bool,
}

impl ChainConfig {
    pub fn mainnet() -> Self {
        Self {
            chain_id: 1,
            name: Chain::Mainnet.to_string(),
            native_symbol: "ETH".to_string(),
            homestead_block: Some(1_150_000),
            byzantium_block: Some(4_370_000),
            london_block: Some(12_965_000),
            eip1559: true,
        }
    }

    /// Config for a chain known only by id; fork schedule is left unset.
    pub fn from_chain_id(chain_id: u64) -> Self {
        if chain_id == 1 {
            return Self::mainnet();
        }
        let chain = Chain::try_from(chain_id).ok();
        Self {
            chain_id,
            name: chain
                .map(|c| c.to_string())
                .unwrap_or_else(|| format!("chain-{chain_id}")),
            native_symbol: "ETH".to_string(),
            homestead_block: None,
            byzantium_block: None,
            london_block: None,
            eip1559: chain.map(|c| !c.is_legacy()).unwrap_or(true),
        }
    }
}

impl Default for ChainConfig {
    fn default() -> Self {
        Self::mainnet()
    }
}
