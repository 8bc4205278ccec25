use dashmap::DashMap;
use std::sync::Arc;

use crate::models::ChainConfig;

/// Process-wide chain parameters keyed by network identifier.
///
/// Lookups never fail: unknown ids fall back to mainnet.
pub struct ChainConfigResolver {
    configs: DashMap<String, Arc<ChainConfig>>,
    fallback: Arc<ChainConfig>,
}

impl ChainConfigResolver {
    pub fn new() -> Self {
        Self {
            configs: DashMap::new(),
            fallback: Arc::new(ChainConfig::mainnet()),
        }
    }

    pub fn resolve(&self, network_id: &str) -> Arc<ChainConfig> {
        match self.configs.get(network_id.trim()) {
            Some(config) => Arc::clone(config.value()),
            None => Arc::clone(&self.fallback),
        }
    }

    /// Loads a config at startup; the status path only reads.
    pub fn register(&self, network_id: &str, config: ChainConfig) {
        tracing::debug!(
            "Registered chain config for network {} (chain id {})",
            network_id,
            config.chain_id
        );
        self.configs
            .insert(network_id.trim().to_string(), Arc::new(config));
    }

    pub fn contains(&self, network_id: &str) -> bool {
        self.configs.contains_key(network_id.trim())
    }
}

impl Default for ChainConfigResolver {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_network_falls_back_to_mainnet() {
        let resolver = ChainConfigResolver::new();
        assert_eq!(*resolver.resolve("does-not-exist"), ChainConfig::mainnet());
        assert_eq!(*resolver.resolve(""), ChainConfig::mainnet());
    }

    #[test]
    fn registered_network_is_returned() {
        let resolver = ChainConfigResolver::new();
        resolver.register("sepolia", ChainConfig::from_chain_id(11155111));
        assert!(resolver.contains("sepolia"));
        assert_eq!(resolver.resolve(" sepolia ").chain_id, 11155111);
        assert_eq!(resolver.resolve("mainnet").chain_id, 1);
    }
}
