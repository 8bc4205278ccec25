// All service modules
pub mod chain_config;
pub mod contract_reader;
pub mod network_status;
pub mod onchain;

// Re-export for convenience
pub use chain_config::ChainConfigResolver;
pub use contract_reader::{CallMessage, ContractReader};
pub use network_status::NetworkStatusService;
pub use onchain::{OnchainReader, ReceiptPolicy};
