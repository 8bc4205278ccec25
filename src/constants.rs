/// Application constants

pub const API_VERSION: &str = "v1";

// JSON-RPC methods
pub const ETH_SYNCING: &str = "eth_syncing";
pub const ETH_BLOCK_NUMBER: &str = "eth_blockNumber";
pub const ETH_GET_BLOCK_BY_NUMBER: &str = "eth_getBlockByNumber";
pub const ETH_GAS_PRICE: &str = "eth_gasPrice";
pub const ETH_GET_BALANCE: &str = "eth_getBalance";
pub const ETH_GET_CODE: &str = "eth_getCode";
pub const ETH_CALL: &str = "eth_call";
pub const ETH_GET_TRANSACTION_RECEIPT: &str = "eth_getTransactionReceipt";
pub const ETH_PROTOCOL_VERSION: &str = "eth_protocolVersion";
pub const NET_VERSION: &str = "net_version";
pub const NET_PEER_COUNT: &str = "net_peerCount";
pub const PARITY_NET_PEERS: &str = "parity_netPeers";
pub const TRACE_TRANSACTION: &str = "trace_transaction";

// Block tags
pub const BLOCK_TAG_LATEST: &str = "latest";
pub const BLOCK_TAG_EARLIEST: &str = "earliest";

pub const NO_ENDPOINT_MESSAGE: &str = "No JSON-RPC endpoint configured or resolvable";

// Transport defaults (seconds)
pub const DEFAULT_RPC_CONNECT_TIMEOUT_SECS: u64 = 4;
pub const DEFAULT_RPC_TIMEOUT_SECS: u64 = 12;

// Receipt polling defaults
pub const DEFAULT_RECEIPT_TIMEOUT_SECS: u64 = 120;
pub const RECEIPT_INITIAL_BACKOFF_MS: u64 = 250;
pub const RECEIPT_MAX_BACKOFF_MS: u64 = 4_000;

pub const DEFAULT_NETWORK_ID: &str = "mainnet";

// ERC-20 read methods
pub const ERC20_BALANCE_OF: &str = "balanceOf(address)";
pub const ERC20_SYMBOL: &str = "symbol()";
