//! Wallet provider constants.
//!
//! Contains RPC method names, event names and provider error codes.

// ============================================================================
// RPC Methods
// ============================================================================

/// Ask the wallet for account access (may open an approval prompt).
pub const ETH_REQUEST_ACCOUNTS: &str = "eth_requestAccounts";

/// Passive account query; never prompts.
pub const ETH_ACCOUNTS: &str = "eth_accounts";

/// Current chain ID (hex string).
pub const ETH_CHAIN_ID: &str = "eth_chainId";

/// Ask the wallet to switch to another chain.
pub const WALLET_SWITCH_ETHEREUM_CHAIN: &str = "wallet_switchEthereumChain";

// ============================================================================
// Provider Events
// ============================================================================

/// Emitted with the new ordered account list.
pub const ACCOUNTS_CHANGED: &str = "accountsChanged";

/// Emitted with the new hex chain ID.
pub const CHAIN_CHANGED: &str = "chainChanged";

/// Emitted when the provider loses its connection.
pub const DISCONNECT: &str = "disconnect";

// ============================================================================
// Provider Error Codes (EIP-1193 / MetaMask conventions)
// ============================================================================

/// The user rejected the request.
pub const USER_REJECTED_CODE: i64 = 4001;

/// The provider does not support the requested method.
pub const UNSUPPORTED_METHOD_CODE: i64 = 4200;

/// The requested chain has not been added to the wallet.
pub const CHAIN_NOT_ADDED_CODE: i64 = 4902;

/// A request of the same kind is already pending.
pub const REQUEST_PENDING_CODE: i64 = -32002;

// ============================================================================
// Defaults
// ============================================================================

/// Default interval between account/chain polls of an RPC-backed provider.
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 2_000;
