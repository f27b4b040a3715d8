//! Error types and handling module.
//!
//! Defines the application error, the provider (RPC) error and the
//! connection error taxonomy reported by the connection flow.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::ethereum::constants::{
    CHAIN_NOT_ADDED_CODE, REQUEST_PENDING_CODE, UNSUPPORTED_METHOD_CODE, USER_REJECTED_CODE,
};

/// Application-wide error type.
#[derive(Debug, Error)]
pub enum AppError {
    /// Configuration-related errors.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Transport errors.
    #[error("Transport error: {0}")]
    Transport(String),

    /// Invalid Ethereum address.
    #[error("Invalid address: {0}")]
    InvalidAddress(String),

    /// Parse error.
    #[error("Parse error: {0}")]
    Parse(String),

    /// Wallet connection failed.
    #[error(transparent)]
    Connect(#[from] ConnectError),
}

impl From<alloy::transports::TransportError> for AppError {
    fn from(err: alloy::transports::TransportError) -> Self {
        AppError::Transport(err.to_string())
    }
}

impl From<std::num::ParseIntError> for AppError {
    fn from(err: std::num::ParseIntError) -> Self {
        AppError::Parse(err.to_string())
    }
}

/// Result type alias using AppError.
pub type Result<T, E = AppError> = std::result::Result<T, E>;

/// Error returned by a wallet provider, shaped like an EIP-1193 RPC error.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[error("{message}")]
pub struct ProviderError {
    /// Provider-reported numeric code, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<i64>,
    /// Human-readable message.
    #[serde(default)]
    pub message: String,
    /// Extra provider data.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
}

impl ProviderError {
    /// Create an error with a code.
    pub fn new(code: i64, message: impl Into<String>) -> Self {
        Self { code: Some(code), message: message.into(), data: None }
    }

    /// Create an error without a code.
    pub fn other(message: impl Into<String>) -> Self {
        Self { code: None, message: message.into(), data: None }
    }

    /// The provider does not implement the named method.
    pub fn unsupported(method: &str) -> Self {
        Self::new(UNSUPPORTED_METHOD_CODE, format!("Provider does not support '{method}'"))
    }
}

impl From<alloy::transports::TransportError> for ProviderError {
    fn from(err: alloy::transports::TransportError) -> Self {
        match err.as_error_resp() {
            Some(payload) => Self::new(payload.code, payload.message.to_string()),
            None => Self::other(err.to_string()),
        }
    }
}

/// Kind of a connection failure, without its payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConnectErrorKind {
    NoProvider,
    NoAccounts,
    UserRejected,
    RequestPending,
    Disconnected,
    UnrecognizedChain,
    Unknown,
}

/// Failure reported by the connection flow.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConnectError {
    /// No wallet extension detected.
    #[error("No Ethereum provider found. Please install MetaMask or another wallet.")]
    NoProvider,

    /// The provider answered with zero accounts.
    #[error("No accounts returned from wallet")]
    NoAccounts,

    /// The user declined the approval prompt.
    #[error("User rejected the connection request")]
    UserRejected,

    /// An earlier approval request is still open in the wallet.
    #[error("Connection request already pending. Check your wallet.")]
    RequestPending,

    /// The account list of a live session became empty.
    #[error("Wallet disconnected")]
    Disconnected,

    /// The wallet does not know the requested chain.
    #[error("Chain {0} has not been added to the wallet")]
    UnrecognizedChain(String),

    /// Any other rejection, with the provider's message.
    #[error("Wallet connection failed: {0}")]
    Unknown(String),
}

impl ConnectError {
    /// The kind of this error.
    pub fn kind(&self) -> ConnectErrorKind {
        match self {
            ConnectError::NoProvider => ConnectErrorKind::NoProvider,
            ConnectError::NoAccounts => ConnectErrorKind::NoAccounts,
            ConnectError::UserRejected => ConnectErrorKind::UserRejected,
            ConnectError::RequestPending => ConnectErrorKind::RequestPending,
            ConnectError::Disconnected => ConnectErrorKind::Disconnected,
            ConnectError::UnrecognizedChain(_) => ConnectErrorKind::UnrecognizedChain,
            ConnectError::Unknown(_) => ConnectErrorKind::Unknown,
        }
    }

    /// Classify a rejected account request by its provider code.
    ///
    /// Only the two codes wallets agree on are mapped; everything else is
    /// `Unknown` with the original message.
    pub fn from_rejection(err: &ProviderError) -> Self {
        match err.code {
            Some(USER_REJECTED_CODE) => ConnectError::UserRejected,
            Some(REQUEST_PENDING_CODE) => ConnectError::RequestPending,
            _ if err.message.is_empty() => ConnectError::Unknown("Unknown error".to_string()),
            _ => ConnectError::Unknown(err.message.clone()),
        }
    }

    /// Classify a rejected `wallet_switchEthereumChain` request.
    pub fn from_switch_rejection(err: &ProviderError, chain_id: u64) -> Self {
        match err.code {
            Some(CHAIN_NOT_ADDED_CODE) => ConnectError::UnrecognizedChain(format!("{chain_id:#x}")),
            _ => Self::from_rejection(err),
        }
    }
}
