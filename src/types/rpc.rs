//! Request types sent to wallet providers.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Arguments of a provider `request` call (`{ method, params }`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequestArguments {
    /// RPC method name.
    pub method: String,
    /// Positional parameters.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub params: Option<Value>,
}

impl RequestArguments {
    /// A request without parameters.
    pub fn new(method: impl Into<String>) -> Self {
        Self { method: method.into(), params: None }
    }

    pub fn with_params(method: impl Into<String>, params: Value) -> Self {
        Self { method: method.into(), params: Some(params) }
    }

    /// Parameters as sent over JSON-RPC; absent params become `[]`.
    pub fn params_or_empty(&self) -> Value {
        self.params.clone().unwrap_or_else(|| Value::Array(Vec::new()))
    }
}

/// Parameters of `wallet_switchEthereumChain`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SwitchChainParams {
    /// Hex-encoded chain ID.
    pub chain_id: String,
}

impl SwitchChainParams {
    pub fn new(chain_id: u64) -> Self {
        Self { chain_id: format!("{chain_id:#x}") }
    }
}
