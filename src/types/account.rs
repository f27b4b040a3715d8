//! Account address types.

use std::fmt;

use alloy::primitives::Address;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::AppError;

/// A wallet account address as reported by the provider.
///
/// Kept as the provider's string (lowercase or checksummed); compare with
/// [`AccountAddress::eq_ignore_case`] when casing may differ.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AccountAddress(String);

impl AccountAddress {
    pub fn new(address: impl Into<String>) -> Self {
        Self(address.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Compare two addresses ignoring hex casing.
    pub fn eq_ignore_case(&self, other: &AccountAddress) -> bool {
        self.0.eq_ignore_ascii_case(&other.0)
    }

    /// Parse into a typed address.
    pub fn to_address(&self) -> Result<Address, AppError> {
        self.0.trim().parse::<Address>().map_err(|e| {
            AppError::InvalidAddress(format!("Invalid address format '{}': {}", self.0, e))
        })
    }

    /// Shortened form for display, e.g. `0x1234...abcd`.
    pub fn short(&self) -> String {
        let s = self.0.as_str();
        match (s.get(..6), s.len().checked_sub(4).and_then(|start| s.get(start..))) {
            (Some(head), Some(tail)) if s.len() > 10 => format!("{head}...{tail}"),
            _ => s.to_string(),
        }
    }
}

impl fmt::Display for AccountAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for AccountAddress {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for AccountAddress {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<Address> for AccountAddress {
    fn from(address: Address) -> Self {
        Self(address.to_checksum(None))
    }
}

/// Parse an account list payload (`eth_accounts`, `accountsChanged`).
///
/// `null` is an empty list. Returns `None` for anything that is not a list
/// of strings.
pub fn parse_accounts(value: &Value) -> Option<Vec<AccountAddress>> {
    match value {
        Value::Null => Some(Vec::new()),
        Value::Array(items) => items
            .iter()
            .map(|item| item.as_str().map(AccountAddress::from))
            .collect::<Option<Vec<_>>>(),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_accounts_list() {
        let accounts = parse_accounts(&json!(["0xAAA", "0xBBB"])).unwrap();
        assert_eq!(accounts, vec![AccountAddress::from("0xAAA"), AccountAddress::from("0xBBB")]);
    }

    #[test]
    fn test_parse_accounts_null_is_empty() {
        assert_eq!(parse_accounts(&Value::Null), Some(vec![]));
        assert_eq!(parse_accounts(&json!([])), Some(vec![]));
    }

    #[test]
    fn test_parse_accounts_malformed() {
        assert!(parse_accounts(&json!("0xAAA")).is_none());
        assert!(parse_accounts(&json!(["0xAAA", 7])).is_none());
        assert!(parse_accounts(&json!({"accounts": []})).is_none());
    }

    #[test]
    fn test_eq_ignore_case() {
        let lower = AccountAddress::from("0xf39fd6e51aad88f6f4ce6ab8827279cfffb92266");
        let mixed = AccountAddress::from("0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266");
        assert_ne!(lower, mixed);
        assert!(lower.eq_ignore_case(&mixed));
    }

    #[test]
    fn test_to_address() {
        let account = AccountAddress::from("0xf39fd6e51aad88f6f4ce6ab8827279cfffb92266");
        let address = account.to_address().unwrap();
        assert_ne!(address, Address::ZERO);
        assert!(AccountAddress::from(address).eq_ignore_case(&account));
    }

    #[test]
    fn test_to_address_invalid() {
        let result = AccountAddress::from("0xAAA").to_address();
        match result {
            Err(AppError::InvalidAddress(msg)) => assert!(msg.contains("0xAAA")),
            _ => panic!("Expected InvalidAddress error"),
        }
    }

    #[test]
    fn test_short() {
        let account = AccountAddress::from("0xf39fd6e51aad88f6f4ce6ab8827279cfffb92266");
        assert_eq!(account.short(), "0xf39f...2266");
        assert_eq!(AccountAddress::from("0xAAA").short(), "0xAAA");
    }

    #[test]
    fn test_serde_transparent() {
        let account = AccountAddress::from("0xAAA");
        assert_eq!(serde_json::to_string(&account).unwrap(), "\"0xAAA\"");
    }
}
