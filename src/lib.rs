//! Edu Wallet Connect Library
//!
//! Provider-agnostic wallet discovery, event subscription and connection flow
//! for EIP-1193 style wallets.
//!
//! # Features
//!
//! - **Provider Discovery**: Locate a wallet among the primary, legacy `web3`
//!   and multi-provider injection points
//! - **Event Subscriptions**: One subscribe/cancel contract over the `on`,
//!   `addEventListener` and `addListener` calling conventions
//! - **Connection Flow**: Request accounts, then follow account changes until
//!   cancelled or disconnected
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use edu_wallet_connect::{InjectedProviders, RpcWalletProvider, WalletConnector};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let injected = Arc::new(InjectedProviders::new());
//!     injected.inject_ethereum(Arc::new(RpcWalletProvider::new("http://127.0.0.1:8545")?));
//!
//!     let connector = WalletConnector::new(injected);
//!     let subscription = connector
//!         .connect_with(|account| println!("account: {account}"), |err| eprintln!("{err}"))
//!         .await;
//!     subscription.cancel();
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;
pub mod ethereum;
pub mod services;
pub mod types;

pub use config::Config;
pub use error::{AppError, ConnectError, ConnectErrorKind, ProviderError, Result};
pub use ethereum::{EventMethods, Listener, RpcWalletProvider, WalletProvider};
pub use services::{
    subscribe, ConnectionObserver, InjectedProviders, LegacyWeb3, ProviderLocator, Subscription,
    WalletConnector,
};
pub use types::{AccountAddress, RequestArguments};
