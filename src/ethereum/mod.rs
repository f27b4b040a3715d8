//! Ethereum wallet provider module.
//!
//! Contains the provider abstraction, event plumbing, constants and an
//! RPC-backed provider.

pub mod client;
pub mod constants;
pub mod events;
pub mod provider;

pub use client::{HttpProvider, RpcWalletProvider};
pub use events::EventEmitter;
pub use provider::{is_provider_ready, EventMethods, Listener, ListenerId, WalletProvider};
