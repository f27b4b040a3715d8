//! Wallet provider backed by an Ethereum JSON-RPC node.
//!
//! A node has no approval prompt and pushes no events over HTTP, so this
//! provider answers `eth_requestAccounts` with the node's unlocked accounts
//! and synthesizes `accountsChanged`, `chainChanged` and `disconnect` by
//! polling.

use std::borrow::Cow;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use alloy::{
    network::Ethereum,
    providers::{Provider, ProviderBuilder, RootProvider},
};
use async_trait::async_trait;
use serde_json::Value;
use tokio::task::JoinHandle;

use super::constants::{
    ACCOUNTS_CHANGED, CHAIN_CHANGED, DISCONNECT, ETH_ACCOUNTS, ETH_CHAIN_ID, ETH_REQUEST_ACCOUNTS,
};
use super::events::EventEmitter;
use super::provider::{EventMethods, Listener, WalletProvider};
use crate::error::{AppError, ProviderError, Result};
use crate::types::RequestArguments;

/// Type alias for the HTTP provider.
pub type HttpProvider = RootProvider<Ethereum>;

/// Last observed node state.
#[derive(Debug, Default)]
struct Observed {
    accounts: Option<Value>,
    chain_id: Option<Value>,
    disconnected: bool,
}

/// Wallet provider over an HTTP JSON-RPC endpoint.
#[derive(Clone)]
pub struct RpcWalletProvider {
    /// The underlying provider.
    provider: Arc<HttpProvider>,
    /// RPC URL for logging.
    rpc_url: String,
    /// Registered event listeners.
    emitter: EventEmitter,
    /// State from the previous poll.
    observed: Arc<Mutex<Observed>>,
}

impl RpcWalletProvider {
    /// Create a new RPC-backed wallet provider.
    ///
    /// Note: This does NOT make any network calls. The connection is
    /// established lazily when the first request is performed.
    pub fn new(rpc_url: &str) -> Result<Self> {
        let url = rpc_url
            .parse()
            .map_err(|_| AppError::Config(format!("Invalid RPC URL: {}", rpc_url)))?;

        #[allow(deprecated)]
        let provider = ProviderBuilder::new().connect_http(url).root().clone();

        tracing::info!(rpc_url = %rpc_url, "RPC wallet provider created (lazy initialization)");

        Ok(Self {
            provider: Arc::new(provider),
            rpc_url: rpc_url.to_string(),
            emitter: EventEmitter::new(),
            observed: Arc::new(Mutex::new(Observed::default())),
        })
    }

    /// Get the underlying provider.
    pub fn provider(&self) -> &HttpProvider {
        &self.provider
    }

    /// Get the emitter used for this provider's events.
    pub fn emitter(&self) -> &EventEmitter {
        &self.emitter
    }

    fn observed(&self) -> MutexGuard<'_, Observed> {
        self.observed.lock().unwrap_or_else(PoisonError::into_inner)
    }

    async fn call_node(&self, method: &str, params: Value) -> Result<Value, ProviderError> {
        let result = self
            .provider
            .raw_request::<Value, Value>(Cow::Owned(method.to_string()), params)
            .await?;
        Ok(result)
    }

    /// Poll the node once and emit events for anything that changed.
    ///
    /// The first successful poll only records state. A failed poll emits
    /// `disconnect` once; the next successful poll clears that state.
    pub async fn poll(&self) -> Result<(), ProviderError> {
        let polled = async {
            let accounts = self.call_node(ETH_ACCOUNTS, Value::Array(Vec::new())).await?;
            let chain_id = self.call_node(ETH_CHAIN_ID, Value::Array(Vec::new())).await?;
            Ok::<_, ProviderError>((accounts, chain_id))
        }
        .await;

        let (accounts, chain_id) = match polled {
            Ok(state) => state,
            Err(err) => {
                let first_failure = !std::mem::replace(&mut self.observed().disconnected, true);
                if first_failure {
                    tracing::warn!(rpc_url = %self.rpc_url, error = %err, "RPC node unreachable");
                    let payload = serde_json::to_value(&err).unwrap_or(Value::Null);
                    self.emitter.emit(DISCONNECT, &payload);
                }
                return Err(err);
            }
        };

        let (accounts_changed, chain_changed) = {
            let mut observed = self.observed();
            if observed.disconnected {
                tracing::info!(rpc_url = %self.rpc_url, "RPC node reachable again");
                observed.disconnected = false;
            }
            let accounts_changed = observed.accounts.as_ref().is_some_and(|prev| *prev != accounts);
            let chain_changed = observed.chain_id.as_ref().is_some_and(|prev| *prev != chain_id);
            observed.accounts = Some(accounts.clone());
            observed.chain_id = Some(chain_id.clone());
            (accounts_changed, chain_changed)
        };

        if chain_changed {
            tracing::debug!(chain_id = %chain_id, "Chain changed");
            self.emitter.emit(CHAIN_CHANGED, &chain_id);
        }
        if accounts_changed {
            tracing::debug!(accounts = %accounts, "Accounts changed");
            self.emitter.emit(ACCOUNTS_CHANGED, &accounts);
        }

        Ok(())
    }

    /// Spawn a task polling the node every `interval`.
    ///
    /// Abort the returned handle to stop polling.
    ///
    /// # Panics
    ///
    /// Panics if called outside of a tokio runtime.
    pub fn spawn_watcher(&self, interval: Duration) -> JoinHandle<()> {
        let this = self.clone();
        tracing::debug!(interval_ms = interval.as_millis() as u64, "Starting RPC watcher");
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                if let Err(e) = this.poll().await {
                    tracing::debug!(error = %e, "Poll failed");
                }
            }
        })
    }
}

#[async_trait]
impl WalletProvider for RpcWalletProvider {
    async fn request(&self, args: RequestArguments) -> Result<Value, ProviderError> {
        let method = match args.method.as_str() {
            ETH_REQUEST_ACCOUNTS => ETH_ACCOUNTS,
            other => other,
        };
        tracing::debug!(method = %method, rpc_url = %self.rpc_url, "Provider request");
        self.call_node(method, args.params_or_empty()).await
    }

    fn event_methods(&self) -> EventMethods {
        EventMethods::EMITTER
    }

    fn on(&self, event: &str, listener: Listener) -> Result<(), ProviderError> {
        self.emitter.add(event, listener);
        Ok(())
    }

    fn off(&self, event: &str, listener: &Listener) -> Result<(), ProviderError> {
        self.emitter.remove(event, listener.id());
        Ok(())
    }

    fn remove_listener(&self, event: &str, listener: &Listener) -> Result<(), ProviderError> {
        self.off(event, listener)
    }

    fn add_listener(&self, event: &str, listener: Listener) -> Result<(), ProviderError> {
        self.on(event, listener)
    }
}

impl std::fmt::Debug for RpcWalletProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RpcWalletProvider").field("rpc_url", &self.rpc_url).finish()
    }
}
