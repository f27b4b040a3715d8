//! Wallet connection flow.
//!
//! Requests account access once, reports the first account, and keeps
//! reporting account changes until the returned [`Subscription`] is
//! cancelled. A session that reports [`ConnectError::Disconnected`] cancels
//! its own subscription; call [`WalletConnector::connect`] again to reconnect.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, OnceLock};

use serde_json::{json, Value};
use tracing::{debug, error, info, warn};

use super::locator::ProviderLocator;
use super::subscription::{subscribe, Subscription};
use crate::error::ConnectError;
use crate::ethereum::constants::{
    ACCOUNTS_CHANGED, CHAIN_CHANGED, DISCONNECT, ETH_ACCOUNTS, ETH_REQUEST_ACCOUNTS,
    WALLET_SWITCH_ETHEREUM_CHAIN,
};
use crate::ethereum::{Listener, WalletProvider};
use crate::types::{parse_accounts, AccountAddress, RequestArguments, SwitchChainParams};

/// Receiver of connection outcomes.
pub trait ConnectionObserver: Send + Sync {
    /// The active account, on connect and on every change.
    fn on_account(&self, account: AccountAddress);

    /// A failed connect, or the end of a live session.
    fn on_error(&self, error: ConnectError);

    /// The wallet switched chains.
    fn on_chain_changed(&self, _chain_id: &str) {}
}

/// Observer built from two closures.
pub struct CallbackObserver<S, E> {
    on_success: S,
    on_error: E,
}

impl<S, E> CallbackObserver<S, E>
where
    S: Fn(AccountAddress) + Send + Sync,
    E: Fn(ConnectError) + Send + Sync,
{
    pub fn new(on_success: S, on_error: E) -> Self {
        Self { on_success, on_error }
    }
}

impl<S, E> ConnectionObserver for CallbackObserver<S, E>
where
    S: Fn(AccountAddress) + Send + Sync,
    E: Fn(ConnectError) + Send + Sync,
{
    fn on_account(&self, account: AccountAddress) {
        (self.on_success)(account)
    }

    fn on_error(&self, error: ConnectError) {
        (self.on_error)(error)
    }
}

/// State shared by the listeners of one connected session.
struct Session {
    observer: Arc<dyn ConnectionObserver>,
    disconnected: AtomicBool,
    subscription: OnceLock<Subscription>,
}

impl Session {
    fn accounts_changed(&self, payload: &Value) {
        let Some(accounts) = parse_accounts(payload) else {
            debug!(payload = %payload, "Ignoring malformed accountsChanged payload");
            return;
        };
        match accounts.into_iter().next() {
            Some(account) => {
                if self.disconnected.load(Ordering::SeqCst) {
                    debug!(account = %account, "Ignoring account change after disconnect");
                    return;
                }
                info!(account = %account, "Wallet account changed");
                self.observer.on_account(account);
            }
            None => self.disconnect(),
        }
    }

    fn disconnect(&self) {
        if self.disconnected.swap(true, Ordering::SeqCst) {
            return;
        }
        info!("Wallet disconnected");
        self.observer.on_error(ConnectError::Disconnected);
        if let Some(subscription) = self.subscription.get() {
            subscription.cancel();
        }
    }

    fn chain_changed(&self, payload: &Value) {
        if self.disconnected.load(Ordering::SeqCst) {
            return;
        }
        if let Some(chain_id) = payload.as_str() {
            debug!(chain_id = %chain_id, "Wallet chain changed");
            self.observer.on_chain_changed(chain_id);
        }
    }
}

/// Connects to whichever wallet the locator finds.
#[derive(Clone)]
pub struct WalletConnector {
    locator: Arc<dyn ProviderLocator>,
}

impl WalletConnector {
    /// Create a connector over a provider source.
    pub fn new(locator: Arc<dyn ProviderLocator>) -> Self {
        Self { locator }
    }

    fn provider(&self) -> Result<Arc<dyn WalletProvider>, ConnectError> {
        self.locator.locate().ok_or_else(|| {
            warn!("No Ethereum provider found");
            ConnectError::NoProvider
        })
    }

    async fn request_first_account(
        provider: &dyn WalletProvider,
    ) -> Result<AccountAddress, ConnectError> {
        let response = provider.request(RequestArguments::new(ETH_REQUEST_ACCOUNTS)).await;

        let accounts = match response {
            Ok(value) => parse_accounts(&value).ok_or_else(|| {
                error!(response = %value, "Unexpected eth_requestAccounts response");
                ConnectError::Unknown(format!("Unexpected eth_requestAccounts response: {value}"))
            })?,
            Err(e) => {
                let classified = ConnectError::from_rejection(&e);
                match &classified {
                    ConnectError::UserRejected => info!("User rejected the connection request"),
                    ConnectError::RequestPending => warn!("Connection request already pending"),
                    _ => error!(code = ?e.code, error = %e, "Wallet connection failed"),
                }
                return Err(classified);
            }
        };

        accounts.into_iter().next().ok_or_else(|| {
            warn!("No accounts returned from wallet");
            ConnectError::NoAccounts
        })
    }

    /// Request account access once and return the first account.
    ///
    /// May wait indefinitely for the user to answer the wallet prompt.
    pub async fn request_account(&self) -> Result<AccountAddress, ConnectError> {
        let provider = self.provider()?;
        Self::request_first_account(provider.as_ref()).await
    }

    /// Connect and keep `observer` informed of account changes.
    ///
    /// Every failure goes to `observer.on_error`. The returned handle stops
    /// change notifications; it does nothing if connecting failed. A
    /// disconnect cancels it too.
    pub async fn connect(&self, observer: Arc<dyn ConnectionObserver>) -> Subscription {
        let provider = match self.provider() {
            Ok(provider) => provider,
            Err(e) => {
                observer.on_error(e);
                return Subscription::noop();
            }
        };

        let account = match Self::request_first_account(provider.as_ref()).await {
            Ok(account) => account,
            Err(e) => {
                observer.on_error(e);
                return Subscription::noop();
            }
        };

        info!(account = %account, "Wallet connected");
        observer.on_account(account);

        let session = Arc::new(Session {
            observer,
            disconnected: AtomicBool::new(false),
            subscription: OnceLock::new(),
        });
        let on_accounts = {
            let session = session.clone();
            Listener::new(move |payload| session.accounts_changed(payload))
        };
        let on_disconnect = {
            let session = session.clone();
            Listener::new(move |_| session.disconnect())
        };
        let on_chain = {
            let session = session.clone();
            Listener::new(move |payload| session.chain_changed(payload))
        };

        let subscription = Subscription::all([
            subscribe(Some(provider.clone()), ACCOUNTS_CHANGED, on_accounts),
            subscribe(Some(provider.clone()), DISCONNECT, on_disconnect),
            subscribe(Some(provider), CHAIN_CHANGED, on_chain),
        ]);
        let _ = session.subscription.set(subscription.clone());
        // A disconnect delivered while subscribing found no handle to cancel.
        if session.disconnected.load(Ordering::SeqCst) {
            subscription.cancel();
        }
        subscription
    }

    /// [`WalletConnector::connect`] with plain closures.
    pub async fn connect_with<S, E>(&self, on_success: S, on_error: E) -> Subscription
    where
        S: Fn(AccountAddress) + Send + Sync + 'static,
        E: Fn(ConnectError) + Send + Sync + 'static,
    {
        self.connect(Arc::new(CallbackObserver::new(on_success, on_error))).await
    }

    /// Current account without prompting the user (`eth_accounts`).
    pub async fn current_account(&self) -> Result<Option<AccountAddress>, ConnectError> {
        let provider = self.provider()?;
        let value = provider
            .request(RequestArguments::new(ETH_ACCOUNTS))
            .await
            .map_err(|e| ConnectError::from_rejection(&e))?;
        let accounts = parse_accounts(&value).ok_or_else(|| {
            ConnectError::Unknown(format!("Unexpected eth_accounts response: {value}"))
        })?;
        Ok(accounts.into_iter().next())
    }

    /// Ask the wallet to switch to `chain_id`.
    pub async fn switch_chain(&self, chain_id: u64) -> Result<(), ConnectError> {
        let provider = self.provider()?;
        let params = json!([SwitchChainParams::new(chain_id)]);
        provider
            .request(RequestArguments::with_params(WALLET_SWITCH_ETHEREUM_CHAIN, params))
            .await
            .map_err(|e| {
                let classified = ConnectError::from_switch_rejection(&e, chain_id);
                warn!(chain_id, error = %e, "Error switching chain");
                classified
            })?;
        info!(chain_id, "Switched chain");
        Ok(())
    }
}

impl std::fmt::Debug for WalletConnector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WalletConnector").finish_non_exhaustive()
    }
}
