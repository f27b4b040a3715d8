//! Wallet provider abstraction.
//!
//! A provider is the capability object a wallet injects: a JSON-RPC style
//! `request` plus zero or more event-registration method families. Which
//! families exist is reported through [`EventMethods`]; the default bodies of
//! the event methods reject with an "unsupported method" error.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use bitflags::bitflags;
use serde_json::Value;

use crate::error::ProviderError;
use crate::types::RequestArguments;

bitflags! {
    /// Event methods a provider implements.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct EventMethods: u8 {
        const ON = 1;
        const OFF = 1 << 1;
        const REMOVE_LISTENER = 1 << 2;
        const ADD_EVENT_LISTENER = 1 << 3;
        const REMOVE_EVENT_LISTENER = 1 << 4;
        const ADD_LISTENER = 1 << 5;

        /// Node-style emitter: `on`/`off` plus the `addListener`/`removeListener` aliases.
        const EMITTER = Self::ON.bits()
            | Self::OFF.bits()
            | Self::REMOVE_LISTENER.bits()
            | Self::ADD_LISTENER.bits();

        /// DOM-style event target.
        const EVENT_TARGET = Self::ADD_EVENT_LISTENER.bits() | Self::REMOVE_EVENT_LISTENER.bits();
    }
}

/// Identity of a registered listener.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ListenerId(u64);

static NEXT_LISTENER_ID: AtomicU64 = AtomicU64::new(1);

/// An event callback with a stable identity.
///
/// Clones share the identity, so removing a clone removes the original.
#[derive(Clone)]
pub struct Listener {
    id: ListenerId,
    callback: Arc<dyn Fn(&Value) + Send + Sync>,
}

impl Listener {
    /// Wrap a callback, assigning it a fresh identity.
    pub fn new(callback: impl Fn(&Value) + Send + Sync + 'static) -> Self {
        let id = ListenerId(NEXT_LISTENER_ID.fetch_add(1, Ordering::Relaxed));
        Self { id, callback: Arc::new(callback) }
    }

    pub fn id(&self) -> ListenerId {
        self.id
    }

    /// Invoke the callback with an event payload.
    pub fn call(&self, payload: &Value) {
        (self.callback)(payload)
    }
}

impl fmt::Debug for Listener {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Listener").field("id", &self.id).finish()
    }
}

/// An EIP-1193 style wallet provider.
#[async_trait]
pub trait WalletProvider: Send + Sync {
    /// Send a JSON-RPC request to the wallet.
    async fn request(&self, args: RequestArguments) -> Result<Value, ProviderError>;

    /// Whether this is the reference wallet (MetaMask) implementation.
    fn is_metamask(&self) -> bool {
        false
    }

    /// Event methods this provider implements.
    fn event_methods(&self) -> EventMethods {
        EventMethods::empty()
    }

    fn on(&self, _event: &str, _listener: Listener) -> Result<(), ProviderError> {
        Err(ProviderError::unsupported("on"))
    }

    fn off(&self, _event: &str, _listener: &Listener) -> Result<(), ProviderError> {
        Err(ProviderError::unsupported("off"))
    }

    fn remove_listener(&self, _event: &str, _listener: &Listener) -> Result<(), ProviderError> {
        Err(ProviderError::unsupported("removeListener"))
    }

    fn add_event_listener(&self, _event: &str, _listener: Listener) -> Result<(), ProviderError> {
        Err(ProviderError::unsupported("addEventListener"))
    }

    fn remove_event_listener(
        &self,
        _event: &str,
        _listener: &Listener,
    ) -> Result<(), ProviderError> {
        Err(ProviderError::unsupported("removeEventListener"))
    }

    fn add_listener(&self, _event: &str, _listener: Listener) -> Result<(), ProviderError> {
        Err(ProviderError::unsupported("addListener"))
    }
}

/// Whether a provider is present and exposes any event registration shape.
pub fn is_provider_ready(provider: Option<&dyn WalletProvider>) -> bool {
    provider.is_some_and(|p| {
        p.event_methods().intersects(
            EventMethods::ON | EventMethods::ADD_EVENT_LISTENER | EventMethods::ADD_LISTENER,
        )
    })
}
