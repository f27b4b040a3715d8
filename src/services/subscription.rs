//! Event subscription adapter.
//!
//! Wallet providers register listeners through one of three calling
//! conventions. [`subscribe`] probes the provider once, records the shape as
//! an [`EventApi`], and hands back a [`Subscription`] that removes exactly the
//! registered listener through the matching removal method. The registered
//! listener is gated, so cancelling silences it even when the provider
//! cannot remove it.

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use tracing::{debug, error, warn};

use crate::error::ProviderError;
use crate::ethereum::{EventMethods, Listener, WalletProvider};

/// Removal method paired with a registration method.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Removal {
    RemoveListener,
    Off,
    RemoveEventListener,
}

/// Event registration shape of a provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventApi {
    /// `on`, removed with `removeListener` or else `off`.
    OnOff { removal: Option<Removal> },
    /// `addEventListener` / `removeEventListener`.
    EventTarget { removable: bool },
    /// `addListener` / `removeListener`.
    AddListener { removable: bool },
    /// No registration method at all.
    Unsupported,
}

impl EventApi {
    /// Pick the shape to use for a capability set.
    pub fn probe(methods: EventMethods) -> Self {
        if methods.contains(EventMethods::ON) {
            let removal = if methods.contains(EventMethods::REMOVE_LISTENER) {
                Some(Removal::RemoveListener)
            } else if methods.contains(EventMethods::OFF) {
                Some(Removal::Off)
            } else {
                None
            };
            EventApi::OnOff { removal }
        } else if methods.contains(EventMethods::ADD_EVENT_LISTENER) {
            EventApi::EventTarget {
                removable: methods.contains(EventMethods::REMOVE_EVENT_LISTENER),
            }
        } else if methods.contains(EventMethods::ADD_LISTENER) {
            EventApi::AddListener { removable: methods.contains(EventMethods::REMOVE_LISTENER) }
        } else {
            EventApi::Unsupported
        }
    }

    /// Removal method matching the registration method, if the provider has one.
    pub fn removal(&self) -> Option<Removal> {
        match *self {
            EventApi::OnOff { removal } => removal,
            EventApi::EventTarget { removable: true } => Some(Removal::RemoveEventListener),
            EventApi::AddListener { removable: true } => Some(Removal::RemoveListener),
            _ => None,
        }
    }

    fn register(
        &self,
        provider: &dyn WalletProvider,
        event: &str,
        listener: Listener,
    ) -> Result<(), ProviderError> {
        match self {
            EventApi::OnOff { .. } => provider.on(event, listener),
            EventApi::EventTarget { .. } => provider.add_event_listener(event, listener),
            EventApi::AddListener { .. } => provider.add_listener(event, listener),
            EventApi::Unsupported => Err(ProviderError::other("no event registration method")),
        }
    }
}

impl Removal {
    fn remove(
        self,
        provider: &dyn WalletProvider,
        event: &str,
        listener: &Listener,
    ) -> Result<(), ProviderError> {
        match self {
            Removal::RemoveListener => provider.remove_listener(event, listener),
            Removal::Off => provider.off(event, listener),
            Removal::RemoveEventListener => provider.remove_event_listener(event, listener),
        }
    }
}

type CancelFn = Box<dyn FnOnce() + Send>;

/// Cancellation handle for an event subscription.
///
/// `cancel` runs the removal at most once; later calls do nothing. Clones
/// share that state. Dropping the handle leaves the subscription in place.
#[derive(Clone)]
pub struct Subscription {
    cancel: Arc<Mutex<Option<CancelFn>>>,
}

impl Subscription {
    /// A handle whose cancellation does nothing.
    pub fn noop() -> Self {
        Self { cancel: Arc::new(Mutex::new(None)) }
    }

    /// A handle running `cancel` on the first call to [`Subscription::cancel`].
    pub fn new(cancel: impl FnOnce() + Send + 'static) -> Self {
        Self { cancel: Arc::new(Mutex::new(Some(Box::new(cancel)))) }
    }

    /// Merge several handles into one that cancels all of them.
    pub fn all(subscriptions: impl IntoIterator<Item = Subscription>) -> Self {
        let subscriptions: Vec<_> = subscriptions.into_iter().collect();
        Self::new(move || {
            for subscription in &subscriptions {
                subscription.cancel();
            }
        })
    }

    /// Stop delivery to the subscribed listener.
    pub fn cancel(&self) {
        let cancel = self.cancel.lock().unwrap_or_else(PoisonError::into_inner).take();
        if let Some(cancel) = cancel {
            cancel();
        }
    }

    /// Whether `cancel` still has something to do.
    pub fn is_active(&self) -> bool {
        self.cancel.lock().unwrap_or_else(PoisonError::into_inner).is_some()
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription").field("active", &self.is_active()).finish()
    }
}

/// Subscribe `listener` to `event` on whatever shape the provider supports.
///
/// Never fails: a missing provider, an unsupported shape or a failing
/// registration is logged and yields a no-op handle.
///
/// Cancelling stops delivery to `listener` first, then attempts removal
/// once. A provider without a removal method, or whose removal fails, keeps
/// a silent listener registered.
pub fn subscribe(
    provider: Option<Arc<dyn WalletProvider>>,
    event: &str,
    listener: Listener,
) -> Subscription {
    let Some(provider) = provider else {
        warn!(event = %event, "No provider available for event subscription");
        return Subscription::noop();
    };

    let api = EventApi::probe(provider.event_methods());
    if api == EventApi::Unsupported {
        warn!(event = %event, "Provider exposes no event registration method");
        return Subscription::noop();
    }

    let open = Arc::new(AtomicBool::new(true));
    let gated = {
        let open = open.clone();
        Listener::new(move |payload| {
            if open.load(Ordering::SeqCst) {
                listener.call(payload);
            }
        })
    };

    if let Err(e) = api.register(provider.as_ref(), event, gated.clone()) {
        error!(event = %event, error = %e, "Error subscribing to event");
        return Subscription::noop();
    }
    debug!(event = %event, api = ?api, listener = ?gated.id(), "Subscribed to provider event");

    let event = event.to_string();
    let removal = api.removal();
    Subscription::new(move || {
        open.store(false, Ordering::SeqCst);
        match removal.map(|r| r.remove(provider.as_ref(), &event, &gated)) {
            Some(Ok(())) => debug!(event = %event, ?removal, "Unsubscribed from provider event"),
            Some(Err(e)) => warn!(event = %event, error = %e, "Error unsubscribing from event"),
            None => debug!(event = %event, "Provider has no removal method; listener silenced"),
        }
    })
}
