//! Listener registry for providers that emit events themselves.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use serde_json::Value;

use super::provider::{Listener, ListenerId};

/// A node-style event emitter keyed by event name.
#[derive(Clone, Default)]
pub struct EventEmitter {
    listeners: Arc<Mutex<HashMap<String, Vec<Listener>>>>,
}

impl EventEmitter {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, Vec<Listener>>> {
        self.listeners.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Register a listener for an event.
    pub fn add(&self, event: &str, listener: Listener) {
        self.lock().entry(event.to_string()).or_default().push(listener);
    }

    /// Remove one registration of the listener with `id`.
    ///
    /// Returns `false` if no such registration existed.
    pub fn remove(&self, event: &str, id: ListenerId) -> bool {
        let mut listeners = self.lock();
        let Some(registered) = listeners.get_mut(event) else {
            return false;
        };
        let Some(index) = registered.iter().position(|l| l.id() == id) else {
            return false;
        };
        registered.remove(index);
        if registered.is_empty() {
            listeners.remove(event);
        }
        true
    }

    /// Deliver a payload to every listener of an event.
    ///
    /// Listeners run outside the lock, so they may add or remove listeners.
    /// Returns the number of listeners called.
    pub fn emit(&self, event: &str, payload: &Value) -> usize {
        let snapshot = self.lock().get(event).cloned().unwrap_or_default();
        for listener in &snapshot {
            listener.call(payload);
        }
        tracing::trace!(event = %event, listeners = snapshot.len(), "Event emitted");
        snapshot.len()
    }

    pub fn listener_count(&self, event: &str) -> usize {
        self.lock().get(event).map_or(0, Vec::len)
    }
}

impl std::fmt::Debug for EventEmitter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let events: Vec<String> = self.lock().keys().cloned().collect();
        f.debug_struct("EventEmitter").field("events", &events).finish()
    }
}
