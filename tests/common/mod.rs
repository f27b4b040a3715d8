//! Common utilities for integration tests.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use edu_wallet_connect::{
    AccountAddress, ConnectError, ConnectionObserver, EventMethods, Listener, ProviderError,
    RequestArguments, WalletProvider,
};
use serde_json::Value;

/// How the fake answers `request`.
#[derive(Clone)]
pub enum Response {
    Resolve(Value),
    Reject(ProviderError),
    /// Never settles, like a wallet prompt nobody answers.
    Pending,
}

/// A provider exposing a chosen set of event methods.
pub struct FakeProvider {
    methods: EventMethods,
    metamask: bool,
    fail_registration: bool,
    fail_removal: bool,
    response: Mutex<Response>,
    listeners: Mutex<HashMap<String, Vec<Listener>>>,
    requests: Mutex<Vec<RequestArguments>>,
    removals: Mutex<HashMap<&'static str, usize>>,
    registrations: AtomicUsize,
}

impl FakeProvider {
    pub fn new(methods: EventMethods) -> Self {
        Self {
            methods,
            metamask: false,
            fail_registration: false,
            fail_removal: false,
            response: Mutex::new(Response::Resolve(Value::Array(Vec::new()))),
            listeners: Mutex::new(HashMap::new()),
            requests: Mutex::new(Vec::new()),
            removals: Mutex::new(HashMap::new()),
            registrations: AtomicUsize::new(0),
        }
    }

    pub fn metamask(mut self) -> Self {
        self.metamask = true;
        self
    }

    pub fn failing_registration(mut self) -> Self {
        self.fail_registration = true;
        self
    }

    /// Removal methods are counted but fail and keep the listener.
    pub fn failing_removal(mut self) -> Self {
        self.fail_removal = true;
        self
    }

    pub fn respond(self, response: Response) -> Self {
        *self.response.lock().unwrap() = response;
        self
    }

    pub fn set_response(&self, response: Response) {
        *self.response.lock().unwrap() = response;
    }

    /// Deliver an event to the listeners registered for it.
    pub fn emit(&self, event: &str, payload: Value) -> usize {
        let snapshot = self.listeners.lock().unwrap().get(event).cloned().unwrap_or_default();
        for listener in &snapshot {
            listener.call(&payload);
        }
        snapshot.len()
    }

    pub fn listener_count(&self, event: &str) -> usize {
        self.listeners.lock().unwrap().get(event).map_or(0, Vec::len)
    }

    pub fn removal_calls(&self, method: &str) -> usize {
        self.removals.lock().unwrap().get(method).copied().unwrap_or(0)
    }

    pub fn total_removal_calls(&self) -> usize {
        self.removals.lock().unwrap().values().sum()
    }

    pub fn registrations(&self) -> usize {
        self.registrations.load(Ordering::SeqCst)
    }

    pub fn requested_methods(&self) -> Vec<String> {
        self.requests.lock().unwrap().iter().map(|r| r.method.clone()).collect()
    }

    pub fn requests(&self) -> Vec<RequestArguments> {
        self.requests.lock().unwrap().clone()
    }

    fn register(&self, method: &str, event: &str, listener: Listener) -> Result<(), ProviderError> {
        if self.fail_registration {
            return Err(ProviderError::other(format!("{method} exploded")));
        }
        self.registrations.fetch_add(1, Ordering::SeqCst);
        self.listeners.lock().unwrap().entry(event.to_string()).or_default().push(listener);
        Ok(())
    }

    fn unregister(
        &self,
        method: &'static str,
        event: &str,
        listener: &Listener,
    ) -> Result<(), ProviderError> {
        *self.removals.lock().unwrap().entry(method).or_default() += 1;
        if self.fail_removal {
            return Err(ProviderError::other(format!("{method} exploded")));
        }
        if let Some(registered) = self.listeners.lock().unwrap().get_mut(event) {
            registered.retain(|l| l.id() != listener.id());
        }
        Ok(())
    }
}

#[async_trait]
impl WalletProvider for FakeProvider {
    async fn request(&self, args: RequestArguments) -> Result<Value, ProviderError> {
        self.requests.lock().unwrap().push(args);
        let response = self.response.lock().unwrap().clone();
        match response {
            Response::Resolve(value) => Ok(value),
            Response::Reject(err) => Err(err),
            Response::Pending => std::future::pending().await,
        }
    }

    fn is_metamask(&self) -> bool {
        self.metamask
    }

    fn event_methods(&self) -> EventMethods {
        self.methods
    }

    fn on(&self, event: &str, listener: Listener) -> Result<(), ProviderError> {
        self.register("on", event, listener)
    }

    fn off(&self, event: &str, listener: &Listener) -> Result<(), ProviderError> {
        self.unregister("off", event, listener)
    }

    fn remove_listener(&self, event: &str, listener: &Listener) -> Result<(), ProviderError> {
        self.unregister("removeListener", event, listener)
    }

    fn add_event_listener(&self, event: &str, listener: Listener) -> Result<(), ProviderError> {
        self.register("addEventListener", event, listener)
    }

    fn remove_event_listener(&self, event: &str, listener: &Listener) -> Result<(), ProviderError> {
        self.unregister("removeEventListener", event, listener)
    }

    fn add_listener(&self, event: &str, listener: Listener) -> Result<(), ProviderError> {
        self.register("addListener", event, listener)
    }
}

/// Observer recording every callback.
#[derive(Default)]
pub struct RecordingObserver {
    pub accounts: Mutex<Vec<AccountAddress>>,
    pub errors: Mutex<Vec<ConnectError>>,
    pub chains: Mutex<Vec<String>>,
}

impl RecordingObserver {
    pub fn accounts(&self) -> Vec<String> {
        self.accounts.lock().unwrap().iter().map(|a| a.to_string()).collect()
    }

    pub fn errors(&self) -> Vec<ConnectError> {
        self.errors.lock().unwrap().clone()
    }

    pub fn chains(&self) -> Vec<String> {
        self.chains.lock().unwrap().clone()
    }
}

impl ConnectionObserver for RecordingObserver {
    fn on_account(&self, account: AccountAddress) {
        self.accounts.lock().unwrap().push(account);
    }

    fn on_error(&self, error: ConnectError) {
        self.errors.lock().unwrap().push(error);
    }

    fn on_chain_changed(&self, chain_id: &str) {
        self.chains.lock().unwrap().push(chain_id.to_string());
    }
}

/// A listener counting its invocations.
pub fn counting_listener() -> (Listener, Arc<AtomicUsize>) {
    let hits = Arc::new(AtomicUsize::new(0));
    let counter = hits.clone();
    let listener = Listener::new(move |_| {
        counter.fetch_add(1, Ordering::SeqCst);
    });
    (listener, hits)
}

/// Helper to create an RPC-backed provider from environment variables.
pub fn rpc_url_from_env() -> Option<String> {
    // Load .env file if present
    let _ = dotenvy::dotenv();

    std::env::var("WALLET_RPC_URL").ok().filter(|url| !url.is_empty())
}

/// Skip test if no RPC node is configured.
#[macro_export]
macro_rules! skip_if_no_node {
    () => {
        match common::rpc_url_from_env() {
            Some(url) => url,
            None => {
                eprintln!("Skipping test: WALLET_RPC_URL not set");
                return;
            }
        }
    };
}
