//! Provider discovery.
//!
//! Browsers expose wallets through a handful of well-known injection points.
//! Those points are modelled by [`InjectedProviders`], which callers fill in
//! and pass around explicitly. Lookups always read the current slots, so a
//! wallet injected after startup is still found.

use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use tracing::{debug, trace};

use crate::ethereum::WalletProvider;

/// Source of a wallet provider.
pub trait ProviderLocator: Send + Sync {
    /// Return the best available provider, if any.
    fn locate(&self) -> Option<Arc<dyn WalletProvider>>;
}

/// A fixed provider always locates itself.
impl ProviderLocator for Arc<dyn WalletProvider> {
    fn locate(&self) -> Option<Arc<dyn WalletProvider>> {
        Some(self.clone())
    }
}

/// Legacy `web3` injection wrapping a provider one level deep.
#[derive(Clone, Default)]
pub struct LegacyWeb3 {
    pub current_provider: Option<Arc<dyn WalletProvider>>,
}

impl LegacyWeb3 {
    pub fn new(current_provider: Arc<dyn WalletProvider>) -> Self {
        Self { current_provider: Some(current_provider) }
    }
}

#[derive(Default)]
struct Slots {
    ethereum: Option<Arc<dyn WalletProvider>>,
    web3: Option<LegacyWeb3>,
    providers: Vec<Arc<dyn WalletProvider>>,
}

/// The injection points a wallet extension may populate.
#[derive(Default)]
pub struct InjectedProviders {
    slots: RwLock<Slots>,
}

impl InjectedProviders {
    /// Empty injection points.
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> RwLockReadGuard<'_, Slots> {
        self.slots.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Slots> {
        self.slots.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Set the primary single-provider slot (`window.ethereum`).
    pub fn inject_ethereum(&self, provider: Arc<dyn WalletProvider>) {
        self.write().ethereum = Some(provider);
    }

    /// Set the legacy wrapper slot (`window.web3`).
    pub fn inject_web3(&self, web3: LegacyWeb3) {
        self.write().web3 = Some(web3);
    }

    /// Replace the multi-provider list.
    pub fn inject_providers(&self, providers: Vec<Arc<dyn WalletProvider>>) {
        self.write().providers = providers;
    }

    /// Empty every slot.
    pub fn clear(&self) {
        *self.write() = Slots::default();
    }
}

impl ProviderLocator for InjectedProviders {
    fn locate(&self) -> Option<Arc<dyn WalletProvider>> {
        let slots = self.read();

        if let Some(provider) = &slots.ethereum {
            trace!("Using injected ethereum provider");
            return Some(provider.clone());
        }

        if let Some(provider) = slots.web3.as_ref().and_then(|w| w.current_provider.as_ref()) {
            debug!("Using legacy web3 current provider");
            return Some(provider.clone());
        }

        if let Some(provider) = slots.providers.iter().find(|p| p.is_metamask()) {
            debug!(count = slots.providers.len(), "Using MetaMask from provider list");
            return Some(provider.clone());
        }

        let first = slots.providers.first().cloned();
        if first.is_some() {
            debug!(count = slots.providers.len(), "Using first entry of provider list");
        }
        first
    }
}

impl std::fmt::Debug for InjectedProviders {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let slots = self.read();
        f.debug_struct("InjectedProviders")
            .field("ethereum", &slots.ethereum.is_some())
            .field("web3", &slots.web3.is_some())
            .field("providers", &slots.providers.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ProviderError;
    use crate::types::RequestArguments;
    use async_trait::async_trait;
    use serde_json::{json, Value};

    struct Named {
        name: &'static str,
        metamask: bool,
    }

    #[async_trait]
    impl WalletProvider for Named {
        async fn request(&self, _args: RequestArguments) -> Result<Value, ProviderError> {
            Ok(json!(self.name))
        }

        fn is_metamask(&self) -> bool {
            self.metamask
        }
    }

    fn named(name: &'static str, metamask: bool) -> Arc<dyn WalletProvider> {
        Arc::new(Named { name, metamask })
    }

    fn same(a: &Arc<dyn WalletProvider>, b: &Arc<dyn WalletProvider>) -> bool {
        Arc::ptr_eq(a, b)
    }

    #[test]
    fn test_empty_locates_nothing() {
        assert!(InjectedProviders::new().locate().is_none());
    }

    #[test]
    fn test_ethereum_wins_over_everything() {
        let injected = InjectedProviders::new();
        let primary = named("primary", false);
        injected.inject_providers(vec![named("listed", true)]);
        injected.inject_web3(LegacyWeb3::new(named("legacy", false)));
        injected.inject_ethereum(primary.clone());

        assert!(same(&injected.locate().unwrap(), &primary));
    }

    #[test]
    fn test_web3_unwrapped_before_list() {
        let injected = InjectedProviders::new();
        let legacy = named("legacy", false);
        injected.inject_providers(vec![named("listed", true)]);
        injected.inject_web3(LegacyWeb3::new(legacy.clone()));

        assert!(same(&injected.locate().unwrap(), &legacy));
    }

    #[test]
    fn test_empty_web3_wrapper_is_skipped() {
        let injected = InjectedProviders::new();
        let listed = named("listed", false);
        injected.inject_web3(LegacyWeb3::default());
        injected.inject_providers(vec![listed.clone()]);

        assert!(same(&injected.locate().unwrap(), &listed));
    }

    #[test]
    fn test_late_injection_and_clear() {
        let injected = InjectedProviders::new();
        assert!(injected.locate().is_none());

        injected.inject_ethereum(named("late", false));
        assert!(injected.locate().is_some());

        injected.clear();
        assert!(injected.locate().is_none());
    }

    #[test]
    fn test_fixed_provider_locator() {
        let provider = named("fixed", false);
        assert!(same(&provider.locate().unwrap(), &provider));
    }

    #[test]
    fn test_debug_reports_slots() {
        let injected = InjectedProviders::new();
        injected.inject_providers(vec![named("a", false), named("b", false)]);
        let debug_str = format!("{:?}", injected);
        assert!(debug_str.contains("providers: 2"));
        assert!(debug_str.contains("ethereum: false"));
    }
}
