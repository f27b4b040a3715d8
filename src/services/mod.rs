//! Wallet connection services module.

pub mod connector;
pub mod locator;
pub mod subscription;

pub use connector::{CallbackObserver, ConnectionObserver, WalletConnector};
pub use locator::{InjectedProviders, LegacyWeb3, ProviderLocator};
pub use subscription::{subscribe, EventApi, Removal, Subscription};
