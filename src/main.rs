//! Edu Wallet Connect
//!
//! Connects to the wallet behind a JSON-RPC node and follows account changes
//! until interrupted.

use std::sync::Arc;

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use edu_wallet_connect::{Config, InjectedProviders, RpcWalletProvider, WalletConnector};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load configuration
    let config = Config::from_env()?;

    // Initialize logging
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    tracing::info!("Starting Edu Wallet Connect");

    let provider = RpcWalletProvider::new(&config.rpc_url)?;
    let watcher = provider.spawn_watcher(config.poll_interval);

    let injected = Arc::new(InjectedProviders::new());
    injected.inject_ethereum(Arc::new(provider));

    let connector = WalletConnector::new(injected);
    if let Ok(Some(account)) = connector.current_account().await {
        tracing::info!(account = %account.short(), "Wallet already authorized");
    }

    let subscription = connector
        .connect_with(
            |account| tracing::info!(account = %account, "Active account"),
            |err| tracing::warn!(kind = ?err.kind(), "{err}"),
        )
        .await;

    if subscription.is_active() {
        tokio::signal::ctrl_c().await?;
        tracing::info!("Shutting down");
    }

    subscription.cancel();
    watcher.abort();

    Ok(())
}
