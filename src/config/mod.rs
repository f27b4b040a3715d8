//! Configuration management module.
//!
//! Handles loading configuration from environment variables.

use std::env;
use std::time::Duration;

use crate::error::AppError;
use crate::ethereum::constants::DEFAULT_POLL_INTERVAL_MS;

/// Application configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// JSON-RPC endpoint backing the wallet provider.
    pub rpc_url: String,
    /// Interval between account/chain polls.
    pub poll_interval: Duration,
    /// Logging level (default: info).
    pub log_level: String,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Required environment variables:
    /// - `WALLET_RPC_URL`: JSON-RPC endpoint with unlocked accounts (e.g. a local dev node)
    ///
    /// Optional environment variables:
    /// - `WALLET_POLL_INTERVAL_MS`: Poll interval in milliseconds (default: 2000)
    /// - `LOG_LEVEL`: Logging level (default: info)
    pub fn from_env() -> Result<Self, AppError> {
        // Load .env file if present
        let _ = dotenvy::dotenv();

        let rpc_url = env::var("WALLET_RPC_URL")
            .map_err(|_| AppError::Config("WALLET_RPC_URL environment variable not set".into()))?;

        let poll_interval = match env::var("WALLET_POLL_INTERVAL_MS") {
            Ok(raw) => parse_poll_interval(&raw)?,
            Err(_) => Duration::from_millis(DEFAULT_POLL_INTERVAL_MS),
        };

        let log_level = env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        Ok(Self { rpc_url, poll_interval, log_level })
    }
}

/// Parse a poll interval in milliseconds; zero is rejected.
fn parse_poll_interval(raw: &str) -> Result<Duration, AppError> {
    let millis: u64 = raw.trim().parse()?;
    if millis == 0 {
        return Err(AppError::Config("WALLET_POLL_INTERVAL_MS must be greater than zero".into()));
    }
    Ok(Duration::from_millis(millis))
}
