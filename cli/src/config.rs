//! Configuration for the storefront CLI.
//!
//! Loads configuration from environment variables with sensible defaults.
//! `main` loads a `.env` file first, so either source works.

use anyhow::{Context, Result};
use std::env;
use std::time::Duration;
use storefront::StockPolicy;
use storefront_api::UserId;

/// CLI configuration loaded from environment variables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorefrontConfig {
    /// Root of the REST API (`STOREFRONT_API_URL`)
    pub api_url: String,
    /// Per-request timeout (`STOREFRONT_API_TIMEOUT_SECS`)
    pub api_timeout: Duration,
    /// User orders are placed for (`STOREFRONT_USER_ID`)
    pub user_id: UserId,
    /// Who adjusts stock after an order (`STOREFRONT_STOCK_POLICY`: `server` or `client`)
    pub stock_policy: StockPolicy,
    /// How long a command waits for the server's answer (`STOREFRONT_WAIT_TIMEOUT_SECS`)
    pub wait_timeout: Duration,
    /// Default log filter when `RUST_LOG` is unset or invalid
    pub log_level: String,
}

impl StorefrontConfig {
    /// Load configuration from the process environment.
    ///
    /// # Errors
    ///
    /// Returns an error if `STOREFRONT_STOCK_POLICY` is set to an unknown value.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration through `lookup`.
    ///
    /// Unparseable numbers fall back to their defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if `STOREFRONT_STOCK_POLICY` is set to an unknown value.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let number = |key: &str, default: u64| {
            lookup(key)
                .and_then(|s| s.trim().parse().ok())
                .unwrap_or(default)
        };

        let stock_policy = match lookup("STOREFRONT_STOCK_POLICY") {
            Some(raw) => raw
                .parse::<StockPolicy>()
                .context("STOREFRONT_STOCK_POLICY must be `server` or `client`")?,
            None => StockPolicy::default(),
        };

        Ok(Self {
            api_url: lookup("STOREFRONT_API_URL")
                .unwrap_or_else(|| "http://localhost:5132/api".to_string()),
            api_timeout: Duration::from_secs(number("STOREFRONT_API_TIMEOUT_SECS", 10)),
            user_id: lookup("STOREFRONT_USER_ID")
                .and_then(|s| s.trim().parse().ok())
                .map_or(UserId(1), UserId),
            stock_policy,
            wait_timeout: Duration::from_secs(number("STOREFRONT_WAIT_TIMEOUT_SECS", 15)),
            log_level: lookup("RUST_LOG").unwrap_or_else(|| "info".to_string()),
        })
    }
}
