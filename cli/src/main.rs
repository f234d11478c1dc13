//! `storefront`: browse the catalog, manage the cart and place orders
//!
//! # Usage
//!
//! ```bash
//! STOREFRONT_API_URL=http://localhost:5132/api storefront products
//! storefront add 3 -q 2
//! storefront inc 12
//! storefront checkout
//! ```
//!
//! Every command loads the catalog and the cart first, then sends one
//! action to the cart store and waits for the server's answer. Notifications
//! raised along the way are printed after the command output.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use config::StorefrontConfig;
use std::sync::Arc;
use storefront::{Storefront, StorefrontEnvironment};
use storefront_api::{ApiConfig, StorefrontClient};
use storefront_core::environment::SystemClock;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

mod commands;
mod config;
mod render;

#[derive(Debug, Parser)]
#[command(name = "storefront", version, about = "Browse products, manage the cart and place orders")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

/// Commands, one per view interaction
#[derive(Debug, Subcommand)]
pub enum Command {
    /// List the product catalog
    Products,
    /// Show the cart and its total
    Cart,
    /// Add a product to the cart
    Add {
        /// Product id from `products`
        product_id: i64,
        /// Units to add
        #[arg(short, long, default_value_t = 1)]
        quantity: u32,
    },
    /// Increase a cart line's quantity by one
    Inc {
        /// Line id from `cart`
        line_id: i64,
    },
    /// Decrease a cart line's quantity by one
    Dec {
        /// Line id from `cart`
        line_id: i64,
    },
    /// Change a cart line's quantity by a signed amount
    Change {
        /// Line id from `cart`
        line_id: i64,
        /// Amount to add, negative to remove units
        #[arg(allow_hyphen_values = true)]
        delta: i64,
    },
    /// Set a cart line's quantity
    Set {
        /// Line id from `cart`
        line_id: i64,
        /// New quantity, at least 1
        #[arg(allow_hyphen_values = true)]
        quantity: i64,
    },
    /// Remove a line from the cart
    Remove {
        /// Line id from `cart`
        line_id: i64,
    },
    /// Review the cart and place the order
    Checkout {
        /// Place the order without asking for confirmation
        #[arg(long)]
        yes: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Missing .env is fine
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();
    let config = StorefrontConfig::from_env()?;
    init_tracing(&config.log_level);

    let api_config = ApiConfig::new(&config.api_url)
        .context("STOREFRONT_API_URL is not a usable base URL")?
        .with_timeout(config.api_timeout);
    let client = StorefrontClient::new(api_config).context("Failed to build the HTTP client")?;

    let env = StorefrontEnvironment::new(Arc::new(client), Arc::new(SystemClock))
        .with_user_id(config.user_id)
        .with_stock_policy(config.stock_policy);
    let storefront = Storefront::new(env);

    tracing::debug!(api_url = %config.api_url, command = ?cli.command, "Starting");
    storefront
        .load_and_wait(config.wait_timeout)
        .await
        .with_context(|| format!("Storefront at {} did not answer", config.api_url))?;

    let result = commands::execute(cli.command, &storefront, &config).await;

    if let Err(error) = storefront.shutdown(config.wait_timeout).await {
        tracing::warn!(%error, "Shutdown did not complete");
    }
    result
}

fn init_tracing(default_filter: &str) {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}
