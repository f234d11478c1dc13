//! # Storefront API Client
//!
//! Typed client for the storefront REST API: products, the server-side cart
//! and orders.
//!
//! The [`StorefrontApi`] trait is the seam the state machines depend on.
//! [`StorefrontClient`] implements it over HTTP with `reqwest`; tests swap in
//! an in-memory double.
//!
//! ## Example
//!
//! ```no_run
//! use storefront_api::{ApiConfig, StorefrontApi, StorefrontClient};
//!
//! # async fn run() -> Result<(), storefront_api::ApiError> {
//! let client = StorefrontClient::new(ApiConfig::new("http://localhost:5132/api")?)?;
//!
//! for product in client.list_products().await? {
//!     println!("{} costs {}", product.name, product.price);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! Every operation is a single attempt. Nothing is retried.

pub mod client;
pub mod config;
pub mod error;
pub mod service;
pub mod types;

// Re-export main types for convenience
pub use client::StorefrontClient;
pub use config::ApiConfig;
pub use error::{ApiError, FailureCategory};
pub use rust_decimal::Decimal;
pub use service::{ApiFuture, StorefrontApi};
pub use types::{
    CartLine, CartLineId, NewCartLine, OrderId, OrderItem, OrderReceipt, OrderRequest, Product,
    ProductId, StockUpdate, UserId,
};
