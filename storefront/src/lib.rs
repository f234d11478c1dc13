//! # Storefront
//!
//! Client-side state machines for a storefront backed by a remote REST API.
//!
//! - [`catalog`]: the product list
//! - [`cart`]: the cart lines, their mutations and the order placement flow
//! - [`Storefront`]: one [`Store`](storefront_runtime::Store) per collaborator,
//!   the single source of truth every view reads from
//!
//! Nothing is applied optimistically. Every mutation waits for the server,
//! and every failure leaves the previous state in place and records one
//! [`Notification`](notification::Notification).
//!
//! ## Example
//!
//! ```ignore
//! let storefront = Storefront::new(environment);
//! storefront.load_and_wait(Duration::from_secs(10)).await?;
//!
//! let total = storefront.cart().state(CartState::total).await;
//! ```

pub mod app;
pub mod cart;
pub mod catalog;
pub mod environment;
pub mod notification;
pub mod session;

pub use app::{CartStore, CatalogStore, Storefront};
pub use cart::{CartAction, CartReducer, CartState, CheckoutState};
pub use catalog::{CatalogAction, CatalogReducer, CatalogState};
pub use environment::{ParseStockPolicyError, StockPolicy, StorefrontEnvironment};
pub use notification::{Level, MAX_NOTIFICATIONS, Notification, NotificationId, Notifications};
pub use session::{Phase, Session};
