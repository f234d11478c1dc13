//! The remote storefront service as seen by the state machines

use crate::error::ApiError;
use crate::types::{CartLine, CartLineId, NewCartLine, OrderReceipt, OrderRequest, Product, ProductId};
use std::future::Future;
use std::pin::Pin;

/// Boxed future returned by [`StorefrontApi`] operations
pub type ApiFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, ApiError>> + Send + 'a>>;

/// Operations offered by the storefront backend
///
/// Each call is a single request: no retries, no caching. Implementations
/// validate their input locally where noted and fail with
/// [`ApiError::Validation`] before touching the network.
///
/// # Dyn Compatibility
///
/// This trait uses explicit `Pin<Box<dyn Future>>` returns instead of `async fn`
/// so it can be held as `Arc<dyn StorefrontApi>` inside an environment.
pub trait StorefrontApi: Send + Sync {
    /// All products, in server order
    ///
    /// # Errors
    ///
    /// Network, status or decode failures.
    fn list_products(&self) -> ApiFuture<'_, Vec<Product>>;

    /// The current contents of the cart
    ///
    /// # Errors
    ///
    /// Network, status or decode failures.
    fn read_cart(&self) -> ApiFuture<'_, Vec<CartLine>>;

    /// Add a product to the cart and return the created line
    ///
    /// # Errors
    ///
    /// [`ApiError::Validation`] for quantity 0. The server rejects unknown
    /// products or quantities above stock.
    fn add_cart_line(&self, line: NewCartLine) -> ApiFuture<'_, CartLine>;

    /// Set the quantity of a cart line
    ///
    /// # Errors
    ///
    /// [`ApiError::Validation`] for quantity 0 (use
    /// [`StorefrontApi::delete_cart_line`] instead). [`ApiError::NotFound`]
    /// for an unknown line.
    fn update_cart_line_quantity(&self, id: CartLineId, quantity: u32) -> ApiFuture<'_, ()>;

    /// Delete a cart line
    ///
    /// A line that is already gone counts as deleted.
    ///
    /// # Errors
    ///
    /// Network or non-404 status failures.
    fn delete_cart_line(&self, id: CartLineId) -> ApiFuture<'_, ()>;

    /// Place an order for the given snapshot
    ///
    /// # Errors
    ///
    /// [`ApiError::Validation`] if the order is empty or its totals do not
    /// add up. The server rejects orders exceeding live stock.
    fn place_order(&self, order: OrderRequest) -> ApiFuture<'_, OrderReceipt>;

    /// Overwrite the stock level of a product
    ///
    /// Only used when the client is responsible for stock bookkeeping.
    ///
    /// # Errors
    ///
    /// Network, status or not-found failures.
    fn update_product_stock(&self, id: ProductId, quantity: u32) -> ApiFuture<'_, ()>;
}
