//! In-memory storefront service for testing
//!
//! [`InMemoryStorefront`] implements [`StorefrontApi`] against a
//! `Vec`-backed catalog, cart and order book. It behaves like the real
//! backend on the paths the client exercises (stock checks, unknown ids,
//! clearing the cart when an order is recorded) and adds failure injection,
//! latency and call counters for assertions.

#![allow(clippy::unwrap_used)] // Test infrastructure uses unwrap for simplicity
#![allow(clippy::missing_panics_doc)] // Panics only on a poisoned lock

use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use std::time::Duration;
use storefront_api::{
    ApiError, ApiFuture, CartLine, CartLineId, NewCartLine, OrderId, OrderReceipt, OrderRequest,
    Product, ProductId, StorefrontApi,
};

/// Operations of [`StorefrontApi`], used to inject failures and count calls
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Operation {
    /// `list_products`
    ListProducts,
    /// `read_cart`
    ReadCart,
    /// `add_cart_line`
    AddCartLine,
    /// `update_cart_line_quantity`
    UpdateCartLineQuantity,
    /// `delete_cart_line`
    DeleteCartLine,
    /// `place_order`
    PlaceOrder,
    /// `update_product_stock`
    UpdateProductStock,
}

#[derive(Debug)]
struct Backend {
    products: Vec<Product>,
    cart: Vec<CartLine>,
    orders: Vec<OrderRequest>,
    stock_updates: Vec<(ProductId, u32)>,
    next_line_id: i64,
    next_order_id: i64,
    failures: HashMap<Operation, ApiError>,
    calls: HashMap<Operation, usize>,
    adjusts_stock: bool,
}

impl Default for Backend {
    fn default() -> Self {
        Self {
            products: Vec::new(),
            cart: Vec::new(),
            orders: Vec::new(),
            stock_updates: Vec::new(),
            next_line_id: 1,
            next_order_id: 1,
            failures: HashMap::new(),
            calls: HashMap::new(),
            adjusts_stock: true,
        }
    }
}

impl Backend {
    /// Count the call and take any injected failure
    fn begin(&mut self, operation: Operation) -> Result<(), ApiError> {
        *self.calls.entry(operation).or_default() += 1;
        self.failures.remove(&operation).map_or(Ok(()), Err)
    }

    fn product(&self, id: ProductId) -> Result<&Product, ApiError> {
        self.products
            .iter()
            .find(|p| p.id == id)
            .ok_or_else(|| ApiError::NotFound {
                message: format!("Product {id} not found"),
            })
    }

    fn add_cart_line(&mut self, request: &NewCartLine) -> Result<CartLine, ApiError> {
        request.validate()?;
        let product = self.product(request.product_id)?.clone();

        let existing = self.cart.iter().position(|l| l.product_id == product.id);
        let already = existing.map_or(0, |i| self.cart[i].quantity);
        let wanted = already + request.quantity;

        if wanted > product.quantity_in_stock {
            return Err(ApiError::Rejected {
                status: 400,
                message: "Not enough stock".to_string(),
            });
        }

        if let Some(i) = existing {
            self.cart[i].quantity = wanted;
            return Ok(self.cart[i].clone());
        }

        let line = CartLine {
            id: CartLineId(self.next_line_id),
            product_id: product.id,
            product_name: request.product_name.clone(),
            price: product.price,
            quantity: request.quantity,
        };
        self.next_line_id += 1;
        self.cart.push(line.clone());
        Ok(line)
    }

    fn update_quantity(&mut self, id: CartLineId, quantity: u32) -> Result<(), ApiError> {
        if quantity == 0 {
            return Err(ApiError::Validation("quantity must be at least 1".to_string()));
        }

        let index = self
            .cart
            .iter()
            .position(|l| l.id == id)
            .ok_or_else(|| ApiError::NotFound {
                message: "Cart item not found".to_string(),
            })?;

        let stock = self.product(self.cart[index].product_id).map_or(u32::MAX, |p| p.quantity_in_stock);
        if quantity > stock {
            return Err(ApiError::Rejected {
                status: 400,
                message: "Not enough stock".to_string(),
            });
        }

        self.cart[index].quantity = quantity;
        Ok(())
    }

    fn place_order(&mut self, order: OrderRequest) -> Result<OrderReceipt, ApiError> {
        order.validate()?;

        for (product_id, quantity) in order.quantities() {
            if quantity > self.product(product_id)?.quantity_in_stock {
                return Err(ApiError::Rejected {
                    status: 400,
                    message: format!("Not enough stock for product {product_id}"),
                });
            }
        }

        if self.adjusts_stock {
            for (product_id, quantity) in order.quantities() {
                if let Some(product) = self.products.iter_mut().find(|p| p.id == product_id) {
                    product.quantity_in_stock = product.quantity_in_stock.saturating_sub(quantity);
                }
            }
        }

        let order_id = OrderId(self.next_order_id);
        self.next_order_id += 1;
        self.orders.push(order);
        self.cart.clear();

        Ok(OrderReceipt {
            order_id: Some(order_id),
        })
    }

    fn update_product_stock(&mut self, id: ProductId, quantity: u32) -> Result<(), ApiError> {
        let product = self
            .products
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or_else(|| ApiError::NotFound {
                message: format!("Product {id} not found"),
            })?;
        product.quantity_in_stock = quantity;
        self.stock_updates.push((id, quantity));
        Ok(())
    }
}

/// In-memory storefront backend for fast, deterministic tests
///
/// Clones share the same backend, so a test can keep one handle for
/// assertions while the environment owns another.
///
/// # Example
///
/// ```
/// use storefront_testing::{InMemoryStorefront, Operation};
/// use storefront_api::{ApiError, StorefrontApi};
///
/// # async fn example() {
/// let api = InMemoryStorefront::new();
/// api.fail_next(Operation::ReadCart, ApiError::Network("offline".into()));
///
/// assert!(api.read_cart().await.is_err());
/// assert!(api.read_cart().await.is_ok());
/// assert_eq!(api.calls(Operation::ReadCart), 2);
/// # }
/// ```
#[derive(Clone, Debug, Default)]
pub struct InMemoryStorefront {
    backend: Arc<RwLock<Backend>>,
    latency: Option<Duration>,
}

impl InMemoryStorefront {
    /// Create an empty backend
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the catalog
    #[must_use]
    pub fn with_products(self, products: Vec<Product>) -> Self {
        self.backend.write().unwrap().products = products;
        self
    }

    /// Seed the cart; new lines get ids above the highest seeded one
    #[must_use]
    pub fn with_cart(self, lines: Vec<CartLine>) -> Self {
        {
            let mut backend = self.backend.write().unwrap();
            backend.next_line_id = lines.iter().map(|l| l.id.0).max().unwrap_or(0) + 1;
            backend.cart = lines;
        }
        self
    }

    /// Delay every response by `latency`
    #[must_use]
    pub const fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    /// Whether recording an order decrements product stock (default `true`)
    #[must_use]
    pub fn with_server_stock_adjustment(self, adjusts: bool) -> Self {
        self.backend.write().unwrap().adjusts_stock = adjusts;
        self
    }

    /// Make the next call of `operation` fail with `error`
    pub fn fail_next(&self, operation: Operation, error: ApiError) {
        self.backend.write().unwrap().failures.insert(operation, error);
    }

    /// Number of calls made to `operation`
    #[must_use]
    pub fn calls(&self, operation: Operation) -> usize {
        self.backend
            .read()
            .unwrap()
            .calls
            .get(&operation)
            .copied()
            .unwrap_or(0)
    }

    /// Total calls across all operations
    #[must_use]
    pub fn total_calls(&self) -> usize {
        self.backend.read().unwrap().calls.values().sum()
    }

    /// Current catalog
    #[must_use]
    pub fn products(&self) -> Vec<Product> {
        self.backend.read().unwrap().products.clone()
    }

    /// Current stock of one product
    #[must_use]
    pub fn stock(&self, id: ProductId) -> Option<u32> {
        self.backend
            .read()
            .unwrap()
            .products
            .iter()
            .find(|p| p.id == id)
            .map(|p| p.quantity_in_stock)
    }

    /// Current server-side cart
    #[must_use]
    pub fn cart(&self) -> Vec<CartLine> {
        self.backend.read().unwrap().cart.clone()
    }

    /// Orders recorded so far
    #[must_use]
    pub fn orders(&self) -> Vec<OrderRequest> {
        self.backend.read().unwrap().orders.clone()
    }

    /// Stock writes received through `update_product_stock`
    #[must_use]
    pub fn stock_updates(&self) -> Vec<(ProductId, u32)> {
        self.backend.read().unwrap().stock_updates.clone()
    }

    /// Run `f` against the backend after the configured latency
    fn respond<T, F>(&self, operation: Operation, f: F) -> ApiFuture<'_, T>
    where
        T: Send + 'static,
        F: FnOnce(&mut Backend) -> Result<T, ApiError> + Send + 'static,
    {
        let backend = Arc::clone(&self.backend);
        let latency = self.latency;

        Box::pin(async move {
            if let Some(latency) = latency {
                tokio::time::sleep(latency).await;
            }
            let mut backend = backend.write().unwrap();
            backend.begin(operation)?;
            f(&mut backend)
        })
    }
}

impl StorefrontApi for InMemoryStorefront {
    fn list_products(&self) -> ApiFuture<'_, Vec<Product>> {
        self.respond(Operation::ListProducts, |b| Ok(b.products.clone()))
    }

    fn read_cart(&self) -> ApiFuture<'_, Vec<CartLine>> {
        self.respond(Operation::ReadCart, |b| Ok(b.cart.clone()))
    }

    fn add_cart_line(&self, line: NewCartLine) -> ApiFuture<'_, CartLine> {
        self.respond(Operation::AddCartLine, move |b| b.add_cart_line(&line))
    }

    fn update_cart_line_quantity(&self, id: CartLineId, quantity: u32) -> ApiFuture<'_, ()> {
        self.respond(Operation::UpdateCartLineQuantity, move |b| {
            b.update_quantity(id, quantity)
        })
    }

    fn delete_cart_line(&self, id: CartLineId) -> ApiFuture<'_, ()> {
        self.respond(Operation::DeleteCartLine, move |b| {
            // Already gone counts as deleted
            b.cart.retain(|l| l.id != id);
            Ok(())
        })
    }

    fn place_order(&self, order: OrderRequest) -> ApiFuture<'_, OrderReceipt> {
        self.respond(Operation::PlaceOrder, move |b| b.place_order(order))
    }

    fn update_product_stock(&self, id: ProductId, quantity: u32) -> ApiFuture<'_, ()> {
        self.respond(Operation::UpdateProductStock, move |b| {
            b.update_product_stock(id, quantity)
        })
    }
}
