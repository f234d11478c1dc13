//! The storefront facade: one store per collaborator.

use crate::cart::{CartAction, CartReducer, CartState};
use crate::catalog::{CatalogAction, CatalogReducer, CatalogState};
use crate::environment::StorefrontEnvironment;
use std::time::Duration;
use storefront_api::{Product, ProductId};
use storefront_runtime::{Store, StoreConfig, StoreError};

/// Store holding the catalog
pub type CatalogStore =
    Store<CatalogState, CatalogAction, StorefrontEnvironment, CatalogReducer>;

/// Store holding the cart and its checkout flow
pub type CartStore = Store<CartState, CartAction, StorefrontEnvironment, CartReducer>;

/// Catalog and cart, built from one environment
///
/// Views read through [`Store::state`], observe through
/// [`Store::subscribe_actions`] and mutate through [`Store::send`]. Cloning a
/// `Storefront` shares the same stores.
#[derive(Clone)]
pub struct Storefront {
    catalog: CatalogStore,
    cart: CartStore,
}

impl Storefront {
    /// Creates both stores with the default [`StoreConfig`]
    #[must_use]
    pub fn new(env: StorefrontEnvironment) -> Self {
        Self::with_config(env, StoreConfig::default())
    }

    /// Creates both stores with `config`
    #[must_use]
    pub fn with_config(env: StorefrontEnvironment, config: StoreConfig) -> Self {
        Self {
            catalog: Store::with_config(
                CatalogState::new(),
                CatalogReducer::new(),
                env.clone(),
                config.clone(),
            ),
            cart: Store::with_config(CartState::new(), CartReducer::new(), env, config),
        }
    }

    /// The catalog store
    #[must_use]
    pub const fn catalog(&self) -> &CatalogStore {
        &self.catalog
    }

    /// The cart store
    #[must_use]
    pub const fn cart(&self) -> &CartStore {
        &self.cart
    }

    /// Starts loading the catalog and the cart
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::ShutdownInProgress`] after [`Storefront::shutdown`].
    pub async fn load(&self) -> Result<(), StoreError> {
        self.catalog.send(CatalogAction::Load).await?;
        self.cart.send(CartAction::Load).await?;
        Ok(())
    }

    /// Loads the catalog and the cart and waits until both have answered
    ///
    /// A failed load still counts as answered. The failure is in the
    /// collaborator's notifications.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Timeout`] if either load has not answered within
    /// `timeout`. A cart load issued while checkout is in progress is ignored
    /// and therefore times out.
    pub async fn load_and_wait(&self, timeout: Duration) -> Result<(), StoreError> {
        tracing::debug!("Loading catalog and cart");
        futures::future::try_join(
            self.catalog
                .send_and_wait_for(CatalogAction::Load, CatalogAction::is_load_result, timeout),
            self.cart
                .send_and_wait_for(CartAction::Load, CartAction::is_load_result, timeout),
        )
        .await?;
        Ok(())
    }

    /// Tears the view down: answers to requests already issued are ignored
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::ShutdownInProgress`] after [`Storefront::shutdown`].
    pub async fn detach(&self) -> Result<(), StoreError> {
        self.catalog.send(CatalogAction::Detach).await?;
        self.cart.send(CartAction::Detach).await?;
        Ok(())
    }

    /// Stops both stores, waiting up to `timeout` for running effects
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::ShutdownTimeout`] if effects were still running.
    pub async fn shutdown(&self, timeout: Duration) -> Result<(), StoreError> {
        let (catalog, cart) =
            futures::future::join(self.catalog.shutdown(timeout), self.cart.shutdown(timeout))
                .await;
        catalog.and(cart)
    }

    /// Looks up a catalog product by id
    pub async fn product(&self, id: ProductId) -> Option<Product> {
        self.catalog.state(|s| s.product(id).cloned()).await
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;
    use std::sync::Arc;
    use storefront_api::{CartLine, CartLineId, Decimal};
    use storefront_testing::{InMemoryStorefront, test_clock};

    fn laptop() -> Product {
        Product {
            id: ProductId(1),
            name: "Laptop".to_string(),
            price: Decimal::from(100),
            quantity_in_stock: 5,
            description: None,
            image_url: None,
        }
    }

    fn storefront(api: InMemoryStorefront) -> Storefront {
        Storefront::new(StorefrontEnvironment::new(Arc::new(api), Arc::new(test_clock())))
    }

    #[tokio::test]
    async fn load_and_wait_fills_both_stores() {
        let api = InMemoryStorefront::new()
            .with_products(vec![laptop()])
            .with_cart(vec![CartLine {
                id: CartLineId(4),
                product_id: ProductId(1),
                product_name: "Laptop".to_string(),
                price: Decimal::from(100),
                quantity: 2,
            }]);
        let storefront = storefront(api);

        storefront.load_and_wait(Duration::from_secs(1)).await.unwrap();

        assert_eq!(storefront.product(ProductId(1)).await, Some(laptop()));
        assert!(storefront.product(ProductId(2)).await.is_none());
        assert_eq!(storefront.cart().state(CartState::total).await, Decimal::from(200));
    }

    #[tokio::test]
    async fn shutdown_rejects_further_loads() {
        let storefront = storefront(InMemoryStorefront::new());
        storefront.shutdown(Duration::from_secs(1)).await.unwrap();

        assert_eq!(storefront.load().await, Err(StoreError::ShutdownInProgress));
    }
}
