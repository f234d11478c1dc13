//! Client-side stock bookkeeping after an order
//!
//! Only used under [`StockPolicy::ClientDecrement`](crate::StockPolicy).
//! Stock is re-read right before each write so the new level is based on the
//! server's current count, not on the catalog the view loaded earlier.

use crate::cart::types::CartAction;
use crate::session::Session;
use std::collections::BTreeMap;
use std::sync::Arc;
use storefront_api::{OrderRequest, ProductId, StorefrontApi};
use storefront_core::{async_effect, effect::Effect};

/// Units ordered per product, summed over the order's items
#[must_use]
pub fn ordered_quantities(order: &OrderRequest) -> BTreeMap<ProductId, u32> {
    let mut quantities = BTreeMap::new();
    for (product_id, quantity) in order.quantities() {
        let total: &mut u32 = quantities.entry(product_id).or_default();
        *total = total.saturating_add(quantity);
    }
    quantities
}

/// Rewrite each ordered product's stock to `stock - ordered`
///
/// Products are keyed by product id. Levels never go below zero.
pub(crate) fn sync_stock(
    api: Arc<dyn StorefrontApi>,
    session: Session,
    order: &OrderRequest,
) -> Effect<CartAction> {
    let quantities = ordered_quantities(order);

    async_effect! {
        let products = match api.list_products().await {
            Ok(products) => products,
            Err(error) => {
                tracing::warn!(%error, "Could not read stock levels");
                return Some(CartAction::StockSynced {
                    session,
                    updated: Vec::new(),
                    failed: quantities.into_keys().collect(),
                });
            },
        };

        let mut updated = Vec::new();
        let mut failed = Vec::new();

        for (product_id, ordered) in quantities {
            let Some(product) = products.iter().find(|p| p.id == product_id) else {
                tracing::warn!(%product_id, "Ordered product missing from catalog");
                failed.push(product_id);
                continue;
            };

            let remaining = product.quantity_in_stock.saturating_sub(ordered);
            match api.update_product_stock(product_id, remaining).await {
                Ok(()) => updated.push(product_id),
                Err(error) => {
                    tracing::warn!(%product_id, %error, "Stock update failed");
                    failed.push(product_id);
                },
            }
        }

        Some(CartAction::StockSynced { session, updated, failed })
    }
}
