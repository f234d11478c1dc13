//! Wire types for the storefront REST API
//!
//! Field names follow the server's camelCase JSON. Money is a [`Decimal`] so
//! that `price × quantity` sums never drift.

use crate::error::ApiError;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

macro_rules! id_type {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub i64);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<i64> for $name {
            fn from(id: i64) -> Self {
                Self(id)
            }
        }
    };
}

id_type!(
    /// Server-assigned product identifier
    ProductId
);
id_type!(
    /// Server-assigned cart line identifier
    CartLineId
);
id_type!(
    /// Server-assigned order identifier
    OrderId
);
id_type!(
    /// Identifier of the user placing orders
    UserId
);

/// A product as listed by the catalog (read-only for the client)
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    /// Product id
    pub id: ProductId,
    /// Display name
    pub name: String,
    /// Unit price
    pub price: Decimal,
    /// Units the server reports as available
    pub quantity_in_stock: u32,
    /// Optional long description
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Optional image location
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

/// One line of the server-side cart
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartLine {
    /// Cart line id
    pub id: CartLineId,
    /// Product this line refers to
    pub product_id: ProductId,
    /// Product name at the time the line was added
    pub product_name: String,
    /// Unit price at the time the line was added
    pub price: Decimal,
    /// Always at least 1
    pub quantity: u32,
}

impl CartLine {
    /// `price × quantity`, saturating at the bounds of [`Decimal`]
    #[must_use]
    pub fn total(&self) -> Decimal {
        self.price.saturating_mul(Decimal::from(self.quantity))
    }

    /// `price × quantity`, or `None` if it does not fit a [`Decimal`]
    #[must_use]
    pub fn checked_total(&self) -> Option<Decimal> {
        self.price.checked_mul(Decimal::from(self.quantity))
    }

    /// Check a line received from the server
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Decode`] if the quantity is zero or the line total
    /// overflows.
    pub fn validate(&self) -> Result<(), ApiError> {
        if self.quantity == 0 {
            return Err(ApiError::Decode(format!("cart line {} has quantity 0", self.id)));
        }
        if self.checked_total().is_none() {
            return Err(ApiError::Decode(format!("cart line {} total overflows", self.id)));
        }
        Ok(())
    }
}

/// Body of `POST /cart`
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewCartLine {
    /// Product to add
    pub product_id: ProductId,
    /// Name snapshot
    pub product_name: String,
    /// Units to add
    pub quantity: u32,
}

impl NewCartLine {
    /// Build the request for `quantity` units of `product`
    #[must_use]
    pub fn for_product(product: &Product, quantity: u32) -> Self {
        Self {
            product_id: product.id,
            product_name: product.name.clone(),
            quantity,
        }
    }

    /// Check the request before it is sent
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Validation`] if the quantity is zero.
    pub fn validate(&self) -> Result<(), ApiError> {
        if self.quantity == 0 {
            return Err(ApiError::Validation("quantity must be at least 1".to_string()));
        }
        Ok(())
    }
}

/// One item of an order
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
    /// Product ordered
    pub product_id: ProductId,
    /// Product name snapshot
    pub name: String,
    /// Unit price snapshot
    pub price: Decimal,
    /// Units ordered
    pub quantity: u32,
    /// `price × quantity`
    pub total: Decimal,
}

impl From<&CartLine> for OrderItem {
    fn from(line: &CartLine) -> Self {
        Self {
            product_id: line.product_id,
            name: line.product_name.clone(),
            price: line.price,
            quantity: line.quantity,
            total: line.total(),
        }
    }
}

/// Body of `POST /orders`
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderRequest {
    /// User placing the order
    pub user_id: UserId,
    /// Ordered items, never empty
    pub items: Vec<OrderItem>,
    /// Sum of item totals
    pub total_price: Decimal,
    /// When the order was placed
    pub order_date: DateTime<Utc>,
}

impl OrderRequest {
    /// Snapshot the given cart lines into an order
    ///
    /// Totals saturate, so an order built from lines whose totals do not
    /// fit a [`Decimal`] fails [`OrderRequest::validate`].
    #[must_use]
    pub fn from_lines(user_id: UserId, lines: &[CartLine], order_date: DateTime<Utc>) -> Self {
        let items: Vec<OrderItem> = lines.iter().map(OrderItem::from).collect();
        let total_price = items
            .iter()
            .fold(Decimal::ZERO, |sum, item| sum.saturating_add(item.total));
        Self {
            user_id,
            items,
            total_price,
            order_date,
        }
    }

    /// Check the order is self-consistent before it is sent
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Validation`] if there are no items, an item has
    /// quantity zero, an item total is not `price × quantity`, the order
    /// total is not the sum of the item totals, or a total overflows.
    pub fn validate(&self) -> Result<(), ApiError> {
        if self.items.is_empty() {
            return Err(ApiError::Validation("order has no items".to_string()));
        }

        for item in &self.items {
            if item.quantity == 0 {
                return Err(ApiError::Validation(format!(
                    "item for product {} has quantity 0",
                    item.product_id
                )));
            }
            let Some(expected) = item.price.checked_mul(Decimal::from(item.quantity)) else {
                return Err(ApiError::Validation(format!(
                    "item total for product {} overflows",
                    item.product_id
                )));
            };
            if item.total != expected {
                return Err(ApiError::Validation(format!(
                    "item total for product {} does not match price × quantity",
                    item.product_id
                )));
            }
        }

        let sum = self
            .items
            .iter()
            .try_fold(Decimal::ZERO, |sum, item| sum.checked_add(item.total))
            .ok_or_else(|| ApiError::Validation("order total overflows".to_string()))?;
        if sum != self.total_price {
            return Err(ApiError::Validation(format!(
                "order total {} does not match item sum {sum}",
                self.total_price
            )));
        }

        Ok(())
    }

    /// Units ordered per product
    pub fn quantities(&self) -> impl Iterator<Item = (ProductId, u32)> + '_ {
        self.items.iter().map(|item| (item.product_id, item.quantity))
    }
}

/// Server acknowledgement of a placed order
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct OrderReceipt {
    /// Created order id, when the server returned one
    pub order_id: Option<OrderId>,
}

impl OrderReceipt {
    /// Read the receipt from a success body
    ///
    /// Accepts an object carrying `id` or `orderId`. Anything else (an empty
    /// body, plain text) yields a receipt without an id.
    #[must_use]
    pub fn from_body(body: &str) -> Self {
        let order_id = serde_json::from_str::<serde_json::Value>(body)
            .ok()
            .and_then(|value| {
                value
                    .get("id")
                    .or_else(|| value.get("orderId"))
                    .and_then(serde_json::Value::as_i64)
            })
            .map(OrderId);
        Self { order_id }
    }
}

/// Body of `PUT /products/{id}`
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockUpdate {
    /// New stock level
    pub quantity: u32,
}
