//! HTTP implementation of [`StorefrontApi`]

use crate::{
    config::ApiConfig,
    error::ApiError,
    service::{ApiFuture, StorefrontApi},
    types::{
        CartLine, CartLineId, NewCartLine, OrderReceipt, OrderRequest, Product, ProductId,
        StockUpdate,
    },
};
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use tracing::Instrument;

/// Storefront API client over HTTP
#[derive(Clone, Debug)]
pub struct StorefrontClient {
    client: Client,
    config: ApiConfig,
}

impl StorefrontClient {
    /// Create a client for the given configuration
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::InvalidConfig`] if the HTTP client cannot be built.
    pub fn new(config: ApiConfig) -> Result<Self, ApiError> {
        let client = Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(|e| ApiError::InvalidConfig(e.to_string()))?;

        Ok(Self { client, config })
    }

    /// Configuration this client was built with
    #[must_use]
    pub const fn config(&self) -> &ApiConfig {
        &self.config
    }

    /// Send a request and map transport failures and error statuses
    async fn execute(
        &self,
        request: RequestBuilder,
        method: &'static str,
        path: &str,
    ) -> Result<Response, ApiError> {
        tracing::debug!(method, path, "Sending request");

        let result = match request.send().await {
            Ok(response) => check_status(response).await,
            Err(e) => Err(ApiError::Network(e.to_string())),
        };

        if let Err(error) = &result {
            tracing::warn!(method, path, %error, "Request failed");
        }
        result
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let response = self
            .execute(self.client.get(self.config.url(path)), "GET", path)
            .await?;

        response
            .json::<T>()
            .await
            .map_err(|e| ApiError::Decode(e.to_string()))
    }
}

/// Map a non-success status to the matching [`ApiError`]
async fn check_status(response: Response) -> Result<Response, ApiError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let message = response.text().await.unwrap_or_default();
    Err(match status {
        StatusCode::NOT_FOUND => ApiError::NotFound { message },
        StatusCode::BAD_REQUEST | StatusCode::CONFLICT | StatusCode::UNPROCESSABLE_ENTITY => {
            ApiError::Rejected {
                status: status.as_u16(),
                message,
            }
        },
        status => ApiError::Status {
            status: status.as_u16(),
            message,
        },
    })
}

impl StorefrontApi for StorefrontClient {
    fn list_products(&self) -> ApiFuture<'_, Vec<Product>> {
        Box::pin(
            async move { self.get_json::<Vec<Product>>("/products").await }
                .instrument(tracing::debug_span!("list_products")),
        )
    }

    fn read_cart(&self) -> ApiFuture<'_, Vec<CartLine>> {
        Box::pin(
            async move {
                let lines = self.get_json::<Vec<CartLine>>("/cart").await?;
                lines.iter().try_for_each(CartLine::validate)?;
                Ok(lines)
            }
            .instrument(tracing::debug_span!("read_cart")),
        )
    }

    fn add_cart_line(&self, line: NewCartLine) -> ApiFuture<'_, CartLine> {
        let span = tracing::debug_span!("add_cart_line", product_id = %line.product_id, quantity = line.quantity);
        Box::pin(
            async move {
                line.validate()?;

                let path = "/cart";
                let request = self.client.post(self.config.url(path)).json(&line);
                let response = self.execute(request, "POST", path).await?;

                let added = response
                    .json::<CartLine>()
                    .await
                    .map_err(|e| ApiError::Decode(e.to_string()))?;
                added.validate()?;
                Ok(added)
            }
            .instrument(span),
        )
    }

    fn update_cart_line_quantity(&self, id: CartLineId, quantity: u32) -> ApiFuture<'_, ()> {
        let span = tracing::debug_span!("update_cart_line_quantity", line_id = %id, quantity);
        Box::pin(
            async move {
                if quantity == 0 {
                    return Err(ApiError::Validation(
                        "quantity must be at least 1, remove the line instead".to_string(),
                    ));
                }

                let path = format!("/cart/update-quantity/{id}");
                let request = self
                    .client
                    .put(self.config.url(&path))
                    .query(&[("newquantity", quantity)]);
                self.execute(request, "PUT", &path).await?;
                Ok(())
            }
            .instrument(span),
        )
    }

    fn delete_cart_line(&self, id: CartLineId) -> ApiFuture<'_, ()> {
        let span = tracing::debug_span!("delete_cart_line", line_id = %id);
        Box::pin(
            async move {
                let path = format!("/cart/{id}");
                let request = self.client.delete(self.config.url(&path));

                match self.execute(request, "DELETE", &path).await {
                    Ok(_) => Ok(()),
                    Err(ApiError::NotFound { .. }) => {
                        tracing::debug!("Cart line already gone");
                        Ok(())
                    },
                    Err(error) => Err(error),
                }
            }
            .instrument(span),
        )
    }

    fn place_order(&self, order: OrderRequest) -> ApiFuture<'_, OrderReceipt> {
        let span = tracing::debug_span!("place_order", items = order.items.len(), total = %order.total_price);
        Box::pin(
            async move {
                order.validate()?;

                let path = "/orders";
                let request = self.client.post(self.config.url(path)).json(&order);
                let response = self.execute(request, "POST", path).await?;

                // The acknowledgement body is optional
                let body = response.text().await.unwrap_or_default();
                Ok(OrderReceipt::from_body(&body))
            }
            .instrument(span),
        )
    }

    fn update_product_stock(&self, id: ProductId, quantity: u32) -> ApiFuture<'_, ()> {
        let span = tracing::debug_span!("update_product_stock", product_id = %id, quantity);
        Box::pin(
            async move {
                let path = format!("/products/{id}");
                let request = self
                    .client
                    .put(self.config.url(&path))
                    .json(&StockUpdate { quantity });
                self.execute(request, "PUT", &path).await?;
                Ok(())
            }
            .instrument(span),
        )
    }
}
