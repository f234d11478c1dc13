//! Connection settings for the storefront API

use crate::error::ApiError;
use reqwest::Url;
use std::time::Duration;

/// Default request timeout
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Where the API lives and how long a single request may take
///
/// The base URL is validated on construction and stored without a trailing
/// slash so paths can be appended with `format!("{base}/cart")`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ApiConfig {
    base_url: String,
    timeout: Duration,
}

impl ApiConfig {
    /// Create a configuration with the default timeout
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::InvalidConfig`] if `base_url` is not an absolute
    /// `http` or `https` URL.
    pub fn new(base_url: impl AsRef<str>) -> Result<Self, ApiError> {
        let raw = base_url.as_ref().trim();
        let url = Url::parse(raw)
            .map_err(|e| ApiError::InvalidConfig(format!("invalid base URL {raw:?}: {e}")))?;

        if !matches!(url.scheme(), "http" | "https") {
            return Err(ApiError::InvalidConfig(format!(
                "unsupported scheme {:?} in base URL",
                url.scheme()
            )));
        }

        Ok(Self {
            base_url: raw.trim_end_matches('/').to_string(),
            timeout: DEFAULT_TIMEOUT,
        })
    }

    /// Set the per-request timeout
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Base URL without trailing slash
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Per-request timeout
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Absolute URL for a path relative to the base
    #[must_use]
    pub fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;

    #[test]
    fn trailing_slash_is_trimmed() {
        let config = ApiConfig::new("http://localhost:5132/api/").unwrap();
        assert_eq!(config.base_url(), "http://localhost:5132/api");
        assert_eq!(config.url("/cart"), "http://localhost:5132/api/cart");
        assert_eq!(config.url("products"), "http://localhost:5132/api/products");
    }

    #[test]
    fn rejects_relative_and_non_http_urls() {
        assert!(matches!(ApiConfig::new("/api"), Err(ApiError::InvalidConfig(_))));
        assert!(matches!(
            ApiConfig::new("ftp://example.com/api"),
            Err(ApiError::InvalidConfig(_))
        ));
    }

    #[test]
    fn timeout_defaults_and_overrides() {
        let config = ApiConfig::new("https://shop.example").unwrap();
        assert_eq!(config.timeout(), DEFAULT_TIMEOUT);

        let config = config.with_timeout(Duration::from_secs(2));
        assert_eq!(config.timeout(), Duration::from_secs(2));
    }
}
