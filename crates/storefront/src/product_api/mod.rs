//! Read-only client for the remote product API.
//!
//! The storefront only ever reads: the product list feeds catalog
//! reconciliation and single products back the detail page when an id is
//! not in the bundled catalog. Single-product lookups are cached with `moka`
//! (5 minute TTL).
//!
//! # Example
//!
//! ```rust,ignore
//! use bakalah_storefront::product_api::ProductApiClient;
//!
//! let client = ProductApiClient::new(&config);
//! let reconciled = bakalah_core::reconcile(static_products(), &client).await;
//! let product = client.get_product("42").await?;
//! ```

use std::sync::Arc;
use std::time::Duration;

use bakalah_core::{CatalogSource, Product, SourceError, decode_product};
use moka::future::Cache;
use reqwest::StatusCode;
use secrecy::{ExposeSecret, SecretString};
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, instrument};
use url::Url;

use crate::config::StorefrontConfig;

const PRODUCTS_PATH: &str = "api/products";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Errors that can occur when talking to the product API.
#[derive(Debug, Error)]
pub enum ProductApiError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The API answered with a non-success status.
    #[error("Unexpected status {0}")]
    Status(StatusCode),

    /// The body was not valid JSON.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// A request URL could not be built.
    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),

    /// The body was JSON but had no usable product identifier.
    #[error("Response is not a product")]
    NotAProduct,
}

impl From<ProductApiError> for SourceError {
    fn from(err: ProductApiError) -> Self {
        match err {
            ProductApiError::Http(e) => Self::Transport(e.to_string()),
            ProductApiError::Status(status) => Self::Status(status.as_u16()),
            ProductApiError::Parse(e) => Self::Malformed(e.to_string()),
            ProductApiError::Url(e) => Self::Transport(e.to_string()),
            ProductApiError::NotAProduct => {
                Self::Malformed("response is not a product".to_string())
            }
        }
    }
}

/// Client for the remote product API.
#[derive(Clone)]
pub struct ProductApiClient {
    inner: Arc<ProductApiClientInner>,
}

struct ProductApiClientInner {
    client: reqwest::Client,
    base_url: Url,
    token: Option<SecretString>,
    cache: Cache<String, Product>,
}

impl ProductApiClient {
    /// Create a client from storefront configuration.
    #[must_use]
    pub fn new(config: &StorefrontConfig) -> Self {
        Self::with_base_url(config.product_api_url.clone(), config.product_api_token.clone())
    }

    /// Create a client for an explicit base URL.
    #[must_use]
    pub fn with_base_url(base_url: Url, token: Option<SecretString>) -> Self {
        let cache = Cache::builder()
            .max_capacity(500)
            .time_to_live(Duration::from_secs(300)) // 5 minutes
            .build();

        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .unwrap_or_default();

        Self {
            inner: Arc::new(ProductApiClientInner {
                client,
                base_url,
                token,
                cache,
            }),
        }
    }

    fn endpoint(&self, path: &str) -> Result<Url, ProductApiError> {
        Ok(self.inner.base_url.join(path)?)
    }

    fn get(&self, url: Url) -> reqwest::RequestBuilder {
        let request = self.inner.client.get(url);
        match &self.inner.token {
            Some(token) => request.bearer_auth(token.expose_secret()),
            None => request,
        }
    }

    /// Fetch the raw product list body.
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure, a non-success status, or a
    /// body that is not JSON. Shape validation is left to the caller.
    #[instrument(skip(self))]
    pub async fn list_products(&self) -> Result<Value, ProductApiError> {
        let response = self.get(self.endpoint(PRODUCTS_PATH)?).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ProductApiError::Status(status));
        }

        let body = response.bytes().await?;
        Ok(serde_json::from_slice(&body)?)
    }

    /// Fetch a single product by id.
    ///
    /// Returns `Ok(None)` when the API answers 404.
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure, any other non-success status,
    /// or a body that does not decode as a product.
    #[instrument(skip(self))]
    pub async fn get_product(&self, id: &str) -> Result<Option<Product>, ProductApiError> {
        if let Some(product) = self.inner.cache.get(id).await {
            debug!("Cache hit for product");
            return Ok(Some(product));
        }

        let path = format!("{PRODUCTS_PATH}/{}", urlencoding::encode(id));
        let response = self.get(self.endpoint(&path)?).send().await?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !status.is_success() {
            return Err(ProductApiError::Status(status));
        }

        let body = response.bytes().await?;
        let product =
            decode_product(serde_json::from_slice(&body)?).ok_or(ProductApiError::NotAProduct)?;

        self.inner
            .cache
            .insert(id.to_string(), product.clone())
            .await;

        Ok(Some(product))
    }
}

impl CatalogSource for ProductApiClient {
    async fn fetch_products(&self) -> Result<Value, SourceError> {
        self.list_products().await.map_err(SourceError::from)
    }
}
