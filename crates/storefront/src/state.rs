//! Application state shared across handlers.

use std::sync::Arc;

use bakalah_core::{Product, static_products};

use crate::config::StorefrontConfig;
use crate::product_api::ProductApiClient;
use crate::services::CatalogStore;

/// Application state shared across all handlers.
///
/// Cheaply cloneable via `Arc`.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: StorefrontConfig,
    products: ProductApiClient,
    catalog: CatalogStore,
}

impl AppState {
    /// Create application state around the bundled static catalog.
    #[must_use]
    pub fn new(config: StorefrontConfig) -> Self {
        Self::with_static_products(config, static_products().to_vec())
    }

    /// Create application state around an explicit static catalog.
    #[must_use]
    pub fn with_static_products(config: StorefrontConfig, static_list: Vec<Product>) -> Self {
        let products = ProductApiClient::new(&config);
        let catalog = CatalogStore::new(static_list);

        Self {
            inner: Arc::new(AppStateInner {
                config,
                products,
                catalog,
            }),
        }
    }

    /// Get a reference to the storefront configuration.
    #[must_use]
    pub fn config(&self) -> &StorefrontConfig {
        &self.inner.config
    }

    /// Get a reference to the product API client.
    #[must_use]
    pub fn products(&self) -> &ProductApiClient {
        &self.inner.products
    }

    /// Get a reference to the catalog store.
    #[must_use]
    pub fn catalog(&self) -> &CatalogStore {
        &self.inner.catalog
    }
}
