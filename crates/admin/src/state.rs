//! Application state shared across handlers.

use std::sync::Arc;

use bakalah_core::{Product, static_products};
use tower_sessions::Session;

use crate::api::{ApiClient, AuthApi};
use crate::config::AdminConfig;
use crate::middleware::SESSION_EXPIRY;
use crate::session::{Clock, SessionGuard, SystemClock, WatchRegistry};

/// Application state shared across all handlers.
///
/// Cheaply cloneable via `Arc`.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: AdminConfig,
    api: ApiClient,
    auth: AuthApi,
    watches: WatchRegistry,
    clock: Arc<dyn Clock>,
    static_products: Arc<[Product]>,
}

impl AppState {
    /// Create application state using the system clock.
    #[must_use]
    pub fn new(config: AdminConfig) -> Self {
        Self::with_clock(config, Arc::new(SystemClock))
    }

    /// Create application state with an explicit clock for token expiry.
    ///
    /// The watch registry is registered as the API client's observer here,
    /// once, for the lifetime of the process.
    #[must_use]
    pub fn with_clock(config: AdminConfig, clock: Arc<dyn Clock>) -> Self {
        let watches = WatchRegistry::new(
            Arc::clone(&clock),
            config.session_check_interval,
            SESSION_EXPIRY,
        );
        let api = ApiClient::new(config.product_api_url.clone(), Arc::new(watches.clone()));
        let auth = AuthApi::new(config.product_api_url.clone());

        Self {
            inner: Arc::new(AppStateInner {
                config,
                api,
                auth,
                watches,
                clock,
                static_products: static_products().into(),
            }),
        }
    }

    /// Get a reference to the admin configuration.
    #[must_use]
    pub fn config(&self) -> &AdminConfig {
        &self.inner.config
    }

    /// Get a reference to the product API client.
    #[must_use]
    pub fn api(&self) -> &ApiClient {
        &self.inner.api
    }

    /// Get a reference to the expiry watch registry.
    #[must_use]
    pub fn watches(&self) -> &WatchRegistry {
        &self.inner.watches
    }

    /// The bundled products the storefront always shows.
    #[must_use]
    pub fn static_products(&self) -> &[Product] {
        &self.inner.static_products
    }

    /// A session guard for one request's session.
    #[must_use]
    pub fn guard(&self, session: Session) -> SessionGuard<Session, AuthApi> {
        SessionGuard::new(
            session,
            self.inner.auth.clone(),
            self.inner.watches.clone(),
            Arc::clone(&self.inner.clock),
        )
    }
}
