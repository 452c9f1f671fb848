//! Current catalog snapshot and its background refresher.
//!
//! The store starts out holding the provisional static catalog, so pages
//! render before the remote API has ever answered. Each refresh cycle runs
//! [`bakalah_core::reconcile`] and replaces the snapshot wholesale.

use std::sync::{Arc, Weak};
use std::time::Duration;

use bakalah_core::{Catalog, CatalogSource, Product, Reconciled, find_static, reconcile};
use chrono::{DateTime, Utc};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info, instrument, warn};

/// One published version of the catalog.
#[derive(Debug, Clone)]
pub struct CatalogSnapshot {
    /// Products to display.
    pub catalog: Arc<Catalog>,
    /// True when the last refresh failed and only static products are shown.
    pub using_fallback: bool,
    /// When the last refresh cycle completed. `None` for the provisional
    /// snapshot.
    pub refreshed_at: Option<DateTime<Utc>>,
}

impl CatalogSnapshot {
    fn provisional(static_list: &[Product]) -> Self {
        Self {
            catalog: Arc::new(Catalog::provisional(static_list)),
            using_fallback: false,
            refreshed_at: None,
        }
    }

    /// Whether no refresh cycle has completed yet.
    #[must_use]
    pub const fn is_provisional(&self) -> bool {
        self.refreshed_at.is_none()
    }
}

/// Holds the current catalog snapshot.
///
/// Cheaply cloneable. Readers never block on a refresh.
#[derive(Clone)]
pub struct CatalogStore {
    inner: Arc<CatalogStoreInner>,
}

struct CatalogStoreInner {
    static_list: Arc<[Product]>,
    tx: watch::Sender<CatalogSnapshot>,
}

impl CatalogStore {
    /// Create a store holding the provisional catalog for `static_list`.
    #[must_use]
    pub fn new(static_list: impl Into<Arc<[Product]>>) -> Self {
        let static_list = static_list.into();
        let (tx, _rx) = watch::channel(CatalogSnapshot::provisional(&static_list));
        Self {
            inner: Arc::new(CatalogStoreInner { static_list, tx }),
        }
    }

    /// The bundled products this store reconciles against.
    #[must_use]
    pub fn static_products(&self) -> &[Product] {
        &self.inner.static_list
    }

    /// The current snapshot.
    #[must_use]
    pub fn snapshot(&self) -> CatalogSnapshot {
        self.inner.tx.borrow().clone()
    }

    /// Look a product up without touching the network.
    ///
    /// The static list is authoritative; remote products already merged
    /// into the current snapshot are consulted next.
    #[must_use]
    pub fn find_local(&self, id: &str) -> Option<Product> {
        if let Some(product) = find_static(&self.inner.static_list, id) {
            return Some(product.clone());
        }
        self.inner.tx.borrow().catalog.get(id).cloned()
    }

    /// Subscribe to snapshot changes.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<CatalogSnapshot> {
        self.inner.tx.subscribe()
    }

    /// Run one reconciliation cycle and publish its result.
    ///
    /// Concurrent refreshes are not coordinated: whichever completes last
    /// publishes last, and its snapshot is the one readers see.
    #[instrument(skip_all)]
    pub async fn refresh<S: CatalogSource>(&self, source: &S) -> CatalogSnapshot {
        let Reconciled {
            catalog,
            using_fallback,
            skipped,
            error,
        } = reconcile(&self.inner.static_list, source).await;

        if let Some(error) = &error {
            warn!(error = %error, "Product API unavailable, showing static catalog");
        } else {
            info!(products = catalog.len(), "Catalog refreshed");
        }
        if skipped > 0 {
            warn!(skipped, "Ignored remote entries that are not valid products");
        }

        let snapshot = CatalogSnapshot {
            catalog: Arc::new(catalog),
            using_fallback,
            refreshed_at: Some(Utc::now()),
        };
        self.inner.tx.send_replace(snapshot.clone());
        snapshot
    }

    /// Spawn a task that refreshes immediately and then every `every`.
    ///
    /// The task holds only a weak reference to the store and exits once the
    /// store is gone. Dropping the returned handle stops it as well.
    pub fn spawn_refresher<S>(&self, source: S, every: Duration) -> CatalogRefresher
    where
        S: CatalogSource + 'static,
    {
        let store = Arc::downgrade(&self.inner);
        let handle = tokio::spawn(run_refresher(store, source, every));
        CatalogRefresher { handle }
    }
}

async fn run_refresher<S: CatalogSource>(
    store: Weak<CatalogStoreInner>,
    source: S,
    every: Duration,
) {
    let mut ticker = tokio::time::interval(every);
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

    loop {
        ticker.tick().await;
        let Some(inner) = store.upgrade() else {
            debug!("Catalog store dropped, stopping refresher");
            break;
        };
        CatalogStore { inner }.refresh(&source).await;
    }
}

/// Handle to the background refresher. Aborts the task when dropped.
#[derive(Debug)]
pub struct CatalogRefresher {
    handle: JoinHandle<()>,
}

impl CatalogRefresher {
    /// Whether the refresher task has stopped.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }
}

impl Drop for CatalogRefresher {
    fn drop(&mut self) {
        self.handle.abort();
    }
}
