//! Application state shared across handlers.

use std::sync::Arc;

use shopcart_core::ProductId;
use tokio::sync::{Mutex, MutexGuard};
use tracing::instrument;

use crate::catalog::CatalogSource;
use crate::config::StorefrontConfig;
use crate::store::{DetailStatus, Settled, Store};

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc`. It owns the single [`Store`]
/// for the lifetime of the process and the catalog source used to fill it.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: StorefrontConfig,
    store: Mutex<Store>,
    catalog: Arc<dyn CatalogSource>,
}

impl AppState {
    /// Create a new application state.
    ///
    /// # Arguments
    ///
    /// * `config` - Storefront configuration
    /// * `store` - Store opened from persisted state
    /// * `catalog` - Source used for catalog and detail fetches
    #[must_use]
    pub fn new(config: StorefrontConfig, store: Store, catalog: Arc<dyn CatalogSource>) -> Self {
        Self {
            inner: Arc::new(AppStateInner {
                config,
                store: Mutex::new(store),
                catalog,
            }),
        }
    }

    /// Get a reference to the storefront configuration.
    #[must_use]
    pub fn config(&self) -> &StorefrontConfig {
        &self.inner.config
    }

    /// Lock the store.
    ///
    /// Never hold the guard across a catalog call; use [`Self::refresh_catalog`]
    /// and [`Self::load_product`] for fetches.
    pub async fn store(&self) -> MutexGuard<'_, Store> {
        self.inner.store.lock().await
    }

    /// Fetch the full catalog and settle it into the store.
    #[instrument(skip(self))]
    pub async fn refresh_catalog(&self) -> Settled {
        let request = self.store().await.begin_catalog_fetch();
        let result = self.inner.catalog.fetch_products().await;
        self.store().await.settle_catalog_fetch(request, result)
    }

    /// Start a catalog fetch in the background.
    ///
    /// The store's loading flag is set before this returns, so callers can
    /// report it immediately.
    pub async fn spawn_catalog_refresh(&self) {
        let request = self.store().await.begin_catalog_fetch();
        let state = self.clone();
        tokio::spawn(async move {
            let result = state.inner.catalog.fetch_products().await;
            state.store().await.settle_catalog_fetch(request, result);
        });
    }

    /// Fetch a product detail and settle it into the store.
    ///
    /// Returns the detail status after settling. If a newer detail request
    /// won the race, the status reflects that request instead.
    ///
    /// The fetch and settle run in their own task, so a caller that stops
    /// waiting (a disconnected client) never leaves the detail loading.
    #[instrument(skip(self))]
    pub async fn load_product(&self, id: ProductId) -> DetailStatus {
        let request = self.store().await.begin_detail_fetch(id);
        let state = self.clone();
        let settle = tokio::spawn(async move {
            let result = state.inner.catalog.fetch_product(id).await;
            let mut store = state.store().await;
            store.settle_detail_fetch(request, result);
            store.detail_status()
        });

        match settle.await {
            Ok(status) => status,
            Err(e) => {
                tracing::error!(product_id = %id, error = %e, "Detail fetch task failed");
                DetailStatus::Failed(id)
            }
        }
    }

    /// Fetch the catalog in the background if the store started empty.
    pub async fn prime_catalog(&self) {
        let needs_catalog = self.store().await.needs_catalog();
        if needs_catalog {
            tracing::info!("No stored catalog, fetching");
            self.spawn_catalog_refresh().await;
        }
    }
}
