//! Product route handlers.

use axum::{
    Json,
    extract::{Path, RawQuery, State},
    http::StatusCode,
};
use serde::Serialize;
use shopcart_core::{CategorySelection, Product, ProductId, SortOption};
use tracing::instrument;

use crate::error::{AppError, Result};
use crate::store::{DetailStatus, Store};
use crate::state::AppState;

/// Product listing response.
#[derive(Debug, Clone, Serialize)]
pub struct ProductListView {
    /// Filtered and sorted products.
    pub products: Vec<Product>,
    /// Categories available for filtering.
    pub categories: Vec<String>,
    /// Active category selection (empty for all).
    pub selected_categories: CategorySelection,
    /// Active sort option.
    pub sort: SortOption,
    /// Whether a catalog fetch is in flight.
    pub loading: bool,
    /// Canonical query string for the current view.
    pub query: String,
}

impl From<&Store> for ProductListView {
    fn from(store: &Store) -> Self {
        Self {
            products: store.visible().to_vec(),
            categories: store.categories(),
            selected_categories: store.selection().clone(),
            sort: store.sort(),
            loading: store.is_loading(),
            query: store.location().query().to_string(),
        }
    }
}

/// List visible products.
///
/// A `categories` or `sort` query parameter takes priority over the stored
/// view state and is applied before listing.
#[instrument(skip(state))]
pub async fn index(
    State(state): State<AppState>,
    RawQuery(query): RawQuery,
) -> Json<ProductListView> {
    let mut store = state.store().await;
    if let Some(query) = query.filter(|q| !q.is_empty()) {
        let mut url = store.location().url().clone();
        url.set_query(Some(&query));
        store.navigate(url);
    }
    Json(ProductListView::from(&*store))
}

/// Refetch the catalog without waiting for it.
#[instrument(skip(state))]
pub async fn refresh(State(state): State<AppState>) -> (StatusCode, Json<ProductListView>) {
    state.spawn_catalog_refresh().await;
    let store = state.store().await;
    (StatusCode::ACCEPTED, Json(ProductListView::from(&*store)))
}

/// Product detail.
///
/// Always asks the catalog, so the detail reflects the latest data even when
/// the product is also in the cached catalog.
#[instrument(skip(state))]
pub async fn show(
    State(state): State<AppState>,
    Path(id): Path<ProductId>,
) -> Result<Json<Product>> {
    let status = state.load_product(id).await;
    let store = state.store().await;

    match status {
        DetailStatus::Ready(ready) if ready == id => store
            .detail()
            .cloned()
            .map(Json)
            .ok_or_else(|| AppError::Internal(format!("detail for product {id} missing"))),
        DetailStatus::NotFound(missing) if missing == id => {
            Err(AppError::NotFound(format!("product {id}")))
        }
        DetailStatus::Failed(failed) if failed == id => {
            Err(AppError::Upstream(format!("product {id} could not be loaded")))
        }
        _ => Err(AppError::Conflict(format!(
            "request for product {id} was superseded"
        ))),
    }
}

/// Categories observed in the catalog.
#[instrument(skip(state))]
pub async fn categories(State(state): State<AppState>) -> Json<Vec<String>> {
    Json(state.store().await.categories())
}
