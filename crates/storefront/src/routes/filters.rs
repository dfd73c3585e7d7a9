//! Filter and sort route handlers.

use axum::{Json, extract::State};
use serde::Deserialize;
use shopcart_core::{CategorySelection, SortOption};
use tracing::instrument;

use super::products::ProductListView;
use crate::error::{AppError, Result};
use crate::state::AppState;

/// Category filter request body.
///
/// An empty list, or one containing `"All"`, clears the filter.
#[derive(Debug, Deserialize)]
pub struct FilterRequest {
    #[serde(default)]
    pub categories: Vec<String>,
}

/// Sort request body.
#[derive(Debug, Deserialize)]
pub struct SortRequest {
    pub sort: String,
}

/// Replace the category selection.
#[instrument(skip(state))]
pub async fn update_filter(
    State(state): State<AppState>,
    Json(body): Json<FilterRequest>,
) -> Json<ProductListView> {
    let mut store = state.store().await;
    store.apply_filter(CategorySelection::from_names(&body.categories));
    Json(ProductListView::from(&*store))
}

/// Replace the sort option.
#[instrument(skip(state))]
pub async fn update_sort(
    State(state): State<AppState>,
    Json(body): Json<SortRequest>,
) -> Result<Json<ProductListView>> {
    let option: SortOption = body
        .sort
        .parse()
        .map_err(|e: shopcart_core::ParseSortError| AppError::BadRequest(e.to_string()))?;

    let mut store = state.store().await;
    store.apply_sort(option);
    Ok(Json(ProductListView::from(&*store)))
}

/// Clear filter and sort.
#[instrument(skip(state))]
pub async fn reset(State(state): State<AppState>) -> Json<ProductListView> {
    let mut store = state.store().await;
    store.reset_filters();
    Json(ProductListView::from(&*store))
}
