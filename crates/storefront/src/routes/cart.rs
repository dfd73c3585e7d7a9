//! Cart route handlers.
//!
//! Successful mutations queue a success notice for the client to show.

use axum::{
    Json,
    extract::{Path, State},
};
use serde::{Deserialize, Serialize};
use shopcart_core::{Cart, CartItem, Price, Product, ProductId};
use tracing::instrument;

use crate::error::{AppError, Result};
use crate::notifications::Notice;
use crate::state::AppState;

/// Cart line display data.
#[derive(Debug, Clone, Serialize)]
pub struct CartItemView {
    #[serde(flatten)]
    pub product: Product,
    pub qty: u32,
    pub line_total: Price,
}

impl From<&CartItem> for CartItemView {
    fn from(item: &CartItem) -> Self {
        Self {
            product: item.product.clone(),
            qty: item.qty,
            line_total: item.line_total(),
        }
    }
}

/// Cart display data.
#[derive(Debug, Clone, Serialize)]
pub struct CartView {
    pub items: Vec<CartItemView>,
    /// Distinct products in the cart.
    pub total_items: usize,
    /// Sum of all quantities.
    pub total_quantity: u32,
    pub subtotal: Price,
}

impl From<&Cart> for CartView {
    fn from(cart: &Cart) -> Self {
        Self {
            items: cart.items().iter().map(CartItemView::from).collect(),
            total_items: cart.line_count(),
            total_quantity: cart.total_quantity(),
            subtotal: cart.subtotal(),
        }
    }
}

/// Add to cart request body.
#[derive(Debug, Deserialize)]
pub struct AddToCartRequest {
    pub product_id: ProductId,
}

/// Display cart.
#[instrument(skip(state))]
pub async fn show(State(state): State<AppState>) -> Json<CartView> {
    Json(CartView::from(state.store().await.cart()))
}

/// Add one unit of a known product.
///
/// The product must be in the catalog or be the loaded detail.
#[instrument(skip(state))]
pub async fn add(
    State(state): State<AppState>,
    Json(body): Json<AddToCartRequest>,
) -> Result<Json<CartView>> {
    let mut store = state.store().await;
    let product = store
        .find_product(body.product_id)
        .cloned()
        .ok_or_else(|| AppError::NotFound(format!("product {}", body.product_id)))?;

    store.add_to_cart(&product);
    store.notify(Notice::success("Added to cart"));
    Ok(Json(CartView::from(store.cart())))
}

/// Increase a line's quantity.
#[instrument(skip(state))]
pub async fn increase(
    State(state): State<AppState>,
    Path(id): Path<ProductId>,
) -> Result<Json<CartView>> {
    let mut store = state.store().await;
    if !store.increase_qty(id) {
        return Err(not_in_cart(id));
    }
    store.notify(Notice::success("Quantity increased"));
    Ok(Json(CartView::from(store.cart())))
}

/// Decrease a line's quantity, removing it at zero.
#[instrument(skip(state))]
pub async fn decrease(
    State(state): State<AppState>,
    Path(id): Path<ProductId>,
) -> Result<Json<CartView>> {
    let mut store = state.store().await;
    if !store.decrease_qty(id) {
        return Err(not_in_cart(id));
    }
    store.notify(Notice::success("Quantity decreased"));
    Ok(Json(CartView::from(store.cart())))
}

/// Remove a line.
#[instrument(skip(state))]
pub async fn remove(
    State(state): State<AppState>,
    Path(id): Path<ProductId>,
) -> Result<Json<CartView>> {
    let mut store = state.store().await;
    if !store.remove_item(id) {
        return Err(not_in_cart(id));
    }
    store.notify(Notice::success("Item removed"));
    Ok(Json(CartView::from(store.cart())))
}

fn not_in_cart(id: ProductId) -> AppError {
    AppError::NotFound(format!("cart item {id}"))
}
