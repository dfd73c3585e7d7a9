//! HTTP route handlers for storefront.
//!
//! Every handler drives the shared [`Store`](crate::store::Store) and answers
//! with JSON; rendering is left to the client.
//!
//! # Route Structure
//!
//! ```text
//! GET    /health                          - Liveness check
//! GET    /health/ready                    - 200 once a catalog is loaded
//!
//! # Products
//! GET    /api/products                    - Visible list (?categories=&sort=)
//! POST   /api/products/refresh            - Refetch catalog in background (202)
//! GET    /api/products/{id}               - Product detail
//! GET    /api/categories                  - Observed categories
//!
//! # Filters
//! PUT    /api/filters                     - Replace category selection
//! PUT    /api/sort                        - Replace sort option
//! POST   /api/filters/reset               - Back to all / price-low
//!
//! # Cart
//! GET    /api/cart                        - Cart with totals
//! POST   /api/cart/items                  - Add one unit of a product
//! POST   /api/cart/items/{id}/increase    - Quantity + 1
//! POST   /api/cart/items/{id}/decrease    - Quantity - 1 (removes at zero)
//! DELETE /api/cart/items/{id}             - Remove line
//!
//! # Notifications
//! GET    /api/notifications               - Drain pending notices
//! ```

pub mod cart;
pub mod filters;
pub mod health;
pub mod notifications;
pub mod products;

use axum::{
    Router,
    extract::Request,
    middleware,
    routing::{delete, get, post, put},
};
use tower_http::trace::TraceLayer;

use crate::middleware::request_id_middleware;
use crate::state::AppState;

/// Create the product routes router.
pub fn product_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(products::index))
        .route("/refresh", post(products::refresh))
        .route("/{id}", get(products::show))
}

/// Create the filter and sort routes router.
pub fn filter_routes() -> Router<AppState> {
    Router::new()
        .route("/filters", put(filters::update_filter))
        .route("/filters/reset", post(filters::reset))
        .route("/sort", put(filters::update_sort))
}

/// Create the cart routes router.
pub fn cart_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(cart::show))
        .route("/items", post(cart::add))
        .route("/items/{id}", delete(cart::remove))
        .route("/items/{id}/increase", post(cart::increase))
        .route("/items/{id}/decrease", post(cart::decrease))
}

/// Create the JSON API router.
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/products", product_routes())
        .nest("/cart", cart_routes())
        .merge(filter_routes())
        .route("/categories", get(products::categories))
        .route("/notifications", get(notifications::drain))
}

/// Create all routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health::health))
        .route("/health/ready", get(health::readiness))
        .nest("/api", api_routes())
}

/// Build the full application with middleware applied.
pub fn app(state: AppState) -> Router {
    Router::new()
        .merge(routes())
        .layer(middleware::from_fn(request_id_middleware))
        .layer(
            TraceLayer::new_for_http().make_span_with(|request: &Request| {
                tracing::info_span!(
                    "request",
                    method = %request.method(),
                    uri = %request.uri(),
                    request_id = tracing::field::Empty,
                )
            }),
        )
        .with_state(state)
        // Sentry layers (outermost for full request coverage)
        .layer(sentry_tower::NewSentryLayer::new_from_top())
        .layer(sentry_tower::SentryHttpLayer::new().enable_transaction())
}
