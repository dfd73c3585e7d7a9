//! Remote product catalog access.
//!
//! # Architecture
//!
//! - [`CatalogSource`] is the seam between the store's fetch lifecycle and
//!   the network; the application holds it as `Arc<dyn CatalogSource>`
//! - [`CatalogClient`] is the `reqwest` implementation for the REST catalog
//! - No caching and no retries: a failed call is terminal for that call
//!
//! # Endpoints
//!
//! ```text
//! GET /products        - full catalog, JSON array of products
//! GET /products/{id}   - single product
//! ```

mod client;

pub use client::CatalogClient;

use async_trait::async_trait;
use shopcart_core::{Product, ProductId};
use thiserror::Error;

/// Errors that can occur when talking to the remote catalog.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// HTTP request failed (connect, timeout, body read).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Catalog answered with a non-success status.
    #[error("HTTP {status}: {body}")]
    Status {
        /// Response status code.
        status: u16,
        /// Leading part of the response body.
        body: String,
    },

    /// Payload could not be parsed.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// The requested product does not exist.
    #[error("Product not found: {0}")]
    NotFound(ProductId),

    /// Endpoint URL could not be built.
    #[error("Invalid catalog URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
}

impl CatalogError {
    /// Whether this error means the product is absent rather than the call failing.
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}

/// Source of catalog data.
#[async_trait]
pub trait CatalogSource: Send + Sync {
    /// Fetch the full catalog.
    async fn fetch_products(&self) -> Result<Vec<Product>, CatalogError>;

    /// Fetch a single product.
    async fn fetch_product(&self, id: ProductId) -> Result<Product, CatalogError>;
}
