//! `reqwest` client for the REST product catalog.

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use shopcart_core::{Product, ProductId};
use tracing::{debug, instrument};
use url::Url;

use super::{CatalogError, CatalogSource};
use crate::config::CatalogConfig;

/// Maximum number of body characters kept in logs and errors.
const BODY_EXCERPT_CHARS: usize = 200;

/// Client for the remote product catalog.
///
/// Cheap to clone; clones share one connection pool.
#[derive(Clone)]
pub struct CatalogClient {
    inner: Arc<CatalogClientInner>,
}

struct CatalogClientInner {
    client: reqwest::Client,
    base_url: Url,
}

impl CatalogClient {
    /// Create a new catalog client.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying HTTP client cannot be built.
    pub fn new(config: &CatalogConfig) -> Result<Self, CatalogError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()?;

        // Url::join replaces the last path segment unless the base ends in '/'
        let mut base_url = config.base_url.clone();
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        Ok(Self {
            inner: Arc::new(CatalogClientInner { client, base_url }),
        })
    }

    /// Base URL all endpoints are resolved against.
    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.inner.base_url
    }

    fn products_url(&self) -> Result<Url, CatalogError> {
        Ok(self.inner.base_url.join("products")?)
    }

    fn product_url(&self, id: ProductId) -> Result<Url, CatalogError> {
        Ok(self.inner.base_url.join(&format!("products/{id}"))?)
    }

    /// Issue a GET and return the status with the body text.
    async fn get_text(&self, url: Url) -> Result<(StatusCode, String), CatalogError> {
        let response = self.inner.client.get(url).send().await?;
        let status = response.status();
        let text = response.text().await?;
        debug!(status = %status, bytes = text.len(), "Catalog response received");
        Ok((status, text))
    }
}

#[async_trait]
impl CatalogSource for CatalogClient {
    #[instrument(skip(self))]
    async fn fetch_products(&self) -> Result<Vec<Product>, CatalogError> {
        let (status, text) = self.get_text(self.products_url()?).await?;
        ensure_success(status, &text)?;
        parse_body(&text)
    }

    #[instrument(skip(self))]
    async fn fetch_product(&self, id: ProductId) -> Result<Product, CatalogError> {
        let (status, text) = self.get_text(self.product_url(id)?).await?;
        if status == StatusCode::NOT_FOUND {
            return Err(CatalogError::NotFound(id));
        }
        ensure_success(status, &text)?;
        parse_product(id, &text)
    }
}

/// Map a non-success status to [`CatalogError::Status`].
fn ensure_success(status: StatusCode, text: &str) -> Result<(), CatalogError> {
    if status.is_success() {
        return Ok(());
    }
    let body = excerpt(text);
    tracing::error!(status = %status, body = %body, "Catalog returned non-success status");
    Err(CatalogError::Status {
        status: status.as_u16(),
        body,
    })
}

/// Parse a detail payload.
///
/// The catalog answers unknown ids with `200` and an empty or `null` body;
/// both mean the product does not exist.
fn parse_product(id: ProductId, text: &str) -> Result<Product, CatalogError> {
    let trimmed = text.trim();
    if trimmed.is_empty() || trimmed == "null" {
        return Err(CatalogError::NotFound(id));
    }
    parse_body(trimmed)
}

fn parse_body<T: DeserializeOwned>(text: &str) -> Result<T, CatalogError> {
    serde_json::from_str(text).map_err(|e| {
        tracing::error!(
            error = %e,
            body = %excerpt(text),
            "Failed to parse catalog response"
        );
        CatalogError::Parse(e)
    })
}

fn excerpt(text: &str) -> String {
    text.chars().take(BODY_EXCERPT_CHARS).collect()
}
