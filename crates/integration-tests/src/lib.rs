//! Integration test harness for the storefront.
//!
//! Tests drive the full router in-process (`tower::ServiceExt::oneshot`)
//! against a [`StubCatalog`], so no network or running server is needed.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p shopcart-integration-tests
//! ```

#![allow(clippy::unwrap_used, clippy::missing_panics_doc)]

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use axum::Router;
use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use serde_json::Value;
use shopcart_core::{Price, Product, ProductId};
use shopcart_storefront::catalog::{CatalogError, CatalogSource};
use shopcart_storefront::config::{CatalogConfig, StorefrontConfig};
use shopcart_storefront::location::Location;
use shopcart_storefront::persistence::MemoryStorage;
use shopcart_storefront::routes;
use shopcart_storefront::state::AppState;
use shopcart_storefront::store::{Store, StoreParts};
use tower::ServiceExt;
use url::Url;

/// Build a product with the given fields.
pub fn product(id: i32, category: &str, cents: i64, title: &str) -> Product {
    Product {
        id: ProductId::new(id),
        title: title.to_string(),
        price: Price::from_cents(cents).unwrap(),
        image: format!("https://img.test/{id}.jpg"),
        description: format!("Description of {title}"),
        category: category.to_string(),
    }
}

/// Three-product catalog: two in "a", one in "b".
pub fn scenario_catalog() -> Vec<Product> {
    vec![
        product(1, "a", 1000, "B"),
        product(2, "b", 500, "A"),
        product(3, "a", 2000, "C"),
    ]
}

/// In-memory catalog source with switchable failure.
#[derive(Default)]
pub struct StubCatalog {
    products: Vec<Product>,
    failing: AtomicBool,
    calls: AtomicUsize,
}

impl StubCatalog {
    /// Serve `products`.
    #[must_use]
    pub fn new(products: Vec<Product>) -> Self {
        Self {
            products,
            ..Self::default()
        }
    }

    /// Make every call fail with an upstream error.
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// Number of calls received.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn check(&self) -> Result<(), CatalogError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.failing.load(Ordering::SeqCst) {
            return Err(CatalogError::Status {
                status: 503,
                body: "unavailable".to_string(),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl CatalogSource for StubCatalog {
    async fn fetch_products(&self) -> Result<Vec<Product>, CatalogError> {
        self.check()?;
        Ok(self.products.clone())
    }

    async fn fetch_product(&self, id: ProductId) -> Result<Product, CatalogError> {
        self.check()?;
        self.products
            .iter()
            .find(|p| p.id == id)
            .cloned()
            .ok_or(CatalogError::NotFound(id))
    }
}

/// A storefront wired to a stub catalog.
pub struct TestContext {
    pub state: AppState,
    pub catalog: Arc<StubCatalog>,
    pub app: Router,
}

impl TestContext {
    /// Storefront with empty storage serving `products`.
    #[must_use]
    pub fn new(products: Vec<Product>) -> Self {
        Self::with_storage(products, MemoryStorage::new(), MemoryStorage::new())
    }

    /// Storefront opened over the given storage.
    #[must_use]
    pub fn with_storage(
        products: Vec<Product>,
        durable: MemoryStorage,
        session: MemoryStorage,
    ) -> Self {
        let config = test_config();
        let store = Store::open(StoreParts {
            durable: Box::new(durable),
            session: Box::new(session),
            location: Location::new(config.base_url.clone()),
        });
        let catalog = Arc::new(StubCatalog::new(products));
        let state = AppState::new(config, store, catalog.clone());
        let app = routes::app(state.clone());
        Self {
            state,
            catalog,
            app,
        }
    }

    /// Storefront whose catalog is already loaded.
    pub async fn loaded(products: Vec<Product>) -> Self {
        let ctx = Self::new(products);
        ctx.state.refresh_catalog().await;
        ctx
    }

    /// Send a request and return status and parsed JSON body (`Null` if not JSON).
    pub async fn send(&self, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let response = self.send_raw(method, uri, body).await;
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, json)
    }

    /// Send a request and return the raw response.
    pub async fn send_raw(
        &self,
        method: Method,
        uri: &str,
        body: Option<Value>,
    ) -> axum::response::Response {
        let builder = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(json) => builder
                .header("content-type", "application/json")
                .body(Body::from(json.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };
        self.app.clone().oneshot(request).await.unwrap()
    }

    pub async fn get(&self, uri: &str) -> (StatusCode, Value) {
        self.send(Method::GET, uri, None).await
    }

    pub async fn post(&self, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        self.send(Method::POST, uri, body).await
    }

    pub async fn put(&self, uri: &str, body: Value) -> (StatusCode, Value) {
        self.send(Method::PUT, uri, Some(body)).await
    }

    pub async fn delete(&self, uri: &str) -> (StatusCode, Value) {
        self.send(Method::DELETE, uri, None).await
    }

    /// Wait for a background catalog fetch to settle.
    pub async fn wait_until_loaded(&self) {
        for _ in 0..100 {
            if !self.state.store().await.is_loading() {
                return;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        panic!("catalog fetch did not settle");
    }
}

/// Configuration pointing at unroutable addresses; nothing dials out.
#[must_use]
pub fn test_config() -> StorefrontConfig {
    StorefrontConfig {
        host: "127.0.0.1".parse().unwrap(),
        port: 0,
        base_url: Url::parse("http://shop.test/").unwrap(),
        data_dir: std::env::temp_dir(),
        catalog: CatalogConfig {
            base_url: Url::parse("http://catalog.invalid/").unwrap(),
            timeout: Duration::from_secs(1),
        },
        sentry_dsn: None,
        sentry_environment: None,
    }
}

/// Product ids of a JSON product array.
pub fn ids(products: &Value) -> Vec<i64> {
    products
        .as_array()
        .map(|items| items.iter().filter_map(|p| p["id"].as_i64()).collect())
        .unwrap_or_default()
}

/// Convenience: id/qty pairs of a cart view.
pub fn cart_lines(cart: &Value) -> Vec<(i64, i64)> {
    cart["items"]
        .as_array()
        .map(|items| {
            items
                .iter()
                .filter_map(|item| Some((item["id"].as_i64()?, item["qty"].as_i64()?)))
                .collect()
        })
        .unwrap_or_default()
}

/// Group notices by level.
pub fn notices_by_level(notices: &Value) -> HashMap<String, Vec<String>> {
    let mut grouped: HashMap<String, Vec<String>> = HashMap::new();
    for notice in notices.as_array().into_iter().flatten() {
        let level = notice["level"].as_str().unwrap_or_default().to_string();
        let message = notice["message"].as_str().unwrap_or_default().to_string();
        grouped.entry(level).or_default().push(message);
    }
    grouped
}
