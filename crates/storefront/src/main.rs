//! Shopcart Storefront - catalog browsing and cart service.
//!
//! Serves the JSON storefront API on port 3000 by default.
//!
//! # Architecture
//!
//! - One `Store` per process, created at startup and torn down on shutdown
//! - Durable state (catalog snapshot, cart) in files under `STOREFRONT_DATA_DIR`
//! - Session state (filter, sort) in memory for the life of the process
//! - Remote REST catalog for products

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::sync::Arc;

use sentry::integrations::tracing as sentry_tracing;
use shopcart_storefront::catalog::CatalogClient;
use shopcart_storefront::config::StorefrontConfig;
use shopcart_storefront::location::Location;
use shopcart_storefront::persistence::{FileStorage, MemoryStorage};
use shopcart_storefront::routes;
use shopcart_storefront::state::AppState;
use shopcart_storefront::store::{Store, StoreParts};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize Sentry error tracking and return guard that must be kept alive.
fn init_sentry(config: &StorefrontConfig) -> Option<sentry::ClientInitGuard> {
    let dsn = config.sentry_dsn.as_ref()?;

    let guard = sentry::init((
        dsn.as_str(),
        sentry::ClientOptions {
            release: sentry::release_name!(),
            environment: config
                .sentry_environment
                .clone()
                .map(std::borrow::Cow::Owned),
            attach_stacktrace: true,
            ..Default::default()
        },
    ));

    tracing::info!("Sentry initialized");
    Some(guard)
}

/// Filter tracing events to Sentry event types.
fn sentry_event_filter(metadata: &tracing::Metadata<'_>) -> sentry_tracing::EventFilter {
    match *metadata.level() {
        tracing::Level::ERROR | tracing::Level::WARN => sentry_tracing::EventFilter::Event,
        tracing::Level::INFO | tracing::Level::DEBUG => sentry_tracing::EventFilter::Breadcrumb,
        _ => sentry_tracing::EventFilter::Ignore,
    }
}

#[tokio::main]
async fn main() {
    // Load configuration from environment (needed for Sentry init)
    let config = StorefrontConfig::from_env().expect("Failed to load configuration");

    // Initialize Sentry (must be done before tracing subscriber)
    let _sentry_guard = init_sentry(&config);

    // Defaults to info level for our crate if RUST_LOG is not set
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "shopcart_storefront=info,tower_http=debug".into());

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .with(sentry_tracing::layer().event_filter(sentry_event_filter))
        .init();

    let durable = FileStorage::open(&config.data_dir).expect("Failed to open data directory");
    tracing::info!(dir = %durable.dir().display(), "Durable storage opened");

    let catalog = CatalogClient::new(&config.catalog).expect("Failed to build catalog client");
    tracing::info!(catalog = %catalog.base_url(), "Catalog client ready");

    let store = Store::open(StoreParts {
        durable: Box::new(durable),
        session: Box::new(MemoryStorage::new()),
        location: Location::new(config.base_url.clone()),
    });

    let state = AppState::new(config.clone(), store, Arc::new(catalog));

    // Fetch in the background when nothing was stored
    state.prime_catalog().await;

    let app = routes::app(state.clone());

    let addr = config.socket_addr();
    tracing::info!("storefront listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind to address");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Server error");

    // Every mutation was written through; log what is left for the next run
    let store = state.store().await;
    tracing::info!(
        products = store.catalog().len(),
        cart_lines = store.cart().line_count(),
        "Store closed"
    );
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("Shutdown signal received, starting graceful shutdown");
}
