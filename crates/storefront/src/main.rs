//! Sockworks Storefront - headless e-commerce service.
//!
//! This binary serves the storefront JSON API on port 3000.
//!
//! # Architecture
//!
//! - Axum web framework, JSON responses for an external SPA
//! - Session-scoped cart (tower-sessions, in-memory store)
//! - Hosted backend for auth, products, orders, and image storage,
//!   reached through a single gateway interface
//! - Process-wide wishlist persisted to a JSON blob on disk
//!
//! # Security
//!
//! The service-role backend key never leaves this process; browsers only
//! ever hold their session cookie.

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::sync::Arc;

use axum::{Router, routing::get};
use sentry::integrations::tracing as sentry_tracing;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use sockworks_storefront::backend::RestBackend;
use sockworks_storefront::config::StorefrontConfig;
use sockworks_storefront::middleware::{create_session_layer, request_id_middleware};
use sockworks_storefront::routes;
use sockworks_storefront::state::AppState;
use sockworks_storefront::wishlist::{FileBlobStore, WishlistStore};

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

/// Build the CORS layer for the configured SPA origin, if any.
fn cors_layer(config: &StorefrontConfig) -> Option<tower_http::cors::CorsLayer> {
    use axum::http::{HeaderValue, Method, header};

    let origin = config.allowed_origin.as_ref()?;
    let origin = origin.parse::<HeaderValue>().ok()?;

    Some(
        tower_http::cors::CorsLayer::new()
            .allow_origin(origin)
            .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
            .allow_headers([header::CONTENT_TYPE])
            .allow_credentials(true),
    )
}

#[tokio::main]
async fn main() {
    // Load configuration from environment (needed for Sentry init)
    let config = StorefrontConfig::from_env().expect("Failed to load configuration");

    // Initialize Sentry (must be done before tracing subscriber)
    let _sentry_guard = init_sentry(&config);

    // Initialize tracing with EnvFilter and Sentry integration
    // Defaults to info level for our crate if RUST_LOG is not set
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "sockworks_storefront=info,tower_http=debug".into());

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .with(sentry_tracing::layer().event_filter(sentry_event_filter))
        .init();

    // Load the process-wide wishlist from its blob
    let wishlist = WishlistStore::load(Box::new(FileBlobStore::new(&config.wishlist_path)));
    tracing::info!(path = %config.wishlist_path.display(), "wishlist loaded");

    // Backend gateway and application state
    let gateway = Arc::new(RestBackend::new(&config.backend));
    let state = AppState::new(config.clone(), gateway, wishlist);

    // Create session layer
    let session_layer = create_session_layer(config.is_secure());

    // Build router
    let mut app = Router::new()
        .route("/health", get(health))
        .merge(routes::routes())
        .layer(axum::middleware::from_fn(request_id_middleware))
        .layer(session_layer)
        .layer(TraceLayer::new_for_http());

    if let Some(cors) = cors_layer(&config) {
        app = app.layer(cors);
    }

    let app = app
        .with_state(state)
        // Sentry layers (outermost for full request coverage)
        .layer(sentry_tower::NewSentryLayer::new_from_top())
        .layer(sentry_tower::SentryHttpLayer::new().enable_transaction());

    // Start server
    let addr = config.socket_addr();
    tracing::info!("storefront listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind to address");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Server error");
}

/// Liveness health check endpoint.
///
/// Returns "ok" if the server is running. Does not check dependencies.
async fn health() -> &'static str {
    "ok"
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
