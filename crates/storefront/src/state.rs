//! Application state shared across handlers.

use std::sync::Arc;

use crate::backend::BackendGateway;
use crate::catalog::Catalog;
use crate::config::StorefrontConfig;
use crate::wishlist::WishlistStore;

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to the
/// configuration, the backend gateway, the cached catalogue, and the
/// process-wide wishlist store.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: StorefrontConfig,
    gateway: Arc<dyn BackendGateway>,
    catalog: Catalog,
    wishlist: WishlistStore,
}

impl AppState {
    /// Create a new application state.
    ///
    /// The gateway is taken as a trait object so tests can substitute an
    /// in-memory backend; the catalogue shares the same gateway.
    #[must_use]
    pub fn new(
        config: StorefrontConfig,
        gateway: Arc<dyn BackendGateway>,
        wishlist: WishlistStore,
    ) -> Self {
        let catalog = Catalog::new(gateway.clone());

        Self {
            inner: Arc::new(AppStateInner {
                config,
                gateway,
                catalog,
                wishlist,
            }),
        }
    }

    /// Get a reference to the storefront configuration.
    #[must_use]
    pub fn config(&self) -> &StorefrontConfig {
        &self.inner.config
    }

    /// Get a reference to the backend gateway.
    #[must_use]
    pub fn gateway(&self) -> &dyn BackendGateway {
        self.inner.gateway.as_ref()
    }

    /// Get a reference to the product catalogue.
    #[must_use]
    pub fn catalog(&self) -> &Catalog {
        &self.inner.catalog
    }

    /// Get a reference to the wishlist store.
    #[must_use]
    pub fn wishlist(&self) -> &WishlistStore {
        &self.inner.wishlist
    }
}
