//! Product catalogue access and browsing.
//!
//! The catalogue lives in the hosted backend; this module fronts it with a
//! `moka` cache (5-minute TTL, invalidated on admin writes) and provides
//! the pure filter/sort used by the catalogue page.

use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;
use rust_decimal::Decimal;
use tracing::{debug, instrument};

use sockworks_core::ProductId;

use crate::backend::{BackendError, BackendGateway};
use crate::models::Product;

/// Cache TTL for the product list.
const CACHE_TTL: Duration = Duration::from_secs(300);

const PRODUCTS_KEY: &str = "products";

/// Cached, read-only view of the product catalogue.
#[derive(Clone)]
pub struct Catalog {
    inner: Arc<CatalogInner>,
}

struct CatalogInner {
    gateway: Arc<dyn BackendGateway>,
    cache: Cache<&'static str, Arc<Vec<Product>>>,
}

impl Catalog {
    /// Create a catalogue over the given gateway.
    #[must_use]
    pub fn new(gateway: Arc<dyn BackendGateway>) -> Self {
        let cache = Cache::builder()
            .max_capacity(16)
            .time_to_live(CACHE_TTL)
            .build();

        Self {
            inner: Arc::new(CatalogInner { gateway, cache }),
        }
    }

    /// The full product list, cached.
    ///
    /// # Errors
    ///
    /// Returns the gateway error if the backend read fails on a cache miss.
    #[instrument(skip(self))]
    pub async fn list_products(&self) -> Result<Arc<Vec<Product>>, BackendError> {
        if let Some(products) = self.inner.cache.get(PRODUCTS_KEY).await {
            debug!("cache hit for product list");
            return Ok(products);
        }

        let products = Arc::new(self.inner.gateway.list_products().await?);
        self.inner.cache.insert(PRODUCTS_KEY, products.clone()).await;
        Ok(products)
    }

    /// Look up a single product by id.
    ///
    /// # Errors
    ///
    /// Returns the gateway error if the backend read fails on a cache miss.
    #[instrument(skip(self), fields(product_id = %id))]
    pub async fn get_product(&self, id: ProductId) -> Result<Option<Product>, BackendError> {
        let products = self.list_products().await?;
        Ok(products.iter().find(|p| p.id == id).cloned())
    }

    /// Drop cached data. Called after admin writes so the storefront sees
    /// them immediately instead of after the TTL.
    pub async fn invalidate(&self) {
        self.inner.cache.invalidate_all();
        self.inner.cache.run_pending_tasks().await;
    }
}

/// Sort orders for the catalogue page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SortOption {
    /// Curated order - whatever order the catalogue returns.
    #[default]
    Featured,
    PriceAsc,
    PriceDesc,
    NameAsc,
    NameDesc,
}

/// Catalogue page filters. All fields optional; an empty filter keeps
/// everything in featured order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CatalogFilter {
    /// Inclusive lower price bound.
    pub price_min: Option<Decimal>,
    /// Inclusive upper price bound.
    pub price_max: Option<Decimal>,
    /// Keep products available in at least one of these sizes.
    pub sizes: Vec<String>,
    pub sort: SortOption,
}

impl CatalogFilter {
    fn matches(&self, product: &Product) -> bool {
        if let Some(min) = self.price_min
            && product.price.amount < min
        {
            return false;
        }
        if let Some(max) = self.price_max
            && product.price.amount > max
        {
            return false;
        }
        if !self.sizes.is_empty()
            && !product.sizes.iter().any(|size| self.sizes.contains(size))
        {
            return false;
        }
        true
    }

    /// Apply the filter and sort to a product list.
    ///
    /// Deterministic: `Featured` preserves the input order, and all sorts
    /// are stable.
    #[must_use]
    pub fn apply(&self, products: &[Product]) -> Vec<Product> {
        let mut result: Vec<Product> = products
            .iter()
            .filter(|p| self.matches(p))
            .cloned()
            .collect();

        match self.sort {
            SortOption::Featured => {}
            SortOption::PriceAsc => result.sort_by_key(|p| p.price.amount),
            SortOption::PriceDesc => {
                result.sort_by(|a, b| b.price.amount.cmp(&a.price.amount));
            }
            SortOption::NameAsc => {
                result.sort_by(|a, b| a.name.to_lowercase().cmp(&b.name.to_lowercase()));
            }
            SortOption::NameDesc => {
                result.sort_by(|a, b| b.name.to_lowercase().cmp(&a.name.to_lowercase()));
            }
        }

        result
    }
}
