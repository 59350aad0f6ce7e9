//! Product route handlers.

use axum::{
    Json,
    extract::{Path, Query, State},
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::instrument;

use sockworks_core::ProductId;

use crate::catalog::{CatalogFilter, SortOption};
use crate::error::{AppError, Result};
use crate::models::Product;
use crate::state::AppState;

/// Catalogue listing query parameters.
#[derive(Debug, Default, Deserialize)]
pub struct ProductListQuery {
    pub price_min: Option<Decimal>,
    pub price_max: Option<Decimal>,
    /// Comma-separated size labels, e.g. `sizes=Small,Medium`.
    pub sizes: Option<String>,
    pub sort: Option<SortOption>,
}

impl From<ProductListQuery> for CatalogFilter {
    fn from(query: ProductListQuery) -> Self {
        Self {
            price_min: query.price_min,
            price_max: query.price_max,
            sizes: query
                .sizes
                .map(|s| {
                    s.split(',')
                        .map(str::trim)
                        .filter(|s| !s.is_empty())
                        .map(ToString::to_string)
                        .collect()
                })
                .unwrap_or_default(),
            sort: query.sort.unwrap_or_default(),
        }
    }
}

/// Catalogue listing response body.
#[derive(Debug, Serialize)]
pub struct ProductListResponse {
    pub products: Vec<Product>,
    pub count: usize,
}

/// Product listing with filtering and sorting.
#[instrument(skip(state, query))]
pub async fn index(
    State(state): State<AppState>,
    Query(query): Query<ProductListQuery>,
) -> Result<Json<ProductListResponse>> {
    let products = state.catalog().list_products().await?;
    let filter = CatalogFilter::from(query);
    let products = filter.apply(&products);

    Ok(Json(ProductListResponse {
        count: products.len(),
        products,
    }))
}

/// Product detail.
#[instrument(skip(state))]
pub async fn show(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<Product>> {
    let id = ProductId::new(id);
    state
        .catalog()
        .get_product(id)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("product {id}")))
}
