//! Admin route handlers: order management and product CRUD.
//!
//! Everything here requires [`RequireAdmin`]. Product writes invalidate
//! the catalogue cache so the storefront reflects them immediately.

use axum::{
    Json,
    extract::{Multipart, Path, Query, State},
    http::StatusCode,
};
use chrono::{NaiveDate, TimeDelta};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::instrument;

use sockworks_core::{OrderId, OrderStatus, Price, ProductId, UserId};

use crate::backend::OrderFilter;
use crate::error::{AppError, Result};
use crate::middleware::RequireAdmin;
use crate::models::{NewProduct, Order, Product};
use crate::state::AppState;

// =============================================================================
// Order Management
// =============================================================================

/// Admin order listing query parameters.
#[derive(Debug, Default, Deserialize)]
pub struct AdminOrdersQuery {
    pub status: Option<OrderStatus>,
    /// Inclusive start date, `YYYY-MM-DD`.
    pub date_from: Option<NaiveDate>,
    /// Inclusive end date, `YYYY-MM-DD`.
    pub date_to: Option<NaiveDate>,
}

impl From<AdminOrdersQuery> for OrderFilter {
    fn from(query: AdminOrdersQuery) -> Self {
        Self {
            status: query.status,
            date_from: query
                .date_from
                .and_then(|d| d.and_hms_opt(0, 0, 0))
                .map(|dt| dt.and_utc()),
            // End of day: the filter is inclusive of the whole end date.
            date_to: query
                .date_to
                .and_then(|d| d.and_hms_opt(0, 0, 0))
                .map(|dt| dt.and_utc() + TimeDelta::days(1) - TimeDelta::seconds(1)),
        }
    }
}

/// An order joined with its customer's email for the admin table.
#[derive(Debug, Serialize)]
pub struct AdminOrderView {
    #[serde(flatten)]
    pub order: Order,
    /// Customer email, falling back to the raw user id when the profile
    /// cannot be resolved.
    pub user_email: String,
}

/// Admin order listing response body.
#[derive(Debug, Serialize)]
pub struct AdminOrdersResponse {
    pub orders: Vec<AdminOrderView>,
}

/// List orders, newest first, with optional status and date filters.
#[instrument(skip(state, query))]
pub async fn list_orders(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Query(query): Query<AdminOrdersQuery>,
) -> Result<Json<AdminOrdersResponse>> {
    let filter = OrderFilter::from(query);
    let orders = state.gateway().list_orders(&filter).await?;

    // Join customer emails from profiles. A failed lookup degrades to
    // showing raw user ids instead of failing the listing.
    let mut user_ids: Vec<UserId> = orders.iter().map(|o| o.user_id.clone()).collect();
    user_ids.sort_by(|a, b| a.as_str().cmp(b.as_str()));
    user_ids.dedup();

    let email_of: std::collections::HashMap<UserId, String> = match state
        .gateway()
        .get_profiles(&user_ids)
        .await
    {
        Ok(profiles) => profiles
            .into_iter()
            .filter_map(|p| p.email.map(|email| (p.id, email.into_inner())))
            .collect(),
        Err(e) => {
            tracing::warn!(error = %e, "profile join failed, showing user ids");
            std::collections::HashMap::new()
        }
    };

    let orders = orders
        .into_iter()
        .map(|order| {
            let user_email = email_of
                .get(&order.user_id)
                .cloned()
                .unwrap_or_else(|| order.user_id.to_string());
            AdminOrderView { order, user_email }
        })
        .collect();

    Ok(Json(AdminOrdersResponse { orders }))
}

/// Status update request body.
#[derive(Debug, Deserialize)]
pub struct UpdateStatusRequest {
    pub status: OrderStatus,
}

/// Advance an order's status.
#[instrument(skip(state), fields(order_id = %id))]
pub async fn update_order_status(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Json(request): Json<UpdateStatusRequest>,
) -> Result<StatusCode> {
    state
        .gateway()
        .update_order_status(OrderId::new(id), request.status)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

// =============================================================================
// Product CRUD
// =============================================================================

/// Product create/update request body.
#[derive(Debug, Deserialize)]
pub struct ProductRequest {
    pub name: String,
    pub description: String,
    /// Bare decimal amount in the storefront's currency.
    pub price: Decimal,
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default)]
    pub sizes: Vec<String>,
}

impl ProductRequest {
    /// Validate into a [`NewProduct`] in the storefront's currency.
    fn into_new_product(self, state: &AppState) -> Result<NewProduct> {
        if self.name.trim().is_empty() {
            return Err(AppError::BadRequest("A product name is required.".to_string()));
        }
        let price = Price::non_negative(self.price, state.config().backend.currency)
            .map_err(|e| AppError::BadRequest(e.to_string()))?;

        Ok(NewProduct {
            name: self.name,
            description: self.description,
            price,
            images: self.images,
            sizes: self.sizes,
        })
    }
}

/// Create a product.
#[instrument(skip(state, request), fields(name = %request.name))]
pub async fn create_product(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Json(request): Json<ProductRequest>,
) -> Result<(StatusCode, Json<Product>)> {
    let product = request.into_new_product(&state)?;
    let created = state.gateway().insert_product(&product).await?;
    state.catalog().invalidate().await;

    Ok((StatusCode::CREATED, Json(created)))
}

/// Update a product.
#[instrument(skip(state, request), fields(product_id = %id))]
pub async fn update_product(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Json(request): Json<ProductRequest>,
) -> Result<Json<Product>> {
    let product = request.into_new_product(&state)?;
    let updated = state
        .gateway()
        .update_product(ProductId::new(id), &product)
        .await?;
    state.catalog().invalidate().await;

    Ok(Json(updated))
}

/// Delete a product.
#[instrument(skip(state), fields(product_id = %id))]
pub async fn delete_product(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<StatusCode> {
    state.gateway().delete_product(ProductId::new(id)).await?;
    state.catalog().invalidate().await;

    Ok(StatusCode::NO_CONTENT)
}

// =============================================================================
// Image Upload
// =============================================================================

/// Image upload response body.
#[derive(Debug, Serialize)]
pub struct UploadResponse {
    /// Signed URLs for the uploaded images, in upload order.
    pub urls: Vec<String>,
}

/// Upload product images (multipart) and return signed URLs.
#[instrument(skip(state, multipart))]
pub async fn upload_images(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>> {
    let mut urls = Vec::new();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(e.to_string()))?
    {
        let Some(filename) = field.file_name().map(ToString::to_string) else {
            continue;
        };
        let content_type = field
            .content_type()
            .map_or_else(|| "application/octet-stream".to_string(), ToString::to_string);
        let bytes = field
            .bytes()
            .await
            .map_err(|e| AppError::BadRequest(e.to_string()))?;

        let url = state
            .gateway()
            .upload_image(&filename, &content_type, bytes.to_vec())
            .await?;
        urls.push(url);
    }

    if urls.is_empty() {
        return Err(AppError::BadRequest("No image files in upload.".to_string()));
    }

    Ok(Json(UploadResponse { urls }))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_date_filters_cover_whole_days() {
        let query = AdminOrdersQuery {
            status: None,
            date_from: NaiveDate::from_ymd_opt(2026, 8, 1),
            date_to: NaiveDate::from_ymd_opt(2026, 8, 3),
        };
        let filter = OrderFilter::from(query);

        let from = filter.date_from.unwrap();
        let to = filter.date_to.unwrap();
        assert_eq!(from.to_rfc3339(), "2026-08-01T00:00:00+00:00");
        // Inclusive of the last second of the end date
        assert_eq!(to.to_rfc3339(), "2026-08-03T23:59:59+00:00");
    }

    #[test]
    fn test_empty_query_maps_to_empty_filter() {
        let filter = OrderFilter::from(AdminOrdersQuery::default());
        assert_eq!(filter, OrderFilter::default());
    }
}
