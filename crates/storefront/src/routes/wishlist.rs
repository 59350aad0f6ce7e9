//! Wishlist route handlers.
//!
//! The wishlist store is process-wide and write-through; these handlers
//! only translate between HTTP and [`crate::wishlist::WishlistStore`].

use axum::{Json, extract::State};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use sockworks_core::ProductId;

use crate::error::Result;
use crate::middleware::RequireAuth;
use crate::state::AppState;

/// Wishlist contents response body, in insertion order.
#[derive(Debug, Serialize)]
pub struct WishlistResponse {
    pub product_ids: Vec<ProductId>,
}

/// Toggle request body.
#[derive(Debug, Deserialize)]
pub struct ToggleRequest {
    pub product_id: ProductId,
}

/// Toggle response body.
#[derive(Debug, Serialize)]
pub struct ToggleResponse {
    pub product_id: ProductId,
    /// Membership after the toggle.
    pub in_wishlist: bool,
}

/// Display the wishlist.
#[instrument(skip(state))]
pub async fn show(
    RequireAuth(_user): RequireAuth,
    State(state): State<AppState>,
) -> Result<Json<WishlistResponse>> {
    Ok(Json(WishlistResponse {
        product_ids: state.wishlist().product_ids(),
    }))
}

/// Toggle a product's wishlist membership.
#[instrument(skip(state), fields(product_id = %request.product_id))]
pub async fn toggle(
    RequireAuth(_user): RequireAuth,
    State(state): State<AppState>,
    Json(request): Json<ToggleRequest>,
) -> Result<Json<ToggleResponse>> {
    let in_wishlist = state.wishlist().toggle(request.product_id);
    Ok(Json(ToggleResponse {
        product_id: request.product_id,
        in_wishlist,
    }))
}
