//! Order route handlers.
//!
//! The invoice view: one order, visible to its owner and to admins.

use axum::{
    Json,
    extract::{Path, State},
};
use tracing::instrument;

use sockworks_core::OrderId;

use crate::error::{AppError, Result};
use crate::middleware::RequireAuth;
use crate::models::Order;
use crate::state::AppState;

/// Display a single order.
#[instrument(skip(state), fields(user_id = %user.id))]
pub async fn show(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<Order>> {
    let order = state.gateway().get_order(OrderId::new(id)).await?;

    if order.user_id != user.id && !user.is_admin() {
        return Err(AppError::Forbidden(
            "This order belongs to another account.".to_string(),
        ));
    }

    Ok(Json(order))
}
