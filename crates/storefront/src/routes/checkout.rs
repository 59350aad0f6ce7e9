//! Checkout route handler.
//!
//! Orchestrates one checkout attempt: validate the delivery fields,
//! capture an immutable snapshot of the session's cart, and submit it
//! through the gateway. The session cart is cleared only after the
//! backend confirms the order - a failed submission leaves it exactly as
//! it was so the user can retry.

use axum::{Json, extract::State};
use serde::{Deserialize, Serialize};
use tower_sessions::Session;
use tracing::instrument;

use sockworks_core::{DeliveryMethod, OrderId, Price};

use crate::checkout::{DeliveryDetails, OrderSnapshot, Submission, place_order};
use crate::error::{AppError, Result};
use crate::middleware::RequireAuth;
use crate::state::AppState;

use super::cart::{load_cart, save_cart};

/// Checkout request body: the delivery form fields.
#[derive(Debug, Deserialize)]
pub struct CheckoutRequest {
    #[serde(default)]
    pub delivery_method: DeliveryMethod,
    pub location: String,
    pub phone: String,
    #[serde(default)]
    pub notes: String,
}

/// Successful checkout response body.
#[derive(Debug, Serialize)]
pub struct CheckoutResponse {
    pub order_id: OrderId,
    /// The submitted total - identical to the total the cart displayed,
    /// because both come from the same snapshot.
    pub total: Price,
}

/// Submit the session's cart as an order.
#[instrument(skip(state, session, request), fields(user_id = %user.id))]
pub async fn submit(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
    session: Session,
    Json(request): Json<CheckoutRequest>,
) -> Result<Json<CheckoutResponse>> {
    let cart = load_cart(&session).await?;
    let products = state.catalog().list_products().await?;

    let delivery = DeliveryDetails {
        delivery_method: request.delivery_method,
        location: request.location,
        phone: request.phone,
        notes: request.notes,
    };

    // Atomic copy: cart edits made after this point cannot change what is
    // submitted.
    let snapshot = OrderSnapshot::capture(
        &cart,
        |id| products.iter().find(|p| p.id == id),
        delivery,
    )?;
    let total = snapshot.total();

    let mut submission = Submission::default();
    submission
        .begin()
        .map_err(|e| AppError::BadRequest(e.to_string()))?;

    match place_order(state.gateway(), &user, snapshot).await {
        Ok(order_id) => {
            let _ = submission.complete(order_id);

            let mut cart = cart;
            cart.clear();
            save_cart(&session, &cart).await?;

            Ok(Json(CheckoutResponse { order_id, total }))
        }
        Err(e) => {
            // Cart state is untouched; the user can retry from where they
            // were.
            let _ = submission.fail(e.to_string());
            tracing::warn!(error = %e, "order submission failed");
            Err(AppError::Backend(e))
        }
    }
}
