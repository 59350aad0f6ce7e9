//! Cart route handlers.
//!
//! The cart lives in the session; every handler loads it, applies one
//! transition from [`crate::cart`], and writes it back. Responses always
//! carry the derived subtotal and item count, recomputed from the state
//! being returned - never from a cache.
//!
//! All cart operations require a logged-in user.

use axum::{Json, extract::State};
use serde::{Deserialize, Serialize};
use tower_sessions::Session;
use tracing::instrument;

use sockworks_core::{Price, ProductId};

use crate::cart::{CartSignal, CartState, pricing};
use crate::error::{AppError, Result};
use crate::middleware::RequireAuth;
use crate::models::{Product, session_keys};
use crate::state::AppState;

/// One cart line joined with its catalogue product, for display.
#[derive(Debug, Clone, Serialize)]
pub struct CartLineView {
    pub product_id: ProductId,
    pub name: String,
    pub price: Price,
    pub quantity: u32,
    pub line_total: Price,
}

/// Cart display data.
#[derive(Debug, Clone, Serialize)]
pub struct CartResponse {
    pub items: Vec<CartLineView>,
    pub subtotal: Price,
    pub item_count: u32,
    /// UI signal: the cart panel should open (set on add).
    pub open_panel: bool,
}

impl CartResponse {
    /// Join the cart against the catalogue and derive totals.
    ///
    /// Lines whose product has left the catalogue are not rendered and do
    /// not count toward the subtotal.
    fn build(cart: &CartState, products: &[Product], signal: Option<CartSignal>) -> Self {
        let lookup = |id: ProductId| products.iter().find(|p| p.id == id);

        let items = cart
            .lines()
            .iter()
            .filter_map(|line| {
                lookup(line.product_id).map(|product| CartLineView {
                    product_id: product.id,
                    name: product.name.clone(),
                    price: product.price,
                    quantity: line.quantity,
                    line_total: product.price.times(line.quantity),
                })
            })
            .collect();

        Self {
            items,
            subtotal: pricing::subtotal(cart, |id| lookup(id).map(|p| p.price)),
            item_count: pricing::item_count(cart),
            open_panel: matches!(signal, Some(CartSignal::OpenPanel)),
        }
    }
}

/// Load the session's cart, starting empty if none exists yet.
pub(crate) async fn load_cart(session: &Session) -> Result<CartState> {
    Ok(session
        .get::<CartState>(session_keys::CART)
        .await?
        .unwrap_or_default())
}

/// Write the cart back to the session.
pub(crate) async fn save_cart(session: &Session, cart: &CartState) -> Result<()> {
    session.insert(session_keys::CART, cart).await?;
    Ok(())
}

/// Add to cart request body.
#[derive(Debug, Deserialize)]
pub struct AddToCartRequest {
    pub product_id: ProductId,
    pub quantity: Option<u32>,
}

/// Update quantity request body.
#[derive(Debug, Deserialize)]
pub struct UpdateCartRequest {
    pub product_id: ProductId,
    pub quantity: u32,
}

/// Remove from cart request body.
#[derive(Debug, Deserialize)]
pub struct RemoveFromCartRequest {
    pub product_id: ProductId,
}

/// Item count response body.
#[derive(Debug, Serialize)]
pub struct CartCountResponse {
    pub count: u32,
}

/// Display the current cart.
#[instrument(skip(state, session))]
pub async fn show(
    RequireAuth(_user): RequireAuth,
    State(state): State<AppState>,
    session: Session,
) -> Result<Json<CartResponse>> {
    let cart = load_cart(&session).await?;
    let products = state.catalog().list_products().await?;
    Ok(Json(CartResponse::build(&cart, &products, None)))
}

/// Add an item to the cart.
///
/// Unknown product ids are rejected before they can enter the cart; from
/// there the store's merge rules make the operation total.
#[instrument(skip(state, session), fields(product_id = %request.product_id))]
pub async fn add(
    RequireAuth(_user): RequireAuth,
    State(state): State<AppState>,
    session: Session,
    Json(request): Json<AddToCartRequest>,
) -> Result<Json<CartResponse>> {
    let products = state.catalog().list_products().await?;
    if !products.iter().any(|p| p.id == request.product_id) {
        return Err(AppError::NotFound(format!(
            "product {}",
            request.product_id
        )));
    }

    let mut cart = load_cart(&session).await?;
    let signal = cart.add(request.product_id, request.quantity.unwrap_or(1));
    save_cart(&session, &cart).await?;

    Ok(Json(CartResponse::build(&cart, &products, Some(signal))))
}

/// Set a line's quantity.
#[instrument(skip(state, session), fields(product_id = %request.product_id))]
pub async fn update(
    RequireAuth(_user): RequireAuth,
    State(state): State<AppState>,
    session: Session,
    Json(request): Json<UpdateCartRequest>,
) -> Result<Json<CartResponse>> {
    let mut cart = load_cart(&session).await?;
    cart.update_quantity(request.product_id, request.quantity);
    save_cart(&session, &cart).await?;

    let products = state.catalog().list_products().await?;
    Ok(Json(CartResponse::build(&cart, &products, None)))
}

/// Remove a line from the cart.
#[instrument(skip(state, session), fields(product_id = %request.product_id))]
pub async fn remove(
    RequireAuth(_user): RequireAuth,
    State(state): State<AppState>,
    session: Session,
    Json(request): Json<RemoveFromCartRequest>,
) -> Result<Json<CartResponse>> {
    let mut cart = load_cart(&session).await?;
    cart.remove(request.product_id);
    save_cart(&session, &cart).await?;

    let products = state.catalog().list_products().await?;
    Ok(Json(CartResponse::build(&cart, &products, None)))
}

/// Reset the cart.
#[instrument(skip(session))]
pub async fn clear(
    RequireAuth(_user): RequireAuth,
    session: Session,
) -> Result<Json<CartCountResponse>> {
    let mut cart = load_cart(&session).await?;
    cart.clear();
    save_cart(&session, &cart).await?;

    Ok(Json(CartCountResponse { count: 0 }))
}

/// Item count badge.
#[instrument(skip(session))]
pub async fn count(
    RequireAuth(_user): RequireAuth,
    session: Session,
) -> Result<Json<CartCountResponse>> {
    let cart = load_cart(&session).await?;
    Ok(Json(CartCountResponse {
        count: pricing::item_count(&cart),
    }))
}
