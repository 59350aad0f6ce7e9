//! HTTP route handlers for the storefront.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                 - Health check
//!
//! # Products
//! GET  /products               - Product listing (filter/sort via query)
//! GET  /products/{id}          - Product detail
//!
//! # Cart (session-scoped, requires login)
//! GET  /cart                   - Current cart with derived totals
//! POST /cart/add               - Add to cart (merge-by-key)
//! POST /cart/update            - Set a line's quantity (floored at 1)
//! POST /cart/remove            - Remove a line
//! POST /cart/clear             - Reset the cart
//! GET  /cart/count             - Item count badge
//!
//! # Wishlist (requires login)
//! GET  /wishlist               - Wishlist product ids
//! POST /wishlist/toggle        - Toggle a product's membership
//!
//! # Checkout (requires login)
//! POST /checkout               - Snapshot the cart and submit an order
//!
//! # Orders (requires login)
//! GET  /orders/{id}            - Invoice view (owner or admin)
//!
//! # Auth
//! POST /auth/register          - Create an account and sign in
//! POST /auth/login             - Sign in
//! POST /auth/logout            - Sign out
//!
//! # Admin (requires admin role)
//! GET    /admin/orders              - Order listing with status/date filters
//! POST   /admin/orders/{id}/status  - Advance an order's status
//! POST   /admin/products            - Create a product
//! PUT    /admin/products/{id}       - Update a product
//! DELETE /admin/products/{id}       - Delete a product
//! POST   /admin/products/images     - Upload product images
//! ```

pub mod admin;
pub mod auth;
pub mod cart;
pub mod checkout;
pub mod orders;
pub mod products;
pub mod wishlist;

use axum::{
    Router,
    routing::{get, post},
};

use crate::state::AppState;

/// Create the product routes router.
pub fn product_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(products::index))
        .route("/{id}", get(products::show))
}

/// Create the cart routes router.
pub fn cart_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(cart::show))
        .route("/add", post(cart::add))
        .route("/update", post(cart::update))
        .route("/remove", post(cart::remove))
        .route("/clear", post(cart::clear))
        .route("/count", get(cart::count))
}

/// Create the wishlist routes router.
pub fn wishlist_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(wishlist::show))
        .route("/toggle", post(wishlist::toggle))
}

/// Create the auth routes router.
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/register", post(auth::register))
        .route("/login", post(auth::login))
        .route("/logout", post(auth::logout))
}

/// Create the admin routes router.
pub fn admin_routes() -> Router<AppState> {
    use axum::routing::put;

    Router::new()
        .route("/orders", get(admin::list_orders))
        .route("/orders/{id}/status", post(admin::update_order_status))
        .route("/products", post(admin::create_product))
        .route(
            "/products/{id}",
            put(admin::update_product).delete(admin::delete_product),
        )
        .route("/products/images", post(admin::upload_images))
}

/// Create all routes for the storefront.
pub fn routes() -> Router<AppState> {
    Router::new()
        .nest("/products", product_routes())
        .nest("/cart", cart_routes())
        .nest("/wishlist", wishlist_routes())
        .route("/checkout", post(checkout::submit))
        .route("/orders/{id}", get(orders::show))
        .nest("/auth", auth_routes())
        .nest("/admin", admin_routes())
}
