//! Checkout integration tests.
//!
//! The properties under test: delivery validation happens before any
//! submission, the submitted total equals the displayed total, and the
//! cart is cleared on success but preserved byte-for-byte on failure.

use axum::http::StatusCode;
use serde_json::json;

use sockworks_core::{OrderStatus, Role};
use sockworks_integration_tests::{MockBackend, TestStore};

fn store_with_cart_items() -> TestStore {
    let backend = MockBackend::new();
    backend.seed_product("Classic Elegance", 1000, &["Small"]); // id 1, 10.00
    backend.seed_product("Urban Essentials", 500, &["Medium"]); // id 2, 5.00
    backend.seed_account("shopper@example.com", "correct horse", Role::User);
    TestStore::new(backend)
}

async fn fill_cart(store: &mut TestStore) {
    store.login("shopper@example.com", "correct horse").await;
    store
        .post("/cart/add", json!({ "product_id": 1, "quantity": 2 }))
        .await;
    store
        .post("/cart/add", json!({ "product_id": 2, "quantity": 3 }))
        .await;
}

fn delivery_body() -> serde_json::Value {
    json!({
        "delivery_method": "delivery",
        "location": "12 Independence Ave",
        "phone": "+264 81 000 0000",
        "notes": "ring the bell"
    })
}

#[tokio::test]
async fn checkout_requires_login() {
    let mut store = store_with_cart_items();
    let (status, _) = store.post("/checkout", delivery_body()).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn checkout_submits_displayed_total_and_clears_cart() {
    let mut store = store_with_cart_items();
    fill_cart(&mut store).await;

    let (_, cart) = store.get("/cart").await;
    let displayed_total = cart["subtotal"]["amount"].clone();

    let (status, body) = store.post("/checkout", delivery_body()).await;
    assert_eq!(status, StatusCode::OK, "checkout failed: {body}");
    assert_eq!(body["total"]["amount"], displayed_total);
    let order_id = body["order_id"].as_i64().expect("order id");

    // Success clears the cart
    let (_, cart) = store.get("/cart").await;
    assert_eq!(cart["item_count"], 0);

    // The stored order carries the same total and the delivery fields
    let orders = store.backend.orders();
    assert_eq!(orders.len(), 1);
    let order = &orders[0];
    assert_eq!(i64::from(order.id.as_i32()), order_id);
    assert_eq!(order.total.amount.to_string(), "35.00");
    assert_eq!(order.location, "12 Independence Ave");
    assert_eq!(order.status, OrderStatus::Pending);
}

#[tokio::test]
async fn failed_submission_preserves_the_cart() {
    let mut store = store_with_cart_items();
    fill_cart(&mut store).await;
    let (_, cart_before) = store.get("/cart").await;

    store.backend.fail_order_inserts();

    let (status, body) = store.post("/checkout", delivery_body()).await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(body["error"], "External service error");

    // Cart is untouched so the user can retry
    let (_, cart_after) = store.get("/cart").await;
    assert_eq!(cart_after, cart_before);
    assert!(store.backend.orders().is_empty());
}

#[tokio::test]
async fn checkout_rejects_missing_delivery_fields() {
    let mut store = store_with_cart_items();
    fill_cart(&mut store).await;

    let (status, body) = store
        .post(
            "/checkout",
            json!({ "delivery_method": "pickup", "location": "", "phone": "0810000000" }),
        )
        .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["error"], "a delivery or pickup location is required");

    let (status, body) = store
        .post(
            "/checkout",
            json!({ "delivery_method": "pickup", "location": "Shop 4", "phone": "  " }),
        )
        .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["error"], "a phone number is required");

    // Nothing was submitted
    assert!(store.backend.orders().is_empty());
}

#[tokio::test]
async fn checkout_rejects_empty_cart() {
    let mut store = store_with_cart_items();
    store.login("shopper@example.com", "correct horse").await;

    let (status, body) = store.post("/checkout", delivery_body()).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["error"], "the cart is empty");
}

#[tokio::test]
async fn invoice_is_visible_to_owner_only() {
    let mut store = store_with_cart_items();
    store.backend.seed_account("other@example.com", "other pass", Role::User);
    fill_cart(&mut store).await;

    let (_, body) = store.post("/checkout", delivery_body()).await;
    let order_id = body["order_id"].as_i64().expect("order id");

    // Owner sees the invoice
    let (status, body) = store.get(&format!("/orders/{order_id}")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["location"], "12 Independence Ave");

    // Another shopper does not
    store.login("other@example.com", "other pass").await;
    let (status, _) = store.get(&format!("/orders/{order_id}")).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}
