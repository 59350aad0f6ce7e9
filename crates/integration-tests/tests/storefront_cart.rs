//! Cart flow integration tests.
//!
//! Drives the assembled router end to end: login gating, merge-by-key
//! adds, the quantity floor, removal, and the derived totals returned
//! with every cart response.

use axum::http::StatusCode;
use serde_json::json;

use sockworks_core::Role;
use sockworks_integration_tests::{MockBackend, TestStore};

fn store_with_shopper() -> TestStore {
    let backend = MockBackend::new();
    backend.seed_product("Classic Elegance", 1000, &["Small", "Medium"]); // id 1, 10.00
    backend.seed_product("Urban Essentials", 500, &["Medium"]); // id 2, 5.00
    backend.seed_account("shopper@example.com", "correct horse", Role::User);
    TestStore::new(backend)
}

#[tokio::test]
async fn cart_requires_login() {
    let mut store = store_with_shopper();

    let (status, _) = store
        .post("/cart/add", json!({ "product_id": 1 }))
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = store.get("/cart").await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn add_merges_into_one_line() {
    let mut store = store_with_shopper();
    store.login("shopper@example.com", "correct horse").await;

    let (status, _) = store
        .post("/cart/add", json!({ "product_id": 1, "quantity": 1 }))
        .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = store
        .post("/cart/add", json!({ "product_id": 1, "quantity": 2 }))
        .await;
    assert_eq!(status, StatusCode::OK);

    let items = body["items"].as_array().expect("items array");
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["quantity"], 3);
    assert_eq!(body["item_count"], 3);
    // Adds always signal the panel open
    assert_eq!(body["open_panel"], true);
}

#[tokio::test]
async fn add_unknown_product_is_rejected() {
    let mut store = store_with_shopper();
    store.login("shopper@example.com", "correct horse").await;

    let (status, _) = store
        .post("/cart/add", json!({ "product_id": 99 }))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (_, body) = store.get("/cart").await;
    assert_eq!(body["item_count"], 0);
}

#[tokio::test]
async fn subtotal_reflects_current_lines() {
    let mut store = store_with_shopper();
    store.login("shopper@example.com", "correct horse").await;

    store
        .post("/cart/add", json!({ "product_id": 1, "quantity": 2 }))
        .await;
    let (_, body) = store
        .post("/cart/add", json!({ "product_id": 2, "quantity": 3 }))
        .await;

    // 2 x 10.00 + 3 x 5.00 = 35.00
    assert_eq!(body["subtotal"]["amount"], "35.00");
    assert_eq!(body["item_count"], 5);
}

#[tokio::test]
async fn update_quantity_floors_at_one() {
    let mut store = store_with_shopper();
    store.login("shopper@example.com", "correct horse").await;

    store
        .post("/cart/add", json!({ "product_id": 1, "quantity": 5 }))
        .await;
    let (status, body) = store
        .post("/cart/update", json!({ "product_id": 1, "quantity": 0 }))
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["items"][0]["quantity"], 1);
}

#[tokio::test]
async fn remove_then_count_is_zero() {
    let mut store = store_with_shopper();
    store.login("shopper@example.com", "correct horse").await;

    store
        .post("/cart/add", json!({ "product_id": 1, "quantity": 2 }))
        .await;
    let (status, body) = store
        .post("/cart/remove", json!({ "product_id": 1 }))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["items"].as_array().expect("items array").is_empty());

    let (_, body) = store.get("/cart/count").await;
    assert_eq!(body["count"], 0);

    // Removing again is a no-op, not an error
    let (status, _) = store
        .post("/cart/remove", json!({ "product_id": 1 }))
        .await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn clear_empties_the_cart() {
    let mut store = store_with_shopper();
    store.login("shopper@example.com", "correct horse").await;

    store
        .post("/cart/add", json!({ "product_id": 1, "quantity": 2 }))
        .await;
    store
        .post("/cart/add", json!({ "product_id": 2, "quantity": 1 }))
        .await;

    let (status, body) = store.post("/cart/clear", json!({})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["count"], 0);

    let (_, body) = store.get("/cart").await;
    assert_eq!(body["item_count"], 0);
    assert_eq!(body["subtotal"]["amount"], "0");
}
