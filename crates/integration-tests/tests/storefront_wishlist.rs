//! Wishlist integration tests.

use axum::http::StatusCode;
use serde_json::json;

use sockworks_core::Role;
use sockworks_integration_tests::{MockBackend, TestStore};

fn store_with_shopper() -> TestStore {
    let backend = MockBackend::new();
    backend.seed_product("Classic Elegance", 1000, &["Small"]);
    backend.seed_product("Urban Essentials", 500, &["Medium"]);
    backend.seed_account("shopper@example.com", "correct horse", Role::User);
    TestStore::new(backend)
}

#[tokio::test]
async fn wishlist_requires_login() {
    let mut store = store_with_shopper();

    let (status, _) = store.get("/wishlist").await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = store
        .post("/wishlist/toggle", json!({ "product_id": 1 }))
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn toggle_twice_restores_membership() {
    let mut store = store_with_shopper();
    store.login("shopper@example.com", "correct horse").await;

    let (status, body) = store
        .post("/wishlist/toggle", json!({ "product_id": 1 }))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["in_wishlist"], true);

    let (_, body) = store
        .post("/wishlist/toggle", json!({ "product_id": 1 }))
        .await;
    assert_eq!(body["in_wishlist"], false);

    let (_, body) = store.get("/wishlist").await;
    assert!(body["product_ids"].as_array().expect("ids").is_empty());
}

#[tokio::test]
async fn wishlist_keeps_insertion_order() {
    let mut store = store_with_shopper();
    store.login("shopper@example.com", "correct horse").await;

    store
        .post("/wishlist/toggle", json!({ "product_id": 2 }))
        .await;
    store
        .post("/wishlist/toggle", json!({ "product_id": 1 }))
        .await;

    let (_, body) = store.get("/wishlist").await;
    assert_eq!(body["product_ids"], json!([2, 1]));
}
