//! Admin surface integration tests.
//!
//! Role gating, order listing with filters and the email join, status
//! updates, and product CRUD with catalogue cache invalidation.

use axum::http::StatusCode;
use serde_json::json;

use sockworks_core::{OrderStatus, Role};
use sockworks_integration_tests::{MockBackend, TestStore};

fn store_with_admin() -> TestStore {
    let backend = MockBackend::new();
    backend.seed_product("Classic Elegance", 1000, &["Small"]); // id 1
    backend.seed_account("shopper@example.com", "correct horse", Role::User);
    backend.seed_account("admin@example.com", "admin pass 1", Role::Admin);
    TestStore::new(backend)
}

/// Place one order as the shopper, then log in as admin.
async fn place_order_and_become_admin(store: &mut TestStore) -> i64 {
    store.login("shopper@example.com", "correct horse").await;
    store
        .post("/cart/add", json!({ "product_id": 1, "quantity": 2 }))
        .await;
    let (_, body) = store
        .post(
            "/checkout",
            json!({
                "delivery_method": "pickup",
                "location": "Shop 4, Main Mall",
                "phone": "+264 81 000 0000"
            }),
        )
        .await;
    let order_id = body["order_id"].as_i64().expect("order id");

    store.login("admin@example.com", "admin pass 1").await;
    order_id
}

#[tokio::test]
async fn admin_routes_reject_non_admins() {
    let mut store = store_with_admin();

    // Logged out
    let (status, _) = store.get("/admin/orders").await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    // Logged in without the admin role
    store.login("shopper@example.com", "correct horse").await;
    let (status, _) = store.get("/admin/orders").await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = store
        .post("/admin/products", json!({ "name": "X", "description": "", "price": "1.00" }))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn order_listing_joins_customer_emails() {
    let mut store = store_with_admin();
    place_order_and_become_admin(&mut store).await;

    let (status, body) = store.get("/admin/orders").await;
    assert_eq!(status, StatusCode::OK);

    let orders = body["orders"].as_array().expect("orders array");
    assert_eq!(orders.len(), 1);
    assert_eq!(orders[0]["user_email"], "shopper@example.com");
    assert_eq!(orders[0]["status"], "pending");
}

#[tokio::test]
async fn order_listing_filters_by_status() {
    let mut store = store_with_admin();
    place_order_and_become_admin(&mut store).await;

    let (_, body) = store.get("/admin/orders?status=pending").await;
    assert_eq!(body["orders"].as_array().expect("orders").len(), 1);

    let (_, body) = store.get("/admin/orders?status=shipped").await;
    assert!(body["orders"].as_array().expect("orders").is_empty());
}

#[tokio::test]
async fn status_update_is_visible_in_the_listing() {
    let mut store = store_with_admin();
    let order_id = place_order_and_become_admin(&mut store).await;

    let (status, _) = store
        .post(
            &format!("/admin/orders/{order_id}/status"),
            json!({ "status": "shipped" }),
        )
        .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let orders = store.backend.orders();
    assert_eq!(orders[0].status, OrderStatus::Shipped);

    let (_, body) = store.get("/admin/orders?status=shipped").await;
    assert_eq!(body["orders"].as_array().expect("orders").len(), 1);
}

#[tokio::test]
async fn product_crud_updates_the_storefront() {
    let mut store = store_with_admin();
    store.login("admin@example.com", "admin pass 1").await;

    // Warm the catalogue cache
    let (_, body) = store.get("/products").await;
    assert_eq!(body["count"], 1);

    // Create
    let (status, created) = store
        .post(
            "/admin/products",
            json!({
                "name": "Performance Crew",
                "description": "Cushioned soles",
                "price": "89.99",
                "sizes": ["Medium", "Large"]
            }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    let new_id = created["id"].as_i64().expect("product id");

    // The storefront sees it immediately (cache invalidated)
    let (_, body) = store.get("/products").await;
    assert_eq!(body["count"], 2);

    // Update
    let (status, updated) = store
        .request(
            "PUT",
            &format!("/admin/products/{new_id}"),
            Some(json!({
                "name": "Performance Crew",
                "description": "Cushioned soles",
                "price": "79.99",
                "sizes": ["Medium", "Large"]
            })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["price"]["amount"], "79.99");

    // Delete
    let (status, _) = store
        .request("DELETE", &format!("/admin/products/{new_id}"), None)
        .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (_, body) = store.get("/products").await;
    assert_eq!(body["count"], 1);
}

#[tokio::test]
async fn product_creation_rejects_negative_prices() {
    let mut store = store_with_admin();
    store.login("admin@example.com", "admin pass 1").await;

    let (status, body) = store
        .post(
            "/admin/products",
            json!({ "name": "Broken", "description": "", "price": "-1.00" }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "price amount cannot be negative");
}
