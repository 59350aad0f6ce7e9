//! Integration test harness for Sockworks.
//!
//! Builds the real storefront router over an in-memory backend gateway so
//! the suite runs without the hosted backend. Tests drive the router
//! directly through `tower::ServiceExt::oneshot`, carrying the session
//! cookie between requests the way a browser would.
//!
//! # Test Categories
//!
//! - `storefront_cart` - Cart flow: auth gating, merge rules, derived totals
//! - `storefront_checkout` - Checkout: validation, snapshot submission,
//!   clear-only-on-success
//! - `storefront_wishlist` - Wishlist toggling and persistence
//! - `admin_orders` - Admin order listing/filtering and product CRUD

use std::collections::HashMap;
use std::net::{IpAddr, Ipv4Addr};
use std::path::PathBuf;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicI32, Ordering};

use async_trait::async_trait;
use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use chrono::Utc;
use rust_decimal::Decimal;
use secrecy::SecretString;
use serde_json::Value;
use tower::ServiceExt;

use sockworks_core::{
    CurrencyCode, Email, OrderId, OrderStatus, Price, ProductId, Role, UserId,
};
use sockworks_storefront::backend::{
    AuthSession, BackendError, BackendGateway, OrderFilter,
};
use sockworks_storefront::config::{BackendConfig, StorefrontConfig};
use sockworks_storefront::middleware::create_session_layer;
use sockworks_storefront::models::{NewOrder, NewProduct, Order, Product, Profile};
use sockworks_storefront::routes;
use sockworks_storefront::state::AppState;
use sockworks_storefront::wishlist::{MemoryBlobStore, WishlistStore};

/// In-memory stand-in for the hosted backend.
///
/// Every table the real backend owns is a `Mutex<Vec<_>>` here; ids are
/// allocated from counters the way the backend's sequences would.
#[derive(Default)]
pub struct MockBackend {
    products: Mutex<Vec<Product>>,
    orders: Mutex<Vec<Order>>,
    profiles: Mutex<Vec<Profile>>,
    /// email -> (password, user id)
    accounts: Mutex<HashMap<String, (String, UserId)>>,
    next_product_id: AtomicI32,
    next_order_id: AtomicI32,
    /// When set, `insert_order` fails with a 500-class error.
    fail_order_inserts: AtomicBool,
}

impl MockBackend {
    #[must_use]
    pub fn new() -> Self {
        Self {
            next_product_id: AtomicI32::new(1),
            next_order_id: AtomicI32::new(1),
            ..Self::default()
        }
    }

    /// Seed a product and return it.
    pub fn seed_product(&self, name: &str, cents: i64, sizes: &[&str]) -> Product {
        let id = self.next_product_id.fetch_add(1, Ordering::SeqCst);
        let product = Product {
            id: ProductId::new(id),
            name: name.to_string(),
            description: format!("{name} description"),
            price: Price::new(Decimal::new(cents, 2), CurrencyCode::NAD),
            images: vec![format!("/{}.jpg", id)],
            sizes: sizes.iter().map(ToString::to_string).collect(),
        };
        lock(&self.products).push(product.clone());
        product
    }

    /// Seed an account with the given role.
    pub fn seed_account(&self, email: &str, password: &str, role: Role) -> UserId {
        let user_id = UserId::new(format!("user-{email}"));
        lock(&self.accounts).insert(
            email.to_string(),
            (password.to_string(), user_id.clone()),
        );
        lock(&self.profiles).push(Profile {
            id: user_id.clone(),
            email: Email::parse(email).ok(),
            role,
        });
        user_id
    }

    /// Make every subsequent `insert_order` fail.
    pub fn fail_order_inserts(&self) {
        self.fail_order_inserts.store(true, Ordering::SeqCst);
    }

    /// Orders currently stored, newest first.
    #[must_use]
    pub fn orders(&self) -> Vec<Order> {
        let mut orders = lock(&self.orders).clone();
        orders.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        orders
    }
}

fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(std::sync::PoisonError::into_inner)
}

#[async_trait]
impl BackendGateway for MockBackend {
    async fn authenticate(
        &self,
        email: &Email,
        password: &str,
    ) -> Result<AuthSession, BackendError> {
        let accounts = lock(&self.accounts);
        match accounts.get(email.as_str()) {
            Some((stored, user_id)) if stored == password => Ok(AuthSession {
                user_id: user_id.clone(),
                email: email.clone(),
                access_token: SecretString::from("test-token".to_string()),
            }),
            _ => Err(BackendError::Unauthorized(
                "invalid login credentials".to_string(),
            )),
        }
    }

    async fn sign_up(&self, email: &Email, password: &str) -> Result<AuthSession, BackendError> {
        if lock(&self.accounts).contains_key(email.as_str()) {
            return Err(BackendError::Conflict("user already registered".to_string()));
        }

        let user_id = self.seed_account(email.as_str(), password, Role::User);
        Ok(AuthSession {
            user_id,
            email: email.clone(),
            access_token: SecretString::from("test-token".to_string()),
        })
    }

    async fn get_profile(&self, user_id: &UserId) -> Result<Profile, BackendError> {
        lock(&self.profiles)
            .iter()
            .find(|p| p.id == *user_id)
            .cloned()
            .ok_or_else(|| BackendError::NotFound(format!("profile for {user_id}")))
    }

    async fn get_profiles(&self, user_ids: &[UserId]) -> Result<Vec<Profile>, BackendError> {
        Ok(lock(&self.profiles)
            .iter()
            .filter(|p| user_ids.contains(&p.id))
            .cloned()
            .collect())
    }

    async fn list_products(&self) -> Result<Vec<Product>, BackendError> {
        Ok(lock(&self.products).clone())
    }

    async fn insert_product(&self, product: &NewProduct) -> Result<Product, BackendError> {
        let id = self.next_product_id.fetch_add(1, Ordering::SeqCst);
        let created = Product {
            id: ProductId::new(id),
            name: product.name.clone(),
            description: product.description.clone(),
            price: product.price,
            images: product.images.clone(),
            sizes: product.sizes.clone(),
        };
        lock(&self.products).push(created.clone());
        Ok(created)
    }

    async fn update_product(
        &self,
        id: ProductId,
        product: &NewProduct,
    ) -> Result<Product, BackendError> {
        let mut products = lock(&self.products);
        let existing = products
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or_else(|| BackendError::NotFound(format!("product {id}")))?;

        existing.name = product.name.clone();
        existing.description = product.description.clone();
        existing.price = product.price;
        existing.images = product.images.clone();
        existing.sizes = product.sizes.clone();
        Ok(existing.clone())
    }

    async fn delete_product(&self, id: ProductId) -> Result<(), BackendError> {
        lock(&self.products).retain(|p| p.id != id);
        Ok(())
    }

    async fn insert_order(&self, order: &NewOrder) -> Result<Order, BackendError> {
        if self.fail_order_inserts.load(Ordering::SeqCst) {
            return Err(BackendError::Api {
                status: 500,
                message: "order insert disabled".to_string(),
            });
        }

        let id = self.next_order_id.fetch_add(1, Ordering::SeqCst);
        let created = Order {
            id: OrderId::new(id),
            user_id: order.user_id.clone(),
            items: order.items.clone(),
            total: order.total,
            delivery_method: order.delivery_method,
            location: order.location.clone(),
            phone: order.phone.clone(),
            notes: order.notes.clone(),
            status: OrderStatus::Pending,
            created_at: Utc::now(),
        };
        lock(&self.orders).push(created.clone());
        Ok(created)
    }

    async fn get_order(&self, id: OrderId) -> Result<Order, BackendError> {
        lock(&self.orders)
            .iter()
            .find(|o| o.id == id)
            .cloned()
            .ok_or_else(|| BackendError::NotFound(format!("order {id}")))
    }

    async fn list_orders(&self, filter: &OrderFilter) -> Result<Vec<Order>, BackendError> {
        let mut orders: Vec<Order> = lock(&self.orders)
            .iter()
            .filter(|o| filter.status.is_none_or(|s| o.status == s))
            .filter(|o| filter.date_from.is_none_or(|from| o.created_at >= from))
            .filter(|o| filter.date_to.is_none_or(|to| o.created_at <= to))
            .cloned()
            .collect();
        orders.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(orders)
    }

    async fn update_order_status(
        &self,
        id: OrderId,
        status: OrderStatus,
    ) -> Result<(), BackendError> {
        let mut orders = lock(&self.orders);
        let order = orders
            .iter_mut()
            .find(|o| o.id == id)
            .ok_or_else(|| BackendError::NotFound(format!("order {id}")))?;
        order.status = status;
        Ok(())
    }

    async fn upload_image(
        &self,
        filename: &str,
        _content_type: &str,
        _bytes: Vec<u8>,
    ) -> Result<String, BackendError> {
        Ok(format!("https://cdn.test/product-images/{filename}"))
    }
}

/// Configuration with harmless test values.
#[must_use]
pub fn test_config() -> StorefrontConfig {
    StorefrontConfig {
        host: IpAddr::V4(Ipv4Addr::LOCALHOST),
        port: 0,
        base_url: "http://localhost:3000".to_string(),
        allowed_origin: None,
        backend: BackendConfig {
            base_url: "http://backend.test".to_string(),
            api_key: SecretString::from("test-anon-key".to_string()),
            service_key: SecretString::from("test-service-key".to_string()),
            storage_bucket: "product-images".to_string(),
            currency: CurrencyCode::NAD,
        },
        wishlist_path: PathBuf::from("/dev/null"),
        sentry_dsn: None,
        sentry_environment: None,
    }
}

/// A storefront instance over a mock backend, plus a cookie-carrying client.
pub struct TestStore {
    pub backend: std::sync::Arc<MockBackend>,
    router: Router,
    cookie: Option<String>,
}

impl TestStore {
    /// Build the full router over a fresh mock backend.
    #[must_use]
    pub fn new(backend: MockBackend) -> Self {
        let backend = std::sync::Arc::new(backend);
        let wishlist = WishlistStore::load(Box::new(MemoryBlobStore::new()));
        let state = AppState::new(test_config(), backend.clone(), wishlist);

        let router = routes::routes()
            .layer(create_session_layer(false))
            .with_state(state);

        Self {
            backend,
            router,
            cookie: None,
        }
    }

    /// Send a request, carrying the session cookie, and parse the JSON
    /// response (an empty body parses as `null`).
    pub async fn request(
        &mut self,
        method: &str,
        uri: &str,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(cookie) = &self.cookie {
            builder = builder.header(header::COOKIE, cookie);
        }

        let request = match body {
            Some(json) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json.to_string())),
            None => builder.body(Body::empty()),
        }
        .expect("failed to build request");

        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("router never errors");

        if let Some(cookie) = response
            .headers()
            .get(header::SET_COOKIE)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.split(';').next())
        {
            self.cookie = Some(cookie.to_string());
        }

        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("failed to read body");
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };

        (status, json)
    }

    /// Shorthand GET.
    pub async fn get(&mut self, uri: &str) -> (StatusCode, Value) {
        self.request("GET", uri, None).await
    }

    /// Shorthand POST with JSON body.
    pub async fn post(&mut self, uri: &str, body: Value) -> (StatusCode, Value) {
        self.request("POST", uri, Some(body)).await
    }

    /// Log in as a seeded account.
    pub async fn login(&mut self, email: &str, password: &str) {
        let (status, body) = self
            .post(
                "/auth/login",
                serde_json::json!({ "email": email, "password": password }),
            )
            .await;
        assert_eq!(status, StatusCode::OK, "login failed: {body}");
    }
}
