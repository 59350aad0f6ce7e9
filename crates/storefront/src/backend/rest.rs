//! REST implementation of the backend gateway.
//!
//! Talks to the hosted provider's three surfaces with `reqwest`:
//! `/auth/v1` for credential exchange, `/rest/v1` for table access, and
//! `/storage/v1` for image objects. Table responses always arrive as JSON
//! arrays; single-row reads take the first element or report not-found.

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use secrecy::ExposeSecret;
use serde::de::DeserializeOwned;
use serde_json::json;
use tracing::instrument;
use uuid::Uuid;

use sockworks_core::{CurrencyCode, Email, OrderId, OrderStatus, ProductId, UserId};

use crate::config::BackendConfig;
use crate::models::{NewOrder, NewProduct, Order, Product, Profile};

use super::records::{
    OrderPayload, OrderRecord, ProductPayload, ProductRecord, ProfileRecord, SignedUrlResponse,
    TokenResponse,
};
use super::{AuthSession, BackendError, BackendGateway, OrderFilter};

/// Signed image URLs stay valid for one year.
const SIGNED_URL_TTL_SECONDS: u64 = 31_536_000;

/// Client for the hosted backend's REST, auth, and storage APIs.
#[derive(Clone)]
pub struct RestBackend {
    inner: Arc<RestBackendInner>,
}

struct RestBackendInner {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    service_key: String,
    storage_bucket: String,
    currency: CurrencyCode,
}

impl RestBackend {
    /// Create a new backend client.
    #[must_use]
    pub fn new(config: &BackendConfig) -> Self {
        Self {
            inner: Arc::new(RestBackendInner {
                client: reqwest::Client::new(),
                base_url: config.base_url.trim_end_matches('/').to_owned(),
                api_key: config.api_key.expose_secret().to_owned(),
                service_key: config.service_key.expose_secret().to_owned(),
                storage_bucket: config.storage_bucket.clone(),
                currency: config.currency,
            }),
        }
    }

    fn currency(&self) -> CurrencyCode {
        self.inner.currency
    }

    fn auth_url(&self, path: &str) -> String {
        format!("{}/auth/v1/{path}", self.inner.base_url)
    }

    fn table_url(&self, table: &str) -> String {
        format!("{}/rest/v1/{table}", self.inner.base_url)
    }

    fn storage_url(&self, path: &str) -> String {
        format!("{}/storage/v1/{path}", self.inner.base_url)
    }

    /// Attach the service-role credentials used for server-side table and
    /// storage access.
    fn service_headers(&self, req: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        req.header("apikey", &self.inner.api_key).bearer_auth(&self.inner.service_key)
    }

    /// Send a request and apply the shared status handling.
    ///
    /// Returns the response body as text so call sites get useful
    /// diagnostics out of parse failures.
    async fn send(&self, req: reqwest::RequestBuilder) -> Result<String, BackendError> {
        let response = req.send().await?;
        let status = response.status();

        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            let retry_after = response
                .headers()
                .get("Retry-After")
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.parse::<u64>().ok())
                .unwrap_or(1);
            return Err(BackendError::RateLimited(retry_after));
        }

        let body = response.text().await?;

        if !status.is_success() {
            let message: String = body.chars().take(200).collect();
            tracing::error!(
                status = %status,
                body = %message,
                "backend returned non-success status"
            );
            return Err(match status.as_u16() {
                400 | 401 | 403 => BackendError::Unauthorized(message),
                404 => BackendError::NotFound(message),
                409 | 422 => BackendError::Conflict(message),
                code => BackendError::Api {
                    status: code,
                    message,
                },
            });
        }

        Ok(body)
    }

    /// Send a request and parse the JSON body.
    async fn send_json<T: DeserializeOwned>(
        &self,
        req: reqwest::RequestBuilder,
    ) -> Result<T, BackendError> {
        let body = self.send(req).await?;
        serde_json::from_str(&body).map_err(|e| {
            tracing::error!(
                error = %e,
                body = %body.chars().take(500).collect::<String>(),
                "failed to parse backend response"
            );
            BackendError::Parse(e)
        })
    }

    /// Take the first row of a single-row read.
    fn first<T>(rows: Vec<T>, what: impl Into<String>) -> Result<T, BackendError> {
        rows.into_iter()
            .next()
            .ok_or_else(|| BackendError::NotFound(what.into()))
    }

    async fn token_exchange(&self, path: &str, query: &[(&str, &str)], email: &Email, password: &str) -> Result<AuthSession, BackendError> {
        let req = self
            .inner
            .client
            .post(self.auth_url(path))
            .query(query)
            .header("apikey", &self.inner.api_key)
            .json(&json!({ "email": email.as_str(), "password": password }));

        let token: TokenResponse = self.send_json(req).await?;

        let email = Email::parse(&token.user.email).map_err(|e| {
            BackendError::InvalidRecord(format!("auth user {}: {e}", token.user.id))
        })?;

        Ok(AuthSession {
            user_id: UserId::new(token.user.id),
            email,
            access_token: token.access_token.into(),
        })
    }
}

#[async_trait]
impl BackendGateway for RestBackend {
    #[instrument(skip(self, password), fields(email = %email))]
    async fn authenticate(
        &self,
        email: &Email,
        password: &str,
    ) -> Result<AuthSession, BackendError> {
        self.token_exchange("token", &[("grant_type", "password")], email, password)
            .await
    }

    #[instrument(skip(self, password), fields(email = %email))]
    async fn sign_up(&self, email: &Email, password: &str) -> Result<AuthSession, BackendError> {
        self.token_exchange("signup", &[], email, password).await
    }

    #[instrument(skip(self), fields(user_id = %user_id))]
    async fn get_profile(&self, user_id: &UserId) -> Result<Profile, BackendError> {
        let req = self.service_headers(
            self.inner
                .client
                .get(self.table_url("profiles"))
                .query(&[
                    ("select", "id,email,role".to_string()),
                    ("id", format!("eq.{}", user_id.as_str())),
                ]),
        );

        let rows: Vec<ProfileRecord> = self.send_json(req).await?;
        Self::first(rows, format!("profile for {user_id}"))?.into_domain()
    }

    #[instrument(skip(self, user_ids), fields(count = user_ids.len()))]
    async fn get_profiles(&self, user_ids: &[UserId]) -> Result<Vec<Profile>, BackendError> {
        if user_ids.is_empty() {
            return Ok(Vec::new());
        }

        let ids = user_ids
            .iter()
            .map(UserId::as_str)
            .collect::<Vec<_>>()
            .join(",");
        let req = self.service_headers(
            self.inner
                .client
                .get(self.table_url("profiles"))
                .query(&[
                    ("select", "id,email,role".to_string()),
                    ("id", format!("in.({ids})")),
                ]),
        );

        let rows: Vec<ProfileRecord> = self.send_json(req).await?;
        rows.into_iter().map(ProfileRecord::into_domain).collect()
    }

    #[instrument(skip(self))]
    async fn list_products(&self) -> Result<Vec<Product>, BackendError> {
        let req = self.service_headers(
            self.inner
                .client
                .get(self.table_url("products"))
                .query(&[("select", "*"), ("order", "id.asc")]),
        );

        let rows: Vec<ProductRecord> = self.send_json(req).await?;
        rows.into_iter()
            .map(|row| row.into_domain(self.currency()))
            .collect()
    }

    #[instrument(skip(self, product), fields(name = %product.name))]
    async fn insert_product(&self, product: &NewProduct) -> Result<Product, BackendError> {
        let req = self
            .service_headers(self.inner.client.post(self.table_url("products")))
            .header("Prefer", "return=representation")
            .json(&ProductPayload::from(product));

        let rows: Vec<ProductRecord> = self.send_json(req).await?;
        Self::first(rows, "inserted product")?.into_domain(self.currency())
    }

    #[instrument(skip(self, product), fields(product_id = %id))]
    async fn update_product(
        &self,
        id: ProductId,
        product: &NewProduct,
    ) -> Result<Product, BackendError> {
        let req = self
            .service_headers(
                self.inner
                    .client
                    .patch(self.table_url("products"))
                    .query(&[("id", format!("eq.{id}"))]),
            )
            .header("Prefer", "return=representation")
            .json(&ProductPayload::from(product));

        let rows: Vec<ProductRecord> = self.send_json(req).await?;
        Self::first(rows, format!("product {id}"))?.into_domain(self.currency())
    }

    #[instrument(skip(self), fields(product_id = %id))]
    async fn delete_product(&self, id: ProductId) -> Result<(), BackendError> {
        let req = self.service_headers(
            self.inner
                .client
                .delete(self.table_url("products"))
                .query(&[("id", format!("eq.{id}"))]),
        );

        self.send(req).await?;
        Ok(())
    }

    #[instrument(skip(self, order), fields(user_id = %order.user_id))]
    async fn insert_order(&self, order: &NewOrder) -> Result<Order, BackendError> {
        let req = self
            .service_headers(self.inner.client.post(self.table_url("orders")))
            .header("Prefer", "return=representation")
            .json(&OrderPayload::from(order));

        let rows: Vec<OrderRecord> = self.send_json(req).await?;
        Self::first(rows, "inserted order")?.into_domain(self.currency())
    }

    #[instrument(skip(self), fields(order_id = %id))]
    async fn get_order(&self, id: OrderId) -> Result<Order, BackendError> {
        let req = self.service_headers(
            self.inner
                .client
                .get(self.table_url("orders"))
                .query(&[("select", "*".to_string()), ("id", format!("eq.{id}"))]),
        );

        let rows: Vec<OrderRecord> = self.send_json(req).await?;
        Self::first(rows, format!("order {id}"))?.into_domain(self.currency())
    }

    #[instrument(skip(self, filter))]
    async fn list_orders(&self, filter: &OrderFilter) -> Result<Vec<Order>, BackendError> {
        let mut query: Vec<(&str, String)> = vec![
            ("select", "*".to_string()),
            ("order", "created_at.desc".to_string()),
        ];
        if let Some(status) = filter.status {
            query.push(("status", format!("eq.{status}")));
        }
        if let Some(from) = filter.date_from {
            query.push(("created_at", format!("gte.{}", from.to_rfc3339())));
        }
        if let Some(to) = filter.date_to {
            query.push(("created_at", format!("lte.{}", to.to_rfc3339())));
        }

        let req = self.service_headers(
            self.inner
                .client
                .get(self.table_url("orders"))
                .query(&query),
        );

        let rows: Vec<OrderRecord> = self.send_json(req).await?;
        rows.into_iter()
            .map(|row| row.into_domain(self.currency()))
            .collect()
    }

    #[instrument(skip(self), fields(order_id = %id, status = %status))]
    async fn update_order_status(
        &self,
        id: OrderId,
        status: OrderStatus,
    ) -> Result<(), BackendError> {
        let req = self
            .service_headers(
                self.inner
                    .client
                    .patch(self.table_url("orders"))
                    .query(&[("id", format!("eq.{id}"))]),
            )
            .json(&json!({ "status": status }));

        self.send(req).await?;
        Ok(())
    }

    #[instrument(skip(self, bytes), fields(filename = %filename, size = bytes.len()))]
    async fn upload_image(
        &self,
        filename: &str,
        content_type: &str,
        bytes: Vec<u8>,
    ) -> Result<String, BackendError> {
        // Prefix with a fresh UUID so concurrent uploads of the same
        // filename cannot clobber each other.
        let path = format!("products/{}_{filename}", Uuid::new_v4());
        let bucket = &self.inner.storage_bucket;

        let upload = self
            .service_headers(
                self.inner
                    .client
                    .post(self.storage_url(&format!("object/{bucket}/{path}"))),
            )
            .header(CONTENT_TYPE, content_type)
            .body(bytes);
        self.send(upload).await?;

        let sign = self
            .service_headers(
                self.inner
                    .client
                    .post(self.storage_url(&format!("object/sign/{bucket}/{path}"))),
            )
            .json(&json!({ "expiresIn": SIGNED_URL_TTL_SECONDS }));
        let signed: SignedUrlResponse = self.send_json(sign).await?;

        Ok(format!(
            "{}/storage/v1{}",
            self.inner.base_url, signed.signed_url
        ))
    }
}
