//! Hosted backend gateway.
//!
//! All persistence in this service is delegated to a hosted
//! database/auth/storage provider. Everything that talks to it goes through
//! the [`BackendGateway`] trait - one interface covering auth, profiles,
//! products, orders, and image storage - so the rest of the service (and the
//! tests) never touch the provider directly and can substitute an in-memory
//! implementation.
//!
//! The production implementation is [`RestBackend`], a `reqwest` client
//! against the provider's REST/auth/storage endpoints.

pub mod records;
mod rest;

pub use rest::RestBackend;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use secrecy::SecretString;
use thiserror::Error;

use sockworks_core::{Email, OrderId, OrderStatus, ProductId, UserId};

use crate::models::{NewOrder, NewProduct, Order, Product, Profile};

/// Errors that can occur when interacting with the hosted backend.
#[derive(Debug, Error)]
pub enum BackendError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The backend answered with a non-success status.
    #[error("backend returned {status}: {message}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Response body snippet.
        message: String,
    },

    /// JSON parsing failed.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// A record came back in a shape the service refuses to propagate.
    #[error("invalid record: {0}")]
    InvalidRecord(String),

    /// Resource not found.
    #[error("not found: {0}")]
    NotFound(String),

    /// Credentials were rejected by the auth service.
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// The request conflicts with existing state (e.g. duplicate signup).
    #[error("conflict: {0}")]
    Conflict(String),

    /// Rate limited by the backend.
    #[error("rate limited, retry after {0} seconds")]
    RateLimited(u64),
}

/// An authenticated session issued by the hosted auth service.
#[derive(Debug, Clone)]
pub struct AuthSession {
    /// The authenticated user's opaque ID.
    pub user_id: UserId,
    /// The email the account was registered with.
    pub email: Email,
    /// Bearer token for user-scoped requests.
    pub access_token: SecretString,
}

/// Admin-side order listing filter.
///
/// All fields are optional; an empty filter lists everything. Results are
/// always ordered newest first.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OrderFilter {
    /// Only orders currently in this status.
    pub status: Option<OrderStatus>,
    /// Only orders created at or after this instant.
    pub date_from: Option<DateTime<Utc>>,
    /// Only orders created at or before this instant.
    pub date_to: Option<DateTime<Utc>>,
}

/// The single gateway to the hosted backend.
///
/// Object-safe so application state can hold an `Arc<dyn BackendGateway>`
/// and tests can swap in a fake.
#[async_trait]
pub trait BackendGateway: Send + Sync {
    /// Exchange email/password for an authenticated session.
    async fn authenticate(
        &self,
        email: &Email,
        password: &str,
    ) -> Result<AuthSession, BackendError>;

    /// Create an account and return its session.
    async fn sign_up(&self, email: &Email, password: &str) -> Result<AuthSession, BackendError>;

    /// Fetch a single user profile.
    async fn get_profile(&self, user_id: &UserId) -> Result<Profile, BackendError>;

    /// Fetch profiles for a set of users (admin order listing join).
    async fn get_profiles(&self, user_ids: &[UserId]) -> Result<Vec<Profile>, BackendError>;

    /// List the full product catalogue.
    async fn list_products(&self) -> Result<Vec<Product>, BackendError>;

    /// Create a product.
    async fn insert_product(&self, product: &NewProduct) -> Result<Product, BackendError>;

    /// Replace a product's fields.
    async fn update_product(
        &self,
        id: ProductId,
        product: &NewProduct,
    ) -> Result<Product, BackendError>;

    /// Delete a product.
    async fn delete_product(&self, id: ProductId) -> Result<(), BackendError>;

    /// Write an order record; the backend allocates the id.
    async fn insert_order(&self, order: &NewOrder) -> Result<Order, BackendError>;

    /// Fetch a single order.
    async fn get_order(&self, id: OrderId) -> Result<Order, BackendError>;

    /// List orders matching `filter`, newest first.
    async fn list_orders(&self, filter: &OrderFilter) -> Result<Vec<Order>, BackendError>;

    /// Advance an order's status.
    async fn update_order_status(
        &self,
        id: OrderId,
        status: OrderStatus,
    ) -> Result<(), BackendError>;

    /// Upload an image to the backend's storage bucket and return a
    /// long-lived signed URL for it.
    async fn upload_image(
        &self,
        filename: &str,
        content_type: &str,
        bytes: Vec<u8>,
    ) -> Result<String, BackendError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backend_error_display() {
        let err = BackendError::NotFound("product 123".to_string());
        assert_eq!(err.to_string(), "not found: product 123");

        let err = BackendError::Api {
            status: 500,
            message: "boom".to_string(),
        };
        assert_eq!(err.to_string(), "backend returned 500: boom");
    }

    #[test]
    fn test_rate_limited_display() {
        let err = BackendError::RateLimited(60);
        assert_eq!(err.to_string(), "rate limited, retry after 60 seconds");
    }
}
