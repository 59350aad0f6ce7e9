//! Wire records for the hosted backend's REST API.
//!
//! The backend speaks loosely-typed JSON; these records are the only place
//! that shape is allowed to exist. Each incoming record carries an
//! `into_domain` conversion that validates it into a typed model - records
//! that fail validation are rejected at this boundary
//! ([`BackendError::InvalidRecord`]) instead of propagating inward.
//!
//! Outgoing payloads are built here too, flattening typed models back into
//! the backend's column shapes.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use sockworks_core::{
    CurrencyCode, Email, OrderId, Price, ProductId, Role, UserId,
};

use crate::models::{NewOrder, NewProduct, Order, OrderItem, Product, Profile};

use super::BackendError;

/// Auth service user object, embedded in token responses.
#[derive(Debug, Deserialize)]
pub struct AuthUserRecord {
    pub id: String,
    pub email: String,
}

/// Response from the password-grant and signup endpoints.
#[derive(Debug, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub user: AuthUserRecord,
}

/// A row from the `profiles` table.
#[derive(Debug, Clone, Deserialize)]
pub struct ProfileRecord {
    pub id: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
}

impl ProfileRecord {
    /// Validate into a [`Profile`].
    ///
    /// A missing role defaults to [`Role::User`] (accounts predating the
    /// profile trigger have no role column value); an *unknown* role string
    /// is rejected.
    ///
    /// # Errors
    ///
    /// Returns `BackendError::InvalidRecord` for an empty id, an
    /// unparseable role, or a malformed email.
    pub fn into_domain(self) -> Result<Profile, BackendError> {
        if self.id.is_empty() {
            return Err(BackendError::InvalidRecord(
                "profile with empty id".to_string(),
            ));
        }

        let role = match self.role.as_deref() {
            None | Some("") => Role::default(),
            Some(s) => s
                .parse()
                .map_err(|e: String| BackendError::InvalidRecord(e))?,
        };

        let email = match self.email.as_deref() {
            None | Some("") => None,
            Some(s) => Some(Email::parse(s).map_err(|e| {
                BackendError::InvalidRecord(format!("profile {}: {e}", self.id))
            })?),
        };

        Ok(Profile {
            id: UserId::new(self.id),
            email,
            role,
        })
    }
}

/// A row from the `products` table.
#[derive(Debug, Clone, Deserialize)]
pub struct ProductRecord {
    pub id: i32,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub price: Decimal,
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default)]
    pub sizes: Vec<String>,
}

impl ProductRecord {
    /// Validate into a [`Product`], minting prices in the storefront's
    /// currency.
    ///
    /// # Errors
    ///
    /// Returns `BackendError::InvalidRecord` for an empty name or a
    /// negative price.
    pub fn into_domain(self, currency: CurrencyCode) -> Result<Product, BackendError> {
        if self.name.trim().is_empty() {
            return Err(BackendError::InvalidRecord(format!(
                "product {} has no name",
                self.id
            )));
        }

        let price = Price::non_negative(self.price, currency).map_err(|e| {
            BackendError::InvalidRecord(format!("product {}: {e}", self.id))
        })?;

        Ok(Product {
            id: ProductId::new(self.id),
            name: self.name,
            description: self.description,
            price,
            images: self.images,
            sizes: self.sizes,
        })
    }
}

/// Outgoing product payload (create and update).
#[derive(Debug, Serialize)]
pub struct ProductPayload {
    pub name: String,
    pub description: String,
    pub price: Decimal,
    pub images: Vec<String>,
    pub sizes: Vec<String>,
}

impl From<&NewProduct> for ProductPayload {
    fn from(product: &NewProduct) -> Self {
        Self {
            name: product.name.clone(),
            description: product.description.clone(),
            price: product.price.amount,
            images: product.images.clone(),
            sizes: product.sizes.clone(),
        }
    }
}

/// One denormalized line inside an order row's `items` column.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderItemRecord {
    pub product_id: i32,
    pub name: String,
    pub price: Decimal,
    pub quantity: i64,
}

impl OrderItemRecord {
    fn into_domain(self, currency: CurrencyCode) -> Result<OrderItem, BackendError> {
        let quantity = u32::try_from(self.quantity).ok().filter(|q| *q >= 1).ok_or_else(|| {
            BackendError::InvalidRecord(format!(
                "order item for product {} has quantity {}",
                self.product_id, self.quantity
            ))
        })?;

        let price = Price::non_negative(self.price, currency).map_err(|e| {
            BackendError::InvalidRecord(format!(
                "order item for product {}: {e}",
                self.product_id
            ))
        })?;

        Ok(OrderItem {
            product_id: ProductId::new(self.product_id),
            name: self.name,
            price,
            quantity,
        })
    }
}

impl From<&OrderItem> for OrderItemRecord {
    fn from(item: &OrderItem) -> Self {
        Self {
            product_id: item.product_id.as_i32(),
            name: item.name.clone(),
            price: item.price.amount,
            quantity: i64::from(item.quantity),
        }
    }
}

/// A row from the `orders` table.
#[derive(Debug, Clone, Deserialize)]
pub struct OrderRecord {
    pub id: i32,
    pub user_id: String,
    pub items: Vec<OrderItemRecord>,
    pub total: Decimal,
    pub delivery_method: String,
    pub location: String,
    pub phone: String,
    #[serde(default)]
    pub notes: Option<String>,
    pub status: String,
    pub created_at: DateTime<Utc>,
}

impl OrderRecord {
    /// Validate into an [`Order`].
    ///
    /// # Errors
    ///
    /// Returns `BackendError::InvalidRecord` for an empty user id, an empty
    /// item list, an unknown status or delivery method, a negative total,
    /// or any invalid item.
    pub fn into_domain(self, currency: CurrencyCode) -> Result<Order, BackendError> {
        if self.user_id.is_empty() {
            return Err(BackendError::InvalidRecord(format!(
                "order {} has no user id",
                self.id
            )));
        }
        if self.items.is_empty() {
            return Err(BackendError::InvalidRecord(format!(
                "order {} has no items",
                self.id
            )));
        }

        let status = self
            .status
            .parse()
            .map_err(|e: String| BackendError::InvalidRecord(format!("order {}: {e}", self.id)))?;
        let delivery_method = self
            .delivery_method
            .parse()
            .map_err(|e: String| BackendError::InvalidRecord(format!("order {}: {e}", self.id)))?;
        let total = Price::non_negative(self.total, currency)
            .map_err(|e| BackendError::InvalidRecord(format!("order {}: {e}", self.id)))?;

        let items = self
            .items
            .into_iter()
            .map(|item| item.into_domain(currency))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Order {
            id: OrderId::new(self.id),
            user_id: UserId::new(self.user_id),
            items,
            total,
            delivery_method,
            location: self.location,
            phone: self.phone,
            notes: self.notes.unwrap_or_default(),
            status,
            created_at: self.created_at,
        })
    }
}

/// Outgoing order payload.
///
/// The backend allocates the id, stamps `created_at`, and defaults the
/// status column to `pending`.
#[derive(Debug, Serialize)]
pub struct OrderPayload {
    pub user_id: String,
    pub items: Vec<OrderItemRecord>,
    pub total: Decimal,
    pub delivery_method: String,
    pub location: String,
    pub phone: String,
    pub notes: String,
}

impl From<&NewOrder> for OrderPayload {
    fn from(order: &NewOrder) -> Self {
        Self {
            user_id: order.user_id.as_str().to_owned(),
            items: order.items.iter().map(OrderItemRecord::from).collect(),
            total: order.total.amount,
            delivery_method: order.delivery_method.to_string(),
            location: order.location.clone(),
            phone: order.phone.clone(),
            notes: order.notes.clone(),
        }
    }
}

/// Response from the storage signing endpoint.
#[derive(Debug, Deserialize)]
pub struct SignedUrlResponse {
    #[serde(rename = "signedURL")]
    pub signed_url: String,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use sockworks_core::OrderStatus;

    fn product_record() -> ProductRecord {
        ProductRecord {
            id: 1,
            name: "Classic Elegance".to_string(),
            description: "Signature black socks".to_string(),
            price: Decimal::new(7999, 2),
            images: vec!["/classic.jpg".to_string()],
            sizes: vec!["Small".to_string(), "Medium".to_string()],
        }
    }

    fn order_record() -> OrderRecord {
        OrderRecord {
            id: 11,
            user_id: "user-1".to_string(),
            items: vec![OrderItemRecord {
                product_id: 1,
                name: "Classic Elegance".to_string(),
                price: Decimal::new(7999, 2),
                quantity: 2,
            }],
            total: Decimal::new(15998, 2),
            delivery_method: "delivery".to_string(),
            location: "12 Independence Ave".to_string(),
            phone: "+264 81 000 0000".to_string(),
            notes: None,
            status: "pending".to_string(),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_product_record_validates() {
        let product = product_record().into_domain(CurrencyCode::NAD).unwrap();
        assert_eq!(product.id, ProductId::new(1));
        assert_eq!(product.price.amount, Decimal::new(7999, 2));
    }

    #[test]
    fn test_product_record_rejects_negative_price() {
        let mut record = product_record();
        record.price = Decimal::new(-100, 2);
        assert!(matches!(
            record.into_domain(CurrencyCode::NAD),
            Err(BackendError::InvalidRecord(_))
        ));
    }

    #[test]
    fn test_product_record_rejects_blank_name() {
        let mut record = product_record();
        record.name = "  ".to_string();
        assert!(matches!(
            record.into_domain(CurrencyCode::NAD),
            Err(BackendError::InvalidRecord(_))
        ));
    }

    #[test]
    fn test_order_record_validates() {
        let order = order_record().into_domain(CurrencyCode::NAD).unwrap();
        assert_eq!(order.status, OrderStatus::Pending);
        assert_eq!(order.items.len(), 1);
        assert_eq!(order.notes, "");
    }

    #[test]
    fn test_order_record_rejects_unknown_status() {
        let mut record = order_record();
        record.status = "refunded".to_string();
        assert!(matches!(
            record.into_domain(CurrencyCode::NAD),
            Err(BackendError::InvalidRecord(_))
        ));
    }

    #[test]
    fn test_order_record_rejects_empty_items() {
        let mut record = order_record();
        record.items.clear();
        assert!(matches!(
            record.into_domain(CurrencyCode::NAD),
            Err(BackendError::InvalidRecord(_))
        ));
    }

    #[test]
    fn test_order_item_rejects_zero_quantity() {
        let mut record = order_record();
        record.items[0].quantity = 0;
        assert!(matches!(
            record.into_domain(CurrencyCode::NAD),
            Err(BackendError::InvalidRecord(_))
        ));
    }

    #[test]
    fn test_profile_record_defaults_missing_role() {
        let record = ProfileRecord {
            id: "user-1".to_string(),
            email: Some("shopper@example.com".to_string()),
            role: None,
        };
        let profile = record.into_domain().unwrap();
        assert_eq!(profile.role, Role::User);
    }

    #[test]
    fn test_profile_record_rejects_unknown_role() {
        let record = ProfileRecord {
            id: "user-1".to_string(),
            email: None,
            role: Some("owner".to_string()),
        };
        assert!(matches!(
            record.into_domain(),
            Err(BackendError::InvalidRecord(_))
        ));
    }
}
