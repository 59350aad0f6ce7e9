//! Order domain types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use sockworks_core::{DeliveryMethod, OrderId, OrderStatus, Price, ProductId, UserId};

/// One line of an order, denormalized at submission time.
///
/// Name and unit price are copied out of the catalogue when the order
/// snapshot is captured, so later catalogue edits cannot rewrite history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderItem {
    pub product_id: ProductId,
    pub name: String,
    pub price: Price,
    pub quantity: u32,
}

impl OrderItem {
    /// Line total (unit price times quantity).
    #[must_use]
    pub fn line_total(&self) -> Price {
        self.price.times(self.quantity)
    }
}

/// A placed order, as stored by the hosted backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    pub user_id: UserId,
    pub items: Vec<OrderItem>,
    pub total: Price,
    pub delivery_method: DeliveryMethod,
    pub location: String,
    pub phone: String,
    pub notes: String,
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
}

/// An order submission payload.
///
/// The backend allocates the id, stamps `created_at`, and starts the order
/// in [`OrderStatus::Pending`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewOrder {
    pub user_id: UserId,
    pub items: Vec<OrderItem>,
    pub total: Price,
    pub delivery_method: DeliveryMethod,
    pub location: String,
    pub phone: String,
    pub notes: String,
}
