//! Product domain types.

use serde::{Deserialize, Serialize};

use sockworks_core::{Price, ProductId};

/// A catalogue product.
///
/// Owned by the hosted backend; read-only everywhere else. The cart holds
/// product ids only and resolves them against the catalogue on each read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    /// Unique, stable product ID.
    pub id: ProductId,
    /// Display name.
    pub name: String,
    /// Long-form description.
    pub description: String,
    /// Unit price.
    pub price: Price,
    /// Image URLs, in display order.
    pub images: Vec<String>,
    /// Size labels, in display order (e.g. "Small", "Medium", "Large").
    pub sizes: Vec<String>,
}

/// A product payload without an id, for admin create/update.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewProduct {
    pub name: String,
    pub description: String,
    pub price: Price,
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default)]
    pub sizes: Vec<String>,
}
