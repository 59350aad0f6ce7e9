//! Session cart state and its transition rules.
//!
//! The cart is a small piece of per-session state: an insertion-ordered list
//! of (product id, quantity) lines. Every operation is a total function -
//! out-of-range quantities are clamped, removals of absent lines are no-ops,
//! and adding an already-carted product merges into the existing line rather
//! than appending a duplicate.
//!
//! Transitions are pure. The one UI side effect the storefront wants from
//! `add` (opening the cart panel) is returned as an explicit [`CartSignal`]
//! value instead of being performed here, so the state rules stay
//! independently testable.
//!
//! Derived values (subtotal, item count) live in [`pricing`] and are
//! recomputed from the current state on every read.

pub mod pricing;

use serde::{Deserialize, Serialize};

use sockworks_core::ProductId;

/// One product-identity/quantity pair within the cart.
///
/// Invariants, maintained by [`CartState`]:
/// - at most one line exists per product id
/// - `quantity >= 1` (a zero-quantity line is removed, never retained)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartLine {
    /// Weak reference into the catalogue; the cart never owns product data.
    pub product_id: ProductId,
    /// Units of the product, always at least 1.
    pub quantity: u32,
}

/// A UI event produced by a cart transition.
///
/// Returned to the presentation layer rather than acted on here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CartSignal {
    /// The cart panel should be opened (emitted on every add).
    OpenPanel,
}

/// The session's cart: an insertion-ordered sequence of [`CartLine`]s.
///
/// Lines keep the order in which their product was first added; quantity
/// updates and merges never reorder. The cart is created empty at session
/// start, serialized into the session on every mutation, and carries no
/// durability guarantee beyond the session itself.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartState {
    lines: Vec<CartLine>,
}

impl CartState {
    /// Create an empty cart.
    #[must_use]
    pub const fn new() -> Self {
        Self { lines: Vec::new() }
    }

    /// The cart lines, in insertion order.
    #[must_use]
    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    /// Look up the line for a product, if present.
    #[must_use]
    pub fn line(&self, product_id: ProductId) -> Option<&CartLine> {
        self.lines.iter().find(|l| l.product_id == product_id)
    }

    /// Whether the cart has no lines.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Add `quantity` units of a product.
    ///
    /// Quantities below 1 are clamped to 1. If a line for the product
    /// already exists the quantity is summed onto it (merge-by-key,
    /// saturating); otherwise a new line is appended at the end. Always
    /// succeeds.
    #[must_use = "the returned signal tells the presentation layer to open the cart panel"]
    pub fn add(&mut self, product_id: ProductId, quantity: u32) -> CartSignal {
        let quantity = quantity.max(1);
        match self.lines.iter_mut().find(|l| l.product_id == product_id) {
            Some(line) => line.quantity = line.quantity.saturating_add(quantity),
            None => self.lines.push(CartLine {
                product_id,
                quantity,
            }),
        }
        CartSignal::OpenPanel
    }

    /// Remove the line for a product.
    ///
    /// No-op if the product is not in the cart; the order of the remaining
    /// lines is preserved.
    pub fn remove(&mut self, product_id: ProductId) {
        self.lines.retain(|l| l.product_id != product_id);
    }

    /// Set the quantity of an existing line to `max(1, quantity)`.
    ///
    /// Quantities can never be driven below 1 through this path; use
    /// [`CartState::remove`] to delete a line. No-op if the product is not
    /// in the cart.
    pub fn update_quantity(&mut self, product_id: ProductId, quantity: u32) {
        if let Some(line) = self.lines.iter_mut().find(|l| l.product_id == product_id) {
            line.quantity = quantity.max(1);
        }
    }

    /// Reset the cart to empty. Used after successful order placement.
    pub fn clear(&mut self) {
        self.lines.clear();
    }
}
