//! Derived cart values.
//!
//! Pure functions of the current [`CartState`] and a product lookup. They
//! are recomputed on every read - nothing here caches, so a displayed total
//! can never drift from the state it was derived from.

use sockworks_core::{CurrencyCode, Price, ProductId};

use super::CartState;

/// Total number of units across all lines.
#[must_use]
pub fn item_count(cart: &CartState) -> u32 {
    cart.lines()
        .iter()
        .fold(0u32, |acc, line| acc.saturating_add(line.quantity))
}

/// Sum of `quantity * unit price` over all lines.
///
/// `lookup` resolves a product id to its current unit price. Lines whose
/// product no longer resolves contribute nothing, as does a line whose
/// currency disagrees with the running sum (a single catalogue only ever
/// carries one currency, so the latter is a guard, not a code path).
#[must_use]
pub fn subtotal(cart: &CartState, lookup: impl Fn(ProductId) -> Option<Price>) -> Price {
    let mut sum: Option<Price> = None;
    for line in cart.lines() {
        let Some(unit) = lookup(line.product_id) else {
            continue;
        };
        let line_total = unit.times(line.quantity);
        sum = Some(match sum {
            None => line_total,
            Some(acc) => acc.checked_add(&line_total).unwrap_or(acc),
        });
    }
    sum.unwrap_or_else(|| Price::zero(CurrencyCode::default()))
}

/// The amount submitted at checkout.
///
/// Currently equal to the subtotal: tax and shipping are presentation-layer
/// placeholders, not computed here.
#[must_use]
pub fn total(cart: &CartState, lookup: impl Fn(ProductId) -> Option<Price>) -> Price {
    subtotal(cart, lookup)
}
