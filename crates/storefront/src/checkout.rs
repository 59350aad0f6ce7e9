//! Checkout: snapshot capture, delivery validation, and order submission.
//!
//! A checkout attempt freezes the cart into an [`OrderSnapshot`] - an
//! immutable copy with denormalized lines and a computed total - before
//! anything is sent to the backend. Because the snapshot is a copy, cart
//! edits made while a submission is in flight cannot change what was
//! submitted, and the total the user saw is exactly the total written.
//!
//! Submission progress is tracked by the [`Submission`] state machine:
//! `Idle -> Submitting -> Succeeded | Failed`. Failure returns to idle with
//! the cart untouched so the user can retry; only success clears the cart,
//! and that is the caller's move, never an implicit side effect here.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::instrument;

use sockworks_core::{DeliveryMethod, OrderId, Price, ProductId};

use crate::backend::{BackendError, BackendGateway};
use crate::cart::CartState;
use crate::models::{CurrentUser, NewOrder, OrderItem, Product};

/// Validation failures that stop a checkout before submission.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// The delivery location field is blank.
    #[error("a delivery or pickup location is required")]
    MissingLocation,
    /// The phone field is blank.
    #[error("a phone number is required")]
    MissingPhone,
    /// The cart has no lines.
    #[error("the cart is empty")]
    EmptyCart,
    /// No cart line resolves to a catalogue product.
    #[error("no cart item is available any more")]
    UnknownProducts,
}

/// Delivery fields entered on the checkout form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeliveryDetails {
    pub delivery_method: DeliveryMethod,
    pub location: String,
    pub phone: String,
    #[serde(default)]
    pub notes: String,
}

impl DeliveryDetails {
    /// Check that the required fields are present.
    ///
    /// # Errors
    ///
    /// Returns the first missing required field.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.location.trim().is_empty() {
            return Err(ValidationError::MissingLocation);
        }
        if self.phone.trim().is_empty() {
            return Err(ValidationError::MissingPhone);
        }
        Ok(())
    }
}

/// An immutable, point-in-time projection of the cart for submission.
///
/// Holds copies, not references: mutating the cart after capture leaves the
/// snapshot's lines and total unchanged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderSnapshot {
    items: Vec<OrderItem>,
    total: Price,
    delivery: DeliveryDetails,
}

impl OrderSnapshot {
    /// Capture the current cart atomically.
    ///
    /// Lines are denormalized through `lookup` (name and unit price copied
    /// out of the catalogue) and the total is computed from the captured
    /// lines, so the submitted amount cannot drift from the displayed one.
    /// Lines whose product no longer resolves are dropped.
    ///
    /// # Errors
    ///
    /// Returns a [`ValidationError`] if the delivery fields are incomplete,
    /// the cart is empty, or no line resolves to a product.
    pub fn capture<'a>(
        cart: &CartState,
        lookup: impl Fn(ProductId) -> Option<&'a Product>,
        delivery: DeliveryDetails,
    ) -> Result<Self, ValidationError> {
        delivery.validate()?;

        if cart.is_empty() {
            return Err(ValidationError::EmptyCart);
        }

        let items: Vec<OrderItem> = cart
            .lines()
            .iter()
            .filter_map(|line| {
                lookup(line.product_id).map(|product| OrderItem {
                    product_id: product.id,
                    name: product.name.clone(),
                    price: product.price,
                    quantity: line.quantity,
                })
            })
            .collect();

        if items.is_empty() {
            return Err(ValidationError::UnknownProducts);
        }

        let total = items.iter().fold(None::<Price>, |acc, item| {
            let line_total = item.line_total();
            Some(match acc {
                None => line_total,
                Some(sum) => sum.checked_add(&line_total).unwrap_or(sum),
            })
        });
        // items is non-empty, so the fold produced a value
        let total = total.unwrap_or_else(|| Price::zero(sockworks_core::CurrencyCode::default()));

        Ok(Self {
            items,
            total,
            delivery,
        })
    }

    /// The captured lines.
    #[must_use]
    pub fn items(&self) -> &[OrderItem] {
        &self.items
    }

    /// The total computed at capture time.
    #[must_use]
    pub const fn total(&self) -> Price {
        self.total
    }

    /// The delivery fields captured with the cart.
    #[must_use]
    pub const fn delivery(&self) -> &DeliveryDetails {
        &self.delivery
    }

    /// Build the submission payload for a user.
    #[must_use]
    pub fn into_new_order(self, user: &CurrentUser) -> NewOrder {
        NewOrder {
            user_id: user.id.clone(),
            items: self.items,
            total: self.total,
            delivery_method: self.delivery.delivery_method,
            location: self.delivery.location,
            phone: self.delivery.phone,
            notes: self.delivery.notes,
        }
    }
}

/// Invalid state-machine transitions.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TransitionError {
    /// `begin` while a submission is already outstanding.
    #[error("a submission is already in flight")]
    AlreadySubmitting,
    /// `begin` after the snapshot already succeeded.
    #[error("this order was already placed")]
    AlreadySucceeded,
    /// `complete`/`fail` without an outstanding submission.
    #[error("no submission is in flight")]
    NotSubmitting,
}

/// Progress of one checkout attempt over one snapshot.
///
/// ```text
/// Idle -> Submitting -> Succeeded(order)   (terminal for this snapshot)
///                    -> Failed(reason) -> Submitting (retry)
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Submission {
    /// Nothing outstanding.
    #[default]
    Idle,
    /// The snapshot has been handed to the backend; duplicate submission is
    /// rejected until this resolves.
    Submitting,
    /// The backend accepted the order. Terminal; a new attempt starts a
    /// fresh [`Submission`].
    Succeeded(OrderId),
    /// The backend rejected or never received the order. The cart is
    /// intact and the attempt may be retried.
    Failed(String),
}

impl Submission {
    /// Whether a submission is currently outstanding.
    #[must_use]
    pub const fn in_flight(&self) -> bool {
        matches!(self, Self::Submitting)
    }

    /// Enter `Submitting`.
    ///
    /// # Errors
    ///
    /// Rejected while already submitting, or after success.
    pub fn begin(&mut self) -> Result<(), TransitionError> {
        match self {
            Self::Idle | Self::Failed(_) => {
                *self = Self::Submitting;
                Ok(())
            }
            Self::Submitting => Err(TransitionError::AlreadySubmitting),
            Self::Succeeded(_) => Err(TransitionError::AlreadySucceeded),
        }
    }

    /// Record a successful submission.
    ///
    /// # Errors
    ///
    /// Rejected unless a submission is in flight.
    pub fn complete(&mut self, order_id: OrderId) -> Result<(), TransitionError> {
        match self {
            Self::Submitting => {
                *self = Self::Succeeded(order_id);
                Ok(())
            }
            _ => Err(TransitionError::NotSubmitting),
        }
    }

    /// Record a failed submission.
    ///
    /// # Errors
    ///
    /// Rejected unless a submission is in flight.
    pub fn fail(&mut self, reason: impl Into<String>) -> Result<(), TransitionError> {
        match self {
            Self::Submitting => {
                *self = Self::Failed(reason.into());
                Ok(())
            }
            _ => Err(TransitionError::NotSubmitting),
        }
    }
}

/// Submit a captured snapshot through the gateway.
///
/// The snapshot is already a copy, so concurrent cart edits are harmless.
/// On success the *caller* clears the cart; on failure the cart must be
/// left exactly as it was so the user can retry.
///
/// # Errors
///
/// Returns the gateway error unchanged; the caller maps it for the client.
#[instrument(skip(gateway, snapshot, user), fields(user_id = %user.id, total = %snapshot.total()))]
pub async fn place_order(
    gateway: &dyn BackendGateway,
    user: &CurrentUser,
    snapshot: OrderSnapshot,
) -> Result<OrderId, BackendError> {
    let order = gateway.insert_order(&snapshot.into_new_order(user)).await?;
    tracing::info!(order_id = %order.id, "order placed");
    Ok(order.id)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;
    use sockworks_core::CurrencyCode;

    fn product(id: i32, cents: i64) -> Product {
        Product {
            id: ProductId::new(id),
            name: format!("Sock {id}"),
            description: String::new(),
            price: Price::new(Decimal::new(cents, 2), CurrencyCode::NAD),
            images: Vec::new(),
            sizes: Vec::new(),
        }
    }

    fn delivery() -> DeliveryDetails {
        DeliveryDetails {
            delivery_method: DeliveryMethod::Delivery,
            location: "12 Independence Ave".to_string(),
            phone: "+264 81 000 0000".to_string(),
            notes: String::new(),
        }
    }

    fn catalogue() -> Vec<Product> {
        vec![product(1, 1000), product(2, 500)]
    }

    fn lookup_in<'a>(products: &'a [Product]) -> impl Fn(ProductId) -> Option<&'a Product> + 'a {
        move |id| products.iter().find(|p| p.id == id)
    }

    #[test]
    fn test_delivery_validation() {
        let mut details = delivery();
        assert!(details.validate().is_ok());

        details.location = "   ".to_string();
        assert_eq!(details.validate(), Err(ValidationError::MissingLocation));

        details.location = "somewhere".to_string();
        details.phone = String::new();
        assert_eq!(details.validate(), Err(ValidationError::MissingPhone));
    }

    #[test]
    fn test_capture_computes_total_from_captured_lines() {
        let products = catalogue();
        let mut cart = CartState::new();
        let _ = cart.add(ProductId::new(1), 2);
        let _ = cart.add(ProductId::new(2), 3);

        let snapshot = OrderSnapshot::capture(&cart, lookup_in(&products), delivery()).unwrap();

        // 2 x 10.00 + 3 x 5.00 = 35.00
        assert_eq!(snapshot.total().amount, Decimal::new(3500, 2));
        assert_eq!(snapshot.items().len(), 2);
    }

    #[test]
    fn test_capture_rejects_empty_cart() {
        let products = catalogue();
        assert_eq!(
            OrderSnapshot::capture(&CartState::new(), lookup_in(&products), delivery()),
            Err(ValidationError::EmptyCart)
        );
    }

    #[test]
    fn test_capture_rejects_fully_unresolvable_cart() {
        let products = catalogue();
        let mut cart = CartState::new();
        let _ = cart.add(ProductId::new(99), 1);

        assert_eq!(
            OrderSnapshot::capture(&cart, lookup_in(&products), delivery()),
            Err(ValidationError::UnknownProducts)
        );
    }

    #[test]
    fn test_snapshot_is_isolated_from_later_mutation() {
        let products = catalogue();
        let mut cart = CartState::new();
        let _ = cart.add(ProductId::new(1), 2);

        let snapshot = OrderSnapshot::capture(&cart, lookup_in(&products), delivery()).unwrap();
        let total_before = snapshot.total();
        let items_before = snapshot.items().to_vec();

        let _ = cart.add(ProductId::new(2), 5);
        cart.update_quantity(ProductId::new(1), 9);

        assert_eq!(snapshot.total(), total_before);
        assert_eq!(snapshot.items(), items_before.as_slice());
    }

    #[test]
    fn test_submission_happy_path() {
        let mut submission = Submission::default();
        assert!(!submission.in_flight());

        submission.begin().unwrap();
        assert!(submission.in_flight());

        submission.complete(OrderId::new(7)).unwrap();
        assert_eq!(submission, Submission::Succeeded(OrderId::new(7)));
    }

    #[test]
    fn test_submission_rejects_duplicates_in_flight() {
        let mut submission = Submission::default();
        submission.begin().unwrap();
        assert_eq!(submission.begin(), Err(TransitionError::AlreadySubmitting));
    }

    #[test]
    fn test_submission_failed_returns_to_retryable() {
        let mut submission = Submission::default();
        submission.begin().unwrap();
        submission.fail("network down").unwrap();
        assert_eq!(submission, Submission::Failed("network down".to_string()));

        // Failed is retryable
        submission.begin().unwrap();
        assert!(submission.in_flight());
    }

    #[test]
    fn test_submission_success_is_terminal() {
        let mut submission = Submission::default();
        submission.begin().unwrap();
        submission.complete(OrderId::new(1)).unwrap();
        assert_eq!(submission.begin(), Err(TransitionError::AlreadySucceeded));
    }

    #[test]
    fn test_transitions_require_in_flight() {
        let mut submission = Submission::default();
        assert_eq!(
            submission.complete(OrderId::new(1)),
            Err(TransitionError::NotSubmitting)
        );
        assert_eq!(
            submission.fail("late"),
            Err(TransitionError::NotSubmitting)
        );
    }
}
