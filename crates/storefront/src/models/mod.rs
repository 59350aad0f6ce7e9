//! Domain models for the storefront.
//!
//! These are the validated, typed records the rest of the service works
//! with. Untyped wire data from the hosted backend never crosses this
//! boundary; see `crate::backend::records` for the conversion layer.

pub mod order;
pub mod product;
pub mod session;
pub mod user;

pub use order::{NewOrder, Order, OrderItem};
pub use product::{NewProduct, Product};
pub use session::{CurrentUser, session_keys};
pub use user::{Profile, User};
