//! Business logic services for the storefront.
//!
//! # Services
//!
//! - `auth` - Sign-in/sign-up against the hosted auth service, plus the
//!   profile role lookup that decides what the session may do

pub mod auth;

pub use auth::{AuthError, sign_in, sign_up};
