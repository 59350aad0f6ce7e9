//! User domain types.
//!
//! These types represent validated domain objects separate from the wire
//! records the hosted auth service returns.

use serde::{Deserialize, Serialize};

use sockworks_core::{Email, Role, UserId};

/// An authenticated storefront user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Opaque ID issued by the hosted auth service.
    pub id: UserId,
    /// User's email address.
    pub email: Email,
    /// Role from the user's profile.
    pub role: Role,
}

/// A user profile row from the backend's `profiles` table.
///
/// Profiles carry the role and a display email; either may be absent for
/// accounts created before the profile trigger existed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    pub id: UserId,
    pub email: Option<Email>,
    pub role: Role,
}
