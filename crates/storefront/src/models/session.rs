//! Session-related types.
//!
//! Types stored in the session for authentication and cart state.

use serde::{Deserialize, Serialize};

use sockworks_core::{Email, Role, UserId};

/// Session-stored user identity.
///
/// Minimal data stored in the session to identify the logged-in user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrentUser {
    /// User's backend auth ID.
    pub id: UserId,
    /// User's email address.
    pub email: Email,
    /// Role from the user's profile.
    pub role: Role,
}

impl CurrentUser {
    /// Whether this user may use the admin surface.
    #[must_use]
    pub const fn is_admin(&self) -> bool {
        matches!(self.role, Role::Admin)
    }
}

/// Session keys for per-session state.
pub mod session_keys {
    /// Key for storing the current logged-in user.
    pub const CURRENT_USER: &str = "current_user";

    /// Key for storing the session's cart state.
    pub const CART: &str = "cart";
}
