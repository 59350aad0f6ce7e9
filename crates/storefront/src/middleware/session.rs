//! Session middleware configuration.
//!
//! Sessions are held in memory: they scope the cart and the logged-in
//! user, both of which the service explicitly does not promise to keep
//! beyond the session itself. A restart starts everyone with an empty
//! cart, which matches the cart's lifecycle contract.

use tower_sessions::{Expiry, MemoryStore, SessionManagerLayer};

/// Session cookie name.
pub const SESSION_COOKIE_NAME: &str = "sockworks_session";

/// Session expiry time in seconds (12 hours of inactivity).
const SESSION_EXPIRY_SECONDS: i64 = 12 * 60 * 60;

/// Create the session layer with an in-memory store.
///
/// `secure` should be true when the storefront is served over HTTPS.
#[must_use]
pub fn create_session_layer(secure: bool) -> SessionManagerLayer<MemoryStore> {
    let store = MemoryStore::default();

    SessionManagerLayer::new(store)
        .with_name(SESSION_COOKIE_NAME)
        .with_expiry(Expiry::OnInactivity(
            tower_sessions::cookie::time::Duration::seconds(SESSION_EXPIRY_SECONDS),
        ))
        .with_secure(secure)
        .with_same_site(tower_sessions::cookie::SameSite::Lax)
        .with_http_only(true)
        .with_path("/")
}
