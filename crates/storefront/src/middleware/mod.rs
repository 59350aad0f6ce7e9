//! HTTP middleware stack for the storefront.
//!
//! # Middleware Order (bottom to top in Router)
//!
//! 1. Sentry layers (capture errors, outermost)
//! 2. `TraceLayer` (request tracing)
//! 3. Request ID (correlate logs and error reports per request)
//! 4. Session layer (tower-sessions, in-memory store)
//! 5. CORS (the SPA origin, when configured)

pub mod auth;
pub mod request_id;
pub mod session;

pub use auth::{OptionalAuth, RequireAdmin, RequireAuth, clear_current_user, set_current_user};
pub use request_id::{RequestId, request_id_middleware};
pub use session::create_session_layer;
