//! Per-request correlation IDs.
//!
//! Every request gets a UUID v4 (or keeps the `x-request-id` an upstream
//! proxy already assigned). The ID is stored in the request extensions so
//! handlers can log it, tagged onto the Sentry scope so error reports can
//! be matched to log lines, and echoed in the response headers so clients
//! can quote it when reporting a problem.

use axum::{extract::Request, http::HeaderValue, middleware::Next, response::Response};
use uuid::Uuid;

/// The HTTP header name for request IDs.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// A request's correlation ID, available from the request extensions.
#[derive(Debug, Clone)]
pub struct RequestId(pub String);

/// Middleware that ensures every request has a correlation ID.
pub async fn request_id_middleware(mut request: Request, next: Next) -> Response {
    let request_id = request
        .headers()
        .get(REQUEST_ID_HEADER)
        .and_then(|h| h.to_str().ok())
        .map_or_else(|| Uuid::new_v4().to_string(), String::from);

    request
        .extensions_mut()
        .insert(RequestId(request_id.clone()));

    sentry::configure_scope(|scope| {
        scope.set_tag("request_id", &request_id);
    });

    let mut response = next.run(request).await;

    if let Ok(value) = HeaderValue::from_str(&request_id) {
        response.headers_mut().insert(REQUEST_ID_HEADER, value);
    }

    response
}
