//! Authentication route handlers.
//!
//! Thin JSON wrappers over [`crate::services::auth`]: exchange credentials
//! with the hosted auth service, then store (or clear) the resulting
//! [`CurrentUser`] in the session. The session id is cycled on every
//! login to prevent fixation.

use axum::{Json, extract::State};
use serde::{Deserialize, Serialize};
use tower_sessions::Session;
use tracing::instrument;

use crate::error::Result;
use crate::middleware::{clear_current_user, set_current_user};
use crate::models::CurrentUser;
use crate::services::auth;
use crate::state::AppState;

/// Credentials request body (login and registration).
#[derive(Debug, Deserialize)]
pub struct CredentialsRequest {
    pub email: String,
    pub password: String,
}

/// Authenticated user response body.
#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub user: CurrentUser,
}

/// Register a new account and sign it in.
#[instrument(skip(state, session, request))]
pub async fn register(
    State(state): State<AppState>,
    session: Session,
    Json(request): Json<CredentialsRequest>,
) -> Result<Json<AuthResponse>> {
    let user = auth::sign_up(state.gateway(), &request.email, &request.password).await?;

    session.cycle_id().await?;
    set_current_user(&session, &user).await?;

    tracing::info!(user_id = %user.id, "user registered");
    Ok(Json(AuthResponse { user }))
}

/// Sign an existing user in.
#[instrument(skip(state, session, request))]
pub async fn login(
    State(state): State<AppState>,
    session: Session,
    Json(request): Json<CredentialsRequest>,
) -> Result<Json<AuthResponse>> {
    let user = auth::sign_in(state.gateway(), &request.email, &request.password).await?;

    session.cycle_id().await?;
    set_current_user(&session, &user).await?;

    tracing::info!(user_id = %user.id, "user logged in");
    Ok(Json(AuthResponse { user }))
}

/// Sign the current user out.
#[instrument(skip(session))]
pub async fn logout(session: Session) -> Result<Json<serde_json::Value>> {
    clear_current_user(&session).await?;
    Ok(Json(serde_json::json!({ "logged_out": true })))
}
