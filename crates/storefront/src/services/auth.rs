//! Authentication flows over the backend gateway.
//!
//! Credentials never touch this service beyond being forwarded to the
//! hosted auth endpoint; there is no local password storage. After a
//! successful exchange the user's profile is fetched for its role - a
//! missing or unreadable profile degrades to [`Role::User`] rather than
//! blocking login.

use thiserror::Error;
use tracing::instrument;

use sockworks_core::{Email, EmailError, Role};

use crate::backend::{BackendError, BackendGateway};
use crate::models::CurrentUser;

/// Minimum password length accepted at registration.
const MIN_PASSWORD_LENGTH: usize = 8;

/// Errors that can occur during authentication operations.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Invalid email format.
    #[error("invalid email: {0}")]
    InvalidEmail(#[from] EmailError),

    /// Invalid credentials (wrong password or unknown account).
    #[error("invalid credentials")]
    InvalidCredentials,

    /// An account with this email already exists.
    #[error("user already exists")]
    UserAlreadyExists,

    /// Password too weak or invalid.
    #[error("password validation failed: {0}")]
    WeakPassword(String),

    /// Backend gateway error.
    #[error("backend error: {0}")]
    Backend(BackendError),
}

impl From<BackendError> for AuthError {
    fn from(err: BackendError) -> Self {
        match err {
            BackendError::Unauthorized(_) => Self::InvalidCredentials,
            BackendError::Conflict(_) => Self::UserAlreadyExists,
            other => Self::Backend(other),
        }
    }
}

/// Resolve the role for a user, degrading to `user` when the profile
/// cannot be read.
async fn role_for(gateway: &dyn BackendGateway, session: &crate::backend::AuthSession) -> Role {
    match gateway.get_profile(&session.user_id).await {
        Ok(profile) => profile.role,
        Err(e) => {
            tracing::warn!(
                user_id = %session.user_id,
                error = %e,
                "profile lookup failed, defaulting role to user"
            );
            Role::User
        }
    }
}

/// Sign an existing user in.
///
/// # Errors
///
/// Returns `AuthError::InvalidEmail` for a malformed email,
/// `AuthError::InvalidCredentials` when the auth service rejects the pair,
/// or `AuthError::Backend` for transport-level failures.
#[instrument(skip(gateway, password))]
pub async fn sign_in(
    gateway: &dyn BackendGateway,
    email: &str,
    password: &str,
) -> Result<CurrentUser, AuthError> {
    let email = Email::parse(email)?;
    let session = gateway.authenticate(&email, password).await?;
    let role = role_for(gateway, &session).await;

    Ok(CurrentUser {
        id: session.user_id,
        email: session.email,
        role,
    })
}

/// Register a new account and sign it in.
///
/// # Errors
///
/// Returns `AuthError::WeakPassword` for a too-short password,
/// `AuthError::UserAlreadyExists` when the email is taken, or the same
/// failures as [`sign_in`].
#[instrument(skip(gateway, password))]
pub async fn sign_up(
    gateway: &dyn BackendGateway,
    email: &str,
    password: &str,
) -> Result<CurrentUser, AuthError> {
    let email = Email::parse(email)?;

    if password.len() < MIN_PASSWORD_LENGTH {
        return Err(AuthError::WeakPassword(format!(
            "password must be at least {MIN_PASSWORD_LENGTH} characters"
        )));
    }

    let session = gateway.sign_up(&email, password).await?;
    let role = role_for(gateway, &session).await;

    Ok(CurrentUser {
        id: session.user_id,
        email: session.email,
        role,
    })
}
