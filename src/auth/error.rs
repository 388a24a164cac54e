//! Typed failure taxonomy for the session core.

use axum::http::StatusCode;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AuthError {
    /// Register with an email already bound to a live account.
    #[error("email already registered")]
    EmailTaken,

    /// Wrong or absent credentials. Covers unknown account, wrong
    /// password, and every refresh-token failure, so callers cannot
    /// probe which one it was.
    #[error("invalid credentials")]
    InvalidCredentials,

    /// Refresh token missing, revoked, or expired. Internal to the
    /// store; [`SessionService`](crate::auth::SessionService) folds it
    /// into [`AuthError::InvalidCredentials`] before it crosses the
    /// HTTP boundary.
    #[error("invalid refresh token")]
    InvalidRefreshToken,

    /// The persistence layer cannot be reached. Not retried here;
    /// surfaced as a server error.
    #[error("storage unavailable: {0}")]
    Storage(#[from] sqlx::Error),

    /// Hashing or token-generation failure. Verification of a
    /// malformed stored hash is *not* this — that reads as
    /// [`AuthError::InvalidCredentials`].
    #[error("cryptography error: {0}")]
    Crypto(String),
}

impl AuthError {
    /// Transport mapping used by the HTTP handlers.
    #[must_use]
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::EmailTaken => StatusCode::CONFLICT,
            Self::InvalidCredentials | Self::InvalidRefreshToken => StatusCode::UNAUTHORIZED,
            Self::Storage(_) | Self::Crypto(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}
