use thiserror::Error;

use crate::errors::AppError;

/// Why a request's credentials were rejected. Callers only ever see
/// `AppError::Unauthenticated`; the detail goes to the log.
#[derive(Error, Debug)]
pub enum AuthError {
    #[error("Missing authorization header")]
    MissingAuthHeader,
    #[error("Invalid authorization header format")]
    InvalidAuthHeaderFormat,
    #[error("Invalid token")]
    InvalidToken,
    #[error("Token expired")]
    TokenExpired,
    #[error("Cron secret not configured")]
    CronDisabled,
    #[error("Cron secret mismatch")]
    CronSecretMismatch,
    #[error("JWT error: {0}")]
    Jwt(#[from] jsonwebtoken::errors::Error),
}

impl From<AuthError> for AppError {
    fn from(err: AuthError) -> Self {
        tracing::debug!("Rejected credentials: {}", err);
        AppError::Unauthenticated
    }
}
