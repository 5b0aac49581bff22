use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
};
use axum_extra::{
    headers::{authorization::Bearer, Authorization},
    TypedHeader,
};
use tower_http::cors::{Any, CorsLayer};
use uuid::Uuid;

use crate::api::AppState;
use crate::auth::{extract_bearer_token, AuthError};
use crate::errors::AppError;

/// The caller behind a valid bearer token, mapped to an internal user
/// (created on first sight).
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: Uuid,
    pub external_id: String,
}

#[async_trait]
impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let TypedHeader(Authorization(bearer)) =
            TypedHeader::<Authorization<Bearer>>::from_request_parts(parts, state)
                .await
                .map_err(|_| AuthError::MissingAuthHeader)?;

        let claims = state.jwt.validate_token(bearer.token())?;
        let user = state
            .users
            .resolve(&claims.sub, claims.email, claims.name)
            .await?;

        Ok(AuthUser {
            user_id: user.id,
            external_id: user.external_id,
        })
    }
}

/// The external scheduler, authenticated by the shared cron secret.
#[derive(Debug, Clone, Copy)]
pub struct CronCaller;

#[async_trait]
impl FromRequestParts<AppState> for CronCaller {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let expected = state
            .config
            .cron_secret
            .as_deref()
            .ok_or(AuthError::CronDisabled)?;

        let header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .ok_or(AuthError::MissingAuthHeader)?;
        let presented = extract_bearer_token(header)?;

        if !constant_time_eq(presented.as_bytes(), expected.as_bytes()) {
            return Err(AuthError::CronSecretMismatch.into());
        }
        Ok(CronCaller)
    }
}

/// Byte comparison whose running time does not depend on where the inputs
/// first differ.
fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

/// CORS configuration for the API
pub fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constant_time_eq() {
        assert!(constant_time_eq(b"s3cret", b"s3cret"));
        assert!(!constant_time_eq(b"s3cret", b"s3cres"));
        assert!(!constant_time_eq(b"s3cret", b"s3cret!"));
        assert!(constant_time_eq(b"", b""));
    }
}
