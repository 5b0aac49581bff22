use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};

use crate::auth::{AuthError, Claims};

/// JWT token service for issuing and validating identity tokens
#[derive(Clone)]
pub struct JwtService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    token_expires_in: Duration,
}

impl std::fmt::Debug for JwtService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtService")
            .field("encoding_key", &"[REDACTED]")
            .field("decoding_key", &"[REDACTED]")
            .field("token_expires_in", &self.token_expires_in)
            .finish()
    }
}

impl JwtService {
    /// Create a new JWT service with the given secret
    pub fn new(secret: &str) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            token_expires_in: Duration::hours(12),
        }
    }

    /// Issue a token for an external identity. Production tokens come from the
    /// identity provider; this serves local tooling and tests.
    pub fn create_token(
        &self,
        external_id: &str,
        email: Option<&str>,
        name: Option<&str>,
    ) -> Result<String, AuthError> {
        let now = Utc::now();
        let exp = now + self.token_expires_in;

        let claims = Claims {
            sub: external_id.to_string(),
            email: email.map(str::to_string),
            name: name.map(str::to_string),
            exp: exp.timestamp() as usize,
            iat: now.timestamp() as usize,
        };

        encode(&Header::default(), &claims, &self.encoding_key).map_err(AuthError::Jwt)
    }

    /// Validate and decode a token
    pub fn validate_token(&self, token: &str) -> Result<Claims, AuthError> {
        let validation = Validation::new(Algorithm::HS256);

        let claims = decode::<Claims>(token, &self.decoding_key, &validation)
            .map(|token_data| token_data.claims)
            .map_err(|err| match err.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => AuthError::TokenExpired,
                _ => AuthError::InvalidToken,
            })?;

        if claims.sub.trim().is_empty() {
            return Err(AuthError::InvalidToken);
        }
        Ok(claims)
    }
}

/// Extract bearer token from authorization header
pub fn extract_bearer_token(auth_header: &str) -> Result<&str, AuthError> {
    let token = auth_header
        .strip_prefix("Bearer ")
        .ok_or(AuthError::InvalidAuthHeaderFormat)?;

    if token.is_empty() {
        return Err(AuthError::InvalidAuthHeaderFormat);
    }

    Ok(token)
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn test_jwt_creation_and_validation() {
        let jwt_service = JwtService::new("test_secret");

        let token = jwt_service
            .create_token("user_2abc", Some("test@example.com"), None)
            .unwrap();

        let claims = jwt_service.validate_token(&token).unwrap();

        assert_eq!(claims.sub, "user_2abc");
        assert_eq!(claims.email.as_deref(), Some("test@example.com"));
        assert_eq!(claims.name, None);
    }

    #[test]
    fn test_token_from_other_secret_is_rejected() {
        let issuer = JwtService::new("issuer_secret");
        let verifier = JwtService::new("different_secret");

        let token = issuer.create_token("user_2abc", None, None).unwrap();
        assert_matches!(verifier.validate_token(&token), Err(AuthError::InvalidToken));
    }

    #[test]
    fn test_expired_token() {
        let jwt_service = JwtService::new("test_secret");
        let issued = Utc::now() - Duration::hours(3);
        let claims = Claims {
            sub: "user_2abc".into(),
            email: None,
            name: None,
            exp: (issued + Duration::hours(1)).timestamp() as usize,
            iat: issued.timestamp() as usize,
        };
        let token = encode(&Header::default(), &claims, &jwt_service.encoding_key).unwrap();

        assert_matches!(jwt_service.validate_token(&token), Err(AuthError::TokenExpired));
    }

    #[test]
    fn test_bearer_token_extraction() {
        assert_eq!(
            extract_bearer_token("Bearer test_token").unwrap(),
            "test_token"
        );

        assert!(extract_bearer_token("Invalid header").is_err());
        assert!(extract_bearer_token("Bearer ").is_err());
    }
}
