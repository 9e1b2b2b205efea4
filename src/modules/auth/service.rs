use axum::http::{header, HeaderMap};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::shared::error::{AppError, AppResult};

/// Identity asserted by the external identity provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub exp: usize,
    pub iat: usize,
}

pub struct AuthService;

impl AuthService {
    /// Signs a token the way the identity provider does. The service itself
    /// only verifies tokens; this exists for local tooling and tests.
    pub fn issue_token(secret: &str, subject: &str, ttl: Duration) -> AppResult<String> {
        let now = Utc::now();
        let expiration = now
            .checked_add_signed(ttl)
            .ok_or_else(|| AppError::Unexpected("token expiry out of range".to_string()))?;

        let claims = Claims {
            sub: subject.to_string(),
            exp: expiration.timestamp() as usize,
            iat: now.timestamp() as usize,
        };

        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .map_err(|e| AppError::Unexpected(format!("JWT generation failed: {}", e)))
    }

    pub fn verify_token(secret: &str, token: &str) -> AppResult<Claims> {
        decode::<Claims>(
            token,
            &DecodingKey::from_secret(secret.as_bytes()),
            &Validation::default(),
        )
        .map(|data| data.claims)
        .map_err(|e| AppError::Unauthorized(format!("Invalid token: {}", e)))
    }

    pub fn claims_from_headers(headers: &HeaderMap, secret: &str) -> AppResult<Claims> {
        let auth_header = headers
            .get(header::AUTHORIZATION)
            .ok_or(AppError::Unauthorized(
                "Authentication credentials were not provided.".to_string(),
            ))?
            .to_str()
            .map_err(|_| AppError::Unauthorized("Invalid Authorization header".to_string()))?;

        let token = auth_header
            .strip_prefix("Bearer ")
            .ok_or_else(|| AppError::Unauthorized("Invalid token format".to_string()))?;

        Self::verify_token(secret, token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    const SECRET: &str = "test-secret";

    fn headers_with(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, HeaderValue::from_str(value).unwrap());
        headers
    }

    #[test]
    fn issued_tokens_verify() {
        let token = AuthService::issue_token(SECRET, "user-1", Duration::hours(1)).unwrap();
        let claims =
            AuthService::claims_from_headers(&headers_with(&format!("Bearer {token}")), SECRET)
                .unwrap();
        assert_eq!(claims.sub, "user-1");
    }

    #[test]
    fn missing_header_is_unauthorized() {
        let err = AuthService::claims_from_headers(&HeaderMap::new(), SECRET).unwrap_err();
        assert!(matches!(err, AppError::Unauthorized(_)));
    }

    #[test]
    fn wrong_scheme_is_unauthorized() {
        let err = AuthService::claims_from_headers(&headers_with("Basic abc"), SECRET).unwrap_err();
        assert!(matches!(err, AppError::Unauthorized(msg) if msg == "Invalid token format"));
    }

    #[test]
    fn foreign_signature_is_rejected() {
        let token = AuthService::issue_token("other-secret", "user-1", Duration::hours(1)).unwrap();
        assert!(AuthService::verify_token(SECRET, &token).is_err());
    }

    #[test]
    fn expired_tokens_are_rejected() {
        let token = AuthService::issue_token(SECRET, "user-1", Duration::hours(-2)).unwrap();
        assert!(AuthService::verify_token(SECRET, &token).is_err());
    }
}
