//! Caller identity. Tokens are issued elsewhere; this service only verifies them.

use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
};
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::errors::AppError;
use crate::state::AppState;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Invalid token: {0}")]
    InvalidToken(#[from] jsonwebtoken::errors::Error),

    #[error("Token has an empty subject")]
    EmptySubject,
}

/// Resolves an opaque bearer credential to a stable user identity (email).
pub trait CredentialResolver: Send + Sync {
    fn resolve(&self, token: &str) -> Result<String, AuthError>;
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub exp: usize,
}

/// Shared-secret JWT verifier. The `sub` claim carries the user's email.
pub struct JwtCredentialResolver {
    key: DecodingKey,
    validation: Validation,
}

impl JwtCredentialResolver {
    pub fn new(secret: &str, algorithm: Algorithm) -> Self {
        Self {
            key: DecodingKey::from_secret(secret.as_bytes()),
            validation: Validation::new(algorithm),
        }
    }
}

impl CredentialResolver for JwtCredentialResolver {
    fn resolve(&self, token: &str) -> Result<String, AuthError> {
        let data = decode::<Claims>(token, &self.key, &self.validation)?;
        if data.claims.sub.trim().is_empty() {
            return Err(AuthError::EmptySubject);
        }
        Ok(data.claims.sub)
    }
}

/// Authenticated caller, extracted from `Authorization: Bearer <token>`.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub email: String,
}

#[async_trait]
impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, AppError> {
        let token = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.strip_prefix("Bearer "))
            .ok_or(AppError::Unauthorized)?;

        let email = state.credentials.resolve(token.trim()).map_err(|e| {
            debug!("Rejected credential: {e}");
            AppError::Unauthorized
        })?;

        Ok(AuthUser { email })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsonwebtoken::{encode, EncodingKey, Header};

    fn token(secret: &str, sub: &str, exp: usize) -> String {
        token_with(Algorithm::HS256, secret, sub, exp)
    }

    fn token_with(algorithm: Algorithm, secret: &str, sub: &str, exp: usize) -> String {
        encode(
            &Header::new(algorithm),
            &Claims {
                sub: sub.to_string(),
                exp,
            },
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .unwrap()
    }

    fn far_future() -> usize {
        (chrono::Utc::now().timestamp() + 3600) as usize
    }

    #[test]
    fn test_valid_token_resolves_to_subject() {
        let resolver = JwtCredentialResolver::new("s3cret", Algorithm::HS256);
        let email = resolver
            .resolve(&token("s3cret", "ada@example.com", far_future()))
            .unwrap();
        assert_eq!(email, "ada@example.com");
    }

    #[test]
    fn test_wrong_secret_is_rejected() {
        let resolver = JwtCredentialResolver::new("s3cret", Algorithm::HS256);
        let result = resolver.resolve(&token("other", "ada@example.com", far_future()));
        assert!(matches!(result, Err(AuthError::InvalidToken(_))));
    }

    #[test]
    fn test_expired_token_is_rejected() {
        let resolver = JwtCredentialResolver::new("s3cret", Algorithm::HS256);
        let expired = (chrono::Utc::now().timestamp() - 3600) as usize;
        let result = resolver.resolve(&token("s3cret", "ada@example.com", expired));
        assert!(result.is_err());
    }

    #[test]
    fn test_empty_subject_is_rejected() {
        let resolver = JwtCredentialResolver::new("s3cret", Algorithm::HS256);
        let result = resolver.resolve(&token("s3cret", " ", far_future()));
        assert!(matches!(result, Err(AuthError::EmptySubject)));
    }

    #[test]
    fn test_configured_algorithm_is_enforced() {
        let resolver = JwtCredentialResolver::new("s3cret", Algorithm::HS512);

        let hs512 = token_with(Algorithm::HS512, "s3cret", "ada@example.com", far_future());
        assert_eq!(resolver.resolve(&hs512).unwrap(), "ada@example.com");

        let hs256 = token("s3cret", "ada@example.com", far_future());
        assert!(matches!(
            resolver.resolve(&hs256),
            Err(AuthError::InvalidToken(_))
        ));
    }
}
