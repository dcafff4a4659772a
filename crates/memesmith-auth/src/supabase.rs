//! Supabase access-token validation.
//!
//! Supabase signs user access tokens with the project's JWT secret (HS256).
//! The `sub` claim is the auth user id, which is also the primary key of the
//! `users` table.

use std::future::Future;
use std::pin::Pin;

use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use memesmith_core::UserId;
use serde::Deserialize;

use crate::{AuthConfig, AuthError, AuthenticatedUser, TokenValidator};

#[derive(Debug, Deserialize)]
struct SupabaseClaims {
    #[serde(default)]
    sub: Option<String>,
    #[serde(default)]
    email: Option<String>,
}

/// Validates Supabase-issued HS256 access tokens.
#[derive(Debug, Clone, Copy, Default)]
pub struct SupabaseJwtValidator;

impl SupabaseJwtValidator {
    /// Create a validator. The secret and audience come from [`AuthConfig`].
    pub fn new() -> Self {
        Self
    }

    /// Validate a token synchronously.
    pub fn validate_token(&self, token: &str, config: &AuthConfig) -> Result<AuthenticatedUser, AuthError> {
        if config.secret.is_empty() {
            return Err(AuthError::Misconfigured("no JWT secret configured".to_string()));
        }

        let mut validation = Validation::new(Algorithm::HS256);
        if config.audience.is_empty() {
            validation.validate_aud = false;
        } else {
            validation.set_audience(&[config.audience.as_str()]);
        }

        let key = DecodingKey::from_secret(config.secret.as_bytes());
        let data = decode::<SupabaseClaims>(token, &key, &validation).map_err(|e| match e.kind() {
            ErrorKind::ExpiredSignature => AuthError::Expired,
            ErrorKind::InvalidAudience => AuthError::InvalidAudience,
            ErrorKind::InvalidToken | ErrorKind::Base64(_) | ErrorKind::Json(_) | ErrorKind::Utf8(_) => {
                AuthError::InvalidFormat(e.to_string())
            }
            _ => AuthError::InvalidSignature(e.to_string()),
        })?;

        let claims = data.claims;
        let sub = claims
            .sub
            .filter(|s| !s.trim().is_empty())
            .ok_or(AuthError::MissingSubject)?;

        Ok(AuthenticatedUser {
            user_id: UserId::new(sub),
            email: claims.email.filter(|e| !e.is_empty()),
        })
    }
}

impl TokenValidator for SupabaseJwtValidator {
    fn validate(
        &self,
        token: &str,
        config: &AuthConfig,
    ) -> Pin<Box<dyn Future<Output = Result<AuthenticatedUser, AuthError>> + Send + '_>> {
        let result = self.validate_token(token, config);
        Box::pin(async move { result })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use jsonwebtoken::{encode, EncodingKey, Header};
    use serde::Serialize;

    const SECRET: &str = "super-secret-jwt-token-with-at-least-32-characters";

    #[derive(Debug, Serialize)]
    struct TestClaims {
        #[serde(skip_serializing_if = "Option::is_none")]
        sub: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        email: Option<String>,
        aud: String,
        role: String,
        exp: u64,
        iat: u64,
    }

    fn now_epoch() -> u64 {
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap()
            .as_secs()
    }

    fn valid_claims() -> TestClaims {
        let now = now_epoch();
        TestClaims {
            sub: Some("8d5c2b4e-1f0a-4c1b-9a51-3b1f6f0d2e77".to_string()),
            email: Some("alice@example.com".to_string()),
            aud: "authenticated".to_string(),
            role: "authenticated".to_string(),
            exp: now + 3600,
            iat: now,
        }
    }

    fn sign(claims: &TestClaims, secret: &str) -> String {
        encode(
            &Header::new(Algorithm::HS256),
            claims,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .unwrap()
    }

    fn config() -> AuthConfig {
        AuthConfig {
            enabled: true,
            audience: "authenticated".to_string(),
            secret: SECRET.to_string(),
        }
    }

    #[test]
    fn test_valid_token() {
        let token = sign(&valid_claims(), SECRET);
        let user = SupabaseJwtValidator::new().validate_token(&token, &config()).unwrap();
        assert_eq!(user.user_id.as_str(), "8d5c2b4e-1f0a-4c1b-9a51-3b1f6f0d2e77");
        assert_eq!(user.email.as_deref(), Some("alice@example.com"));
    }

    #[test]
    fn test_wrong_secret() {
        let token = sign(&valid_claims(), "another-secret-another-secret-another");
        let err = SupabaseJwtValidator::new().validate_token(&token, &config()).unwrap_err();
        assert!(matches!(err, AuthError::InvalidSignature(_)));
    }

    #[test]
    fn test_expired() {
        let mut claims = valid_claims();
        claims.exp = now_epoch() - 3600;
        let token = sign(&claims, SECRET);
        let err = SupabaseJwtValidator::new().validate_token(&token, &config()).unwrap_err();
        assert!(matches!(err, AuthError::Expired));
    }

    #[test]
    fn test_wrong_audience() {
        let mut claims = valid_claims();
        claims.aud = "anon".to_string();
        let token = sign(&claims, SECRET);
        let err = SupabaseJwtValidator::new().validate_token(&token, &config()).unwrap_err();
        assert!(matches!(err, AuthError::InvalidAudience));
    }

    #[test]
    fn test_missing_subject() {
        let mut claims = valid_claims();
        claims.sub = None;
        let token = sign(&claims, SECRET);
        let err = SupabaseJwtValidator::new().validate_token(&token, &config()).unwrap_err();
        assert!(matches!(err, AuthError::MissingSubject));
    }

    #[test]
    fn test_garbage_token() {
        let err = SupabaseJwtValidator::new()
            .validate_token("not.a.jwt", &config())
            .unwrap_err();
        assert!(err.is_client_error());
    }

    #[test]
    fn test_missing_secret_is_server_error() {
        let token = sign(&valid_claims(), SECRET);
        let cfg = AuthConfig {
            secret: String::new(),
            ..config()
        };
        let err = SupabaseJwtValidator::new().validate_token(&token, &cfg).unwrap_err();
        assert!(!err.is_client_error());
    }

    #[tokio::test]
    async fn test_token_validator_impl() {
        let token = sign(&valid_claims(), SECRET);
        let user = SupabaseJwtValidator::new().validate(&token, &config()).await.unwrap();
        assert_eq!(user.email.as_deref(), Some("alice@example.com"));
    }
}
