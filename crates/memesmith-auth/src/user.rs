//! Authenticated user identity and extraction helpers.

use std::convert::Infallible;

use axum::extract::FromRequestParts;
use axum::response::Response;
use http::request::Parts;
use memesmith_core::UserId;

use crate::middleware::unauthorized_response;
use crate::AuthError;

/// An authenticated user identity, extracted from a validated token.
///
/// Stored in HTTP request extensions by the auth middleware.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedUser {
    /// The user's id (the token's `sub` claim).
    pub user_id: UserId,
    /// The user's email address, when the token carries one.
    pub email: Option<String>,
}

impl AuthenticatedUser {
    /// Identity injected on every request when auth is disabled.
    pub fn dev() -> Self {
        Self {
            user_id: UserId::new("00000000-0000-0000-0000-000000000000"),
            email: Some("dev@localhost".to_string()),
        }
    }
}

/// Extract the `AuthenticatedUser` from HTTP request `Parts`, if present.
pub fn user_from_parts(parts: &Parts) -> Option<&AuthenticatedUser> {
    parts.extensions.get::<AuthenticatedUser>()
}

impl<S> FromRequestParts<S> for AuthenticatedUser
where
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        user_from_parts(parts)
            .cloned()
            .ok_or_else(|| unauthorized_response(&AuthError::MissingToken.to_string(), false))
    }
}

/// Extractor for routes where signing in is optional.
#[derive(Debug, Clone, Default)]
pub struct MaybeUser(pub Option<AuthenticatedUser>);

impl<S> FromRequestParts<S> for MaybeUser
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(MaybeUser(user_from_parts(parts).cloned()))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use http::StatusCode;

    fn alice() -> AuthenticatedUser {
        AuthenticatedUser {
            user_id: UserId::new("user-123"),
            email: Some("alice@example.com".to_string()),
        }
    }

    fn parts_with_user() -> Parts {
        let (mut parts, _body) = http::Request::new(()).into_parts();
        parts.extensions.insert(alice());
        parts
    }

    fn parts_without_user() -> Parts {
        let (parts, _body) = http::Request::new(()).into_parts();
        parts
    }

    #[test]
    fn test_user_from_parts_present() {
        let parts = parts_with_user();
        let user = user_from_parts(&parts).unwrap();
        assert_eq!(user.user_id.as_str(), "user-123");
        assert_eq!(user.email.as_deref(), Some("alice@example.com"));
    }

    #[test]
    fn test_user_from_parts_absent() {
        assert!(user_from_parts(&parts_without_user()).is_none());
    }

    #[tokio::test]
    async fn test_extractor_rejects_anonymous() {
        let mut parts = parts_without_user();
        let rejection = AuthenticatedUser::from_request_parts(&mut parts, &())
            .await
            .unwrap_err();
        assert_eq!(rejection.status(), StatusCode::UNAUTHORIZED);

        let body = axum::body::to_bytes(rejection.into_body(), usize::MAX).await.unwrap();
        assert!(String::from_utf8_lossy(&body).contains("missing authentication token"));
    }

    #[tokio::test]
    async fn test_extractor_returns_user() {
        let mut parts = parts_with_user();
        let user = AuthenticatedUser::from_request_parts(&mut parts, &())
            .await
            .unwrap();
        assert_eq!(user, alice());
    }

    #[tokio::test]
    async fn test_maybe_user() {
        let mut anon = parts_without_user();
        assert!(MaybeUser::from_request_parts(&mut anon, &()).await.unwrap().0.is_none());

        let mut signed_in = parts_with_user();
        let MaybeUser(user) = MaybeUser::from_request_parts(&mut signed_in, &()).await.unwrap();
        assert_eq!(user, Some(alice()));
    }

    #[test]
    fn test_dev_user_is_stable() {
        assert_eq!(AuthenticatedUser::dev(), AuthenticatedUser::dev());
    }
}
