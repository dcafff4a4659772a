//! Authentication primitives for MemeSmith.
//!
//! Provides:
//! - [`AuthenticatedUser`]: identity extracted from a validated token
//! - [`TokenValidator`]: trait for async token validation
//! - [`AuthLayer`] / [`AuthService`]: Tower middleware parameterised over `TokenValidator`
//! - [`SupabaseJwtValidator`]: HS256 validation of Supabase access tokens
//! - [`AuthConfig`]: configuration for the auth layer
//! - [`AuthError`]: auth-specific error types

mod error;
mod middleware;
mod supabase;
mod user;

pub use error::AuthError;
pub use middleware::{AuthLayer, AuthMode, AuthService};
pub use supabase::SupabaseJwtValidator;
pub use user::{user_from_parts, AuthenticatedUser, MaybeUser};

/// Configuration for the auth middleware.
#[derive(Clone, Default)]
pub struct AuthConfig {
    /// Whether authentication is enabled. When false, every request runs as
    /// [`AuthenticatedUser::dev`].
    pub enabled: bool,
    /// Expected `aud` claim. Empty skips the audience check.
    pub audience: String,
    /// Shared secret tokens are signed with.
    pub secret: String,
}

impl std::fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthConfig")
            .field("enabled", &self.enabled)
            .field("audience", &self.audience)
            .field("secret", &"<redacted>")
            .finish()
    }
}

impl From<&memesmith_core::config::AuthSettings> for AuthConfig {
    fn from(settings: &memesmith_core::config::AuthSettings) -> Self {
        Self {
            enabled: settings.enabled,
            audience: settings.audience.clone(),
            secret: settings.jwt_secret.clone(),
        }
    }
}

/// Trait for validating tokens and extracting user identity.
///
/// The middleware calls `validate()` with the bearer token and returns
/// the authenticated user on success.
pub trait TokenValidator: Send + Sync + 'static {
    /// Validate a token and return the authenticated user.
    fn validate(
        &self,
        token: &str,
        config: &AuthConfig,
    ) -> std::pin::Pin<
        Box<dyn std::future::Future<Output = Result<AuthenticatedUser, AuthError>> + Send + '_>,
    >;
}
