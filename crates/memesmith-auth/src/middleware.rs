//! Tower authentication middleware.
//!
//! `AuthLayer` and `AuthService` wrap any inner service with bearer-token
//! validation. Generic over `TokenValidator`.

use std::convert::Infallible;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use axum::body::Body;
use axum::response::IntoResponse;
use http::{Request, StatusCode};
use tower::{Layer, Service};

use crate::{AuthConfig, AuthError, AuthenticatedUser, TokenValidator};

/// Whether a route needs a signed-in user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthMode {
    /// No token → 401.
    Required,
    /// No token → the request continues anonymously.
    Optional,
}

/// Tower `Layer` that wraps services with token authentication.
pub struct AuthLayer<V: TokenValidator> {
    validator: Arc<V>,
    config: AuthConfig,
    mode: AuthMode,
}

impl<V: TokenValidator> Clone for AuthLayer<V> {
    fn clone(&self) -> Self {
        Self {
            validator: self.validator.clone(),
            config: self.config.clone(),
            mode: self.mode,
        }
    }
}

impl<V: TokenValidator> AuthLayer<V> {
    /// Create a layer with an explicit mode.
    pub fn new(validator: Arc<V>, config: AuthConfig, mode: AuthMode) -> Self {
        Self {
            validator,
            config,
            mode,
        }
    }

    /// Reject requests without a valid token.
    pub fn required(validator: Arc<V>, config: AuthConfig) -> Self {
        Self::new(validator, config, AuthMode::Required)
    }

    /// Let anonymous requests through; still reject bad tokens.
    pub fn optional(validator: Arc<V>, config: AuthConfig) -> Self {
        Self::new(validator, config, AuthMode::Optional)
    }
}

impl<V: TokenValidator, S> Layer<S> for AuthLayer<V> {
    type Service = AuthService<V, S>;

    fn layer(&self, inner: S) -> Self::Service {
        AuthService {
            inner,
            validator: self.validator.clone(),
            config: self.config.clone(),
            mode: self.mode,
        }
    }
}

/// Tower `Service` that validates tokens before forwarding requests.
///
/// On successful validation, inserts `AuthenticatedUser` into request
/// extensions where it's available to downstream handlers.
pub struct AuthService<V: TokenValidator, S> {
    inner: S,
    validator: Arc<V>,
    config: AuthConfig,
    mode: AuthMode,
}

impl<V: TokenValidator, S: Clone> Clone for AuthService<V, S> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
            validator: self.validator.clone(),
            config: self.config.clone(),
            mode: self.mode,
        }
    }
}

impl<V, S> Service<Request<Body>> for AuthService<V, S>
where
    V: TokenValidator,
    S: Service<Request<Body>, Error = Infallible> + Clone + Send + 'static,
    S::Response: IntoResponse,
    S::Future: Send,
{
    type Response = axum::response::Response;
    type Error = Infallible;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, mut req: Request<Body>) -> Self::Future {
        let clone = self.inner.clone();
        let mut inner = std::mem::replace(&mut self.inner, clone);

        let validator = self.validator.clone();
        let config = self.config.clone();
        let mode = self.mode;

        Box::pin(async move {
            // Dev mode: everyone is the dev user
            if !config.enabled {
                req.extensions_mut().insert(AuthenticatedUser::dev());
                let resp = inner
                    .call(req)
                    .await
                    .unwrap_or_else(|infallible| match infallible {});
                return Ok(resp.into_response());
            }

            let token = match extract_bearer_token(&req) {
                Some(t) => t.to_string(),
                None if mode == AuthMode::Optional => {
                    let resp = inner
                        .call(req)
                        .await
                        .unwrap_or_else(|infallible| match infallible {});
                    return Ok(resp.into_response());
                }
                None => {
                    return Ok(unauthorized_response(&AuthError::MissingToken.to_string(), false));
                }
            };

            match validator.validate(&token, &config).await {
                Ok(user) => {
                    log::debug!("Authenticated {}", user.user_id);
                    req.extensions_mut().insert(user);
                    let resp = inner
                        .call(req)
                        .await
                        .unwrap_or_else(|infallible| match infallible {});
                    Ok(resp.into_response())
                }
                Err(auth_err) if auth_err.is_client_error() => {
                    log::warn!("Authentication failed: {auth_err}");
                    Ok(unauthorized_response(&auth_err.to_string(), true))
                }
                Err(auth_err) => {
                    log::error!("Authentication unavailable: {auth_err}");
                    Ok(error_response(StatusCode::INTERNAL_SERVER_ERROR, "authentication unavailable"))
                }
            }
        })
    }
}

/// Extract bearer token from the Authorization header.
fn extract_bearer_token(req: &Request<Body>) -> Option<&str> {
    req.headers()
        .get(http::header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

fn error_response(status: StatusCode, message: &str) -> axum::response::Response {
    let body = serde_json::json!({ "error": message });
    (
        status,
        [(http::header::CONTENT_TYPE, "application/json")],
        body.to_string(),
    )
        .into_response()
}

/// Build a 401 Unauthorized response with WWW-Authenticate header.
pub(crate) fn unauthorized_response(message: &str, invalid_token: bool) -> axum::response::Response {
    let mut response = error_response(StatusCode::UNAUTHORIZED, message);

    let www_auth = if invalid_token {
        r#"Bearer realm="memesmith", error="invalid_token""#
    } else {
        r#"Bearer realm="memesmith""#
    };
    response.headers_mut().insert(
        http::header::WWW_AUTHENTICATE,
        http::HeaderValue::from_static(www_auth),
    );

    response
}
