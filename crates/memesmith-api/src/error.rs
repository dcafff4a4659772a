//! Error types for memesmith-api.
//!
//! Every handler returns [`ApiError`] on failure, which renders as
//! `{"error": message}` with the matching status code.

use axum::extract::multipart::MultipartError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use memesmith_billing::BillingError;
use memesmith_render::RenderError;
use memesmith_store::StoreError;

/// Result type alias for handlers.
pub type Result<T> = std::result::Result<T, ApiError>;

/// Errors a request can end in.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum ApiError {
    /// The request is malformed or fails validation.
    #[error("{0}")]
    BadRequest(String),

    /// A signed-in user is required.
    #[error("{0}")]
    Unauthorized(String),

    /// Premium content without pro status or credits.
    #[error("{0}")]
    PaymentRequired(String),

    /// The caller may not touch this resource.
    #[error("{0}")]
    Forbidden(String),

    /// The resource does not exist.
    #[error("{0}")]
    NotFound(String),

    /// The request body exceeds the upload limit.
    #[error("{0}")]
    PayloadTooLarge(String),

    /// Anything the caller can't fix.
    #[error("{0}")]
    Internal(String),
}

impl ApiError {
    /// Creates a bad-request error.
    pub fn bad_request<S: Into<String>>(message: S) -> Self {
        ApiError::BadRequest(message.into())
    }

    /// Creates an internal error.
    pub fn internal<S: Into<String>>(message: S) -> Self {
        ApiError::Internal(message.into())
    }

    /// HTTP status for this error.
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::PaymentRequired(_) => StatusCode::PAYMENT_REQUIRED,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(%status, error = %self, "request failed");
        } else {
            tracing::debug!(%status, error = %self, "request rejected");
        }
        (status, Json(serde_json::json!({ "error": self.to_string() }))).into_response()
    }
}

impl From<memesmith_core::Error> for ApiError {
    fn from(e: memesmith_core::Error) -> Self {
        match e {
            memesmith_core::Error::TemplateNotFound { .. } | memesmith_core::Error::NotFound { .. } => {
                ApiError::NotFound(e.to_string())
            }
            e if e.is_client_error() => ApiError::BadRequest(e.to_string()),
            e => ApiError::Internal(e.to_string()),
        }
    }
}

impl From<RenderError> for ApiError {
    fn from(e: RenderError) -> Self {
        if e.is_client_error() {
            ApiError::BadRequest(e.to_string())
        } else {
            ApiError::Internal(e.to_string())
        }
    }
}

impl From<StoreError> for ApiError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::NotFound { .. } => ApiError::NotFound(e.to_string()),
            StoreError::Forbidden(_) => ApiError::Forbidden(e.to_string()),
            StoreError::InsufficientCredits(_) => ApiError::PaymentRequired(e.to_string()),
            StoreError::Conflict(_) => ApiError::BadRequest(e.to_string()),
            e => ApiError::Internal(e.to_string()),
        }
    }
}

impl From<BillingError> for ApiError {
    fn from(e: BillingError) -> Self {
        match e {
            BillingError::Store(inner) => inner.into(),
            e if e.is_signature_error() => {
                ApiError::BadRequest(format!("Webhook signature verification failed: {e}"))
            }
            e if e.is_client_error() => ApiError::BadRequest(e.to_string()),
            e => ApiError::Internal(e.to_string()),
        }
    }
}

impl From<MultipartError> for ApiError {
    fn from(e: MultipartError) -> Self {
        if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
            ApiError::PayloadTooLarge(e.body_text())
        } else {
            ApiError::BadRequest(e.body_text())
        }
    }
}
