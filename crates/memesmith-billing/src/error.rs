//! Error types for memesmith-billing.

use memesmith_store::StoreError;

/// Errors raised while talking to Stripe or handling its webhooks.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum BillingError {
    /// The request has no `Stripe-Signature` header.
    #[error("Missing Stripe-Signature header")]
    MissingHeader,

    /// The signature header could not be parsed.
    #[error("Malformed Stripe-Signature header: {0}")]
    MalformedHeader(String),

    /// No `v1` signature matched the payload.
    #[error("No signatures found matching the expected signature for payload")]
    NoMatchingSignature,

    /// The signed timestamp is too old or too far in the future.
    #[error("Timestamp {timestamp} outside the tolerance zone (now {now})")]
    TimestampOutOfTolerance {
        /// Signed timestamp
        timestamp: i64,
        /// Local clock
        now: i64,
    },

    /// The payload is not a Stripe event.
    #[error("Invalid webhook payload: {0}")]
    InvalidPayload(#[from] serde_json::Error),

    /// A completed checkout carries no user id.
    #[error("No userId found in session metadata")]
    MissingUserReference,

    /// Checkout metadata is present but unusable.
    #[error("Invalid checkout metadata: {0}")]
    InvalidMetadata(String),

    /// A checkout request failed validation.
    #[error("Invalid checkout request: {0}")]
    InvalidRequest(String),

    /// Stripe rejected an API call.
    #[error("Stripe error ({status}): {message}")]
    Stripe {
        /// HTTP status code
        status: u16,
        /// Stripe's error message
        message: String,
    },

    /// Stripe could not be reached.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Updating the user failed.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// Billing is not configured.
    #[error("Billing configuration error: {0}")]
    Config(String),
}

/// Convenience `Result` alias for billing operations.
pub type Result<T> = std::result::Result<T, BillingError>;

impl BillingError {
    /// Whether the caller (or Stripe, for webhooks) sent bad input.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            BillingError::MissingHeader
                | BillingError::MalformedHeader(_)
                | BillingError::NoMatchingSignature
                | BillingError::TimestampOutOfTolerance { .. }
                | BillingError::InvalidPayload(_)
                | BillingError::MissingUserReference
                | BillingError::InvalidMetadata(_)
                | BillingError::InvalidRequest(_)
        )
    }

    /// Whether this is a webhook signature failure.
    pub fn is_signature_error(&self) -> bool {
        matches!(
            self,
            BillingError::MissingHeader
                | BillingError::MalformedHeader(_)
                | BillingError::NoMatchingSignature
                | BillingError::TimestampOutOfTolerance { .. }
        )
    }
}
