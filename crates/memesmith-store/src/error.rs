//! Error types for memesmith-store.

/// Errors raised by a store backend.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum StoreError {
    /// No such row.
    #[error("{kind} not found: {id}")]
    NotFound {
        /// Row kind ("user", "meme")
        kind: &'static str,
        /// Requested id
        id: String,
    },

    /// The requester may not touch this row.
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// A credit was requested from an empty balance.
    #[error("No credits remaining for user {0}")]
    InsufficientCredits(String),

    /// A row with this key already exists.
    #[error("Conflict: {0}")]
    Conflict(String),

    /// The backend is misconfigured.
    #[error("Store configuration error: {0}")]
    Config(String),

    /// The backend could not be reached.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The backend answered with an error status.
    #[error("Backend error ({status}): {message}")]
    Backend {
        /// HTTP status code
        status: u16,
        /// Error body
        message: String,
    },

    /// The backend answered with something we can't parse.
    #[error("Failed to decode backend response: {0}")]
    Decode(String),
}

/// Convenience `Result` alias for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;

impl StoreError {
    /// Creates a not-found error.
    pub fn not_found(kind: &'static str, id: impl ToString) -> Self {
        StoreError::NotFound {
            kind,
            id: id.to_string(),
        }
    }

    /// Whether this is a missing-row error.
    pub fn is_not_found(&self) -> bool {
        matches!(self, StoreError::NotFound { .. })
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(e: serde_json::Error) -> Self {
        StoreError::Decode(e.to_string())
    }
}
