//! Error types for memesmith-render.

/// Errors raised while compositing an image.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum RenderError {
    /// The input bytes are not an image the decoder understands.
    #[error("Failed to decode image: {0}")]
    Decode(#[from] image::ImageError),

    /// The output could not be encoded.
    #[error("Failed to encode image: {0}")]
    Encode(String),

    /// A canvas of this size can't be allocated.
    #[error("Invalid image dimensions: {width}x{height}")]
    InvalidDimensions {
        /// Requested width
        width: u32,
        /// Requested height
        height: u32,
    },

    /// A colour string could not be parsed.
    #[error("Invalid color: {0}")]
    Color(String),

    /// Overlay settings JSON is malformed.
    #[error("Invalid text overlay settings JSON: {0}")]
    Settings(#[from] serde_json::Error),
}

/// Convenience `Result` alias for render operations.
pub type Result<T> = std::result::Result<T, RenderError>;

impl RenderError {
    /// Whether the caller sent bad input.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            RenderError::Decode(_) | RenderError::Color(_) | RenderError::Settings(_)
        )
    }
}
