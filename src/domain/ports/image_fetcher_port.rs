//! Port definition for retrieving images.

use async_trait::async_trait;

use crate::domain::entities::LoadedImage;

/// Result type for fetch operations.
pub type FetchResult<T> = std::result::Result<T, FetchError>;

/// Errors that can occur while retrieving an image.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FetchError {
    /// The source is not a usable URL.
    #[error("Invalid source: {0}")]
    InvalidSource(String),
    /// Transport level failure.
    #[error("Network error: {0}")]
    NetworkError(String),
    /// Server answered with a non-success status.
    #[error("HTTP {0}")]
    HttpStatus(u16),
    /// Payload exceeds the configured limit.
    #[error("Image too large: {size} bytes (limit {limit})")]
    TooLarge {
        /// Payload size.
        size: usize,
        /// Configured limit.
        limit: usize,
    },
    /// Failed to decode image.
    #[error("Decode error: {0}")]
    DecodeError(String),
}

/// Port for fully retrieving an image before it is shown.
/// Implementations must be thread-safe.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ImageFetcherPort: Send + Sync {
    /// Retrieves and decodes the image at `url`.
    async fn fetch(&self, url: &str) -> FetchResult<LoadedImage>;
}
