//! Domain types for image handling.

use serde::Serialize;

/// Unique identifier for a cached image.
/// Generated from a hash of the source URL.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ImageId(pub String);

impl ImageId {
    /// Creates a new `ImageId` from any string-like input.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Creates an `ImageId` from a URL by hashing it.
    #[must_use]
    pub fn from_url(url: &str) -> Self {
        use sha2::{Digest, Sha256};
        let mut hasher = Sha256::new();
        hasher.update(url.as_bytes());
        let result = hasher.finalize();
        Self(hex::encode(&result[..16]))
    }

    /// Returns the inner string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ImageId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for ImageId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

/// Where a loaded image came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ImageOrigin {
    /// Served from the in-memory LRU cache.
    MemoryCache,
    /// Downloaded from the network.
    Network,
}

impl std::fmt::Display for ImageOrigin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MemoryCache => write!(f, "memory"),
            Self::Network => write!(f, "network"),
        }
    }
}

/// An image that was fully retrieved and decoded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadedImage {
    /// Cache identifier.
    pub id: ImageId,
    /// URL the image was requested with.
    pub url: String,
    /// Decoded width in pixels.
    pub width: u32,
    /// Decoded height in pixels.
    pub height: u32,
    /// Size of the encoded payload.
    pub byte_len: usize,
    /// Where the image was served from.
    pub origin: ImageOrigin,
}

impl LoadedImage {
    /// Returns the load event a visible surface reports for this image.
    #[must_use]
    pub fn to_load_event(&self) -> LoadEvent {
        LoadEvent {
            source: self.url.clone(),
            width: self.width,
            height: self.height,
        }
    }
}

/// Notification that a surface finished loading its bound source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LoadEvent {
    /// The source that finished loading.
    pub source: String,
    /// Natural width in pixels.
    pub width: u32,
    /// Natural height in pixels.
    pub height: u32,
}

impl LoadEvent {
    /// Creates a load event for `source`.
    #[must_use]
    pub fn new(source: impl Into<String>, width: u32, height: u32) -> Self {
        Self {
            source: source.into(),
            width,
            height,
        }
    }
}
