//! Infrastructure layer with external service adapters.

/// Application configuration.
pub mod config;
/// Image retrieval (HTTP fetching, memory caching).
pub mod image;

pub use config::{AppConfig, CliArgs, ImageConfig, LogLevel, StorageManager};
pub use image::{CacheStats, HttpImageFetcher, MemoryImageCache};
