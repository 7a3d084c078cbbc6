//! Image retrieval infrastructure.
//!
//! This module provides:
//! - Memory caching with LRU eviction
//! - HTTP fetching with full decode before success

pub mod http_fetcher;
pub mod memory_cache;

pub use http_fetcher::{HttpImageFetcher, decode_dimensions, parse_source};
pub use memory_cache::{CacheStats, MemoryImageCache};
