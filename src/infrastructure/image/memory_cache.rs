//! In-memory LRU cache of retrieved images.

use std::num::NonZeroUsize;
use std::sync::atomic::{AtomicU64, Ordering};

use lru::LruCache;
use tokio::sync::RwLock;
use tracing::{debug, trace};

use crate::domain::entities::{ImageId, LoadedImage};

/// Default maximum number of images to remember.
pub const DEFAULT_CACHE_SIZE: usize = 128;

/// LRU cache of images that were fully retrieved at least once.
pub struct MemoryImageCache {
    cache: RwLock<LruCache<ImageId, LoadedImage>>,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl MemoryImageCache {
    /// Creates a new cache with the specified capacity.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let cap = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            cache: RwLock::new(LruCache::new(cap)),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    /// Looks up an image, promoting it in the LRU.
    pub async fn get(&self, id: &ImageId) -> Option<LoadedImage> {
        let mut cache = self.cache.write().await;
        if let Some(image) = cache.get(id) {
            self.hits.fetch_add(1, Ordering::Relaxed);
            trace!(id = %id, "Memory cache hit");
            Some(image.clone())
        } else {
            self.misses.fetch_add(1, Ordering::Relaxed);
            trace!(id = %id, "Memory cache miss");
            None
        }
    }

    /// Peeks at an image without promoting it.
    pub async fn peek(&self, id: &ImageId) -> Option<LoadedImage> {
        let cache = self.cache.read().await;
        cache.peek(id).cloned()
    }

    /// Stores an image, evicting the least recently used entry when full.
    pub async fn put(&self, image: LoadedImage) {
        let mut cache = self.cache.write().await;
        debug!(id = %image.id, "Storing image in memory cache");
        cache.put(image.id.clone(), image);
    }

    /// Best-effort entry count; returns 0 while a writer holds the lock.
    #[must_use]
    pub fn len(&self) -> usize {
        self.cache.try_read().map(|c| c.len()).unwrap_or(0)
    }

    /// Returns true when [`len`](Self::len) is zero.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns cache statistics.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn stats(&self) -> CacheStats {
        let hits = self.hits.load(Ordering::Relaxed);
        let misses = self.misses.load(Ordering::Relaxed);
        let total = hits + misses;
        let hit_rate = if total > 0 {
            (hits as f64 / total as f64) * 100.0
        } else {
            0.0
        };
        CacheStats {
            hits,
            misses,
            hit_rate,
            size: self.len(),
        }
    }
}

impl Default for MemoryImageCache {
    fn default() -> Self {
        Self::new(DEFAULT_CACHE_SIZE)
    }
}

/// Statistics about cache performance.
#[derive(Debug, Clone)]
pub struct CacheStats {
    /// Number of cache hits.
    pub hits: u64,
    /// Number of cache misses.
    pub misses: u64,
    /// Hit rate as a percentage.
    pub hit_rate: f64,
    /// Current number of cached images.
    pub size: usize,
}

impl std::fmt::Display for CacheStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Cache: {} images, {:.1}% hit rate ({} hits, {} misses)",
            self.size, self.hit_rate, self.hits, self.misses
        )
    }
}
