//! HTTP image fetcher.
//!
//! Two tiers: memory cache, then network. A fetch only succeeds once the
//! whole payload has been downloaded and decoded.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use bytes::{Bytes, BytesMut};
use reqwest::Url;
use tracing::debug;

use crate::domain::entities::{ImageId, ImageOrigin, LoadedImage};
use crate::domain::ports::{FetchError, FetchResult, ImageFetcherPort};
use crate::infrastructure::config::ImageConfig;

use super::memory_cache::{CacheStats, MemoryImageCache};

/// Retrieves images over HTTP(S).
pub struct HttpImageFetcher {
    http_client: reqwest::Client,
    memory_cache: Arc<MemoryImageCache>,
    max_image_bytes: usize,
}

impl std::fmt::Debug for HttpImageFetcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpImageFetcher")
            .field("max_image_bytes", &self.max_image_bytes)
            .finish_non_exhaustive()
    }
}

impl HttpImageFetcher {
    /// Creates a fetcher from the image configuration.
    ///
    /// # Errors
    /// Returns error if the HTTP client cannot be created.
    pub fn new(config: &ImageConfig) -> FetchResult<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|e| FetchError::NetworkError(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            http_client,
            memory_cache: Arc::new(MemoryImageCache::new(config.memory_cache_size)),
            max_image_bytes: config.max_image_bytes,
        })
    }

    /// Returns memory cache statistics.
    #[must_use]
    pub fn cache_stats(&self) -> CacheStats {
        self.memory_cache.stats()
    }

    async fn download(&self, url: Url) -> FetchResult<Bytes> {
        let mut response = self
            .http_client
            .get(url)
            .send()
            .await
            .map_err(|e| FetchError::NetworkError(format!("Request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::HttpStatus(status.as_u16()));
        }

        let expected = response.content_length();
        if let Some(len) = expected {
            self.check_size(usize::try_from(len).unwrap_or(usize::MAX))?;
        }

        let mut body = LimitedBody::new(self.max_image_bytes, expected);
        while let Some(chunk) = response
            .chunk()
            .await
            .map_err(|e| FetchError::NetworkError(format!("Failed to read body: {e}")))?
        {
            body.push(&chunk)?;
        }

        Ok(body.finish())
    }

    fn check_size(&self, size: usize) -> FetchResult<()> {
        if size > self.max_image_bytes {
            return Err(FetchError::TooLarge {
                size,
                limit: self.max_image_bytes,
            });
        }
        Ok(())
    }
}

/// Response body accumulator that stops as soon as the limit is crossed.
struct LimitedBody {
    buf: BytesMut,
    limit: usize,
}

impl LimitedBody {
    fn new(limit: usize, expected: Option<u64>) -> Self {
        let capacity = expected
            .and_then(|len| usize::try_from(len).ok())
            .unwrap_or(0)
            .min(limit);
        Self {
            buf: BytesMut::with_capacity(capacity),
            limit,
        }
    }

    fn push(&mut self, chunk: &[u8]) -> FetchResult<()> {
        let size = self.buf.len().saturating_add(chunk.len());
        if size > self.limit {
            return Err(FetchError::TooLarge {
                size,
                limit: self.limit,
            });
        }
        self.buf.extend_from_slice(chunk);
        Ok(())
    }

    fn finish(self) -> Bytes {
        self.buf.freeze()
    }
}

/// Parses `source` and accepts only http and https URLs.
///
/// # Errors
/// Returns `FetchError::InvalidSource` for anything else.
pub fn parse_source(source: &str) -> FetchResult<Url> {
    let url = Url::parse(source).map_err(|e| FetchError::InvalidSource(format!("{source}: {e}")))?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(FetchError::InvalidSource(format!(
            "unsupported scheme '{other}'"
        ))),
    }
}

/// Decodes `bytes` fully and returns the image dimensions.
///
/// # Errors
/// Returns `FetchError::DecodeError` if the payload is not a supported image.
pub fn decode_dimensions(bytes: &[u8]) -> FetchResult<(u32, u32)> {
    let decoded = image::load_from_memory(bytes)
        .map_err(|e| FetchError::DecodeError(format!("Failed to decode image: {e}")))?;
    Ok((decoded.width(), decoded.height()))
}

#[async_trait]
impl ImageFetcherPort for HttpImageFetcher {
    async fn fetch(&self, url: &str) -> FetchResult<LoadedImage> {
        let id = ImageId::from_url(url);

        if let Some(cached) = self.memory_cache.get(&id).await {
            return Ok(LoadedImage {
                origin: ImageOrigin::MemoryCache,
                ..cached
            });
        }

        let parsed = parse_source(url)?;
        debug!(id = %id, url = %parsed, "Downloading image from network");
        let bytes = self.download(parsed).await?;

        let byte_len = bytes.len();
        let (width, height) = tokio::task::spawn_blocking(move || decode_dimensions(&bytes))
            .await
            .map_err(|e| FetchError::DecodeError(format!("Decode task panicked: {e}")))??;

        let image = LoadedImage {
            id,
            url: url.to_string(),
            width,
            height,
            byte_len,
            origin: ImageOrigin::Network,
        };
        self.memory_cache.put(image.clone()).await;

        debug!(id = %image.id, width, height, "Image retrieved");
        Ok(image)
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use test_case::test_case;

    use super::*;

    fn png_bytes(width: u32, height: u32) -> Vec<u8> {
        let img = image::DynamicImage::new_rgb8(width, height);
        let mut out = Cursor::new(Vec::new());
        img.write_to(&mut out, image::ImageFormat::Png)
            .expect("encode png");
        out.into_inner()
    }

    #[test_case("https://cdn.example.com/a.png", true ; "https")]
    #[test_case("http://cdn.example.com/a.png", true ; "http")]
    #[test_case("file:///tmp/a.png", false ; "file_scheme")]
    #[test_case("data:image/png;base64,AAAA", false ; "data_uri")]
    #[test_case("not a url", false ; "garbage")]
    fn test_parse_source(source: &str, ok: bool) {
        assert_eq!(parse_source(source).is_ok(), ok);
    }

    #[test]
    fn test_decode_dimensions() {
        assert_eq!(decode_dimensions(&png_bytes(12, 7)), Ok((12, 7)));
    }

    #[test]
    fn test_decode_rejects_truncated_payload() {
        let bytes = png_bytes(12, 7);
        let result = decode_dimensions(&bytes[..bytes.len() / 2]);
        assert!(matches!(result, Err(FetchError::DecodeError(_))));
    }

    #[test]
    fn test_fetcher_creation() {
        let fetcher = HttpImageFetcher::new(&ImageConfig::default());
        assert!(fetcher.is_ok());
    }

    #[tokio::test]
    async fn test_memory_cache_hit_skips_network() -> Result<(), Box<dyn std::error::Error>> {
        let fetcher = HttpImageFetcher::new(&ImageConfig::default())?;
        // Unroutable on purpose: only the cache can satisfy this fetch.
        let url = "https://invalid.invalid/cat.png";
        fetcher
            .memory_cache
            .put(LoadedImage {
                id: ImageId::from_url(url),
                url: url.to_string(),
                width: 3,
                height: 4,
                byte_len: 10,
                origin: ImageOrigin::Network,
            })
            .await;

        let image = fetcher.fetch(url).await?;
        assert_eq!(image.origin, ImageOrigin::MemoryCache);
        assert_eq!((image.width, image.height), (3, 4));
        Ok(())
    }

    #[tokio::test]
    async fn test_invalid_source_fails_without_network() {
        let fetcher = HttpImageFetcher::new(&ImageConfig::default()).expect("client");
        let result = fetcher.fetch("ftp://example.com/a.png").await;
        assert!(matches!(result, Err(FetchError::InvalidSource(_))));
    }

    #[test]
    fn test_body_stops_buffering_past_limit() {
        let mut body = LimitedBody::new(8, None);
        assert!(body.push(b"abcd").is_ok());
        assert!(body.push(b"efgh").is_ok());
        assert_eq!(
            body.push(b"i"),
            Err(FetchError::TooLarge { size: 9, limit: 8 })
        );
        assert_eq!(body.buf.len(), 8);
        assert_eq!(&body.finish()[..], b"abcdefgh");
    }

    #[test]
    fn test_body_capacity_is_capped_by_limit() {
        let body = LimitedBody::new(16, Some(1 << 40));
        assert!(body.buf.capacity() <= 16);
    }

    #[test]
    fn test_size_limit() {
        let config = ImageConfig {
            max_image_bytes: 10,
            ..ImageConfig::default()
        };
        let fetcher = HttpImageFetcher::new(&config).expect("client");
        assert!(fetcher.check_size(10).is_ok());
        assert_eq!(
            fetcher.check_size(11),
            Err(FetchError::TooLarge { size: 11, limit: 10 })
        );
    }
}
