mod image_fetcher_port;

pub use image_fetcher_port::{FetchError, FetchResult, ImageFetcherPort};

#[cfg(test)]
pub mod mocks {
    pub use super::image_fetcher_port::MockImageFetcherPort;
}
