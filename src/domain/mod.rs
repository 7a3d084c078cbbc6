//! Domain layer with core entities and port definitions.

/// Entity definitions.
pub mod entities;
/// Port definitions.
pub mod ports;

pub use entities::{ImageId, ImageOrigin, LoadEvent, LoadedImage};
pub use ports::{FetchError, FetchResult, ImageFetcherPort};
