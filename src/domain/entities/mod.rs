//! Domain entity definitions.

mod image;

pub use image::{ImageId, ImageOrigin, LoadEvent, LoadedImage};
