//! Application layer with the image swapping services.

/// Service implementations.
pub mod services;

pub use services::{Preloader, ProbeEvent, ProbeOutcome, RenderedImage, SmartImage, SmartImageProps};
