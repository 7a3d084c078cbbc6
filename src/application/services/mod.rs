//! Application services.

pub mod probe;
pub mod smart_image;

pub use probe::{InstanceId, Preloader, Probe, ProbeEvent};
pub use smart_image::{
    DisplayAttributes, DisplayMode, OnLoadCallback, ProbeOutcome, RenderedImage, SmartImage,
    SmartImageProps, SourceRequest,
};
