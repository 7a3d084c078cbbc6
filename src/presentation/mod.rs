//! Presentation layer with terminal widgets.

/// Reusable widgets.
pub mod widgets;

pub use widgets::SmartImageView;
