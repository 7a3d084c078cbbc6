//! Labeeb - flicker-free image swapping for chat message rendering.
//!
//! A [`SmartImage`](application::SmartImage) keeps its surface bound to the
//! last fully loaded source and preloads replacements off-screen.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

/// Application layer containing the image swapping services.
pub mod application;
/// Domain layer containing entities and port definitions.
pub mod domain;
/// Infrastructure layer containing adapters for external services.
pub mod infrastructure;
/// Presentation layer containing terminal widgets.
pub mod presentation;

/// Current version of the application.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Application name.
pub const NAME: &str = "labeeb";
