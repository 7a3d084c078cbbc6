//! Application configuration.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use super::args::CliArgs;

pub(crate) const APP_NAME: &str = "labeeb";
pub(crate) const APP_QUALIFIER: &str = "com";
pub(crate) const APP_ORGANIZATION: &str = "labeeb";

/// Log level configuration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Trace level.
    Trace,
    /// Debug level.
    Debug,
    /// Info level.
    #[default]
    Info,
    /// Warning level.
    Warn,
    /// Error level.
    Error,
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Trace => write!(f, "trace"),
            Self::Debug => write!(f, "debug"),
            Self::Info => write!(f, "info"),
            Self::Warn => write!(f, "warn"),
            Self::Error => write!(f, "error"),
        }
    }
}

/// Application configuration.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Log file path. Logs go to stderr when unset.
    #[serde(default)]
    pub log_path: Option<PathBuf>,

    /// Log verbosity level.
    #[serde(default)]
    pub log_level: LogLevel,

    /// Image retrieval configuration.
    #[serde(default)]
    pub images: ImageConfig,
}

/// Image retrieval configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImageConfig {
    /// Maximum images remembered in memory.
    #[serde(default = "default_memory_cache_size")]
    pub memory_cache_size: usize,

    /// Request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Largest payload accepted, in bytes.
    #[serde(default = "default_max_image_bytes")]
    pub max_image_bytes: usize,

    /// User agent sent with image requests.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

fn default_memory_cache_size() -> usize {
    128
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_max_image_bytes() -> usize {
    20 * 1024 * 1024
}

fn default_user_agent() -> String {
    format!("{APP_NAME}/{}", env!("CARGO_PKG_VERSION"))
}

impl Default for ImageConfig {
    fn default() -> Self {
        Self {
            memory_cache_size: default_memory_cache_size(),
            timeout_secs: default_timeout_secs(),
            max_image_bytes: default_max_image_bytes(),
            user_agent: default_user_agent(),
        }
    }
}

impl AppConfig {
    /// Merges CLI arguments into the configuration.
    pub fn merge_with_args(&mut self, args: &CliArgs) {
        if let Some(log_path) = &args.log_path {
            self.log_path = Some(log_path.clone());
        }
        if let Some(log_level) = args.log_level {
            self.log_level = log_level;
        }
        if let Some(timeout_secs) = args.timeout_secs {
            self.images.timeout_secs = timeout_secs;
        }
    }
}
