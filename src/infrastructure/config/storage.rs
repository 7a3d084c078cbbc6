//! Locating, reading and seeding the configuration file.

use super::app_config::{APP_NAME, APP_ORGANIZATION, APP_QUALIFIER, AppConfig};
use directories::ProjectDirs;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info, warn};

const CONFIG_FILE_NAME: &str = "config.toml";

/// Errors raised while locating or seeding the configuration file.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// No per-user configuration directory exists on this platform.
    #[error("failed to determine config directory")]
    ConfigDirNotFound,
    /// A config file passed on the command line does not exist.
    #[error("config file {0} does not exist")]
    MissingFile(PathBuf),
    /// Reading the file or writing the default failed.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    /// The default configuration could not be serialized.
    #[error("toml serialization error: {0}")]
    TomlSer(#[from] toml::ser::Error),
}

/// Where the configuration file lives and how a missing one is treated.
#[derive(Debug, Clone, PartialEq, Eq)]
enum ConfigSource {
    /// Per-user location; seeded with defaults on first run.
    Default(PathBuf),
    /// Given with `--config`; must already exist.
    Explicit(PathBuf),
}

/// Resolves and loads the application configuration file.
#[derive(Debug)]
pub struct StorageManager {
    source: ConfigSource,
}

impl StorageManager {
    /// Resolves the config file: `path_override` when given, otherwise
    /// `config.toml` in the per-user configuration directory.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::ConfigDirNotFound` when no override is given and
    /// the platform has no configuration directory.
    pub fn locate(path_override: Option<&Path>) -> Result<Self, ConfigError> {
        let source = match path_override {
            Some(path) => ConfigSource::Explicit(path.to_path_buf()),
            None => {
                let dir = ProjectDirs::from(APP_QUALIFIER, APP_ORGANIZATION, APP_NAME)
                    .ok_or(ConfigError::ConfigDirNotFound)?;
                ConfigSource::Default(dir.config_dir().join(CONFIG_FILE_NAME))
            }
        };
        debug!(?source, "Resolved config file");
        Ok(Self { source })
    }

    /// Uses `config.toml` inside `dir` as the default location.
    #[must_use]
    pub fn in_dir(dir: &Path) -> Self {
        Self {
            source: ConfigSource::Default(dir.join(CONFIG_FILE_NAME)),
        }
    }

    /// Path of the resolved config file.
    #[must_use]
    pub fn config_path(&self) -> &Path {
        match &self.source {
            ConfigSource::Default(path) | ConfigSource::Explicit(path) => path.as_path(),
        }
    }

    /// Reads the configuration.
    ///
    /// A missing default file is created with default values. A malformed
    /// file is left untouched and defaults are used instead.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::MissingFile` for a missing explicit file, or
    /// `ConfigError::Io` / `ConfigError::TomlSer` when reading or seeding fails.
    pub fn load(&self) -> Result<AppConfig, ConfigError> {
        let path = self.config_path();

        if !path.exists() {
            if let ConfigSource::Explicit(path) = &self.source {
                return Err(ConfigError::MissingFile(path.clone()));
            }
            info!(path = %path.display(), "Config file not found, writing defaults");
            let config = AppConfig::default();
            write_atomically(path, &toml::to_string_pretty(&config)?)?;
            return Ok(config);
        }

        let content = fs::read_to_string(path)?;
        Ok(toml::from_str(&content).unwrap_or_else(|e| {
            warn!(path = %path.display(), error = %e, "Malformed config file, using defaults");
            AppConfig::default()
        }))
    }
}

fn write_atomically(path: &Path, content: &str) -> Result<(), ConfigError> {
    let parent = path
        .parent()
        .ok_or_else(|| std::io::Error::other("config path has no parent directory"))?;
    fs::create_dir_all(parent)?;

    let mut temp_file = tempfile::NamedTempFile::new_in(parent)?;
    temp_file.write_all(content.as_bytes())?;
    temp_file.persist(path).map_err(|e| e.error)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::config::LogLevel;
    use tempfile::tempdir;

    #[test]
    fn test_missing_default_file_is_seeded() {
        let dir = tempdir().unwrap();
        let nested = dir.path().join("labeeb");
        let manager = StorageManager::in_dir(&nested);

        let config = manager.load().unwrap();
        assert_eq!(config.log_level, LogLevel::Info);

        let written = fs::read_to_string(nested.join(CONFIG_FILE_NAME)).unwrap();
        let reparsed: AppConfig = toml::from_str(&written).unwrap();
        assert_eq!(reparsed.images.timeout_secs, config.images.timeout_secs);
    }

    #[test]
    fn test_malformed_file_falls_back_to_defaults() {
        let dir = tempdir().unwrap();
        let manager = StorageManager::in_dir(dir.path());
        fs::write(manager.config_path(), "invalid_toml = [").unwrap();

        let config = manager.load().unwrap();
        assert_eq!(config.log_level, LogLevel::Info);
        let content = fs::read_to_string(manager.config_path()).unwrap();
        assert_eq!(content, "invalid_toml = [");
    }

    #[test]
    fn test_explicit_file_is_loaded() {
        let dir = tempdir().unwrap();
        let custom = dir.path().join("custom.toml");
        fs::write(&custom, "log_level = \"warn\"\n[images]\ntimeout_secs = 2\n").unwrap();

        let manager = StorageManager::locate(Some(&custom)).unwrap();
        assert_eq!(manager.config_path(), custom.as_path());

        let config = manager.load().unwrap();
        assert_eq!(config.log_level, LogLevel::Warn);
        assert_eq!(config.images.timeout_secs, 2);
    }

    #[test]
    fn test_missing_explicit_file_is_an_error_and_not_created() {
        let dir = tempdir().unwrap();
        let custom = dir.path().join("typo.toml");

        let manager = StorageManager::locate(Some(&custom)).unwrap();
        let err = tokio_test::assert_err!(manager.load());

        assert!(matches!(err, ConfigError::MissingFile(ref p) if *p == custom));
        assert!(!custom.exists());
    }
}
