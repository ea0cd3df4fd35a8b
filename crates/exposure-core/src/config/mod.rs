//! Configuration management for Exposure.
//!
//! Configuration is read from `exposure.toml` in the working directory, then
//! from the per-user config directory, and otherwise falls back to defaults.

mod types;
mod validate;

pub use types::*;

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// File name looked up in the working directory.
pub const CONFIG_FILE_NAME: &str = "exposure.toml";

/// Root configuration structure for Exposure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Source and output layout
    pub site: SiteConfig,

    /// Dispatch settings
    pub processing: ProcessingConfig,

    /// Resource limits
    pub limits: LimitsConfig,

    /// Embedded metadata
    pub metadata: MetadataConfig,

    /// Publish target
    pub publish: PublishConfig,

    /// Logging settings
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from the first location that exists.
    ///
    /// Returns default configuration if no config file is found.
    pub fn load() -> Result<Self, ConfigError> {
        match Self::resolve_path() {
            Some(path) => Self::load_from(&path),
            None => Ok(Self::default()),
        }
    }

    /// Load configuration from a specific file path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// The config file `load()` would read, if any.
    pub fn resolve_path() -> Option<PathBuf> {
        let local = PathBuf::from(CONFIG_FILE_NAME);
        if local.is_file() {
            return Some(local);
        }
        let user = Self::default_path();
        user.is_file().then_some(user)
    }

    /// Get the per-user config file path.
    ///
    /// Uses platform-appropriate directories:
    /// - macOS: ~/Library/Application Support/com.exposure.exposure/config.toml
    /// - Linux: ~/.config/exposure/config.toml
    /// - Windows: C:\Users\<User>\AppData\Roaming\exposure\config\config.toml
    ///
    /// Falls back to ~/.exposure/config.toml if directory detection fails.
    pub fn default_path() -> PathBuf {
        directories::ProjectDirs::from("com", "exposure", "exposure")
            .map(|dirs| dirs.config_dir().to_path_buf().join("config.toml"))
            .unwrap_or_else(|| {
                let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
                PathBuf::from(home).join(".exposure").join("config.toml")
            })
    }

    /// Resolved source image directory (with ~ expansion).
    pub fn images_dir(&self) -> PathBuf {
        expand(&self.site.images_dir)
    }

    /// Resolved static page tree (with ~ expansion).
    pub fn static_dir(&self) -> PathBuf {
        expand(&self.site.static_dir)
    }

    /// Resolved build output root (with ~ expansion).
    pub fn output_dir(&self) -> PathBuf {
        expand(&self.site.output_dir)
    }

    /// Directory that receives optimized images.
    pub fn images_output_dir(&self) -> PathBuf {
        self.output_dir().join(&self.site.images_output_subdir)
    }

    /// Serialize the config to a pretty TOML string.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::ValidationError(e.to_string()))
    }
}

fn expand(path: &Path) -> PathBuf {
    let path_str = path.to_string_lossy();
    let expanded = shellexpand::tilde(&path_str);
    PathBuf::from(expanded.into_owned())
}
