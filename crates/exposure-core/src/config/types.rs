//! Sub-configuration structs with the defaults the site has always used.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Site layout: where sources live and where the build lands.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    /// Directory holding the raw JPEG photographs
    pub images_dir: PathBuf,

    /// Static page tree copied verbatim into the output root
    pub static_dir: PathBuf,

    /// Build output root (also the publish working directory)
    pub output_dir: PathBuf,

    /// Subdirectory of the output root receiving optimized images
    pub images_output_subdir: PathBuf,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            images_dir: PathBuf::from("images"),
            static_dir: PathBuf::from("public"),
            output_dir: PathBuf::from("tmp"),
            images_output_subdir: PathBuf::from("images"),
        }
    }
}

/// Processing settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProcessingConfig {
    /// Maximum number of worker processes running at once
    pub parallel_workers: usize,

    /// Supported input extensions (case-insensitive)
    pub supported_formats: Vec<String>,

    /// Descend into subdirectories of `images_dir`
    pub recursive: bool,

    /// Stop launching new workers once one has failed.
    /// In-flight workers always run to completion.
    pub stop_on_failure: bool,
}

impl Default for ProcessingConfig {
    fn default() -> Self {
        Self {
            parallel_workers: 4,
            supported_formats: vec!["jpg".to_string(), "jpeg".to_string()],
            recursive: false,
            stop_on_failure: false,
        }
    }
}

/// Resource limits to protect against problematic inputs.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LimitsConfig {
    /// Maximum file size in megabytes
    pub max_file_size_mb: u64,

    /// Maximum decoded image dimension (width or height)
    pub max_image_dimension: u32,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_file_size_mb: 100,
            max_image_dimension: 30000,
        }
    }
}

/// Metadata written into every optimized image.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MetadataConfig {
    /// Value of the EXIF Copyright tag (ASCII)
    pub copyright: String,
}

impl Default for MetadataConfig {
    fn default() -> Self {
        Self {
            copyright: "Copyright Philipp Holke. All rights reserved.".to_string(),
        }
    }
}

/// Publish target and identity.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PublishConfig {
    /// git executable
    pub git: PathBuf,

    /// Remote receiving the force-push
    pub remote_url: String,

    /// Remote branch overwritten on every publish
    pub branch: String,

    /// Commit author name
    pub author_name: String,

    /// Commit author email
    pub author_email: String,

    /// Message of the single published commit
    pub commit_message: String,
}

impl Default for PublishConfig {
    fn default() -> Self {
        Self {
            git: PathBuf::from("git"),
            remote_url: "https://github.com/hejijunhao/hejijunhao.github.io.git".to_string(),
            branch: "master".to_string(),
            author_name: "Exposure Publisher".to_string(),
            author_email: "publish@exposure.invalid".to_string(),
            commit_message: "Publish site".to_string(),
        }
    }
}

/// Logging settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level: error, warn, info, debug, trace
    pub level: String,

    /// Log format: "pretty" or "json"
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}
