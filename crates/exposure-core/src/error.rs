//! Error types for the Exposure build and publish pipeline.
//!
//! Errors are organized by stage so that messages carry the asset name or the
//! publish step that failed.

use std::path::PathBuf;
use thiserror::Error;

use crate::publish::PublishStep;

/// Top-level error type for Exposure operations.
#[derive(Error, Debug)]
pub enum ExposureError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Image pipeline errors
    #[error("Pipeline error: {0}")]
    Pipeline(#[from] PipelineError),

    /// Publish sequence errors
    #[error("Publish error: {0}")]
    Publish(#[from] PublishError),

    /// General I/O errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to read the config file from disk
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    /// Failed to parse TOML configuration
    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),

    /// Configuration values are invalid
    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

/// Per-asset pipeline errors, organized by stage.
#[derive(Error, Debug)]
pub enum PipelineError {
    /// Image decoding failed (corrupt or unreadable input)
    #[error("Decode error for {name}: {message}")]
    Decode { name: String, message: String },

    /// Input is not a JPEG
    #[error("Unsupported format for {path}: {format}")]
    UnsupportedFormat { path: PathBuf, format: String },

    /// File exceeds size limit
    #[error("File too large: {path} ({size_mb}MB > {max_mb}MB)")]
    FileTooLarge {
        path: PathBuf,
        size_mb: u64,
        max_mb: u64,
    },

    /// Image dimensions exceed limit
    #[error("Image too large: {name} ({width}x{height} > {max_dim})")]
    ImageTooLarge {
        name: String,
        width: u32,
        height: u32,
        max_dim: u32,
    },

    /// File not found
    #[error("File not found: {0}")]
    FileNotFound(PathBuf),

    /// JPEG re-encoding failed
    #[error("Encode error for {name}: {message}")]
    Encode { name: String, message: String },

    /// Copyright metadata could not be spliced into the JPEG stream
    #[error("Metadata embed failed for {name}: {message}")]
    MetadataEmbed { name: String, message: String },

    /// A worker was invoked without one of its three positional arguments
    #[error("Missing worker argument: {0}")]
    MissingArgument(&'static str),

    /// A worker process could not be launched or exited unsuccessfully
    #[error("Worker failed for {name}: {message}")]
    Worker { name: String, message: String },

    /// Reading input or writing output failed
    #[error("IO error for {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Errors raised while publishing the output tree.
#[derive(Error, Debug)]
pub enum PublishError {
    /// The output root does not exist (nothing has been built)
    #[error("Output directory does not exist: {0}")]
    MissingOutput(PathBuf),

    /// The command for a step could not be spawned
    #[error("Failed to spawn `{program}` for step {step}: {message}")]
    Spawn {
        step: PublishStep,
        program: String,
        message: String,
    },

    /// A step ran and exited unsuccessfully
    #[error("Publish step {step} failed: {message}")]
    Step { step: PublishStep, message: String },

    /// Filesystem errors while removing repository metadata
    #[error("IO error during {step}: {source}")]
    Io {
        step: PublishStep,
        #[source]
        source: std::io::Error,
    },
}

/// Convenience type alias for Exposure results.
pub type Result<T> = std::result::Result<T, ExposureError>;

/// Convenience type alias for pipeline-specific results.
pub type PipelineResult<T> = std::result::Result<T, PipelineError>;

/// Convenience type alias for publish-specific results.
pub type PublishResult<T> = std::result::Result<T, PublishError>;
