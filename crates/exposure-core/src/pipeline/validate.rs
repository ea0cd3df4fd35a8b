//! Input validation before decoding.

use std::path::Path;

use crate::config::LimitsConfig;
use crate::error::PipelineError;

/// Validates source files before they are read in full.
pub struct Validator {
    limits: LimitsConfig,
}

impl Validator {
    /// Create a new validator with the given limits.
    pub fn new(limits: LimitsConfig) -> Self {
        Self { limits }
    }

    /// Check that a file exists and is within the size limit.
    pub fn validate_file(&self, path: &Path) -> Result<(), PipelineError> {
        let metadata = std::fs::metadata(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                PipelineError::FileNotFound(path.to_path_buf())
            } else {
                PipelineError::Io {
                    path: path.to_path_buf(),
                    source: e,
                }
            }
        })?;

        let max_bytes = self.limits.max_file_size_mb * 1024 * 1024;
        if metadata.len() > max_bytes {
            return Err(PipelineError::FileTooLarge {
                path: path.to_path_buf(),
                size_mb: metadata.len() / (1024 * 1024),
                max_mb: self.limits.max_file_size_mb,
            });
        }
        Ok(())
    }

    /// Check the in-memory bytes start like a JPEG stream.
    pub fn validate_bytes(&self, bytes: &[u8], path: &Path) -> Result<(), PipelineError> {
        if bytes.len() < 4 {
            return Err(PipelineError::Decode {
                name: display_name(path),
                message: "File too small to be a valid image".to_string(),
            });
        }
        if !is_jpeg_header(bytes) {
            return Err(PipelineError::UnsupportedFormat {
                path: path.to_path_buf(),
                format: "not a JPEG (invalid magic bytes)".to_string(),
            });
        }
        Ok(())
    }
}

/// JPEG: FF D8 FF
fn is_jpeg_header(header: &[u8]) -> bool {
    header.len() >= 3 && header[0] == 0xFF && header[1] == 0xD8 && header[2] == 0xFF
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
