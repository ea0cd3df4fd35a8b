//! Configuration validation with range checks.

use crate::error::ConfigError;

use super::Config;

impl Config {
    /// Validate configuration values are within acceptable ranges.
    pub(crate) fn validate(&self) -> Result<(), ConfigError> {
        if self.processing.parallel_workers == 0 {
            return Err(ConfigError::ValidationError(
                "processing.parallel_workers must be > 0".into(),
            ));
        }
        if self.processing.supported_formats.is_empty() {
            return Err(ConfigError::ValidationError(
                "processing.supported_formats must not be empty".into(),
            ));
        }
        if self.limits.max_file_size_mb == 0 {
            return Err(ConfigError::ValidationError(
                "limits.max_file_size_mb must be > 0".into(),
            ));
        }
        if self.limits.max_image_dimension == 0 {
            return Err(ConfigError::ValidationError(
                "limits.max_image_dimension must be > 0".into(),
            ));
        }
        if self.metadata.copyright.is_empty() || !self.metadata.copyright.is_ascii() {
            return Err(ConfigError::ValidationError(
                "metadata.copyright must be a non-empty ASCII string".into(),
            ));
        }

        let publish = [
            ("publish.remote_url", &self.publish.remote_url),
            ("publish.branch", &self.publish.branch),
            ("publish.author_name", &self.publish.author_name),
            ("publish.author_email", &self.publish.author_email),
            ("publish.commit_message", &self.publish.commit_message),
        ];
        for (key, value) in publish {
            if value.trim().is_empty() {
                return Err(ConfigError::ValidationError(format!(
                    "{key} must not be empty"
                )));
            }
        }
        Ok(())
    }
}
