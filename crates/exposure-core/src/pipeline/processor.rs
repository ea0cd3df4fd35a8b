//! Per-asset pipeline: read → validate → transform → embed → write.
//!
//! This is the body of a worker. It runs inside the worker process, so the
//! decoded bitmap for one asset lives and dies there.

use std::sync::Arc;
use std::time::Instant;

use crate::config::Config;
use crate::error::{PipelineError, PipelineResult};
use crate::types::{AssetReport, ImageAsset};

use super::copyright::CopyrightEmbedder;
use super::job::JobDescriptor;
use super::transform::ImageTransformer;
use super::validate::Validator;

/// What the worker produced for one job.
#[derive(Debug)]
pub struct ProcessedAsset {
    /// Summary printed for the dispatcher
    pub report: AssetReport,
    /// Set when the output was written without the copyright tag
    pub embed_error: Option<PipelineError>,
}

impl ProcessedAsset {
    pub fn degraded(&self) -> bool {
        self.embed_error.is_some()
    }
}

/// Runs the full pipeline for a single asset.
pub struct AssetProcessor {
    validator: Validator,
    transformer: Arc<ImageTransformer>,
    embedder: CopyrightEmbedder,
}

impl AssetProcessor {
    /// Create a new processor with the given configuration.
    pub fn new(config: &Config) -> Self {
        Self {
            validator: Validator::new(config.limits.clone()),
            transformer: Arc::new(ImageTransformer::new(config.limits.clone())),
            embedder: CopyrightEmbedder::new(config.metadata.copyright.clone()),
        }
    }

    /// Process one job and write exactly one output file.
    ///
    /// Decode and write failures are returned as errors. A copyright failure
    /// is not: the untagged bytes are written and the error is carried in
    /// [`ProcessedAsset::embed_error`].
    pub async fn process(&self, job: &JobDescriptor) -> PipelineResult<ProcessedAsset> {
        let start = Instant::now();
        tracing::debug!("Processing: {} ({:?} -> {:?})", job.name, job.input, job.output);

        self.validator.validate_file(&job.input)?;
        let bytes = tokio::fs::read(&job.input)
            .await
            .map_err(|source| PipelineError::Io {
                path: job.input.clone(),
                source,
            })?;
        self.validator.validate_bytes(&bytes, &job.input)?;
        let asset = ImageAsset::new(&job.input, &job.name, bytes);
        let original_size = asset.original_size();

        let transformer = self.transformer.clone();
        let transformed = tokio::task::spawn_blocking(move || transformer.transform(&asset))
            .await
            .map_err(|e| PipelineError::Decode {
                name: job.name.clone(),
                message: format!("Task join error: {e}"),
            })??;
        tracing::debug!(
            "  Transform: {} bytes in {:?}",
            transformed.new_size(),
            transformed.elapsed
        );

        let (width, height, resized) = (
            transformed.width,
            transformed.height,
            transformed.resized(),
        );
        let embedded = self.embedder.embed(transformed.bytes, &job.name);
        tracing::debug!("  Embed: {:?}", embedded.elapsed);

        if let Some(parent) = job.output.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|source| PipelineError::Io {
                    path: parent.to_path_buf(),
                    source,
                })?;
        }
        tokio::fs::write(&job.output, &embedded.bytes)
            .await
            .map_err(|source| PipelineError::Io {
                path: job.output.clone(),
                source,
            })?;

        let report = AssetReport {
            name: job.name.clone(),
            original_size,
            new_size: embedded.bytes.len() as u64,
            width,
            height,
            resized,
            copyright_embedded: embedded.embedded(),
            elapsed_ms: start.elapsed().as_millis() as u64,
        };
        tracing::info!(
            "{}: {} -> {} ({})",
            report.name,
            report.original_size,
            report.new_size,
            report.size_delta()
        );

        Ok(ProcessedAsset {
            report,
            embed_error: embedded.error,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::copyright::copyright_of;
    use crate::pipeline::transform::encode_jpeg;
    use image::{DynamicImage, GenericImageView};

    fn write_jpeg(dir: &std::path::Path, name: &str, width: u32, height: u32) -> std::path::PathBuf {
        let path = dir.join(name);
        let bytes = encode_jpeg(&DynamicImage::new_rgb8(width, height), name).unwrap();
        std::fs::write(&path, bytes).unwrap();
        path
    }

    #[tokio::test]
    async fn test_process_writes_tagged_output() {
        let dir = tempfile::tempdir().unwrap();
        let input = write_jpeg(dir.path(), "sq.jpg", 1200, 1200);
        let job = JobDescriptor::new("sq.jpg", &input, dir.path().join("out/images/sq.jpg"));

        let config = Config::default();
        let processed = AssetProcessor::new(&config).process(&job).await.unwrap();

        assert!(!processed.degraded());
        assert!(processed.report.copyright_embedded);
        assert!(!processed.report.resized);

        let written = std::fs::read(&job.output).unwrap();
        assert_eq!(written.len() as u64, processed.report.new_size);
        assert_eq!(
            copyright_of(&written).as_deref(),
            Some(config.metadata.copyright.as_str())
        );
        let decoded = image::load_from_memory(&written).unwrap();
        assert_eq!(decoded.dimensions(), (1200, 1200));
    }

    #[tokio::test]
    async fn test_process_oversized_copyright_is_degraded_but_written() {
        let dir = tempfile::tempdir().unwrap();
        let input = write_jpeg(dir.path(), "a.jpg", 64, 48);
        let job = JobDescriptor::new("a.jpg", &input, dir.path().join("out/a.jpg"));

        let mut config = Config::default();
        config.metadata.copyright = "x".repeat(70_000);
        let processed = AssetProcessor::new(&config).process(&job).await.unwrap();

        assert!(processed.degraded());
        assert!(!processed.report.copyright_embedded);
        let written = std::fs::read(&job.output).unwrap();
        assert!(copyright_of(&written).is_none());
        assert!(image::load_from_memory(&written).is_ok());
    }

    #[tokio::test]
    async fn test_process_corrupt_input_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("bad.jpg");
        std::fs::write(&input, [0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x10, b'J', b'F']).unwrap();
        let job = JobDescriptor::new("bad.jpg", &input, dir.path().join("out/bad.jpg"));

        let err = AssetProcessor::new(&Config::default())
            .process(&job)
            .await
            .unwrap_err();
        assert!(matches!(err, PipelineError::Decode { .. }));
        assert!(!job.output.exists());
    }

    #[tokio::test]
    async fn test_process_missing_input() {
        let dir = tempfile::tempdir().unwrap();
        let job = JobDescriptor::new("gone.jpg", dir.path().join("gone.jpg"), dir.path().join("out/gone.jpg"));

        let err = AssetProcessor::new(&Config::default())
            .process(&job)
            .await
            .unwrap_err();
        assert!(matches!(err, PipelineError::FileNotFound(_)));
    }
}
