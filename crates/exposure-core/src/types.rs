//! Core data types for the Exposure image pipeline.
//!
//! An asset moves through the pipeline as a series of new buffers: the raw
//! file bytes, the re-encoded JPEG, then the copyright-tagged JPEG. Nothing is
//! mutated in place.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::PipelineError;

/// A source photograph loaded into memory.
#[derive(Debug, Clone)]
pub struct ImageAsset {
    /// Path the bytes were read from
    pub path: PathBuf,

    /// File name, used for the output file and in logs
    pub name: String,

    /// Raw encoded bytes as read from disk
    pub bytes: Vec<u8>,
}

impl ImageAsset {
    pub fn new(path: impl Into<PathBuf>, name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            path: path.into(),
            name: name.into(),
            bytes,
        }
    }

    /// Size of the source file in bytes.
    pub fn original_size(&self) -> u64 {
        self.bytes.len() as u64
    }
}

/// Output of the transform stage: a freshly encoded JPEG.
#[derive(Debug, Clone)]
pub struct TransformedImage {
    /// Encoded JPEG bytes
    pub bytes: Vec<u8>,

    /// Source dimensions
    pub original_width: u32,
    pub original_height: u32,

    /// Output dimensions
    pub width: u32,
    pub height: u32,

    /// Time spent decoding, resizing and encoding
    pub elapsed: Duration,
}

impl TransformedImage {
    /// Whether the resize policy changed the dimensions.
    pub fn resized(&self) -> bool {
        self.width != self.original_width || self.height != self.original_height
    }

    pub fn new_size(&self) -> u64 {
        self.bytes.len() as u64
    }
}

/// Summary of one processed asset.
///
/// Workers print this as a single JSON line on stdout so the dispatcher can
/// aggregate sizes without sharing memory with the worker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssetReport {
    /// Output file name
    pub name: String,

    /// Source size in bytes
    pub original_size: u64,

    /// Written size in bytes
    pub new_size: u64,

    /// Output dimensions
    pub width: u32,
    pub height: u32,

    /// Whether the image was downscaled
    pub resized: bool,

    /// Whether the copyright tag made it into the output
    pub copyright_embedded: bool,

    /// Wall time spent in the worker
    pub elapsed_ms: u64,
}

impl AssetReport {
    /// Signed size change, as printed in the per-asset log line.
    pub fn size_delta(&self) -> i64 {
        self.new_size as i64 - self.original_size as i64
    }
}

/// How a single dispatched asset ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AssetStatus {
    /// Output written with the copyright tag
    Optimized,

    /// Output written, but copyright embedding fell back to the untagged bytes
    Degraded,

    /// No usable output; the message is the worker's error
    Failed { message: String },

    /// Never launched because an earlier failure stopped the batch
    Skipped,
}

/// Outcome of one asset as observed by the dispatcher.
#[derive(Debug, Clone)]
pub struct AssetOutcome {
    /// Asset file name
    pub name: String,

    /// Source path
    pub input: PathBuf,

    /// Final status
    pub status: AssetStatus,

    /// Worker report, when the worker produced one
    pub report: Option<AssetReport>,

    /// Time from launch to exit as seen by the dispatcher
    pub elapsed: Duration,
}

impl AssetOutcome {
    pub fn failed(&self) -> bool {
        matches!(self.status, AssetStatus::Failed { .. })
    }
}

/// Aggregated result of one dispatch.
///
/// Outcomes are stored in completion order. The entry point consumes this
/// once to decide the process exit status.
#[derive(Debug, Clone, Default)]
pub struct BuildResult {
    /// Per-asset outcomes, in the order workers finished
    pub outcomes: Vec<AssetOutcome>,

    /// Wall time of the whole dispatch
    pub elapsed: Duration,
}

impl BuildResult {
    pub fn push(&mut self, outcome: AssetOutcome) {
        self.outcomes.push(outcome);
    }

    pub fn total(&self) -> usize {
        self.outcomes.len()
    }

    pub fn optimized(&self) -> usize {
        self.count(|s| matches!(s, AssetStatus::Optimized))
    }

    pub fn degraded(&self) -> usize {
        self.count(|s| matches!(s, AssetStatus::Degraded))
    }

    pub fn failed(&self) -> usize {
        self.count(|s| matches!(s, AssetStatus::Failed { .. }))
    }

    pub fn skipped(&self) -> usize {
        self.count(|s| matches!(s, AssetStatus::Skipped))
    }

    /// The representative failure reported for the batch: the first worker
    /// to fail, in completion order.
    pub fn first_failure(&self) -> Option<&AssetOutcome> {
        self.outcomes.iter().find(|o| o.failed())
    }

    /// The first failure as an error value, for reporting the batch.
    pub fn representative_error(&self) -> Option<PipelineError> {
        self.outcomes.iter().find_map(|o| match &o.status {
            AssetStatus::Failed { message } => Some(PipelineError::Worker {
                name: o.name.clone(),
                message: message.clone(),
            }),
            _ => None,
        })
    }

    /// True only when every asset was optimized with its copyright tag.
    pub fn is_success(&self) -> bool {
        self.outcomes
            .iter()
            .all(|o| matches!(o.status, AssetStatus::Optimized))
    }

    /// Process exit status for this build: 0 on full success, 1 otherwise.
    pub fn exit_code(&self) -> u8 {
        if self.is_success() {
            0
        } else {
            1
        }
    }

    /// Source bytes across all reported assets.
    pub fn bytes_before(&self) -> u64 {
        self.reports().map(|r| r.original_size).sum()
    }

    /// Output bytes across all reported assets.
    pub fn bytes_after(&self) -> u64 {
        self.reports().map(|r| r.new_size).sum()
    }

    fn reports(&self) -> impl Iterator<Item = &AssetReport> {
        self.outcomes.iter().filter_map(|o| o.report.as_ref())
    }

    fn count(&self, pred: impl Fn(&AssetStatus) -> bool) -> usize {
        self.outcomes.iter().filter(|o| pred(&o.status)).count()
    }
}

/// File name of a path as an owned string, or `None` for paths like `/` or `..`.
pub fn file_name_of(path: &Path) -> Option<String> {
    path.file_name().map(|n| n.to_string_lossy().into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn outcome(name: &str, status: AssetStatus) -> AssetOutcome {
        AssetOutcome {
            name: name.to_string(),
            input: PathBuf::from(format!("images/{name}")),
            status,
            report: None,
            elapsed: Duration::from_millis(10),
        }
    }

    fn report(name: &str, original: u64, new: u64) -> AssetReport {
        AssetReport {
            name: name.to_string(),
            original_size: original,
            new_size: new,
            width: 2500,
            height: 1875,
            resized: true,
            copyright_embedded: true,
            elapsed_ms: 120,
        }
    }

    #[test]
    fn test_empty_build_is_success() {
        let result = BuildResult::default();
        assert!(result.is_success());
        assert_eq!(result.exit_code(), 0);
        assert!(result.first_failure().is_none());
    }

    #[test]
    fn test_degraded_asset_sets_nonzero_exit() {
        let mut result = BuildResult::default();
        result.push(outcome("a.jpg", AssetStatus::Optimized));
        result.push(outcome("b.jpg", AssetStatus::Degraded));

        assert!(!result.is_success());
        assert_eq!(result.exit_code(), 1);
        assert_eq!(result.degraded(), 1);
        assert!(result.first_failure().is_none());
    }

    #[test]
    fn test_first_failure_is_in_completion_order() {
        let mut result = BuildResult::default();
        result.push(outcome("a.jpg", AssetStatus::Optimized));
        result.push(outcome(
            "b.jpg",
            AssetStatus::Failed {
                message: "corrupt".to_string(),
            },
        ));
        result.push(outcome(
            "c.jpg",
            AssetStatus::Failed {
                message: "also corrupt".to_string(),
            },
        ));

        assert_eq!(result.failed(), 2);
        assert_eq!(result.first_failure().unwrap().name, "b.jpg");
        let err = result.representative_error().unwrap();
        assert!(err.to_string().contains("b.jpg"));
        assert!(err.to_string().contains("corrupt"));
        assert_eq!(result.exit_code(), 1);
    }

    #[test]
    fn test_byte_totals_use_reports_only() {
        let mut result = BuildResult::default();
        let mut a = outcome("a.jpg", AssetStatus::Optimized);
        a.report = Some(report("a.jpg", 1000, 400));
        let mut b = outcome("b.jpg", AssetStatus::Optimized);
        b.report = Some(report("b.jpg", 500, 300));
        result.push(a);
        result.push(b);
        result.push(outcome("c.jpg", AssetStatus::Skipped));

        assert_eq!(result.bytes_before(), 1500);
        assert_eq!(result.bytes_after(), 700);
        assert_eq!(result.skipped(), 1);
    }

    #[test]
    fn test_report_size_delta_is_signed() {
        assert_eq!(report("a.jpg", 1000, 400).size_delta(), -600);
        assert_eq!(report("a.jpg", 100, 150).size_delta(), 50);
    }

    #[test]
    fn test_report_json_shape() {
        let json = serde_json::to_string(&report("a.jpg", 10, 5)).unwrap();
        assert!(json.contains("\"copyright_embedded\":true"));
        let back: AssetReport = serde_json::from_str(&json).unwrap();
        assert_eq!(back.name, "a.jpg");
    }
}
