//! The unit of work handed to an isolated worker, and the exit-code
//! protocol workers use to report back.

use std::path::{Path, PathBuf};

use crate::error::PipelineError;
use crate::types::AssetStatus;

use super::discovery::DiscoveredFile;

/// Worker wrote a tagged output file.
pub const EXIT_OPTIMIZED: i32 = 0;

/// Worker hit a fatal error; no usable output.
pub const EXIT_FAILED: i32 = 1;

/// Worker wrote an output file, but without the copyright tag.
///
/// Distinct from 2, which argument parsers commonly use for usage errors.
pub const EXIT_DEGRADED: i32 = 3;

/// One asset to process: created per dispatch, gone when its worker exits.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobDescriptor {
    /// Asset name (the output file name)
    pub name: String,
    /// Source file
    pub input: PathBuf,
    /// Destination file
    pub output: PathBuf,
}

impl JobDescriptor {
    pub fn new(name: impl Into<String>, input: impl Into<PathBuf>, output: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            input: input.into(),
            output: output.into(),
        }
    }

    /// Job for a discovered file. The output mirrors the file's path
    /// relative to the source directory, so distinct inputs never share an
    /// output.
    pub fn for_file(file: &DiscoveredFile, output_dir: &Path) -> Self {
        Self::new(&file.name, &file.path, output_dir.join(&file.relative))
    }

    /// Build a descriptor from the worker's positional arguments.
    ///
    /// Fails on the first missing (or empty) argument.
    pub fn from_args(
        name: Option<String>,
        input: Option<PathBuf>,
        output: Option<PathBuf>,
    ) -> Result<Self, PipelineError> {
        let name = name
            .filter(|n| !n.is_empty())
            .ok_or(PipelineError::MissingArgument("name"))?;
        let input = input
            .filter(|p| !p.as_os_str().is_empty())
            .ok_or(PipelineError::MissingArgument("input path"))?;
        let output = output
            .filter(|p| !p.as_os_str().is_empty())
            .ok_or(PipelineError::MissingArgument("output path"))?;
        Ok(Self {
            name,
            input,
            output,
        })
    }
}

/// Map a worker exit code to an asset status.
///
/// `None` means the worker was killed by a signal.
pub fn status_from_exit_code(code: Option<i32>) -> AssetStatus {
    match code {
        Some(EXIT_OPTIMIZED) => AssetStatus::Optimized,
        Some(EXIT_DEGRADED) => AssetStatus::Degraded,
        Some(code) => AssetStatus::Failed {
            message: format!("worker exited with status {code}"),
        },
        None => AssetStatus::Failed {
            message: "worker terminated by signal".to_string(),
        },
    }
}
