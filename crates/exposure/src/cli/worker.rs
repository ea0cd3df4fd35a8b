//! The hidden `worker` command: one photograph, one process.
//!
//! Prints a one-line JSON report on stdout and exits with the status code
//! the dispatcher maps back to an asset outcome.

use clap::Args;
use exposure_core::pipeline::{AssetProcessor, JobDescriptor, EXIT_DEGRADED, EXIT_FAILED};
use exposure_core::Config;
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Instant;

/// Positional arguments of a worker invocation.
///
/// All optional at the parser level so a missing argument is reported as a
/// worker failure rather than a usage error.
#[derive(Args, Debug)]
pub struct WorkerArgs {
    /// Asset name (output file name)
    pub name: Option<String>,

    /// Source photograph
    pub input: Option<PathBuf>,

    /// Destination file
    pub output: Option<PathBuf>,
}

pub async fn execute(config: &Config, args: WorkerArgs) -> anyhow::Result<ExitCode> {
    let start = Instant::now();
    let job = match JobDescriptor::from_args(args.name, args.input, args.output) {
        Ok(job) => job,
        Err(e) => {
            tracing::error!("Worker invoked incorrectly: {e}");
            return Ok(exit_code(EXIT_FAILED));
        }
    };

    match AssetProcessor::new(config).process(&job).await {
        Ok(processed) => {
            println!("{}", serde_json::to_string(&processed.report)?);
            if processed.degraded() {
                Ok(exit_code(EXIT_DEGRADED))
            } else {
                Ok(ExitCode::SUCCESS)
            }
        }
        Err(e) => {
            tracing::error!("{}: failed after {:?}: {e}", job.name, start.elapsed());
            Ok(exit_code(EXIT_FAILED))
        }
    }
}

fn exit_code(code: i32) -> ExitCode {
    ExitCode::from(u8::try_from(code).unwrap_or(1))
}
