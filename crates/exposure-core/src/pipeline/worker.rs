//! Isolated execution of one job.
//!
//! The dispatcher only talks to workers through [`AssetWorker`]. The
//! production implementation, [`ProcessWorker`], re-invokes a binary as a
//! child process per asset, passing the job as three positional arguments
//! and reading back the exit code and a one-line JSON report.

use async_trait::async_trait;
use std::ffi::OsString;
use std::path::PathBuf;
use std::process::Stdio;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::{ChildStderr, Command};

use crate::types::{AssetReport, AssetStatus};

use super::job::{status_from_exit_code, JobDescriptor};

/// Subcommand name the worker binary answers to.
pub const WORKER_SUBCOMMAND: &str = "worker";

/// What the dispatcher learns when a worker exits.
#[derive(Debug, Clone)]
pub struct WorkerExit {
    pub status: AssetStatus,
    pub report: Option<AssetReport>,
}

/// Runs a single job to completion in isolation.
#[async_trait]
pub trait AssetWorker: Send + Sync {
    /// Run the job and wait for it to finish. Never cancelled once started.
    async fn run(&self, job: &JobDescriptor) -> WorkerExit;
}

/// Worker that spawns one child process per job.
#[derive(Debug, Clone)]
pub struct ProcessWorker {
    program: PathBuf,
    leading_args: Vec<OsString>,
}

impl ProcessWorker {
    /// Worker invoking `program worker -- <name> <input> <output>`.
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            leading_args: Vec::new(),
        }
    }

    /// Worker re-invoking the running executable.
    pub fn current_exe() -> std::io::Result<Self> {
        Ok(Self::new(std::env::current_exe()?))
    }

    /// Add an argument placed before the worker subcommand (global flags
    /// such as `--config <path>`).
    pub fn leading_arg(mut self, arg: impl Into<OsString>) -> Self {
        self.leading_args.push(arg.into());
        self
    }

    fn command(&self, job: &JobDescriptor) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.leading_args)
            .arg(WORKER_SUBCOMMAND)
            // Names may start with a dash.
            .arg("--")
            .arg(&job.name)
            .arg(&job.input)
            .arg(&job.output)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        cmd
    }
}

#[async_trait]
impl AssetWorker for ProcessWorker {
    async fn run(&self, job: &JobDescriptor) -> WorkerExit {
        let mut child = match self.command(job).spawn() {
            Ok(child) => child,
            Err(e) => {
                return WorkerExit::failed(format!("failed to spawn {:?}: {e}", self.program))
            }
        };

        let forwarder = child
            .stderr
            .take()
            .map(|stderr| tokio::spawn(forward_stderr(stderr)));
        let output = match child.wait_with_output().await {
            Ok(output) => output,
            Err(e) => return WorkerExit::failed(format!("failed to wait for worker: {e}")),
        };
        let last_line = match forwarder {
            Some(handle) => handle.await.ok().flatten(),
            None => None,
        };

        let stdout = String::from_utf8_lossy(&output.stdout);
        let report = parse_report(&stdout);
        if report.is_none() && output.status.success() {
            tracing::debug!("{}: worker printed no report", job.name);
        }

        let status = match status_from_exit_code(output.status.code()) {
            AssetStatus::Failed { message } => AssetStatus::Failed {
                message: match last_line {
                    Some(line) => format!("{message}: {line}"),
                    None => message,
                },
            },
            status => status,
        };

        WorkerExit { status, report }
    }
}

impl WorkerExit {
    fn failed(message: String) -> Self {
        Self {
            status: AssetStatus::Failed { message },
            report: None,
        }
    }
}

/// Copy a worker's stderr to ours line by line.
///
/// Returns the last non-blank line, which is the worker's final log entry.
async fn forward_stderr(stderr: ChildStderr) -> Option<String> {
    let mut lines = BufReader::new(stderr).lines();
    let mut last = None;
    while let Ok(Some(line)) = lines.next_line().await {
        eprintln!("{line}");
        if !line.trim().is_empty() {
            last = Some(line.trim().to_string());
        }
    }
    last
}

/// Last stdout line that parses as an [`AssetReport`].
pub fn parse_report(stdout: &str) -> Option<AssetReport> {
    stdout
        .lines()
        .rev()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .find_map(|line| serde_json::from_str(line).ok())
}
