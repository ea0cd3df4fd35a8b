//! Running git for publish steps.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::process::Command;

use crate::error::{PublishError, PublishResult};

use super::PublishStep;

/// Executes one external command on behalf of a publish step.
#[async_trait]
pub trait CommandRunner: Send + Sync {
    /// Run `args` in `cwd` and wait for it. Non-zero exit is an error.
    async fn run(&self, step: PublishStep, args: &[String], cwd: &Path) -> PublishResult<()>;
}

/// Runs commands with the git executable.
#[derive(Debug, Clone)]
pub struct GitRunner {
    git: PathBuf,
}

impl GitRunner {
    pub fn new(git: impl Into<PathBuf>) -> Self {
        Self { git: git.into() }
    }
}

#[async_trait]
impl CommandRunner for GitRunner {
    async fn run(&self, step: PublishStep, args: &[String], cwd: &Path) -> PublishResult<()> {
        let program = self.git.to_string_lossy().to_string();
        tracing::debug!("{step}: {} {}", program, args.join(" "));

        let output = Command::new(&self.git)
            .args(args)
            .current_dir(cwd)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await
            .map_err(|e| PublishError::Spawn {
                step,
                program: program.clone(),
                message: e.to_string(),
            })?;

        let stdout = String::from_utf8_lossy(&output.stdout);
        let stderr = String::from_utf8_lossy(&output.stderr);
        if !stdout.trim().is_empty() {
            tracing::trace!("{step} stdout: {}", stdout.trim());
        }

        if !output.status.success() {
            return Err(PublishError::Step {
                step,
                message: format!(
                    "`{} {}` exited with {}: {}",
                    program,
                    args.join(" "),
                    output.status,
                    stderr.trim()
                ),
            });
        }
        if !stderr.trim().is_empty() {
            tracing::debug!("{step} stderr: {}", stderr.trim());
        }
        Ok(())
    }
}
