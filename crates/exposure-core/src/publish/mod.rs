//! Publishing the output tree as a single fresh commit.
//!
//! The sequence is a fixed list of [`PublishStep`]s run strictly in order.
//! The first failing step aborts everything after it, except repository
//! metadata removal, which runs on every exit path.

mod git;

pub use git::{CommandRunner, GitRunner};

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::config::PublishConfig;
use crate::error::{PublishError, PublishResult};

/// Directory git keeps its metadata in.
const METADATA_DIR: &str = ".git";

/// One step of the publish sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PublishStep {
    RemoveMetadata,
    Init,
    ConfigureName,
    ConfigureEmail,
    StageAll,
    Commit,
    AddRemote,
    Push,
    Cleanup,
}

impl PublishStep {
    /// Steps in execution order.
    pub const SEQUENCE: [PublishStep; 9] = [
        PublishStep::RemoveMetadata,
        PublishStep::Init,
        PublishStep::ConfigureName,
        PublishStep::ConfigureEmail,
        PublishStep::StageAll,
        PublishStep::Commit,
        PublishStep::AddRemote,
        PublishStep::Push,
        PublishStep::Cleanup,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            PublishStep::RemoveMetadata => "remove-metadata",
            PublishStep::Init => "init",
            PublishStep::ConfigureName => "configure-name",
            PublishStep::ConfigureEmail => "configure-email",
            PublishStep::StageAll => "stage-all",
            PublishStep::Commit => "commit",
            PublishStep::AddRemote => "add-remote",
            PublishStep::Push => "push",
            PublishStep::Cleanup => "cleanup",
        }
    }

    /// git arguments for this step, or `None` for the filesystem steps.
    pub fn git_args(&self, config: &PublishConfig) -> Option<Vec<String>> {
        let args = match self {
            PublishStep::RemoveMetadata | PublishStep::Cleanup => return None,
            PublishStep::Init => to_args(&["init"]),
            PublishStep::ConfigureName => to_args(&["config", "user.name", &config.author_name]),
            PublishStep::ConfigureEmail => {
                to_args(&["config", "user.email", &config.author_email])
            }
            PublishStep::StageAll => to_args(&["add", "--all", "."]),
            PublishStep::Commit => to_args(&["commit", "-m", &config.commit_message]),
            PublishStep::AddRemote => to_args(&["remote", "add", "origin", &config.remote_url]),
            PublishStep::Push => vec![
                "push".to_string(),
                "--force".to_string(),
                "origin".to_string(),
                format!("HEAD:{}", config.branch),
            ],
        };
        Some(args)
    }
}

fn to_args(parts: &[&str]) -> Vec<String> {
    parts.iter().map(|s| s.to_string()).collect()
}

impl fmt::Display for PublishStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Steps that completed during one publish.
#[derive(Debug, Clone, Default)]
pub struct PublishReport {
    /// Completed steps, in order
    pub steps: Vec<PublishStep>,

    /// Wall time of the whole sequence
    pub elapsed: Duration,
}

/// Runs the publish sequence against an output root.
pub struct PublishRunner {
    config: PublishConfig,
    runner: Arc<dyn CommandRunner>,
}

impl PublishRunner {
    pub fn new(config: PublishConfig, runner: Arc<dyn CommandRunner>) -> Self {
        Self { config, runner }
    }

    /// Runner that shells out to the configured git executable.
    pub fn with_git(config: PublishConfig) -> Self {
        let runner = Arc::new(GitRunner::new(config.git.clone()));
        Self::new(config, runner)
    }

    /// Publish `root` as a single commit on the configured remote branch.
    ///
    /// Fails before any step runs if `root` is not a directory. Otherwise the
    /// first failing step is returned, after metadata cleanup has run.
    pub async fn publish(&self, root: &Path) -> PublishResult<PublishReport> {
        if !root.is_dir() {
            return Err(PublishError::MissingOutput(root.to_path_buf()));
        }

        let start = Instant::now();
        let mut report = PublishReport::default();
        let guard = MetadataGuard::new(root);

        let outcome = self.run_steps(root, &mut report).await;
        let cleanup = guard.release().await;

        match (outcome, cleanup) {
            (Ok(()), Ok(())) => {
                report.steps.push(PublishStep::Cleanup);
                report.elapsed = start.elapsed();
                tracing::info!(
                    "Published {:?} to {} ({}) in {:?}",
                    root,
                    self.config.remote_url,
                    self.config.branch,
                    report.elapsed
                );
                Ok(report)
            }
            (Ok(()), Err(e)) => Err(e),
            (Err(e), cleanup) => {
                if let Err(cleanup_err) = cleanup {
                    tracing::warn!("Cleanup after failed publish also failed: {cleanup_err}");
                }
                tracing::error!("Publish aborted after {:?}: {e}", start.elapsed());
                Err(e)
            }
        }
    }

    async fn run_steps(&self, root: &Path, report: &mut PublishReport) -> PublishResult<()> {
        for step in PublishStep::SEQUENCE {
            if step == PublishStep::Cleanup {
                break;
            }
            tracing::info!("Publish step: {step}");
            match step.git_args(&self.config) {
                Some(args) => self.runner.run(step, &args, root).await?,
                None => remove_metadata(root, step).await?,
            }
            report.steps.push(step);
        }
        Ok(())
    }
}

/// Removes repository metadata from `root`. Missing metadata is not an error.
pub async fn remove_metadata(root: &Path, step: PublishStep) -> PublishResult<()> {
    let path = root.join(METADATA_DIR);
    let result = match tokio::fs::symlink_metadata(&path).await {
        Ok(meta) if meta.is_dir() => tokio::fs::remove_dir_all(&path).await,
        Ok(_) => tokio::fs::remove_file(&path).await,
        Err(e) => Err(e),
    };
    match result {
        Ok(()) => {
            tracing::debug!("Removed {:?}", path);
            Ok(())
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(source) => Err(PublishError::Io { step, source }),
    }
}

/// Ensures metadata is removed even if the publish future is dropped midway.
struct MetadataGuard {
    root: PathBuf,
    released: bool,
}

impl MetadataGuard {
    fn new(root: &Path) -> Self {
        Self {
            root: root.to_path_buf(),
            released: false,
        }
    }

    async fn release(mut self) -> PublishResult<()> {
        self.released = true;
        remove_metadata(&self.root, PublishStep::Cleanup).await
    }
}

impl Drop for MetadataGuard {
    fn drop(&mut self) {
        if !self.released {
            let _ = std::fs::remove_dir_all(self.root.join(METADATA_DIR));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::Mutex;

    /// Records invoked steps; `init` creates a metadata dir like git would.
    struct RecordingRunner {
        steps: Mutex<Vec<PublishStep>>,
        fail_at: Option<PublishStep>,
    }

    impl RecordingRunner {
        fn new(fail_at: Option<PublishStep>) -> Arc<Self> {
            Arc::new(Self {
                steps: Mutex::new(Vec::new()),
                fail_at,
            })
        }

        fn steps(&self) -> Vec<PublishStep> {
            self.steps.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl CommandRunner for RecordingRunner {
        async fn run(&self, step: PublishStep, _args: &[String], cwd: &Path) -> PublishResult<()> {
            self.steps.lock().unwrap().push(step);
            if self.fail_at == Some(step) {
                return Err(PublishError::Step {
                    step,
                    message: "exit status 128".to_string(),
                });
            }
            if step == PublishStep::Init {
                assert!(!cwd.join(".git").exists(), "stale metadata survived");
                std::fs::create_dir_all(cwd.join(".git/objects")).unwrap();
            }
            Ok(())
        }
    }

    fn site_root() -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("index.html"), "<html></html>").unwrap();
        dir
    }

    #[tokio::test]
    async fn test_full_sequence_in_order() {
        let dir = site_root();
        std::fs::create_dir_all(dir.path().join(".git/refs")).unwrap();
        let runner = RecordingRunner::new(None);
        let publisher = PublishRunner::new(PublishConfig::default(), runner.clone());

        let report = publisher.publish(dir.path()).await.unwrap();

        assert_eq!(report.steps, PublishStep::SEQUENCE.to_vec());
        assert_eq!(
            runner.steps(),
            vec![
                PublishStep::Init,
                PublishStep::ConfigureName,
                PublishStep::ConfigureEmail,
                PublishStep::StageAll,
                PublishStep::Commit,
                PublishStep::AddRemote,
                PublishStep::Push,
            ]
        );
        assert!(!dir.path().join(".git").exists());
        assert!(dir.path().join("index.html").exists());
    }

    #[tokio::test]
    async fn test_stage_failure_stops_commit_and_push() {
        let dir = site_root();
        let runner = RecordingRunner::new(Some(PublishStep::StageAll));
        let publisher = PublishRunner::new(PublishConfig::default(), runner.clone());

        let err = publisher.publish(dir.path()).await.unwrap_err();

        assert!(matches!(
            err,
            PublishError::Step {
                step: PublishStep::StageAll,
                ..
            }
        ));
        let steps = runner.steps();
        assert!(!steps.contains(&PublishStep::Commit));
        assert!(!steps.contains(&PublishStep::Push));
        assert!(!dir.path().join(".git").exists());
    }

    #[tokio::test]
    async fn test_missing_output_runs_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let runner = RecordingRunner::new(None);
        let publisher = PublishRunner::new(PublishConfig::default(), runner.clone());

        let err = publisher.publish(&dir.path().join("tmp")).await.unwrap_err();

        assert!(matches!(err, PublishError::MissingOutput(_)));
        assert!(runner.steps().is_empty());
    }

    #[tokio::test]
    async fn test_remove_metadata_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join(".git/objects")).unwrap();

        remove_metadata(dir.path(), PublishStep::RemoveMetadata)
            .await
            .unwrap();
        remove_metadata(dir.path(), PublishStep::Cleanup)
            .await
            .unwrap();
        assert!(!dir.path().join(".git").exists());
    }

    #[test]
    fn test_git_args() {
        let config = PublishConfig {
            branch: "gh-pages".to_string(),
            commit_message: "Site".to_string(),
            ..Default::default()
        };
        assert_eq!(PublishStep::Init.git_args(&config).unwrap(), vec!["init"]);
        assert_eq!(
            PublishStep::Commit.git_args(&config).unwrap(),
            vec!["commit", "-m", "Site"]
        );
        assert_eq!(
            PublishStep::Push.git_args(&config).unwrap(),
            vec!["push", "--force", "origin", "HEAD:gh-pages"]
        );
        assert_eq!(
            PublishStep::AddRemote.git_args(&config).unwrap()[3],
            config.remote_url
        );
        assert!(PublishStep::Cleanup.git_args(&config).is_none());
        assert_eq!(PublishStep::StageAll.to_string(), "stage-all");
    }

    fn git_available() -> bool {
        std::process::Command::new("git")
            .arg("--version")
            .output()
            .map(|o| o.status.success())
            .unwrap_or(false)
    }

    #[tokio::test]
    async fn test_publish_to_local_bare_remote() {
        if !git_available() {
            return;
        }
        let remote_dir = tempfile::tempdir().unwrap();
        let remote = remote_dir.path().join("site.git");
        let status = std::process::Command::new("git")
            .args(["init", "--bare", "-q"])
            .arg(&remote)
            .status()
            .unwrap();
        assert!(status.success());

        let dir = site_root();
        let config = PublishConfig {
            remote_url: remote.to_string_lossy().into_owned(),
            branch: "master".to_string(),
            commit_message: "Publish test".to_string(),
            ..Default::default()
        };
        let report = PublishRunner::with_git(config)
            .publish(dir.path())
            .await
            .unwrap();
        assert_eq!(report.steps.last(), Some(&PublishStep::Cleanup));
        assert!(!dir.path().join(".git").exists());

        let log = std::process::Command::new("git")
            .arg("--git-dir")
            .arg(&remote)
            .args(["log", "--format=%s", "master"])
            .output()
            .unwrap();
        assert_eq!(String::from_utf8_lossy(&log.stdout).trim(), "Publish test");
    }
}
