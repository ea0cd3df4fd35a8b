//! Bounded-parallel dispatch of jobs to isolated workers.
//!
//! One tokio task per launched job, gated by a semaphore so no more than
//! `parallel` workers exist at once. Every launched worker is awaited even
//! after a failure has been seen; nothing is cancelled.

use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::{mpsc, Semaphore};

use crate::config::ProcessingConfig;
use crate::error::{PipelineError, PipelineResult};
use crate::types::{AssetOutcome, AssetStatus, BuildResult};

use super::discovery::DiscoveredFile;
use super::job::JobDescriptor;
use super::worker::AssetWorker;

/// Dispatch behavior.
#[derive(Debug, Clone)]
pub struct DispatchOptions {
    /// Maximum concurrently running workers
    pub parallel: usize,
    /// Stop launching new jobs after the first failure
    pub stop_on_failure: bool,
}

impl Default for DispatchOptions {
    fn default() -> Self {
        Self {
            parallel: 4,
            stop_on_failure: false,
        }
    }
}

impl From<&ProcessingConfig> for DispatchOptions {
    fn from(config: &ProcessingConfig) -> Self {
        Self {
            parallel: config.parallel_workers,
            stop_on_failure: config.stop_on_failure,
        }
    }
}

/// Runs discovered files through workers with bounded concurrency.
pub struct Dispatcher {
    worker: Arc<dyn AssetWorker>,
    options: DispatchOptions,
}

impl Dispatcher {
    pub fn new(worker: Arc<dyn AssetWorker>, options: DispatchOptions) -> Self {
        Self { worker, options }
    }

    /// Process every file into `output_dir`.
    pub async fn dispatch(
        &self,
        files: &[DiscoveredFile],
        output_dir: &Path,
    ) -> PipelineResult<BuildResult> {
        self.dispatch_with_progress(files, output_dir, |_| {}).await
    }

    /// Process every file into `output_dir`, calling `on_result` as each
    /// worker finishes.
    ///
    /// Only fails if the output directory cannot be created. Per-asset
    /// failures are collected in the returned [`BuildResult`].
    pub async fn dispatch_with_progress<F>(
        &self,
        files: &[DiscoveredFile],
        output_dir: &Path,
        on_result: F,
    ) -> PipelineResult<BuildResult>
    where
        F: Fn(&AssetOutcome) + Send + Sync + 'static,
    {
        let start = Instant::now();
        tokio::fs::create_dir_all(output_dir)
            .await
            .map_err(|source| PipelineError::Io {
                path: output_dir.to_path_buf(),
                source,
            })?;

        let semaphore = Arc::new(Semaphore::new(self.options.parallel.max(1)));
        let saw_failure = Arc::new(AtomicBool::new(false));
        let on_result = Arc::new(on_result);
        let (tx, mut rx) = mpsc::unbounded_channel::<AssetOutcome>();

        let mut result = BuildResult::default();
        let mut handles = Vec::with_capacity(files.len());

        for file in files {
            let Ok(permit) = semaphore.clone().acquire_owned().await else {
                tracing::warn!("Dispatch semaphore closed unexpectedly, stopping batch");
                break;
            };

            if self.options.stop_on_failure && saw_failure.load(Ordering::SeqCst) {
                drop(permit);
                result.push(AssetOutcome {
                    name: file.name.clone(),
                    input: file.path.clone(),
                    status: AssetStatus::Skipped,
                    report: None,
                    elapsed: std::time::Duration::ZERO,
                });
                continue;
            }

            let job = JobDescriptor::for_file(file, output_dir);
            let worker = self.worker.clone();
            let saw_failure = saw_failure.clone();
            let on_result = on_result.clone();
            let tx = tx.clone();

            let handle = tokio::spawn(async move {
                let launched = Instant::now();
                let exit = worker.run(&job).await;
                let outcome = AssetOutcome {
                    name: job.name,
                    input: job.input,
                    status: exit.status,
                    report: exit.report,
                    elapsed: launched.elapsed(),
                };

                match &outcome.status {
                    AssetStatus::Failed { message } => {
                        tracing::error!(
                            "{}: failed after {:?}: {}",
                            outcome.name,
                            outcome.elapsed,
                            message
                        );
                        saw_failure.store(true, Ordering::SeqCst);
                    }
                    AssetStatus::Degraded => {
                        tracing::warn!(
                            "{}: written without copyright after {:?}",
                            outcome.name,
                            outcome.elapsed
                        );
                    }
                    _ => tracing::debug!("{}: done in {:?}", outcome.name, outcome.elapsed),
                }

                drop(permit); // Free the slot before reporting
                on_result(&outcome);
                let _ = tx.send(outcome);
            });
            handles.push((file, handle));
        }
        drop(tx);

        if result.skipped() > 0 {
            tracing::warn!(
                "Stopped launching after a failure; {} image(s) skipped",
                result.skipped()
            );
        }

        // Drain: wait for every launched worker.
        let mut panicked = Vec::new();
        for (file, handle) in handles {
            if let Err(e) = handle.await {
                tracing::error!("{}: worker task panicked: {e}", file.name);
                panicked.push(AssetOutcome {
                    name: file.name.clone(),
                    input: file.path.clone(),
                    status: AssetStatus::Failed {
                        message: format!("worker task panicked: {e}"),
                    },
                    report: None,
                    elapsed: start.elapsed(),
                });
            }
        }

        while let Some(outcome) = rx.recv().await {
            result.push(outcome);
        }
        for outcome in panicked {
            result.push(outcome);
        }

        result.elapsed = start.elapsed();
        Ok(result)
    }
}
