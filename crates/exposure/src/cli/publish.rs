//! The `publish` command.

use exposure_core::{Config, PublishRunner};
use std::process::ExitCode;

/// Publish the output root to the configured remote branch.
pub async fn execute(config: &Config) -> anyhow::Result<ExitCode> {
    let root = config.output_dir();
    tracing::info!(
        "Publishing {:?} to {} ({})",
        root,
        config.publish.remote_url,
        config.publish.branch
    );

    let report = PublishRunner::with_git(config.publish.clone())
        .publish(&root)
        .await?;

    println!(
        "Published {} to {} in {:.1}s ({} steps)",
        root.display(),
        config.publish.branch,
        report.elapsed.as_secs_f64(),
        report.steps.len()
    );
    Ok(ExitCode::SUCCESS)
}
