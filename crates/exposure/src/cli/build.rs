//! The `clean`, `build-files`, `build-images` and `build` commands.

use clap::Args;
use exposure_core::pipeline::{DispatchOptions, Dispatcher, FileDiscovery, ProcessWorker};
use exposure_core::types::{AssetStatus, BuildResult};
use exposure_core::{site, Config};

use super::GlobalOpts;
use std::process::ExitCode;
use std::sync::Arc;

/// Arguments for the image build.
#[derive(Args, Debug, Clone, Default)]
pub struct ImageArgs {
    /// Number of concurrent workers (overrides config)
    #[arg(short, long)]
    pub parallel: Option<usize>,

    /// Stop launching new workers after the first failure
    #[arg(long)]
    pub stop_on_failure: bool,
}

/// Remove the output directory.
pub async fn clean(config: &Config) -> anyhow::Result<ExitCode> {
    site::clean(&config.output_dir()).await?;
    Ok(ExitCode::SUCCESS)
}

/// Copy the static site into the output root.
pub async fn build_files(config: &Config) -> anyhow::Result<ExitCode> {
    site::copy_static(&config.static_dir(), &config.output_dir()).await?;
    Ok(ExitCode::SUCCESS)
}

/// Clean, copy static files, then process images.
pub async fn build(
    config: &Config,
    global: &GlobalOpts,
    args: ImageArgs,
) -> anyhow::Result<ExitCode> {
    clean(config).await?;
    build_files(config).await?;
    build_images(config, global, args).await
}

/// Process every source photograph through isolated workers.
pub async fn build_images(
    config: &Config,
    global: &GlobalOpts,
    args: ImageArgs,
) -> anyhow::Result<ExitCode> {
    let images_dir = config.images_dir();
    if !images_dir.is_dir() {
        tracing::warn!("Images directory not found: {:?}", images_dir);
    }

    let files = FileDiscovery::new(config.processing.clone()).discover(&images_dir);
    if files.is_empty() {
        tracing::warn!("No images found in {:?}", images_dir);
    } else {
        tracing::info!(
            "Found {} images ({:.1} MB) in {:?}",
            files.len(),
            FileDiscovery::total_size(&files) as f64 / 1_000_000.0,
            images_dir
        );
    }

    let mut options = DispatchOptions::from(&config.processing);
    if let Some(parallel) = args.parallel {
        options.parallel = parallel.max(1);
    }
    options.stop_on_failure |= args.stop_on_failure;

    let worker = global
        .worker_args()
        .into_iter()
        .fold(ProcessWorker::current_exe()?, |worker, arg| worker.leading_arg(arg));
    let dispatcher = Dispatcher::new(Arc::new(worker), options);

    let progress = create_progress_bar(files.len() as u64);
    let pb = progress.clone();
    let result = dispatcher
        .dispatch_with_progress(&files, &config.images_output_dir(), move |outcome| {
            pb.inc(1);
            pb.set_message(outcome.name.clone());
        })
        .await?;
    progress.finish_and_clear();

    print_summary(&result);

    if let Some(err) = result.representative_error() {
        tracing::error!("Build failed: {err}");
    } else if result.degraded() > 0 {
        tracing::error!(
            "{} image(s) were written without the copyright tag",
            result.degraded()
        );
    }

    Ok(ExitCode::from(result.exit_code()))
}

fn create_progress_bar(total: u64) -> indicatif::ProgressBar {
    use indicatif::{ProgressBar, ProgressStyle};

    let pb = ProgressBar::new(total);
    if let Ok(style) = ProgressStyle::default_bar().template(
        "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({percent}%) {msg}",
    ) {
        pb.set_style(style.progress_chars("##-"));
    }
    pb.set_message("starting...");
    pb
}

fn print_summary(result: &BuildResult) {
    let secs = result.elapsed.as_secs_f64();
    let rate = if secs > 0.0 {
        result.total() as f64 / secs
    } else {
        0.0
    };
    let before_mb = result.bytes_before() as f64 / 1_000_000.0;
    let after_mb = result.bytes_after() as f64 / 1_000_000.0;

    eprintln!();
    eprintln!("  ====================================");
    eprintln!("               Summary");
    eprintln!("  ====================================");
    eprintln!("    Optimized:    {:>8}", result.optimized());
    if result.degraded() > 0 {
        eprintln!("    Untagged:     {:>8}", result.degraded());
    }
    if result.failed() > 0 {
        eprintln!("    Failed:       {:>8}", result.failed());
    }
    if result.skipped() > 0 {
        eprintln!("    Skipped:      {:>8}", result.skipped());
    }
    eprintln!("  ------------------------------------");
    eprintln!("    Total:        {:>8}", result.total());
    eprintln!("    Size:         {:>7.1} -> {:.1} MB", before_mb, after_mb);
    eprintln!("    Duration:     {:>7.1}s", secs);
    eprintln!("    Rate:         {:>7.1} img/sec", rate);
    eprintln!("  ====================================");

    for outcome in &result.outcomes {
        if let AssetStatus::Failed { message } = &outcome.status {
            eprintln!("    ✗ {}: {}", outcome.name, message);
        }
    }
}
