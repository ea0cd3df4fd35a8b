//! Exposure CLI - build and publish a static photography site.
//!
//! Exposure downscales a directory of JPEG photographs for the web, tags each
//! with a copyright notice, copies the static pages around them, and
//! force-pushes the result to a git remote.
//!
//! # Usage
//!
//! ```bash
//! # Rebuild the whole site into ./tmp
//! exposure build
//!
//! # Only re-process the photographs
//! exposure build-images --parallel 2
//!
//! # Push ./tmp as a single fresh commit
//! exposure publish
//!
//! # View configuration
//! exposure config show
//! ```

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;

mod cli;
mod logging;

/// Exposure - build and publish a static photography site.
#[derive(Parser, Debug)]
#[command(name = "exposure")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Enable verbose (debug) logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Output logs in JSON format
    #[arg(long, global = true)]
    json_logs: bool,

    /// Config file to use instead of the default lookup
    #[arg(short, long, global = true, env = "EXPOSURE_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

/// Available commands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Remove the output directory
    Clean,

    /// Copy the static site into the output directory
    BuildFiles,

    /// Resize and copyright-tag every photograph
    BuildImages(cli::build::ImageArgs),

    /// Clean, then build files, then build images
    Build(cli::build::ImageArgs),

    /// Force-push the output directory to the configured remote
    Publish,

    /// View and manage configuration
    Config(cli::config::ConfigArgs),

    /// Process a single photograph (used internally by build-images)
    #[command(hide = true)]
    Worker(cli::worker::WorkerArgs),
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();

    // Logging isn't initialized yet, so use eprintln for config warnings.
    let config = match &cli.config {
        Some(path) => exposure_core::Config::load_from(path).map_err(|e| {
            anyhow::anyhow!("Failed to load config from {}: {e}", path.display())
        })?,
        None => match exposure_core::Config::load() {
            Ok(config) => config,
            Err(e) => {
                eprintln!(
                    "Warning: Failed to load config: {e}\n  \
                     Using default configuration. Check your config file with `exposure config path`."
                );
                exposure_core::Config::default()
            }
        },
    };
    logging::init_from_config(&config, cli.verbose, cli.json_logs);

    tracing::debug!("Exposure v{}", exposure_core::VERSION);

    let global = cli::GlobalOpts {
        config: cli.config,
        verbose: cli.verbose,
        json_logs: cli.json_logs,
    };
    match cli.command {
        Commands::Clean => cli::build::clean(&config).await,
        Commands::BuildFiles => cli::build::build_files(&config).await,
        Commands::BuildImages(args) => cli::build::build_images(&config, &global, args).await,
        Commands::Build(args) => cli::build::build(&config, &global, args).await,
        Commands::Publish => cli::publish::execute(&config).await,
        Commands::Config(args) => {
            cli::config::execute(&config, global.config.as_deref(), args).await
        }
        Commands::Worker(args) => cli::worker::execute(&config, args).await,
    }
}
