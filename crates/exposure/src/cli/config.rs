//! The `exposure config` command for configuration management.

use clap::{Args, Subcommand};
use exposure_core::config::CONFIG_FILE_NAME;
use exposure_core::Config;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

/// Arguments for the `config` command.
#[derive(Args, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

/// Subcommands for configuration management.
#[derive(Subcommand, Debug)]
pub enum ConfigCommand {
    /// Display the effective configuration
    Show,

    /// Show the config file path in use
    Path,

    /// Initialize a new config file with defaults
    Init {
        /// Overwrite existing config file
        #[arg(long)]
        force: bool,

        /// Write ./exposure.toml instead of the per-user config
        #[arg(long)]
        local: bool,
    },
}

/// Execute the config command.
pub async fn execute(
    config: &Config,
    config_path: Option<&Path>,
    args: ConfigArgs,
) -> anyhow::Result<ExitCode> {
    match args.command {
        ConfigCommand::Show => {
            println!("{}", config.to_toml()?);
        }

        ConfigCommand::Path => {
            let path = config_path
                .map(Path::to_path_buf)
                .or_else(Config::resolve_path)
                .unwrap_or_else(Config::default_path);
            println!("{}", path.display());
        }

        ConfigCommand::Init { force, local } => {
            let path = if local {
                PathBuf::from(CONFIG_FILE_NAME)
            } else {
                Config::default_path()
            };

            if path.exists() && !force {
                anyhow::bail!(
                    "Config file already exists at: {}\nUse --force to overwrite.",
                    path.display()
                );
            }

            if let Some(parent) = path.parent() {
                if !parent.as_os_str().is_empty() {
                    std::fs::create_dir_all(parent)?;
                }
            }

            std::fs::write(&path, Config::default().to_toml()?)?;

            tracing::info!("Config file created at: {}", path.display());
            println!("Configuration initialized at: {}", path.display());
        }
    }

    Ok(ExitCode::SUCCESS)
}
