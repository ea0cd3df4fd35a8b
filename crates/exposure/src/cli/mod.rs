//! Command handlers.

use std::ffi::OsString;
use std::path::PathBuf;

pub mod build;
pub mod config;
pub mod publish;
pub mod worker;

/// Global flags that worker processes must see as well.
#[derive(Debug, Clone, Default)]
pub struct GlobalOpts {
    pub config: Option<PathBuf>,
    pub verbose: bool,
    pub json_logs: bool,
}

impl GlobalOpts {
    /// Flags to place before the worker subcommand.
    pub fn worker_args(&self) -> Vec<OsString> {
        let mut args = Vec::new();
        if let Some(path) = &self.config {
            args.push(OsString::from("--config"));
            args.push(path.clone().into_os_string());
        }
        if self.verbose {
            args.push(OsString::from("--verbose"));
        }
        if self.json_logs {
            args.push(OsString::from("--json-logs"));
        }
        args
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_worker_args_empty_by_default() {
        assert!(GlobalOpts::default().worker_args().is_empty());
    }

    #[test]
    fn test_worker_args_forward_every_global_flag() {
        let opts = GlobalOpts {
            config: Some(PathBuf::from("site.toml")),
            verbose: true,
            json_logs: true,
        };
        assert_eq!(
            opts.worker_args(),
            vec!["--config", "site.toml", "--verbose", "--json-logs"]
        );
    }

    #[test]
    fn test_worker_args_log_flags_without_config() {
        let opts = GlobalOpts {
            json_logs: true,
            ..GlobalOpts::default()
        };
        assert_eq!(opts.worker_args(), vec!["--json-logs"]);
    }
}
