//! Exposure Core - build and publish pipeline for a static photo site.
//!
//! Exposure takes a directory of JPEG photographs, downscales them for the
//! web, tags each with a copyright notice, copies a static site around them,
//! and publishes the result to a git remote.
//!
//! # Architecture
//!
//! Each photograph is processed in its own worker process so that at most a
//! few decoded bitmaps are alive at once:
//!
//! ```text
//! Discover → Dispatch (≤ 4 workers) → Decode → Resize → Encode (q85) → Embed © → Write
//! ```
//!
//! # Usage
//!
//! ```rust,ignore
//! use exposure_core::{Config, DispatchOptions, Dispatcher, FileDiscovery, ProcessWorker};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> exposure_core::Result<()> {
//!     let config = Config::load()?;
//!     let files = FileDiscovery::new(config.processing.clone()).discover(&config.images_dir());
//!
//!     let worker = Arc::new(ProcessWorker::new("exposure"));
//!     let dispatcher = Dispatcher::new(worker, DispatchOptions::from(&config.processing));
//!     let result = dispatcher.dispatch(&files, &config.images_output_dir()).await?;
//!     std::process::exit(result.exit_code().into());
//! }
//! ```

pub mod config;
pub mod error;
pub mod pipeline;
pub mod publish;
pub mod site;
pub mod types;

pub use config::Config;
pub use error::{
    ConfigError, ExposureError, PipelineError, PipelineResult, PublishError, PublishResult, Result,
};
pub use pipeline::{
    AssetProcessor, AssetWorker, DispatchOptions, Dispatcher, FileDiscovery, JobDescriptor,
    ProcessWorker,
};
pub use publish::{PublishReport, PublishRunner, PublishStep};
pub use types::{AssetOutcome, AssetReport, AssetStatus, BuildResult};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
