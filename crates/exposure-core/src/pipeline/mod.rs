//! Image pipeline components.
//!
//! - **discovery**: Find source photographs
//! - **validate**: Pre-decode checks (size, JPEG magic bytes)
//! - **decode**: JPEG decoding with dimension limits
//! - **transform**: Resize policy and quality-85 re-encoding
//! - **copyright**: Copyright tag embedding
//! - **processor**: The per-asset pipeline a worker runs
//! - **job**: Job descriptors and the worker exit-code protocol
//! - **worker**: Isolated (subprocess) execution of one job
//! - **dispatch**: Bounded-parallel dispatch over all jobs

pub mod copyright;
pub mod decode;
pub mod discovery;
pub mod dispatch;
pub mod job;
pub mod processor;
pub mod transform;
pub mod validate;
pub mod worker;

// Re-exports for convenient access
pub use copyright::{copyright_of, CopyrightEmbedder, EmbedOutcome};
pub use decode::{DecodedImage, ImageDecoder};
pub use discovery::{DiscoveredFile, FileDiscovery};
pub use dispatch::{DispatchOptions, Dispatcher};
pub use job::{JobDescriptor, EXIT_DEGRADED, EXIT_FAILED, EXIT_OPTIMIZED};
pub use processor::{AssetProcessor, ProcessedAsset};
pub use transform::{target_dimensions, ImageTransformer, JPEG_QUALITY, TARGET_SIZE};
pub use validate::Validator;
pub use worker::{AssetWorker, ProcessWorker, WorkerExit, WORKER_SUBCOMMAND};
