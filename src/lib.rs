//! # Filebatch - Concurrent Batch File Processing
//!
//! A batch engine that drives sets of input files through an externally
//! supplied processing pipeline. It expands path lists, directories, and
//! glob patterns into concrete work items, dispatches each chunk of work
//! sequentially or across a bounded worker pool, throttles admission
//! against live resource pressure, and survives per-file failures without
//! losing completed work.
//!
//! ## Features
//!
//! - **Resource-aware**: files are admitted through a `ResourceMonitor`
//!   before the pipeline ever sees them
//! - **Bounded parallelism**: per-chunk worker pools capped at a validated
//!   thread limit, never oversubscribing the machine
//! - **Cooperative cancellation**: a polled flag stops work at defined
//!   checkpoints without killing in-flight files
//! - **Partial-failure tolerant**: every per-file error becomes a failure
//!   result inside the batch, never a panic or an early return
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::path::Path;
//! use std::sync::Arc;
//! use filebatch::{BatchProcessor, InputSpec, ProcessOptions, ProcessingPipeline, ProcessingResult};
//!
//! struct MyPipeline;
//!
//! impl ProcessingPipeline for MyPipeline {
//!     fn process_file(
//!         &self,
//!         input: &Path,
//!         output: Option<&Path>,
//!         _options: &ProcessOptions,
//!     ) -> anyhow::Result<ProcessingResult> {
//!         Ok(ProcessingResult::ok(input, output))
//!     }
//! }
//!
//! let processor = BatchProcessor::with_defaults(Arc::new(MyPipeline));
//! let batch = processor.process_batch(
//!     InputSpec::from(vec!["docs/*.md".to_string()]),
//!     None,
//!     None,
//!     None,
//! );
//! println!("{} ok, {} failed", batch.succeeded(), batch.failed());
//! ```

pub mod batch;
pub mod pipeline;
pub mod shared;

pub use batch::{
    BatchProcessor, BatchResult, BatchSummary, ExecutionStrategy, InputSpec,
    MAX_THREAD_OVERSUBSCRIPTION, ProcessingResult, ProcessingStatus,
};
pub use pipeline::{
    AlwaysAvailable, ErrorContext, ErrorMonitor, FileNameOutputResolver, LoggingErrorMonitor,
    OutputPathResolver, ProcessOptions, ProcessingPipeline, ProgressFn, ResourceAvailability,
    ResourceMonitor,
};

/// Result type alias for filebatch operations
pub type Result<T> = anyhow::Result<T>;

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const PKG_NAME: &str = env!("CARGO_PKG_NAME");
