//! Concurrent batch file-processing engine
//!
//! This module owns everything between "here is an input spec" and "here is
//! the batch result": path resolution, chunk scheduling, dispatch strategy,
//! sequential and parallel execution, per-file failure conversion, and
//! progress/state accounting.
//!
//! ## What this module does:
//! - **Path resolution**: expands path lists, directories, and glob
//!   patterns into a deduplicated, ordered file list
//! - **Chunk scheduling**: splits the list into chunks bounded by
//!   `max_batch_size`, each dispatched as one unit
//! - **Dispatch strategy**: per chunk, sequential on the calling thread or
//!   a bounded crossbeam worker pool, decided once by `max_threads`
//! - **Failure containment**: every per-file error becomes a failure
//!   result inside the batch; nothing escapes `process_batch`
//! - **Single-flight + cancellation**: one run at a time per processor,
//!   with a polled cancellation flag that never kills in-flight work
//!
//! ## What this module does NOT do:
//! - **File conversion**: content work belongs to the injected
//!   [`ProcessingPipeline`](crate::pipeline::ProcessingPipeline)
//! - **Admission policy**: resource judgment belongs to the injected
//!   [`ResourceMonitor`](crate::pipeline::ResourceMonitor)
//! - **Persistence or reporting**: results are returned to the caller and
//!   forgotten
//!
//! ## Ordering contract
//!
//! Sequential chunks yield results in input order. Parallel chunks yield
//! results in completion order; correlate through
//! `ProcessingResult.file_path`, never by position.

pub mod chunk;
pub mod parallel;
pub mod processor;
pub mod resolver;
pub mod strategy;
pub mod types;

pub use processor::{BatchProcessor, MAX_THREAD_OVERSUBSCRIPTION};
pub use resolver::InputSpec;
pub use strategy::ExecutionStrategy;
pub use types::{BatchResult, BatchSummary, ProcessingResult, ProcessingStatus, ProcessorState};
