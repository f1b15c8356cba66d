//! Batch orchestration core
//!
//! `BatchProcessor` owns configuration, the single-flight state guard, the
//! cancellation flag, and progress accounting. It resolves the input spec,
//! chunks the file list, dispatches each chunk sequentially or in parallel,
//! and folds every per-file outcome into one `BatchResult`. No per-file
//! error ever escapes `process_batch`.

use anyhow::{Result, bail};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Instant;

use crate::pipeline::{
    AlwaysAvailable, ErrorContext, ErrorMonitor, FileNameOutputResolver, LoggingErrorMonitor,
    OutputPathResolver, ProcessOptions, ProcessingPipeline, ProgressFn, ResourceMonitor,
};

use super::chunk::chunk_files;
use super::resolver::{InputSpec, resolve_inputs};
use super::strategy::ExecutionStrategy;
use super::types::{BatchResult, BatchSummary, ProcessingResult, ProcessingStatus, ProcessorState};

/// Oversubscription factor applied to the CPU count when validating
/// `max_threads`. Tunable policy constant, nothing else derives from it.
pub const MAX_THREAD_OVERSUBSCRIPTION: usize = 2;

const DEFAULT_MAX_BATCH_SIZE: usize = 50;
const DEFAULT_MAX_THREADS: usize = 4;

#[derive(Debug, Clone)]
struct BatchConfig {
    max_batch_size: usize,
    max_threads: usize,
    continue_on_error: bool,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            max_batch_size: DEFAULT_MAX_BATCH_SIZE,
            max_threads: DEFAULT_MAX_THREADS.min(thread_cap()),
            continue_on_error: true,
        }
    }
}

fn thread_cap() -> usize {
    MAX_THREAD_OVERSUBSCRIPTION * num_cpus::get()
}

/// Outcome of one file attempt, with enough detail for the sequential
/// runner's halt decision. Resource-exhaustion skips are failures in the
/// batch but not pipeline failures, so they never halt a chunk.
pub(crate) struct FileOutcome {
    pub result: ProcessingResult,
    pub pipeline_failed: bool,
}

/// Concurrent batch file-processing engine.
///
/// One instance is reusable across runs; exactly one `process_batch` call
/// may be active at a time and concurrent attempts are rejected without
/// touching the in-flight run.
pub struct BatchProcessor {
    pipeline: Arc<dyn ProcessingPipeline>,
    resources: Arc<dyn ResourceMonitor>,
    errors: Arc<dyn ErrorMonitor>,
    output_paths: Arc<dyn OutputPathResolver>,

    config: Mutex<BatchConfig>,
    state: Mutex<ProcessorState>,
    pub(crate) cancel_requested: AtomicBool,

    pub(crate) files_completed: AtomicUsize,
    files_processing: AtomicUsize,
    pub(crate) active_threads: AtomicUsize,
    total_files: AtomicUsize,
    run_started: Mutex<Option<Instant>>,
    last_summary: Mutex<Option<BatchSummary>>,
}

impl BatchProcessor {
    pub fn new(
        pipeline: Arc<dyn ProcessingPipeline>,
        resources: Arc<dyn ResourceMonitor>,
        errors: Arc<dyn ErrorMonitor>,
        output_paths: Arc<dyn OutputPathResolver>,
    ) -> Self {
        Self {
            pipeline,
            resources,
            errors,
            output_paths,
            config: Mutex::new(BatchConfig::default()),
            state: Mutex::new(ProcessorState::Idle),
            cancel_requested: AtomicBool::new(false),
            files_completed: AtomicUsize::new(0),
            files_processing: AtomicUsize::new(0),
            active_threads: AtomicUsize::new(0),
            total_files: AtomicUsize::new(0),
            run_started: Mutex::new(None),
            last_summary: Mutex::new(None),
        }
    }

    /// Processor with stock collaborators: admission always granted,
    /// errors forwarded to tracing, outputs named after their inputs.
    pub fn with_defaults(pipeline: Arc<dyn ProcessingPipeline>) -> Self {
        Self::new(
            pipeline,
            Arc::new(AlwaysAvailable),
            Arc::new(LoggingErrorMonitor),
            Arc::new(FileNameOutputResolver),
        )
    }

    // --- configuration surface -------------------------------------------

    /// Upper bound on chunk size. Zero is rejected, never clamped.
    pub fn set_max_batch_size(&self, n: usize) -> Result<()> {
        if n == 0 {
            bail!("max_batch_size must be a positive integer, got {n}");
        }
        self.config.lock().unwrap().max_batch_size = n;
        Ok(())
    }

    /// Worker-pool width. `1` forces sequential dispatch. Values of zero or
    /// above `MAX_THREAD_OVERSUBSCRIPTION × cpu_count` are rejected, never
    /// clamped.
    pub fn set_max_threads(&self, n: usize) -> Result<()> {
        if n == 0 {
            bail!("max_threads must be a positive integer, got {n}");
        }
        let cap = thread_cap();
        if n > cap {
            bail!("max_threads must not exceed {cap} ({MAX_THREAD_OVERSUBSCRIPTION}x cpu count), got {n}");
        }
        self.config.lock().unwrap().max_threads = n;
        Ok(())
    }

    /// Whether a sequential chunk keeps going after a pipeline failure.
    pub fn set_continue_on_error(&self, value: bool) {
        self.config.lock().unwrap().continue_on_error = value;
    }

    /// Request cooperative cancellation of the current (or next) run.
    ///
    /// Safe to call while idle: the flag simply primes the next check and
    /// is cleared when that run returns.
    pub fn cancel_processing(&self) {
        self.cancel_requested.store(true, Ordering::SeqCst);
        tracing::debug!("cancellation requested");
    }

    /// Snapshot of current activity and the last finished batch.
    pub fn status(&self) -> ProcessingStatus {
        let is_processing = *self.state.lock().unwrap() == ProcessorState::Processing;
        let files_completed = self.files_completed.load(Ordering::SeqCst);
        let total_files = self.total_files.load(Ordering::SeqCst);
        let progress_percent = if total_files == 0 {
            0.0
        } else {
            files_completed as f64 / total_files as f64 * 100.0
        };
        let eta = self.run_started.lock().unwrap().and_then(|started| {
            if !is_processing || files_completed == 0 || files_completed >= total_files {
                return None;
            }
            let remaining = (total_files - files_completed) as f64 / files_completed as f64;
            Some(started.elapsed().mul_f64(remaining))
        });
        ProcessingStatus {
            is_processing,
            active_threads: self.active_threads.load(Ordering::SeqCst),
            files_processing: self.files_processing.load(Ordering::SeqCst),
            files_completed,
            total_files,
            progress_percent,
            cancellation_requested: self.cancel_requested.load(Ordering::SeqCst),
            eta,
            last_batch_summary: self.last_summary.lock().unwrap().clone(),
        }
    }

    // --- orchestration ---------------------------------------------------

    /// Run one batch: resolve the input spec, chunk it, dispatch each chunk
    /// sequentially or across a worker pool, and aggregate every per-file
    /// result.
    ///
    /// Returns immediately with a rejection result if a batch is already in
    /// flight. Input-resolution failures become a fatal result rather than
    /// an error. The cancellation flag is always cleared and the processor
    /// returned to idle before this returns, whatever path was taken.
    pub fn process_batch(
        &self,
        spec: impl Into<InputSpec>,
        output_dir: Option<&Path>,
        options: Option<&ProcessOptions>,
        progress: Option<&ProgressFn>,
    ) -> BatchResult {
        {
            let mut state = self.state.lock().unwrap();
            if *state == ProcessorState::Processing {
                tracing::warn!("process_batch rejected: already processing a batch");
                return BatchResult::fatal("already processing a batch");
            }
            *state = ProcessorState::Processing;
        }
        let started = Instant::now();
        *self.run_started.lock().unwrap() = Some(started);
        let _guard = RunGuard { processor: self };

        let default_options = ProcessOptions::new();
        let options = options.unwrap_or(&default_options);
        let batch = self.run_batch(&spec.into(), output_dir, options, progress);

        *self.last_summary.lock().unwrap() = Some(BatchSummary {
            total: batch.results.len(),
            succeeded: batch.succeeded(),
            failed: batch.failed(),
            duration: started.elapsed(),
        });
        batch
    }

    fn run_batch(
        &self,
        spec: &InputSpec,
        output_dir: Option<&Path>,
        options: &ProcessOptions,
        progress: Option<&ProgressFn>,
    ) -> BatchResult {
        self.files_completed.store(0, Ordering::SeqCst);
        self.total_files.store(0, Ordering::SeqCst);

        let files = match resolve_inputs(spec) {
            Ok(files) => files,
            Err(e) => {
                tracing::warn!("input resolution failed: {e:#}");
                return BatchResult::fatal(format!("input resolution failed: {e:#}"));
            }
        };

        let mut batch = BatchResult::new();
        if files.is_empty() {
            tracing::debug!("input spec resolved to no files");
            return batch;
        }

        let total = files.len();
        self.total_files.store(total, Ordering::SeqCst);

        let (max_batch_size, max_threads, continue_on_error) = {
            let config = self.config.lock().unwrap();
            (config.max_batch_size, config.max_threads, config.continue_on_error)
        };

        let chunks = chunk_files(files, max_batch_size);
        tracing::debug!(total, chunks = chunks.len(), max_threads, "dispatching batch");

        for chunk in chunks {
            if self.cancel_requested.load(Ordering::SeqCst) {
                tracing::info!("cancellation requested, stopping before next chunk");
                break;
            }
            let results = match ExecutionStrategy::for_chunk(max_threads, chunk.len()) {
                ExecutionStrategy::Sequential => self.run_sequential(
                    &chunk,
                    output_dir,
                    options,
                    progress,
                    total,
                    continue_on_error,
                ),
                ExecutionStrategy::Parallel { workers } => {
                    self.run_parallel(chunk, workers, output_dir, options, progress, total)
                }
            };
            batch.extend(results);
        }
        batch
    }

    /// Process one chunk strictly in order on the calling thread.
    ///
    /// A pipeline failure halts the remainder of the chunk when
    /// `continue_on_error` is off; earlier results are kept.
    fn run_sequential(
        &self,
        chunk: &[PathBuf],
        output_dir: Option<&Path>,
        options: &ProcessOptions,
        progress: Option<&ProgressFn>,
        total_files: usize,
        continue_on_error: bool,
    ) -> Vec<ProcessingResult> {
        let mut results = Vec::with_capacity(chunk.len());
        self.active_threads.store(1, Ordering::SeqCst);

        for file_path in chunk {
            if self.cancel_requested.load(Ordering::SeqCst) {
                tracing::info!("cancellation requested, stopping sequential chunk");
                break;
            }
            let outcome = self.process_one(file_path, output_dir, options);
            let halt = outcome.pipeline_failed && !continue_on_error;

            let current = self.files_completed.fetch_add(1, Ordering::SeqCst) + 1;
            self.report_progress(progress, current, total_files, file_path);
            results.push(outcome.result);

            if halt {
                tracing::debug!(
                    file = %file_path.display(),
                    "halting remainder of chunk after failure"
                );
                break;
            }
        }

        self.active_threads.store(0, Ordering::SeqCst);
        results
    }

    /// Resource-check, resolve the output path, then invoke the pipeline
    /// for one file. Every failure mode ends up as a failure result; this
    /// never returns an error and never panics on collaborator errors.
    pub(crate) fn process_one(
        &self,
        input: &Path,
        output_dir: Option<&Path>,
        options: &ProcessOptions,
    ) -> FileOutcome {
        match self.resources.check() {
            Ok(availability) if !availability.available => {
                let reason = availability
                    .reason
                    .unwrap_or_else(|| "system resources unavailable".to_string());
                tracing::warn!(file = %input.display(), "skipping file: {reason}");
                return FileOutcome {
                    result: ProcessingResult::failure(input, None, reason),
                    pipeline_failed: false,
                };
            }
            Ok(_) => {}
            Err(e) => {
                // Degraded mode: a broken monitor must not stall the batch.
                self.errors
                    .handle_error(&e, &ErrorContext::for_file(input, None, "resource_check"));
            }
        }

        let output_path = match output_dir {
            Some(dir) => match self.output_paths.resolve(input, dir, options) {
                Ok(path) => Some(path),
                Err(e) => {
                    self.errors.handle_error(
                        &e,
                        &ErrorContext::for_file(input, None, "resolve_output_path"),
                    );
                    return FileOutcome {
                        result: ProcessingResult::failure(
                            input,
                            None,
                            format!("output path resolution failed: {e:#}"),
                        ),
                        pipeline_failed: true,
                    };
                }
            },
            None => None,
        };

        self.files_processing.fetch_add(1, Ordering::SeqCst);
        let outcome = match self.pipeline.process_file(input, output_path.as_deref(), options) {
            // Pipeline results pass through verbatim, including its own failures.
            Ok(result) => FileOutcome { pipeline_failed: !result.success, result },
            Err(e) => {
                self.errors.handle_error(
                    &e,
                    &ErrorContext::for_file(input, output_path.as_deref(), "process_file"),
                );
                FileOutcome {
                    result: ProcessingResult::failure(
                        input,
                        output_path.as_deref(),
                        format!("{e:#}"),
                    ),
                    pipeline_failed: true,
                }
            }
        };
        self.files_processing.fetch_sub(1, Ordering::SeqCst);
        outcome
    }

    /// Progress callbacks are best-effort: an `Err` goes to the error
    /// monitor and the batch carries on.
    pub(crate) fn report_progress(
        &self,
        progress: Option<&ProgressFn>,
        current: usize,
        total: usize,
        file_path: &Path,
    ) {
        if let Some(callback) = progress {
            if let Err(e) = callback(current, total, file_path) {
                self.errors.handle_error(
                    &e,
                    &ErrorContext::for_file(file_path, None, "progress_callback"),
                );
            }
        }
    }
}

/// Restores the processor to a reusable state on every exit path from
/// `process_batch`: flag cleared, gauges zeroed, state back to idle.
struct RunGuard<'a> {
    processor: &'a BatchProcessor,
}

impl Drop for RunGuard<'_> {
    fn drop(&mut self) {
        let p = self.processor;
        p.cancel_requested.store(false, Ordering::SeqCst);
        p.files_processing.store(0, Ordering::SeqCst);
        p.active_threads.store(0, Ordering::SeqCst);
        *p.run_started.lock().unwrap() = None;
        *p.state.lock().unwrap() = ProcessorState::Idle;
    }
}
