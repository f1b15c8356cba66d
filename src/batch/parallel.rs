//! Parallel chunk execution
//!
//! Runs one chunk across a bounded worker pool using crossbeam channels in
//! a producer-consumer pattern. The pool lives for exactly one chunk.
//!
//! Results are collected **in completion order**, not submission order:
//! callers correlate results to inputs through `ProcessingResult.file_path`.
//! Cancellation stops result collection only; work already picked up by a
//! worker runs to completion and is dropped unobserved, never interrupted.

use crossbeam::channel::{Receiver, Sender, bounded};
use std::path::{Path, PathBuf};
use std::sync::atomic::Ordering;

use crate::pipeline::{ProcessOptions, ProgressFn};

use super::processor::BatchProcessor;
use super::types::ProcessingResult;

impl BatchProcessor {
    /// Process one chunk on a pool of `workers` threads.
    pub(crate) fn run_parallel(
        &self,
        chunk: Vec<PathBuf>,
        workers: usize,
        output_dir: Option<&Path>,
        options: &ProcessOptions,
        progress: Option<&ProgressFn>,
        total_files: usize,
    ) -> Vec<ProcessingResult> {
        if self.cancel_requested.load(Ordering::SeqCst) {
            tracing::info!("cancellation requested, submitting nothing for this chunk");
            return Vec::new();
        }

        let submitted = chunk.len();

        // Bounded channels for work distribution and result collection
        let (work_tx, work_rx): (Sender<PathBuf>, Receiver<PathBuf>) = bounded(workers * 2);
        let (result_tx, result_rx): (
            Sender<(PathBuf, ProcessingResult)>,
            Receiver<(PathBuf, ProcessingResult)>,
        ) = bounded(workers * 4);

        let collected = crossbeam::thread::scope(|s| {
            // Worker threads: pull a file, process it, push the result
            for _ in 0..workers {
                let work_rx = work_rx.clone();
                let result_tx = result_tx.clone();

                s.spawn(move |_| {
                    self.active_threads.fetch_add(1, Ordering::SeqCst);
                    while let Ok(file_path) = work_rx.recv() {
                        let outcome = self.process_one(&file_path, output_dir, options);
                        if result_tx.send((file_path, outcome.result)).is_err() {
                            break; // Receiver dropped, collection stopped
                        }
                    }
                    self.active_threads.fetch_sub(1, Ordering::SeqCst);
                });
            }

            // Producer thread: feed the chunk to the workers
            let work_tx_clone = work_tx.clone();
            s.spawn(move |_| {
                for file_path in chunk {
                    if work_tx_clone.send(file_path).is_err() {
                        break; // Workers dropped
                    }
                }
                drop(work_tx_clone);
            });

            // Drop the original endpoints so the channels disconnect as soon
            // as the workers and producer are done with their clones; keeping
            // work_rx alive here would leave the producer blocked on a full
            // work channel after an early drain stop.
            drop(work_tx);
            drop(work_rx);
            drop(result_tx);

            self.collect_completions(result_rx, progress, submitted, total_files)
        });

        match collected {
            Ok(results) => results,
            Err(_) => {
                tracing::error!("worker thread panicked during parallel chunk");
                Vec::new()
            }
        }
    }

    /// Drain completed work in the order it finishes. Stops early when
    /// cancellation is observed; dropping the receiver unblocks the workers.
    fn collect_completions(
        &self,
        result_rx: Receiver<(PathBuf, ProcessingResult)>,
        progress: Option<&ProgressFn>,
        submitted: usize,
        total_files: usize,
    ) -> Vec<ProcessingResult> {
        let mut results = Vec::with_capacity(submitted);

        while let Ok((file_path, result)) = result_rx.recv() {
            let current = self.files_completed.fetch_add(1, Ordering::SeqCst) + 1;
            self.report_progress(progress, current, total_files, &file_path);
            results.push(result);

            if self.cancel_requested.load(Ordering::SeqCst) {
                tracing::info!(
                    collected = results.len(),
                    submitted,
                    "cancellation requested, abandoning outstanding work"
                );
                break;
            }
            if results.len() >= submitted {
                break;
            }
        }

        results
    }
}
