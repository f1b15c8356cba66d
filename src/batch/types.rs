use serde::Serialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Outcome of converting exactly one input file
#[derive(Debug, Clone, Serialize)]
pub struct ProcessingResult {
    pub file_path: PathBuf,
    pub output_path: Option<PathBuf>,
    pub success: bool,
    /// Error messages in the order they were recorded
    pub errors: Vec<String>,
    /// Opaque payload produced by the pipeline, passed through untouched
    pub data: Option<serde_json::Value>,
}

impl ProcessingResult {
    /// Successful result with no payload.
    pub fn ok(file_path: &Path, output_path: Option<&Path>) -> Self {
        Self {
            file_path: file_path.to_path_buf(),
            output_path: output_path.map(Path::to_path_buf),
            success: true,
            errors: Vec::new(),
            data: None,
        }
    }

    /// Failure synthesized by the engine (resource exhaustion, pipeline
    /// error, output-path resolution error).
    pub fn failure(file_path: &Path, output_path: Option<&Path>, error: impl Into<String>) -> Self {
        Self {
            file_path: file_path.to_path_buf(),
            output_path: output_path.map(Path::to_path_buf),
            success: false,
            errors: vec![error.into()],
            data: None,
        }
    }

    pub fn with_data(mut self, data: serde_json::Value) -> Self {
        self.data = Some(data);
        self
    }
}

/// Ordered aggregation of every [`ProcessingResult`] one batch produced,
/// plus batch-level success/error state.
///
/// `success` reflects whether the batch itself ran to completion; it is
/// independent of individual item failures. `error` is set only for fatal,
/// batch-level conditions (concurrent-invocation rejection, unresolvable
/// input spec).
#[derive(Debug, Default, Serialize)]
pub struct BatchResult {
    pub results: Vec<ProcessingResult>,
    pub success: bool,
    pub error: Option<String>,
}

impl BatchResult {
    /// Empty, successful batch.
    pub fn new() -> Self {
        Self { results: Vec::new(), success: true, error: None }
    }

    /// Fatal batch-level failure; carries no per-file results.
    pub fn fatal(error: impl Into<String>) -> Self {
        Self { results: Vec::new(), success: false, error: Some(error.into()) }
    }

    pub fn extend(&mut self, results: impl IntoIterator<Item = ProcessingResult>) {
        self.results.extend(results);
    }

    pub fn succeeded(&self) -> usize {
        self.results.iter().filter(|r| r.success).count()
    }

    pub fn failed(&self) -> usize {
        self.results.iter().filter(|r| !r.success).count()
    }
}

/// Whether a `process_batch` call is in flight
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessorState {
    Idle,
    Processing,
}

/// Counts and timing from the most recently finished batch
#[derive(Debug, Clone, Serialize)]
pub struct BatchSummary {
    pub total: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub duration: Duration,
}

/// Point-in-time snapshot of processor activity
#[derive(Debug, Clone)]
pub struct ProcessingStatus {
    pub is_processing: bool,
    pub active_threads: usize,
    pub files_processing: usize,
    pub files_completed: usize,
    pub total_files: usize,
    pub progress_percent: f64,
    pub cancellation_requested: bool,
    /// Remaining-time estimate extrapolated from throughput so far;
    /// `None` when idle or before the first completion.
    pub eta: Option<Duration>,
    pub last_batch_summary: Option<BatchSummary>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn batch_result_counts_split_by_success() {
        let mut batch = BatchResult::new();
        batch.extend([
            ProcessingResult::ok(Path::new("a.txt"), None),
            ProcessingResult::failure(Path::new("b.txt"), None, "boom"),
            ProcessingResult::ok(Path::new("c.txt"), None),
        ]);
        assert!(batch.success);
        assert_eq!(batch.succeeded(), 2);
        assert_eq!(batch.failed(), 1);
    }

    #[test]
    fn fatal_batch_carries_error_and_no_results() {
        let batch = BatchResult::fatal("input spec could not be resolved");
        assert!(!batch.success);
        assert!(batch.error.as_deref().unwrap().contains("resolved"));
        assert!(batch.results.is_empty());
    }
}
