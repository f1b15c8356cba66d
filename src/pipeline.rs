//! Collaborator interfaces consumed by the batch engine
//!
//! The engine owns scheduling, dispatch, and failure accounting; everything
//! domain-specific is injected at construction behind these traits. All of
//! them may be called from multiple worker threads at once and must be
//! internally thread-safe.

use anyhow::Result;
use std::path::{Path, PathBuf};

use crate::batch::ProcessingResult;

/// Opaque key-value options forwarded to the pipeline untouched.
pub type ProcessOptions = serde_json::Map<String, serde_json::Value>;

/// Progress callback: `(files_completed_so_far, total_files, file_just_attempted)`.
///
/// An `Err` from the callback is reported to the [`ErrorMonitor`] and never
/// interrupts the batch. The lifetime parameter lets callers pass closures
/// that borrow from their stack.
pub type ProgressFn<'a> = dyn Fn(usize, usize, &Path) -> Result<()> + Send + Sync + 'a;

/// Converts one input file. The only collaborator that touches file content.
pub trait ProcessingPipeline: Send + Sync {
    /// Process a single file, writing to `output` when one was resolved.
    ///
    /// A returned `ProcessingResult` is passed through to the batch
    /// verbatim, including pipeline-level failures. An `Err` is converted
    /// by the engine into a failure result for this file.
    fn process_file(
        &self,
        input: &Path,
        output: Option<&Path>,
        options: &ProcessOptions,
    ) -> Result<ProcessingResult>;
}

/// Snapshot of system headroom as judged by a [`ResourceMonitor`].
#[derive(Debug, Clone)]
pub struct ResourceAvailability {
    pub available: bool,
    /// Human-readable reason when `available` is false.
    pub reason: Option<String>,
}

impl ResourceAvailability {
    pub fn available() -> Self {
        Self { available: true, reason: None }
    }

    pub fn exhausted(reason: impl Into<String>) -> Self {
        Self { available: false, reason: Some(reason.into()) }
    }
}

/// Admission control: consulted once per file, before the pipeline runs.
///
/// A monitor error is non-fatal: the engine reports it and proceeds as if
/// resources were available.
pub trait ResourceMonitor: Send + Sync {
    fn check(&self) -> Result<ResourceAvailability>;
}

/// Context attached to every error handed to an [`ErrorMonitor`].
#[derive(Debug, Clone, Default)]
pub struct ErrorContext {
    pub file_path: Option<PathBuf>,
    pub output_path: Option<PathBuf>,
    /// Which engine operation produced the error, e.g. `"process_file"`.
    pub operation: &'static str,
}

impl ErrorContext {
    pub fn for_file(path: &Path, output: Option<&Path>, operation: &'static str) -> Self {
        Self {
            file_path: Some(path.to_path_buf()),
            output_path: output.map(Path::to_path_buf),
            operation,
        }
    }
}

/// Sink for every error the engine swallows instead of propagating.
pub trait ErrorMonitor: Send + Sync {
    fn handle_error(&self, error: &anyhow::Error, context: &ErrorContext);
}

/// Maps an input file to its output location under `output_dir`, applying
/// whatever naming or collision policy the caller owns. Only invoked when
/// the batch was given an output directory.
pub trait OutputPathResolver: Send + Sync {
    fn resolve(&self, input: &Path, output_dir: &Path, options: &ProcessOptions)
        -> Result<PathBuf>;
}

/// Resource monitor that always admits work.
pub struct AlwaysAvailable;

impl ResourceMonitor for AlwaysAvailable {
    fn check(&self) -> Result<ResourceAvailability> {
        Ok(ResourceAvailability::available())
    }
}

/// Error monitor that forwards everything to `tracing::error!`.
pub struct LoggingErrorMonitor;

impl ErrorMonitor for LoggingErrorMonitor {
    fn handle_error(&self, error: &anyhow::Error, context: &ErrorContext) {
        tracing::error!(
            operation = context.operation,
            file = ?context.file_path,
            output = ?context.output_path,
            "batch error: {error:#}"
        );
    }
}

/// Output resolver that keeps the input file name and re-roots it under the
/// output directory.
pub struct FileNameOutputResolver;

impl OutputPathResolver for FileNameOutputResolver {
    fn resolve(
        &self,
        input: &Path,
        output_dir: &Path,
        _options: &ProcessOptions,
    ) -> Result<PathBuf> {
        let name = input
            .file_name()
            .ok_or_else(|| anyhow::anyhow!("input path has no file name: {}", input.display()))?;
        Ok(output_dir.join(name))
    }
}
