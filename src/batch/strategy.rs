//! Execution strategy selection
//!
//! One strategy decision per chunk: parallel whenever more than one worker
//! thread is allowed, sequential otherwise. The decision is made once, when
//! the chunk is dispatched, and never re-evaluated mid-chunk.

/// How one chunk of files is executed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecutionStrategy {
    /// Process files strictly in order on the calling thread
    Sequential,
    /// Process files on a bounded worker pool
    Parallel { workers: usize },
}

impl ExecutionStrategy {
    /// Pick the strategy for a chunk given the configured thread limit.
    ///
    /// `max_threads == 1` forces sequential dispatch. Parallel dispatch
    /// never spawns more workers than the chunk has files.
    pub fn for_chunk(max_threads: usize, chunk_len: usize) -> Self {
        if max_threads > 1 {
            ExecutionStrategy::Parallel { workers: max_threads.min(chunk_len.max(1)) }
        } else {
            ExecutionStrategy::Sequential
        }
    }
}
