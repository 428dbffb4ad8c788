//! # Pipeline Entry Points
//!
//! Batteries-included wiring for the full run:
//!
//! ```text
//! BytesView ──► plan_chunks ──► WorkerPool (scan per chunk) ──► barrier ──► merge
//! ```
//!
//! One task per chunk; each task runs the shared scanner over its slice of
//! the byte view and owns its `PartialResult` exclusively. The byte view is
//! reference-counted and immutable, so workers read it concurrently with no
//! synchronization; the task queue is the only contended resource. The
//! aggregation step does not start until every task handle has resolved.
//!
//! Throughput is measured from just before planning until the collection
//! barrier completes, matching what a caller observes for the parallel phase.

use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use crate::aggregate::{merge_partials, GlobalResult, PartialResult};
use crate::bytes::BytesView;
use crate::chunk::plan_chunks;
use crate::error::AnalyzeError;
use crate::pool::{TaskHandle, WorkerPool};
use crate::scanner::RecordScanner;

/// Configuration for one analytics run.
///
/// | Parameter      | Default              | Notes                          |
/// |----------------|----------------------|--------------------------------|
/// | `workers`      | detected CPU count   | Tasks never exceed chunk count |
/// | `top_services` | 3                    | Rows in the service ranking    |
#[derive(Clone, Debug)]
pub struct AnalyzeConfig {
    /// Number of worker threads (and planned chunks).
    pub workers: usize,
    /// Number of services reported in the ranking.
    pub top_services: usize,
}

impl Default for AnalyzeConfig {
    fn default() -> Self {
        Self {
            workers: default_workers(),
            top_services: 3,
        }
    }
}

impl AnalyzeConfig {
    /// Validate configuration. Panics on invalid values.
    pub fn validate(&self) {
        assert!(self.workers > 0, "workers must be > 0");
        assert!(self.top_services > 0, "top_services must be > 0");
    }
}

/// Detected CPU count; falls back to 4 should detection report nothing.
pub fn default_workers() -> usize {
    match num_cpus::get() {
        0 => 4,
        n => n,
    }
}

/// Analyzes the log file at `path`.
pub fn analyze_file(path: &Path, config: &AnalyzeConfig) -> Result<GlobalResult, AnalyzeError> {
    let view = BytesView::open(path)?;
    analyze_bytes(&view, config)
}

/// Analyzes an already-materialized byte view.
///
/// The parallel path and the sequential reference path are the same code:
/// pass `workers: 1` for a single-chunk, single-thread run.
pub fn analyze_bytes(view: &BytesView, config: &AnalyzeConfig) -> Result<GlobalResult, AnalyzeError> {
    config.validate();

    let start = Instant::now();
    let chunks = plan_chunks(view.as_slice(), config.workers);
    if chunks.is_empty() {
        return Err(AnalyzeError::NoData);
    }

    let scanner = Arc::new(RecordScanner::new());
    let pool = WorkerPool::new(config.workers.min(chunks.len()));

    let handles: Vec<TaskHandle<PartialResult>> = chunks
        .iter()
        .map(|&chunk| {
            let view = view.clone();
            let scanner = Arc::clone(&scanner);
            pool.submit(move || {
                let mut shard = PartialResult::new();
                scanner.scan_chunk(chunk.slice(view.as_slice()), &mut shard);
                shard.seal();
                shard
            })
        })
        .collect();

    // Collection barrier: every shard lands before aggregation begins.
    let partials: Vec<PartialResult> = handles.into_iter().map(TaskHandle::wait).collect();
    pool.shutdown();

    merge_partials(partials, start.elapsed(), config.top_services)
}
