//! High-throughput analytics over line-delimited event logs.
//!
//! ## Scope
//! This crate ingests a fixed-schema event log (timestamp, service, status,
//! latency) and produces, in one pass, aggregate operational metrics: event
//! count, error rate, latency min/max/average and tail percentiles
//! (p50/p95/p99), throughput, and top-N service frequency.
//!
//! ## Key invariants
//! - The input is a single, fully-available file, memory-mapped once and
//!   shared read-only across workers; the view type admits no mutable alias.
//! - Chunks are newline-aligned: a complete, delimiter-terminated record is
//!   observed by exactly one worker, never split, never double-counted.
//! - Workers own their partial results exclusively; merging happens once,
//!   behind a full collection barrier, with commutative-associative rules.
//! - Per-field parse failures are recovered locally and counted; they never
//!   abort the run and are never silently treated as zero.
//!
//! ## Pipeline flow
//! `Path -> BytesView -> plan_chunks -> WorkerPool -> PartialResult* ->
//! merge_partials -> GlobalResult -> report`
//!
//! ## Notable entry points
//! - [`analyze_file`] / [`analyze_bytes`]: run the whole pipeline.
//! - [`P2Estimator`]: standalone streaming quantile estimation.
//! - [`plan_chunks`], [`WorkerPool`], [`RecordScanner`]: the pieces, for
//!   callers that want to wire them differently.
//!
//! ## Design trade-offs
//! Cross-shard percentiles come from merged t-digests rather than the
//! per-shard P² estimators, which have no sound merge operation; the P²
//! path stays authoritative for single-shard runs. A trailing record with
//! no terminating newline is dropped by design.

pub mod aggregate;
pub mod analyze;
pub mod bytes;
pub mod chunk;
pub mod error;
pub mod p2;
pub mod pool;
pub mod report;
pub mod rng;
pub mod scanner;

pub use aggregate::{merge_partials, GlobalResult, PartialResult, TRACKED_QUANTILES};
pub use analyze::{analyze_bytes, analyze_file, default_workers, AnalyzeConfig};
pub use bytes::BytesView;
pub use chunk::{plan_chunks, Chunk};
pub use error::AnalyzeError;
pub use p2::P2Estimator;
pub use pool::{TaskHandle, WorkerPool};
pub use report::{render_report, stats_line};
pub use scanner::{FieldValue, RecordScanner, STATUS_OK};
