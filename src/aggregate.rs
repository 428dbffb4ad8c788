//! # Shard Accumulation and Merging
//!
//! Each worker task owns one [`PartialResult`] for the lifetime of its
//! chunk; nothing is shared during processing. After the collection barrier
//! the partials are merged into a [`GlobalResult`] — the merge runs once,
//! after workers join, so the hot path carries no atomics and no locks.
//!
//! ## Merge Rules
//!
//! Counters and latency totals sum; extremes take the global min/max;
//! service frequencies merge by summing counts per key. All of these are
//! commutative and associative, so shard completion order is irrelevant and
//! the merged values are exact regardless of shard count.
//!
//! ## Quantile Policy
//!
//! Tail percentiles are the one non-trivially-mergeable piece. P² marker
//! state cannot be soundly combined across independently-fitted estimators
//! (see `p2`), so every shard also folds its latencies into a t-digest — a
//! sketch built for parallel merging, batched through a small buffer so
//! per-shard memory stays bounded. At merge time:
//!
//! - exactly one shard observed latencies and its P² estimators are ready
//!   (≥5 samples): report the P² heights, the constant-memory path;
//! - otherwise: merge the digests and query those. A lone shard with fewer
//!   than five samples lands here too — below centroid capacity the digest
//!   is exact, which is the explicit not-ready fallback.
//!
//! The trade-off: multi-shard percentiles are t-digest approximations
//! (tightest at the tails, where we query) rather than P² approximations,
//! and memory stays constant per shard either way.

use std::time::Duration;

use ahash::AHashMap;
use tdigest::TDigest;

use crate::error::AnalyzeError;
use crate::p2::P2Estimator;

/// Quantiles tracked per shard.
pub const TRACKED_QUANTILES: [f64; 3] = [0.50, 0.95, 0.99];

/// Centroid budget for the per-shard digest.
const DIGEST_CENTROIDS: usize = 100;

/// Latencies buffered before folding into the digest.
const DIGEST_BATCH: usize = 4096;

/// Per-task accumulator, exclusively owned by one worker while it scans.
#[derive(Clone, Debug)]
pub struct PartialResult {
    pub events_processed: u64,
    pub errors: u64,
    /// Field markers found but unparsable; diagnostic only.
    pub parse_failures: u64,
    pub total_latency: f64,
    pub min_latency: f64,
    pub max_latency: f64,
    pub latency_samples: u64,
    pub services: AHashMap<String, u64>,
    pub p50: P2Estimator,
    pub p95: P2Estimator,
    pub p99: P2Estimator,
    digest: TDigest,
    pending: Vec<f64>,
}

impl PartialResult {
    pub fn new() -> Self {
        Self {
            events_processed: 0,
            errors: 0,
            parse_failures: 0,
            total_latency: 0.0,
            min_latency: f64::INFINITY,
            max_latency: f64::NEG_INFINITY,
            latency_samples: 0,
            services: AHashMap::new(),
            p50: P2Estimator::new(TRACKED_QUANTILES[0]),
            p95: P2Estimator::new(TRACKED_QUANTILES[1]),
            p99: P2Estimator::new(TRACKED_QUANTILES[2]),
            digest: TDigest::new_with_size(DIGEST_CENTROIDS),
            pending: Vec::new(),
        }
    }

    /// Folds one parsed latency into every latency statistic.
    pub fn record_latency(&mut self, ms: f64) {
        self.min_latency = self.min_latency.min(ms);
        self.max_latency = self.max_latency.max(ms);
        self.total_latency += ms;
        self.latency_samples += 1;

        self.p50.observe(ms);
        self.p95.observe(ms);
        self.p99.observe(ms);

        self.pending.push(ms);
        if self.pending.len() >= DIGEST_BATCH {
            self.flush_pending();
        }
    }

    /// Counts one occurrence of `service`, allocating the key only on first
    /// sight.
    pub fn record_service(&mut self, service: &str) {
        if let Some(count) = self.services.get_mut(service) {
            *count += 1;
        } else {
            self.services.insert(service.to_owned(), 1);
        }
    }

    /// Folds any buffered latencies into the digest. Idempotent; workers
    /// call it once at the end of their task.
    pub fn seal(&mut self) {
        if !self.pending.is_empty() {
            self.flush_pending();
        }
    }

    /// The shard's mergeable latency sketch (buffered samples included only
    /// after [`seal`](Self::seal)).
    pub fn digest(&self) -> &TDigest {
        &self.digest
    }

    fn flush_pending(&mut self) {
        let batch = std::mem::take(&mut self.pending);
        self.digest = self.digest.merge_unsorted(batch);
    }
}

impl Default for PartialResult {
    fn default() -> Self {
        Self::new()
    }
}

/// Final merged metrics for one run.
#[derive(Clone, Debug)]
pub struct GlobalResult {
    pub events_processed: u64,
    pub errors: u64,
    pub parse_failures: u64,
    pub total_latency: f64,
    pub min_latency: f64,
    pub max_latency: f64,
    pub latency_samples: u64,
    pub average_latency: f64,
    pub p50: f64,
    pub p95: f64,
    pub p99: f64,
    pub error_percentage: f64,
    pub throughput: f64,
    pub elapsed_seconds: f64,
    pub services: AHashMap<String, u64>,
    /// Highest-frequency services, descending count, ties broken by
    /// ascending service id.
    pub top_services: Vec<(String, u64)>,
    pub shards: usize,
}

/// Merges every shard into the global result and derives the final metrics.
///
/// Order-independent: any permutation of `partials` produces the same
/// result. Fails with [`AnalyzeError::NoData`] when no records were
/// processed.
pub fn merge_partials(
    partials: Vec<PartialResult>,
    elapsed: Duration,
    top_n: usize,
) -> Result<GlobalResult, AnalyzeError> {
    let shards = partials.len();

    let mut events_processed = 0u64;
    let mut errors = 0u64;
    let mut parse_failures = 0u64;
    let mut total_latency = 0.0f64;
    let mut min_latency = f64::INFINITY;
    let mut max_latency = f64::NEG_INFINITY;
    let mut latency_samples = 0u64;
    let mut services: AHashMap<String, u64> = AHashMap::new();
    let mut digests = Vec::with_capacity(shards);
    let mut latency_shards = 0usize;
    let mut lone_estimators: Option<(P2Estimator, P2Estimator, P2Estimator)> = None;

    for mut partial in partials {
        partial.seal();
        let PartialResult {
            events_processed: shard_events,
            errors: shard_errors,
            parse_failures: shard_parse_failures,
            total_latency: shard_total,
            min_latency: shard_min,
            max_latency: shard_max,
            latency_samples: shard_samples,
            services: shard_services,
            p50,
            p95,
            p99,
            digest,
            pending: _,
        } = partial;

        events_processed += shard_events;
        errors += shard_errors;
        parse_failures += shard_parse_failures;
        total_latency += shard_total;
        min_latency = min_latency.min(shard_min);
        max_latency = max_latency.max(shard_max);
        latency_samples += shard_samples;

        for (service, count) in shard_services {
            *services.entry(service).or_insert(0) += count;
        }

        if shard_samples > 0 {
            latency_shards += 1;
            lone_estimators = Some((p50, p95, p99));
        }
        digests.push(digest);
    }

    if events_processed == 0 {
        return Err(AnalyzeError::NoData);
    }

    let (p50, p95, p99) = estimate_quantiles(latency_shards, lone_estimators, digests);

    // Inputs with zero parsed latencies leave the extremes untouched;
    // report zeros instead of leaking infinities.
    if latency_samples == 0 {
        min_latency = 0.0;
        max_latency = 0.0;
    }

    let average_latency = total_latency / events_processed as f64;
    let elapsed_seconds = elapsed.as_secs_f64();
    let throughput = if elapsed_seconds > 0.0 {
        events_processed as f64 / elapsed_seconds
    } else {
        0.0
    };
    let error_percentage = 100.0 * errors as f64 / events_processed as f64;
    let top_services = rank_services(&services, top_n);

    Ok(GlobalResult {
        events_processed,
        errors,
        parse_failures,
        total_latency,
        min_latency,
        max_latency,
        latency_samples,
        average_latency,
        p50,
        p95,
        p99,
        error_percentage,
        throughput,
        elapsed_seconds,
        services,
        top_services,
        shards,
    })
}

/// Applies the quantile policy from the module docs.
fn estimate_quantiles(
    latency_shards: usize,
    lone_estimators: Option<(P2Estimator, P2Estimator, P2Estimator)>,
    digests: Vec<TDigest>,
) -> (f64, f64, f64) {
    if latency_shards == 0 {
        return (0.0, 0.0, 0.0);
    }

    if latency_shards == 1 {
        if let Some((e50, e95, e99)) = &lone_estimators {
            if let (Some(p50), Some(p95), Some(p99)) =
                (e50.quantile(), e95.quantile(), e99.quantile())
            {
                return (p50, p95, p99);
            }
        }
    }

    let merged = TDigest::merge_digests(digests);
    (
        merged.estimate_quantile(TRACKED_QUANTILES[0]),
        merged.estimate_quantile(TRACKED_QUANTILES[1]),
        merged.estimate_quantile(TRACKED_QUANTILES[2]),
    )
}

/// Ranks services by descending count, ties by ascending service id, and
/// keeps the first `top_n`.
fn rank_services(services: &AHashMap<String, u64>, top_n: usize) -> Vec<(String, u64)> {
    let mut ranked: Vec<(String, u64)> = services
        .iter()
        .map(|(name, &count)| (name.clone(), count))
        .collect();
    ranked.sort_unstable_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    ranked.truncate(top_n);
    ranked
}
