//! Text rendering of the merged metrics.
//!
//! The report goes to stdout; the one-line machine-readable stats summary
//! goes to stderr so scripted callers can split them.

use std::fmt::Write as _;

use crate::aggregate::GlobalResult;

const RULE: &str = "==============================";

/// Renders the human-readable summary report.
pub fn render_report(result: &GlobalResult) -> String {
    let mut out = String::with_capacity(512);

    let _ = writeln!(out, "\n{RULE}");
    let _ = writeln!(out, "     METRICS SUMMARY REPORT");
    let _ = writeln!(out, "{RULE}");

    let _ = writeln!(out, "Events Processed : {}", result.events_processed);
    let _ = writeln!(
        out,
        "Errors           : {} ({:.2}%)",
        result.errors, result.error_percentage
    );
    if result.parse_failures > 0 {
        let _ = writeln!(out, "Parse Failures   : {}", result.parse_failures);
    }
    let _ = writeln!(out);

    let _ = writeln!(out, "Latency (ms):");
    let _ = writeln!(out, "   Min        : {:.2}", result.min_latency);
    let _ = writeln!(out, "   Max        : {:.2}", result.max_latency);
    let _ = writeln!(out, "   Average    : {:.2}", result.average_latency);
    let _ = writeln!(out, "   P50        : {:.2}", result.p50);
    let _ = writeln!(out, "   P95        : {:.2}", result.p95);
    let _ = writeln!(out, "   P99        : {:.2}", result.p99);
    let _ = writeln!(out);

    let _ = writeln!(out, "Performance:");
    let _ = writeln!(out, "   Throughput  : {:.2} events/sec", result.throughput);
    let _ = writeln!(out, "   Time Taken  : {:.2} sec", result.elapsed_seconds);
    let _ = writeln!(out);

    let _ = writeln!(out, "Top {} Services:", result.top_services.len());
    for (service, count) in &result.top_services {
        let _ = writeln!(out, "   {service:>12} → {count} events");
    }
    let _ = writeln!(out, "{RULE}\n");

    out
}

/// One-line `key=value` stats summary for stderr.
pub fn stats_line(result: &GlobalResult, workers: usize) -> String {
    format!(
        "events={} errors={} parse_failures={} elapsed_ms={:.1} throughput_eps={:.0} shards={} workers={}",
        result.events_processed,
        result.errors,
        result.parse_failures,
        result.elapsed_seconds * 1_000.0,
        result.throughput,
        result.shards,
        workers,
    )
}
