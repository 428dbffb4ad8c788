//! Criterion benches for the scan hot path and the streaming estimator.

use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};

use logmetrics::rng::XorShift64;
use logmetrics::{analyze_bytes, AnalyzeConfig, BytesView, P2Estimator, PartialResult, RecordScanner};

/// Builds a realistic synthetic corpus of roughly `target_bytes`.
fn synthetic_corpus(target_bytes: usize, seed: u64) -> Vec<u8> {
    let mut rng = XorShift64::new(seed);
    let mut log = Vec::with_capacity(target_bytes + 128);
    let mut timestamp: i64 = 1_700_000_000;
    while log.len() < target_bytes {
        timestamp += rng.next_below(3) as i64;
        let service = rng.next_below(16);
        let status = if rng.next_below(50) == 0 { 500 } else { 200 };
        let latency = 1.0 + rng.next_f64() * 99.0;
        let line = format!(
            "{{\"timestamp\":{timestamp},\"service\":\"svc_{service:03}\",\"status\":{status},\"latency_ms\":{latency:.1}}}\n"
        );
        log.extend_from_slice(line.as_bytes());
    }
    log
}

fn bench_scan_chunk(c: &mut Criterion) {
    let corpus = synthetic_corpus(4 * 1024 * 1024, 0xC0FFEE);
    let scanner = RecordScanner::new();

    let mut group = c.benchmark_group("scan_chunk");
    group.throughput(Throughput::Bytes(corpus.len() as u64));
    group.bench_function("4MiB", |b| {
        b.iter(|| {
            let mut shard = PartialResult::new();
            scanner.scan_chunk(black_box(&corpus), &mut shard);
            shard
        })
    });
    group.finish();
}

fn bench_p2_observe(c: &mut Criterion) {
    let mut rng = XorShift64::new(17);
    let values: Vec<f64> = (0..100_000).map(|_| rng.next_f64() * 100.0).collect();

    let mut group = c.benchmark_group("p2_observe");
    group.throughput(Throughput::Elements(values.len() as u64));
    group.bench_function("100k", |b| {
        b.iter(|| {
            let mut est = P2Estimator::new(0.99);
            for &v in &values {
                est.observe(v);
            }
            est.quantile()
        })
    });
    group.finish();
}

fn bench_full_pipeline(c: &mut Criterion) {
    let corpus = synthetic_corpus(8 * 1024 * 1024, 0xBEEF);
    let len = corpus.len() as u64;
    let view = BytesView::from_vec(corpus);

    let mut group = c.benchmark_group("analyze");
    group.sample_size(10);
    group.throughput(Throughput::Bytes(len));
    for workers in [1usize, 4] {
        group.bench_function(format!("workers_{workers}"), |b| {
            let config = AnalyzeConfig {
                workers,
                top_services: 3,
            };
            b.iter(|| analyze_bytes(black_box(&view), &config).unwrap())
        });
    }
    group.finish();
}

criterion_group!(benches, bench_scan_chunk, bench_p2_observe, bench_full_pipeline);
criterion_main!(benches);
