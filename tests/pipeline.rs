//! End-to-end pipeline tests over in-memory views and real files.

use std::io::Write;

use logmetrics::{analyze_bytes, analyze_file, AnalyzeConfig, AnalyzeError, BytesView};

fn config(workers: usize) -> AnalyzeConfig {
    AnalyzeConfig {
        workers,
        top_services: 3,
    }
}

/// Deterministic synthetic log. Latencies are multiples of 0.25 so sums are
/// exact regardless of how the shards split the additions.
fn synthetic_log(events: usize) -> Vec<u8> {
    let mut log = Vec::new();
    for i in 0..events {
        let status = match i % 11 {
            0 => 500,
            5 => 404,
            _ => 200,
        };
        let latency = (i % 400) as f64 * 0.25;
        let line = format!(
            "{{\"timestamp\":{i},\"service\":\"svc_{:02}\",\"status\":{status},\"latency_ms\":{latency}}}\n",
            i % 7
        );
        log.extend_from_slice(line.as_bytes());
    }
    log
}

#[test]
fn concrete_two_line_scenario() {
    let input = b"{\"timestamp\":1,\"service\":\"svc_a\",\"status\":200,\"latency_ms\":10.0}\n\
                  {\"timestamp\":2,\"service\":\"svc_a\",\"status\":500,\"latency_ms\":20.0}\n";
    let view = BytesView::from_vec(input.to_vec());
    let result = analyze_bytes(&view, &config(4)).unwrap();

    assert_eq!(result.events_processed, 2);
    assert_eq!(result.errors, 1);
    assert_eq!(result.error_percentage, 50.0);
    assert_eq!(result.min_latency, 10.0);
    assert_eq!(result.max_latency, 20.0);
    assert_eq!(result.average_latency, 15.0);
    assert_eq!(result.top_services, vec![("svc_a".to_owned(), 2)]);
}

#[test]
fn empty_input_is_no_data() {
    let view = BytesView::from_vec(Vec::new());
    let err = analyze_bytes(&view, &config(4)).unwrap_err();
    assert!(matches!(err, AnalyzeError::NoData));
}

#[test]
fn single_record_pins_every_percentile() {
    let input = b"{\"timestamp\":7,\"service\":\"solo\",\"status\":200,\"latency_ms\":42.5}\n";
    let view = BytesView::from_vec(input.to_vec());
    let result = analyze_bytes(&view, &config(4)).unwrap();

    assert_eq!(result.events_processed, 1);
    assert_eq!(result.p50, 42.5);
    assert_eq!(result.p95, 42.5);
    assert_eq!(result.p99, 42.5);
    assert_eq!(result.min_latency, 42.5);
    assert_eq!(result.max_latency, 42.5);
}

#[test]
fn parallel_run_matches_sequential_reference() {
    let view = BytesView::from_vec(synthetic_log(1_000));
    let reference = analyze_bytes(&view, &config(1)).unwrap();

    for workers in [2, 3, 4, 7, 8, 16] {
        let got = analyze_bytes(&view, &config(workers)).unwrap();
        assert_eq!(got.events_processed, reference.events_processed, "workers={workers}");
        assert_eq!(got.errors, reference.errors, "workers={workers}");
        assert_eq!(got.parse_failures, reference.parse_failures, "workers={workers}");
        assert_eq!(got.min_latency, reference.min_latency, "workers={workers}");
        assert_eq!(got.max_latency, reference.max_latency, "workers={workers}");
        assert_eq!(got.total_latency, reference.total_latency, "workers={workers}");
        assert_eq!(got.services, reference.services, "workers={workers}");
        assert_eq!(got.top_services, reference.top_services, "workers={workers}");
    }
}

#[test]
fn parallel_percentiles_track_the_sequential_estimate() {
    let view = BytesView::from_vec(synthetic_log(10_000));
    let reference = analyze_bytes(&view, &config(1)).unwrap();
    // Latencies cycle uniformly over [0, 100); both estimation paths must
    // land near the true quantiles.
    for workers in [1, 4, 8] {
        let got = analyze_bytes(&view, &config(workers)).unwrap();
        assert!((got.p50 - 50.0).abs() < 5.0, "workers={workers} p50={}", got.p50);
        assert!((got.p95 - 95.0).abs() < 5.0, "workers={workers} p95={}", got.p95);
        assert!((got.p99 - 99.0).abs() < 5.0, "workers={workers} p99={}", got.p99);
        assert!(got.p50 >= reference.min_latency && got.p50 <= reference.max_latency);
    }
}

#[test]
fn trailing_partial_record_is_not_counted() {
    let mut input = synthetic_log(10);
    // Chop the final newline plus a few bytes: the last record becomes an
    // unterminated tail and must be dropped.
    input.truncate(input.len() - 5);
    let view = BytesView::from_vec(input);
    let result = analyze_bytes(&view, &config(4)).unwrap();
    assert_eq!(result.events_processed, 9);
}

#[test]
fn malformed_fields_are_counted_not_fatal() {
    let input = b"{\"timestamp\":1,\"service\":\"a\",\"status\":200,\"latency_ms\":12.0}\n\
                  {\"timestamp\":2,\"service\":\"a\",\"status\":oops,\"latency_ms\":nope}\n";
    let view = BytesView::from_vec(input.to_vec());
    let result = analyze_bytes(&view, &config(2)).unwrap();

    assert_eq!(result.events_processed, 2);
    assert_eq!(result.parse_failures, 2);
    assert_eq!(result.errors, 0);
    assert_eq!(result.latency_samples, 1);
    assert_eq!(result.total_latency, 12.0);
}

#[test]
fn top_services_ranking_is_deterministic() {
    let mut log = Vec::new();
    for (service, count) in [("echo", 3), ("bravo", 2), ("alpha", 2), ("delta", 1)] {
        for _ in 0..count {
            let line =
                format!("{{\"timestamp\":0,\"service\":\"{service}\",\"status\":200,\"latency_ms\":1.0}}\n");
            log.extend_from_slice(line.as_bytes());
        }
    }
    let view = BytesView::from_vec(log);
    let result = analyze_bytes(&view, &config(4)).unwrap();

    let names: Vec<&str> = result
        .top_services
        .iter()
        .map(|(name, _)| name.as_str())
        .collect();
    assert_eq!(names, vec!["echo", "alpha", "bravo"]);
}

#[test]
fn analyze_file_round_trip() {
    let mut tmp = tempfile::NamedTempFile::new().unwrap();
    tmp.write_all(&synthetic_log(100)).unwrap();
    let result = analyze_file(tmp.path(), &config(4)).unwrap();
    assert_eq!(result.events_processed, 100);
}

#[test]
fn analyze_missing_file_is_open_error() {
    let err = analyze_file(std::path::Path::new("/no/such/file.log"), &config(2)).unwrap_err();
    assert!(matches!(err, AnalyzeError::FileOpen { .. }));
}

mod cli {
    //! Exit-code and output contract of the installed binary.

    use std::io::Write;
    use std::process::Command;

    fn binary() -> Command {
        Command::new(env!("CARGO_BIN_EXE_logmetrics"))
    }

    #[test]
    fn success_prints_report_and_exits_zero() {
        let mut tmp = tempfile::NamedTempFile::new().unwrap();
        tmp.write_all(
            b"{\"timestamp\":1,\"service\":\"svc_a\",\"status\":200,\"latency_ms\":10.0}\n\
              {\"timestamp\":2,\"service\":\"svc_a\",\"status\":500,\"latency_ms\":20.0}\n",
        )
        .unwrap();

        let output = binary().arg(tmp.path()).output().unwrap();
        assert!(output.status.success());

        let stdout = String::from_utf8_lossy(&output.stdout);
        assert!(stdout.contains("METRICS SUMMARY REPORT"));
        assert!(stdout.contains("Events Processed : 2"));
        assert!(stdout.contains("svc_a"));

        let stderr = String::from_utf8_lossy(&output.stderr);
        assert!(stderr.contains("events=2"), "stats line missing: {stderr}");
    }

    #[test]
    fn empty_file_exits_one_with_no_events_message() {
        let tmp = tempfile::NamedTempFile::new().unwrap();
        let output = binary().arg(tmp.path()).output().unwrap();
        assert_eq!(output.status.code(), Some(1));
        let stderr = String::from_utf8_lossy(&output.stderr);
        assert!(stderr.contains("no events"), "stderr was: {stderr}");
    }

    #[test]
    fn missing_file_exits_one() {
        let output = binary().arg("/no/such/file.log").output().unwrap();
        assert_eq!(output.status.code(), Some(1));
    }

    #[test]
    fn missing_argument_exits_two() {
        let output = binary().output().unwrap();
        assert_eq!(output.status.code(), Some(2));
    }

    #[test]
    fn unknown_flag_exits_two() {
        let output = binary().arg("--frobnicate").output().unwrap();
        assert_eq!(output.status.code(), Some(2));
    }
}
