//! Synthetic log generator.
//!
//! Writes event lines in the exact schema the analyzer consumes:
//!
//! ```text
//! {"timestamp":<i64>,"service":"svc_<nnn>","status":<int>,"latency_ms":<f64>}
//! ```
//!
//! Output is deterministic for a given seed, which keeps generated corpora
//! reproducible across runs and machines. Latencies follow a mixture: a
//! uniform body with an occasional 10x tail so the p95/p99 columns have
//! something to say.
//!
//! # Exit Codes
//!
//! - `0`: success
//! - `1`: output file could not be created or written
//! - `2`: invalid arguments

use std::env;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::PathBuf;
use std::process;

use logmetrics::rng::XorShift64;

/// Fraction of events drawn from the slow tail.
const TAIL_FRACTION: f64 = 0.01;

fn print_usage(exe: &std::ffi::OsStr) {
    eprintln!(
        "usage: {} [OPTIONS] <output> <events>

OPTIONS:
    --services=<N>      Distinct service ids (default: 8)
    --error-rate=<PCT>  Percentage of non-200 events (default: 2.0)
    --seed=<N>          RNG seed (default: 1)
    --help, -h          Show this help message",
        exe.to_string_lossy()
    );
}

fn main() {
    let mut args = env::args_os();
    let exe = args.next().unwrap_or_else(|| "loggen".into());

    let mut positional: Vec<PathBuf> = Vec::new();
    let mut services = 8u64;
    let mut error_rate = 2.0f64;
    let mut seed = 1u64;

    for arg in args {
        if let Some(flag) = arg.to_str() {
            if let Some(value) = flag.strip_prefix("--services=") {
                services = parse_flag(value, "--services");
                if services == 0 {
                    eprintln!("--services must be >= 1");
                    process::exit(2);
                }
                continue;
            }
            if let Some(value) = flag.strip_prefix("--error-rate=") {
                error_rate = parse_flag(value, "--error-rate");
                if !(0.0..=100.0).contains(&error_rate) {
                    eprintln!("--error-rate must be within 0..=100");
                    process::exit(2);
                }
                continue;
            }
            if let Some(value) = flag.strip_prefix("--seed=") {
                seed = parse_flag(value, "--seed");
                continue;
            }
            match flag {
                "--help" | "-h" => {
                    print_usage(&exe);
                    process::exit(0);
                }
                _ if flag.starts_with("--") => {
                    eprintln!("unknown flag: {flag}");
                    print_usage(&exe);
                    process::exit(2);
                }
                _ => {}
            }
        }
        positional.push(PathBuf::from(arg));
    }

    let [output, events] = positional.as_slice() else {
        print_usage(&exe);
        process::exit(2);
    };
    let events: u64 = events
        .to_str()
        .and_then(|s| s.parse().ok())
        .unwrap_or_else(|| {
            eprintln!("invalid <events> count");
            process::exit(2);
        });

    if let Err(err) = generate(output, events, services, error_rate, seed) {
        eprintln!("loggen: cannot write {}: {err}", output.display());
        process::exit(1);
    }
}

fn parse_flag<T: std::str::FromStr>(value: &str, flag: &str) -> T {
    value.parse().unwrap_or_else(|_| {
        eprintln!("invalid {flag} value: {value}");
        process::exit(2);
    })
}

fn generate(
    output: &PathBuf,
    events: u64,
    services: u64,
    error_rate: f64,
    seed: u64,
) -> std::io::Result<()> {
    let mut out = BufWriter::new(File::create(output)?);
    let mut rng = XorShift64::new(seed);
    let mut timestamp: i64 = 1_700_000_000;

    for _ in 0..events {
        timestamp += rng.next_below(3) as i64;
        let service = rng.next_below(services);
        let status = if rng.next_f64() * 100.0 < error_rate {
            // Split failures between client and server errors.
            if rng.next_below(2) == 0 {
                404
            } else {
                500
            }
        } else {
            200
        };
        let latency = if rng.next_f64() < TAIL_FRACTION {
            50.0 + rng.next_f64() * 450.0
        } else {
            1.0 + rng.next_f64() * 49.0
        };

        writeln!(
            out,
            "{{\"timestamp\":{timestamp},\"service\":\"svc_{service:03}\",\"status\":{status},\"latency_ms\":{latency:.1}}}"
        )?;
    }

    out.flush()
}
