//! Log analytics CLI.
//!
//! Ingests one line-delimited event log and prints the metrics summary
//! report. Work is split across a fixed pool of N workers over a shared
//! memory-mapped view of the file.
//!
//! # Output
//!
//! The report is written to stdout; a one-line `key=value` stats summary is
//! written to stderr upon success.
//!
//! # Exit Codes
//!
//! - `0`: success
//! - `1`: file-open failure, mapping failure, or zero processed events
//! - `2`: invalid arguments

use std::env;
use std::path::PathBuf;
use std::process;

use logmetrics::{analyze_file, default_workers, render_report, stats_line, AnalyzeConfig};

fn print_usage(exe: &std::ffi::OsStr) {
    eprintln!(
        "usage: {} [OPTIONS] <logfile>

OPTIONS:
    --workers=<N>   Number of worker threads (default: detected CPU count)
    --top=<N>       Services shown in the ranking (default: 3)
    --help, -h      Show this help message",
        exe.to_string_lossy()
    );
}

fn main() {
    let mut args = env::args_os();
    let exe = args.next().unwrap_or_else(|| "logmetrics".into());

    let mut path: Option<PathBuf> = None;
    let mut workers = default_workers();
    let mut top_services = 3usize;

    for arg in args {
        if let Some(flag) = arg.to_str() {
            if let Some(value) = flag.strip_prefix("--workers=") {
                workers = value.parse().unwrap_or_else(|_| {
                    eprintln!("invalid --workers value: {value}");
                    process::exit(2);
                });
                if workers == 0 {
                    eprintln!("--workers must be >= 1");
                    process::exit(2);
                }
                continue;
            }
            if let Some(value) = flag.strip_prefix("--top=") {
                top_services = value.parse().unwrap_or_else(|_| {
                    eprintln!("invalid --top value: {value}");
                    process::exit(2);
                });
                if top_services == 0 {
                    eprintln!("--top must be >= 1");
                    process::exit(2);
                }
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

        if path.is_some() {
            print_usage(&exe);
            process::exit(2);
        }
        path = Some(PathBuf::from(arg));
    }

    let Some(path) = path else {
        print_usage(&exe);
        process::exit(2);
    };

    let config = AnalyzeConfig {
        workers,
        top_services,
    };

    match analyze_file(&path, &config) {
        Ok(result) => {
            print!("{}", render_report(&result));
            eprintln!("{}", stats_line(&result, config.workers));
        }
        Err(err) => {
            eprintln!("logmetrics: {err}");
            process::exit(1);
        }
    }
}
