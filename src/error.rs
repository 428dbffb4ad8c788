//! Error types for the analytics pipeline.
//!
//! Open/map/no-data failures are unrecoverable and reported once at the top
//! level. Per-record parse failures are not errors in this sense: they are
//! recovered field-by-field and surface only as a diagnostic counter on the
//! result (see `scanner`).

use std::fmt;
use std::io;
use std::path::PathBuf;

/// Fatal failures of an analytics run.
#[derive(Debug)]
pub enum AnalyzeError {
    /// Input path missing or unreadable.
    FileOpen { path: PathBuf, source: io::Error },
    /// Memory-mapping the input file failed.
    Map { path: PathBuf, source: io::Error },
    /// No records were processed (empty input, or no complete record).
    NoData,
}

impl fmt::Display for AnalyzeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::FileOpen { path, source } => {
                write!(f, "cannot open {}: {}", path.display(), source)
            }
            Self::Map { path, source } => {
                write!(f, "cannot map {}: {}", path.display(), source)
            }
            Self::NoData => write!(f, "there were no events to process"),
        }
    }
}

impl std::error::Error for AnalyzeError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::FileOpen { source, .. } | Self::Map { source, .. } => Some(source),
            Self::NoData => None,
        }
    }
}
