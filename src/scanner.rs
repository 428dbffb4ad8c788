//! # Record Scanner
//!
//! Zero-allocation field extraction over one newline-aligned chunk.
//!
//! Records are the maximal spans strictly between `\n` delimiters. Within a
//! record, each tracked field is located by a bounded substring search for
//! its literal marker; fields may appear in any order. The schema is fixed
//! (four fields), so this is a micro-parser, not a JSON parser: nothing is
//! validated beyond the tokens we extract.
//!
//! ## Field Outcomes
//!
//! Every field extraction is tri-state:
//!
//! - **Found**: marker present, token parsed; the field contributes.
//! - **Missing**: marker absent; the field is skipped but the record still
//!   counts toward `events_processed`.
//! - **Malformed**: marker present, token unparsable; the field is skipped
//!   and the shard's `parse_failures` diagnostic counter increments. A
//!   malformed token is never treated as zero and never aborts the run.
//!
//! Numeric tokens end at the first `,`, `}` or end of record (the original
//! line format carries a closing brace after its last field); the service
//! token ends at its closing quote, and an unterminated quote counts as
//! malformed.
//!
//! The scanner holds only precompiled marker finders, so one instance is
//! shared read-only across all workers. All mutation lands in the
//! task-owned [`PartialResult`]; concurrently running scans share nothing.

use memchr::memchr;
use memchr::memchr2;
use memchr::memchr_iter;
use memchr::memmem::Finder;

use crate::aggregate::PartialResult;

const TIMESTAMP_MARKER: &[u8] = b"\"timestamp\":";
const STATUS_MARKER: &[u8] = b"\"status\":";
const LATENCY_MARKER: &[u8] = b"\"latency_ms\":";
const SERVICE_MARKER: &[u8] = b"\"service\":\"";

/// Status code treated as success; anything else is an error event.
pub const STATUS_OK: i64 = 200;

/// Outcome of extracting one field from one record.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum FieldValue<T> {
    Found(T),
    Missing,
    Malformed,
}

/// Reusable field extractor; safe to share across worker threads.
pub struct RecordScanner {
    timestamp: Finder<'static>,
    status: Finder<'static>,
    latency: Finder<'static>,
    service: Finder<'static>,
}

impl RecordScanner {
    pub fn new() -> Self {
        Self {
            timestamp: Finder::new(TIMESTAMP_MARKER),
            status: Finder::new(STATUS_MARKER),
            latency: Finder::new(LATENCY_MARKER),
            service: Finder::new(SERVICE_MARKER),
        }
    }

    /// Scans every complete record in `bytes`, folding each into `out`.
    ///
    /// Bytes after the final `\n` form an unterminated trailing record and
    /// are dropped; chunk planning guarantees that only the end of the
    /// whole input can produce one.
    pub fn scan_chunk(&self, bytes: &[u8], out: &mut PartialResult) {
        let mut start = 0usize;
        for nl in memchr_iter(b'\n', bytes) {
            self.scan_record(&bytes[start..nl], out);
            start = nl + 1;
        }
    }

    fn scan_record(&self, record: &[u8], out: &mut PartialResult) {
        // Timestamp is parsed for schema conformance but unused downstream.
        if let FieldValue::Malformed = self.int_field(&self.timestamp, TIMESTAMP_MARKER, record) {
            out.parse_failures += 1;
        }

        match self.int_field(&self.status, STATUS_MARKER, record) {
            FieldValue::Found(status) => {
                if status != STATUS_OK {
                    out.errors += 1;
                }
            }
            FieldValue::Missing => {}
            FieldValue::Malformed => out.parse_failures += 1,
        }

        match self.float_field(&self.latency, LATENCY_MARKER, record) {
            FieldValue::Found(ms) => out.record_latency(ms),
            FieldValue::Missing => {}
            FieldValue::Malformed => out.parse_failures += 1,
        }

        match self.service_field(record) {
            FieldValue::Found(service) => out.record_service(service),
            FieldValue::Missing => {}
            FieldValue::Malformed => out.parse_failures += 1,
        }

        out.events_processed += 1;
    }

    fn int_field(&self, finder: &Finder<'_>, marker: &[u8], record: &[u8]) -> FieldValue<i64> {
        match numeric_token(finder, marker, record) {
            FieldValue::Found(token) => match parse_ascii::<i64>(token) {
                Some(value) => FieldValue::Found(value),
                None => FieldValue::Malformed,
            },
            FieldValue::Missing => FieldValue::Missing,
            FieldValue::Malformed => FieldValue::Malformed,
        }
    }

    fn float_field(&self, finder: &Finder<'_>, marker: &[u8], record: &[u8]) -> FieldValue<f64> {
        match numeric_token(finder, marker, record) {
            FieldValue::Found(token) => match parse_ascii::<f64>(token) {
                Some(value) if value.is_finite() => FieldValue::Found(value),
                _ => FieldValue::Malformed,
            },
            FieldValue::Missing => FieldValue::Missing,
            FieldValue::Malformed => FieldValue::Malformed,
        }
    }

    fn service_field<'a>(&self, record: &'a [u8]) -> FieldValue<&'a str> {
        let Some(at) = self.service.find(record) else {
            return FieldValue::Missing;
        };
        let rest = &record[at + SERVICE_MARKER.len()..];
        let Some(end) = memchr(b'"', rest) else {
            return FieldValue::Malformed;
        };
        match std::str::from_utf8(&rest[..end]) {
            Ok(name) if !name.is_empty() => FieldValue::Found(name),
            _ => FieldValue::Malformed,
        }
    }
}

impl Default for RecordScanner {
    fn default() -> Self {
        Self::new()
    }
}

/// Extracts a raw numeric token after `marker`, ending at the first `,`,
/// `}` or end of record.
fn numeric_token<'a>(
    finder: &Finder<'_>,
    marker: &[u8],
    record: &'a [u8],
) -> FieldValue<&'a [u8]> {
    let Some(at) = finder.find(record) else {
        return FieldValue::Missing;
    };
    let rest = &record[at + marker.len()..];
    let end = memchr2(b',', b'}', rest).unwrap_or(rest.len());
    let token = &rest[..end];
    if token.is_empty() {
        FieldValue::Malformed
    } else {
        FieldValue::Found(token)
    }
}

fn parse_ascii<T: std::str::FromStr>(token: &[u8]) -> Option<T> {
    std::str::from_utf8(token).ok()?.trim().parse().ok()
}
