//! # Chunk Planning
//!
//! Splits the input byte region into disjoint, newline-aligned ranges, one
//! per worker task.
//!
//! ## Invariants
//!
//! - The union of all planned chunks is exactly `[0, len)`.
//! - Chunks are pairwise disjoint and emitted in ascending order.
//! - Every boundary other than `0` and `len` lies immediately after a `\n`,
//!   so a complete, delimiter-terminated record belongs to exactly one chunk.
//!
//! ## Boundary Rule
//!
//! Naive equal-width boundaries `i * len / workers` are each moved forward to
//! `newline + 1` for the first `\n` at or after the candidate offset. Both
//! sides of an internal boundary derive it the same way, so chunk `i`'s end
//! is always chunk `i + 1`'s start. A candidate with no following newline
//! clamps to `len`, which can make trailing ranges empty; empty ranges are
//! dropped rather than scheduled.
//!
//! ## Known Limitation
//!
//! A trailing record with no terminating `\n` is never observed: the scanner
//! only consumes complete records, and the final chunk ends at `len`. This
//! mirrors the generator contract (every event line is newline-terminated)
//! and is deliberate.
//!
//! ## Performance
//!
//! Planning is O(workers) calls to `memchr`, each scanning at most one
//! record's worth of bytes in the expected case. The scan loop dominates;
//! the planner is not the bottleneck.

use memchr::memchr;

/// A half-open, newline-aligned byte range `[start, end)` of the input.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Chunk {
    pub start: usize,
    pub end: usize,
}

impl Chunk {
    /// Number of bytes covered by this chunk.
    #[inline]
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    /// Returns true when the chunk covers no bytes.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// Borrows this chunk's bytes out of the full input slice.
    #[inline]
    pub fn slice<'a>(&self, bytes: &'a [u8]) -> &'a [u8] {
        &bytes[self.start..self.end]
    }
}

/// Plans up to `workers` newline-aligned chunks over `bytes`.
///
/// Empty input produces no chunks; the caller treats that as the no-data
/// condition. Low-entropy inputs (few or no newlines) can produce fewer
/// chunks than workers, down to a single chunk spanning the whole region.
///
/// # Panics
///
/// Panics if `workers` is zero.
pub fn plan_chunks(bytes: &[u8], workers: usize) -> Vec<Chunk> {
    assert!(workers > 0, "workers must be > 0");

    let len = bytes.len();
    if len == 0 {
        return Vec::new();
    }

    let mut cuts = Vec::with_capacity(workers + 1);
    cuts.push(0usize);
    for i in 1..workers {
        let naive = i * len / workers;
        let cut = match memchr(b'\n', &bytes[naive..]) {
            Some(off) => naive + off + 1,
            None => len,
        };
        cuts.push(cut);
    }
    cuts.push(len);

    // Adjacent cuts can collide when one record spans several naive
    // boundaries; the collapsed ranges are empty and carry no work.
    let mut chunks = Vec::with_capacity(workers);
    for pair in cuts.windows(2) {
        debug_assert!(pair[0] <= pair[1], "cuts must be non-decreasing");
        if pair[0] < pair[1] {
            chunks.push(Chunk {
                start: pair[0],
                end: pair[1],
            });
        }
    }

    debug_assert_eq!(chunks.first().map(|c| c.start), Some(0));
    debug_assert_eq!(chunks.last().map(|c| c.end), Some(len));

    chunks
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_plan_invariants(bytes: &[u8], chunks: &[Chunk]) {
        // Exact cover, in order, pairwise disjoint.
        let mut expected_start = 0usize;
        for chunk in chunks {
            assert_eq!(chunk.start, expected_start);
            assert!(chunk.start < chunk.end);
            expected_start = chunk.end;
        }
        assert_eq!(expected_start, bytes.len());

        // Every internal boundary sits immediately after a newline.
        for chunk in &chunks[1..] {
            assert_eq!(bytes[chunk.start - 1], b'\n', "boundary at {}", chunk.start);
        }
    }

    #[test]
    fn empty_input_plans_nothing() {
        assert!(plan_chunks(b"", 4).is_empty());
    }

    #[test]
    fn single_worker_takes_everything() {
        let bytes = b"a\nb\nc\n";
        let chunks = plan_chunks(bytes, 1);
        assert_eq!(chunks, vec![Chunk { start: 0, end: 6 }]);
    }

    #[test]
    fn boundaries_land_after_newlines() {
        let bytes = b"aaaa\nbbbb\ncccc\ndddd\n";
        for workers in 1..=8 {
            let chunks = plan_chunks(bytes, workers);
            assert_plan_invariants(bytes, &chunks);
        }
    }

    #[test]
    fn input_without_newlines_collapses_to_one_chunk() {
        let bytes = b"no delimiter in sight";
        let chunks = plan_chunks(bytes, 4);
        assert_eq!(
            chunks,
            vec![Chunk {
                start: 0,
                end: bytes.len()
            }]
        );
    }

    #[test]
    fn one_long_record_then_short_ones() {
        // The first record spans several naive boundaries; later cuts must
        // collapse without overlapping or losing coverage.
        let mut bytes = vec![b'x'; 100];
        bytes.push(b'\n');
        bytes.extend_from_slice(b"a\nb\nc\n");
        for workers in 1..=8 {
            let chunks = plan_chunks(&bytes, workers);
            assert_plan_invariants(&bytes, &chunks);
        }
    }

    #[test]
    fn more_workers_than_bytes() {
        let bytes = b"a\n";
        let chunks = plan_chunks(bytes, 16);
        assert_plan_invariants(bytes, &chunks);
        assert_eq!(chunks.len(), 1);
    }

    #[test]
    fn no_record_is_split() {
        // Records are identifiable by content; verify each complete record
        // is fully contained in exactly one chunk.
        let bytes = b"alpha\nbeta\ngamma\ndelta\nepsilon\n";
        for workers in 1..=6 {
            let chunks = plan_chunks(bytes, workers);
            assert_plan_invariants(bytes, &chunks);
            let mut seen = Vec::new();
            for chunk in &chunks {
                for line in chunk.slice(bytes).split(|&b| b == b'\n') {
                    if !line.is_empty() {
                        seen.push(line.to_vec());
                    }
                }
            }
            let expected: Vec<Vec<u8>> = bytes
                .split(|&b| b == b'\n')
                .filter(|l| !l.is_empty())
                .map(|l| l.to_vec())
                .collect();
            assert_eq!(seen, expected, "workers={workers}");
        }
    }
}
