//! # P² Streaming Quantile Estimator
//!
//! Single-pass, constant-memory estimation of one order statistic using the
//! Jain/Chlamtac P² algorithm: five markers track the running minimum, the
//! target quantile, the midpoints on either side of it, and the running
//! maximum, approximating the cumulative distribution near the target.
//!
//! ## State
//!
//! | Field       | Meaning                                                  |
//! |-------------|----------------------------------------------------------|
//! | `heights`   | Marker heights; `heights[2]` is the current estimate     |
//! | `positions` | Integer actual positions, strictly increasing            |
//! | `desired`   | Fractional ideal positions, advanced every observation   |
//! | `increments`| Fixed per-observation advance `{0, p/2, p, (1+p)/2, 1}`  |
//!
//! ## Invariants
//!
//! - Heights are monotonically non-decreasing across the five markers.
//! - Positions are strictly increasing, which keeps every interpolation
//!   denominator non-zero: an interior marker only moves toward a neighbor
//!   whose gap exceeds one.
//! - The estimator is queryable only after five observations; before that
//!   [`quantile`](P2Estimator::quantile) reports not-ready as `None`.
//!
//! ## No Merge Operation
//!
//! Marker state from independently-fitted estimators is not soundly
//! combinable: the markers summarize *where* each stream's observations
//! landed, and averaging heights across streams has no statistical
//! guarantee. Cross-shard aggregation therefore runs on a mergeable digest
//! instead (see `aggregate`), and this type is the authoritative
//! constant-memory path only when a single shard observed the data.
//!
//! This type is deliberately decoupled from the concurrency harness: it is
//! plain sequential state, unit-tested in isolation.

/// Streaming estimator for a single target quantile `p` in `(0, 1)`.
#[derive(Clone, Debug)]
pub struct P2Estimator {
    p: f64,
    count: u64,
    bootstrap: [f64; 5],
    heights: [f64; 5],
    positions: [i64; 5],
    desired: [f64; 5],
    increments: [f64; 5],
}

impl P2Estimator {
    /// Creates an estimator for quantile `p`.
    ///
    /// # Panics
    ///
    /// Panics unless `0 < p < 1`.
    pub fn new(p: f64) -> Self {
        assert!(p > 0.0 && p < 1.0, "quantile must be in (0, 1), got {p}");
        Self {
            p,
            count: 0,
            bootstrap: [0.0; 5],
            heights: [0.0; 5],
            positions: [0; 5],
            desired: [0.0; 5],
            increments: [0.0, p / 2.0, p, (1.0 + p) / 2.0, 1.0],
        }
    }

    /// The target quantile this estimator tracks.
    #[inline]
    pub fn target(&self) -> f64 {
        self.p
    }

    /// Number of observations so far.
    #[inline]
    pub fn count(&self) -> u64 {
        self.count
    }

    /// Feeds one observation.
    pub fn observe(&mut self, x: f64) {
        if self.count < 5 {
            self.bootstrap[self.count as usize] = x;
            self.count += 1;
            if self.count == 5 {
                self.seed_markers();
            }
            return;
        }
        self.count += 1;

        // Locate the bracketing cell, clamping at the extremes: a value
        // below the minimum replaces marker 0 and lands in cell 0, a value
        // above the maximum replaces marker 4 and lands in cell 3.
        let k = if x < self.heights[0] {
            self.heights[0] = x;
            0
        } else if x < self.heights[1] {
            0
        } else if x < self.heights[2] {
            1
        } else if x < self.heights[3] {
            2
        } else if x < self.heights[4] {
            3
        } else {
            self.heights[4] = x;
            3
        };

        for i in (k + 1)..5 {
            self.positions[i] += 1;
        }
        for i in 0..5 {
            self.desired[i] += self.increments[i];
        }

        for i in 1..4 {
            let drift = self.desired[i] - self.positions[i] as f64;
            let gap_right = self.positions[i + 1] - self.positions[i];
            let gap_left = self.positions[i - 1] - self.positions[i];
            if (drift >= 1.0 && gap_right > 1) || (drift <= -1.0 && gap_left < -1) {
                let step: i64 = if drift > 0.0 { 1 } else { -1 };
                let candidate = self.parabolic(i, step);
                self.heights[i] =
                    if self.heights[i - 1] < candidate && candidate < self.heights[i + 1] {
                        candidate
                    } else {
                        self.linear(i, step)
                    };
                self.positions[i] += step;
            }
        }

        debug_assert!(
            self.heights.windows(2).all(|w| w[0] <= w[1]),
            "marker heights must stay non-decreasing"
        );
        debug_assert!(
            self.positions.windows(2).all(|w| w[0] < w[1]),
            "marker positions must stay strictly increasing"
        );
    }

    /// Current estimate: the middle marker's height.
    ///
    /// Returns `None` while fewer than five observations have been made
    /// (the not-ready condition); callers choose their own fallback.
    pub fn quantile(&self) -> Option<f64> {
        if self.count < 5 {
            return None;
        }
        Some(self.heights[2])
    }

    fn seed_markers(&mut self) {
        self.bootstrap.sort_by(f64::total_cmp);
        self.heights = self.bootstrap;
        for (i, pos) in self.positions.iter_mut().enumerate() {
            *pos = i as i64 + 1;
        }
        let p = self.p;
        self.desired = [1.0, 1.0 + 2.0 * p, 1.0 + 4.0 * p, 3.0 + 2.0 * p, 5.0];
    }

    /// Piecewise-parabolic height prediction for interior marker `i` moved
    /// by `d` (±1), from the positions and heights of itself and both
    /// neighbors.
    fn parabolic(&self, i: usize, d: i64) -> f64 {
        let q = &self.heights;
        let n = |j: usize| self.positions[j] as f64;
        let d = d as f64;
        q[i]
            + d / (n(i + 1) - n(i - 1))
                * ((n(i) - n(i - 1) + d) * (q[i + 1] - q[i]) / (n(i + 1) - n(i))
                    + (n(i + 1) - n(i) - d) * (q[i] - q[i - 1]) / (n(i) - n(i - 1)))
    }

    /// Linear fallback when the parabola escapes the neighbor-height interval.
    fn linear(&self, i: usize, d: i64) -> f64 {
        let j = (i as i64 + d) as usize;
        self.heights[i]
            + d as f64 * (self.heights[j] - self.heights[i])
                / (self.positions[j] - self.positions[i]) as f64
    }
}
