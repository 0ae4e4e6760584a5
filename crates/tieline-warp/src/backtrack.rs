//! Reverse pass: extract the minimum-cost shift path.

use tracing::instrument;

use crate::accumulate::{AccumulatedCost, min_reachable};
use crate::shift::ShiftTrace;

impl AccumulatedCost {
    /// Walk the accumulated costs backward and return the minimum-cost
    /// shift path as shift values in samples.
    ///
    /// The terminal lag minimizes the cost at the last sample, ties broken
    /// smallest-|shift| first (then the smaller shift, so a tie between
    /// `-k` and `+k` is deterministic). Each backward step recomputes the
    /// same reachable-set minimum the forward pass used, so the recovered
    /// path satisfies the strain bound exactly between every adjacent pair
    /// by construction.
    ///
    /// A flat (degenerate) cost surface falls through the tie-breaks to the
    /// smallest-magnitude shift at every sample.
    #[must_use]
    #[instrument(skip(self), fields(n = self.n_samples()))]
    pub fn backtrack_reverse(&self) -> ShiftTrace {
        let n = self.n_samples();
        let lags = self.lags();
        let window = self.window();

        // Terminal lag: minimum cost, then smallest |shift|, then smaller shift.
        let last = self.row(n - 1);
        let mut l = 0_usize;
        for (cand, lag) in lags.iter().skip(1) {
            let better = last[cand] < last[l] || {
                let best_lag = lags.lag(l);
                last[cand] == last[l]
                    && (lag.abs() < best_lag.abs() || (lag.abs() == best_lag.abs() && lag < best_lag))
            };
            if better {
                l = cand;
            }
        }

        let mut path = vec![0_usize; n];
        path[n - 1] = l;
        for i in (1..n).rev() {
            let (prev_l, _) = min_reachable(self.row(i - 1), l, window);
            l = prev_l;
            path[i - 1] = l;
        }

        let shifts: Vec<f64> = path.into_iter().map(|l| lags.lag(l) as f64).collect();
        ShiftTrace::new_unchecked(shifts)
    }
}
