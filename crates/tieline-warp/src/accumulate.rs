//! Strain-limited forward accumulation of alignment errors.

use tracing::instrument;

use crate::lag::LagRange;
use crate::surface::ErrorSurface;

/// Minimum cumulative cost reachable at each `(sample, lag)` under the
/// strain constraint. Same shape as the [`ErrorSurface`] it accumulates.
///
/// Scratch structure, like the error surface: built per warping pass and
/// discarded once the shift path is extracted. Costs grow without
/// normalization; only relative ordering within a sample position matters
/// to the backtrack.
#[derive(Debug, Clone)]
pub struct AccumulatedCost {
    n_samples: usize,
    lags: LagRange,
    window: usize,
    values: Vec<f64>,
}

impl AccumulatedCost {
    /// Accumulate minimum cumulative costs forward over the error surface.
    ///
    /// `window` is the strain limit in lag indices per sample step: lag `l`
    /// at sample `i` is reachable from lag `l'` at sample `i - 1` iff
    /// `|l - l'| <= window`. Reachable sets truncate at the lag-range edges;
    /// no out-of-range lag is ever referenced. A window of zero locks the
    /// path to a constant lag.
    ///
    /// Runs in O(n * nl * window) time.
    #[must_use]
    #[instrument(skip(errors), fields(n = errors.n_samples(), nl = errors.lags().count(), window))]
    pub fn accumulate(errors: &ErrorSurface, window: usize) -> Self {
        let n = errors.n_samples();
        let nl = errors.lags().count();
        let mut values = vec![0.0_f64; n * nl];

        values[..nl].copy_from_slice(errors.row(0));

        for i in 1..n {
            let (done, rest) = values.split_at_mut(i * nl);
            let prev = &done[(i - 1) * nl..];
            let curr = &mut rest[..nl];
            let err = errors.row(i);
            for l in 0..nl {
                let (_, min_prev) = min_reachable(prev, l, window);
                curr[l] = err[l] + min_prev;
            }
        }

        Self {
            n_samples: n,
            lags: errors.lags(),
            window,
            values,
        }
    }

    /// Return the number of sample positions.
    #[must_use]
    pub fn n_samples(&self) -> usize {
        self.n_samples
    }

    /// Return the lag range.
    #[must_use]
    pub fn lags(&self) -> LagRange {
        self.lags
    }

    /// Return the strain window used during accumulation, in lag indices
    /// per sample step.
    #[must_use]
    pub fn window(&self) -> usize {
        self.window
    }

    /// Return the accumulated cost at sample `i`, lag index `l`.
    ///
    /// # Panics
    ///
    /// Panics if `i` or `l` is out of range.
    #[must_use]
    pub fn get(&self, i: usize, l: usize) -> f64 {
        assert!(i < self.n_samples, "sample index {i} out of range");
        assert!(l < self.lags.count(), "lag index {l} out of range");
        self.values[i * self.lags.count() + l]
    }

    pub(crate) fn row(&self, i: usize) -> &[f64] {
        let nl = self.lags.count();
        &self.values[i * nl..(i + 1) * nl]
    }
}

/// Minimum over the reachable predecessor lags of `prev`, for lag `l` with
/// the given strain window.
///
/// Candidates are scanned in order of increasing `|l - l'|`, decrement
/// before increment at equal distance, and only a strictly smaller cost
/// replaces the current best. Ties therefore resolve to the smallest lag
/// change, biased toward no change. The backtracker reuses this exact scan
/// so forward and reverse passes agree on every tie.
pub(crate) fn min_reachable(prev: &[f64], l: usize, window: usize) -> (usize, f64) {
    let nl = prev.len();
    let mut best_l = l;
    let mut best = prev[l];
    for d in 1..=window {
        if let Some(lm) = l.checked_sub(d) {
            if prev[lm] < best {
                best = prev[lm];
                best_l = lm;
            }
        }
        let lp = l + d;
        if lp < nl && prev[lp] < best {
            best = prev[lp];
            best_l = lp;
        }
    }
    (best_l, best)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sampling::Sampling;
    use crate::surface::ErrorExtrapolation;
    use crate::trace::Trace;

    fn surface(f: Vec<f64>, g: Vec<f64>, lags: LagRange) -> ErrorSurface {
        let sampling = Sampling::unit(f.len()).unwrap();
        let f = Trace::new(sampling, f).unwrap();
        let g = Trace::new(sampling, g).unwrap();
        ErrorSurface::compute(f.as_view(), g.as_view(), lags, ErrorExtrapolation::Clamp).unwrap()
    }

    #[test]
    fn base_row_equals_error_row() {
        let lags = LagRange::symmetric(2).unwrap();
        let e = surface(vec![1.0, 2.0, 3.0], vec![3.0, 2.0, 1.0], lags);
        let d = AccumulatedCost::accumulate(&e, 1);
        for l in 0..lags.count() {
            assert_eq!(d.get(0, l), e.get(0, l));
        }
    }

    #[test]
    fn costs_are_monotone_along_samples() {
        // Errors are non-negative, so the minimum reachable cost never
        // decreases from one sample to the next.
        let lags = LagRange::symmetric(3).unwrap();
        let e = surface(
            vec![0.0, 1.0, -1.0, 2.0, 0.5, -0.5],
            vec![1.0, -1.0, 2.0, 0.5, -0.5, 0.0],
            lags,
        );
        let d = AccumulatedCost::accumulate(&e, 1);
        for i in 1..6 {
            let prev_min = d.row(i - 1).iter().copied().fold(f64::INFINITY, f64::min);
            let curr_min = d.row(i).iter().copied().fold(f64::INFINITY, f64::min);
            assert!(curr_min >= prev_min - 1e-12);
        }
    }

    #[test]
    fn window_zero_accumulates_columns_independently() {
        let lags = LagRange::symmetric(1).unwrap();
        let e = surface(vec![1.0, 2.0, 3.0], vec![0.0, 0.0, 0.0], lags);
        let d = AccumulatedCost::accumulate(&e, 0);
        for l in 0..lags.count() {
            let expected = e.get(0, l) + e.get(1, l) + e.get(2, l);
            assert!((d.get(2, l) - expected).abs() < 1e-12);
        }
    }

    #[test]
    fn single_sample_has_no_predecessors() {
        let lags = LagRange::symmetric(2).unwrap();
        let e = surface(vec![1.5], vec![0.5], lags);
        let d = AccumulatedCost::accumulate(&e, 1);
        assert_eq!(d.n_samples(), 1);
        for l in 0..lags.count() {
            assert_eq!(d.get(0, l), e.get(0, l));
        }
    }

    #[test]
    fn min_reachable_prefers_no_change_on_ties() {
        let prev = [1.0, 1.0, 1.0, 1.0, 1.0];
        let (l, v) = min_reachable(&prev, 2, 2);
        assert_eq!(l, 2);
        assert_eq!(v, 1.0);
    }

    #[test]
    fn min_reachable_prefers_decrement_at_equal_distance() {
        let prev = [5.0, 0.0, 5.0, 0.0, 5.0];
        let (l, _) = min_reachable(&prev, 2, 1);
        assert_eq!(l, 1);
    }

    #[test]
    fn min_reachable_truncates_at_edges() {
        let prev = [1.0, 2.0, 3.0];
        let (l, v) = min_reachable(&prev, 0, 5);
        assert_eq!(l, 0);
        assert_eq!(v, 1.0);
        let (l, v) = min_reachable(&prev, 2, 5);
        assert_eq!(l, 0);
        assert_eq!(v, 1.0);
    }

    #[test]
    fn min_reachable_finds_strictly_smaller_neighbor() {
        let prev = [3.0, 1.0, 2.0];
        let (l, v) = min_reachable(&prev, 2, 1);
        assert_eq!(l, 1);
        assert_eq!(v, 1.0);
    }
}
