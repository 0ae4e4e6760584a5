//! Alignment error surfaces.

use tracing::instrument;

use crate::error::WarpError;
use crate::lag::LagRange;
use crate::trace::{Image, TraceView};

/// Policy for producing error values where a candidate sample index
/// `i + lag` falls outside the valid range. Samples are never read out of
/// bounds; the index is remapped instead.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ErrorExtrapolation {
    /// Clamp the candidate index to the nearest edge sample
    /// (constant-edge replication).
    Clamp,

    /// Mirror the candidate index about the edge sample.
    #[default]
    Reflect,
}

impl ErrorExtrapolation {
    /// Remap an out-of-range sample index into `0..n`.
    ///
    /// `n` must be positive. For `Reflect` the mirror period is `2(n-1)`,
    /// so arbitrarily distant indices fold back into range.
    pub(crate) fn remap(&self, j: i64, n: usize) -> usize {
        let n = n as i64;
        if (0..n).contains(&j) {
            return j as usize;
        }
        match self {
            Self::Clamp => j.clamp(0, n - 1) as usize,
            Self::Reflect => {
                if n == 1 {
                    return 0;
                }
                let period = 2 * (n - 1);
                let mut r = j.rem_euclid(period);
                if r >= n {
                    r = period - r;
                }
                r as usize
            }
        }
    }
}

/// Per-sample, per-lag misfit between a reference trace and a candidate
/// trace: `error[i][l] = (f[i] - g[i + lag(l)])^2`.
///
/// Scratch structure: created per warping pass, discarded once shifts are
/// extracted. Stored row-major, `n_samples` rows of `lags.count()` values.
#[derive(Debug, Clone)]
pub struct ErrorSurface {
    n_samples: usize,
    lags: LagRange,
    values: Vec<f64>,
}

impl ErrorSurface {
    /// Compute the error surface for a trace pair.
    ///
    /// Pure function of its inputs. Candidate samples outside `g` are
    /// produced by `extrapolation`, never by reading out of bounds.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`WarpError::SampleCountMismatch`] | `f` and `g` differ in sample count |
    #[instrument(skip(f, g), fields(n = f.len(), nl = lags.count()))]
    pub fn compute(
        f: TraceView<'_>,
        g: TraceView<'_>,
        lags: LagRange,
        extrapolation: ErrorExtrapolation,
    ) -> Result<Self, WarpError> {
        if f.len() != g.len() {
            return Err(WarpError::SampleCountMismatch {
                expected: f.len(),
                got: g.len(),
            });
        }
        let n = f.len();
        let nl = lags.count();
        let fs = f.as_slice();
        let gs = g.as_slice();

        let mut values = vec![0.0_f64; n * nl];
        for i in 0..n {
            let row = &mut values[i * nl..(i + 1) * nl];
            for (l, lag) in lags.iter() {
                let j = extrapolation.remap(i as i64 + lag, n);
                let d = fs[i] - gs[j];
                row[l] = d * d;
            }
        }
        Ok(Self {
            n_samples: n,
            lags,
            values,
        })
    }

    /// Compute a single stacked error surface for an image pair by averaging
    /// per-trace errors over all traces.
    ///
    /// Stacking suppresses trace-local noise and yields the laterally
    /// constant bulk shift when solved once and broadcast.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`WarpError::TraceCountMismatch`] | `f` and `g` differ in trace count |
    /// | [`WarpError::SampleCountMismatch`] | `f` and `g` differ in sample count |
    #[instrument(skip(f, g), fields(n = f.n_samples(), n2 = f.n_traces(), nl = lags.count()))]
    pub fn compute_stacked(
        f: &Image,
        g: &Image,
        lags: LagRange,
        extrapolation: ErrorExtrapolation,
    ) -> Result<Self, WarpError> {
        if f.n_traces() != g.n_traces() {
            return Err(WarpError::TraceCountMismatch {
                expected: f.n_traces(),
                got: g.n_traces(),
            });
        }
        if f.n_samples() != g.n_samples() {
            return Err(WarpError::SampleCountMismatch {
                expected: f.n_samples(),
                got: g.n_samples(),
            });
        }
        let n = f.n_samples();
        let nl = lags.count();
        let mut values = vec![0.0_f64; n * nl];

        for (ft, gt) in f.traces().zip(g.traces()) {
            let fs = ft.as_slice();
            let gs = gt.as_slice();
            for i in 0..n {
                let row = &mut values[i * nl..(i + 1) * nl];
                for (l, lag) in lags.iter() {
                    let j = extrapolation.remap(i as i64 + lag, n);
                    let d = fs[i] - gs[j];
                    row[l] += d * d;
                }
            }
        }
        let scale = 1.0 / f.n_traces() as f64;
        for v in &mut values {
            *v *= scale;
        }
        Ok(Self {
            n_samples: n,
            lags,
            values,
        })
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

    /// Return the misfit at sample `i`, lag index `l`.
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

    /// Borrow the row of misfits for sample `i`.
    pub(crate) fn row(&self, i: usize) -> &[f64] {
        let nl = self.lags.count();
        &self.values[i * nl..(i + 1) * nl]
    }

    /// Return a copy smoothed by `rounds` passes of the symmetric
    /// three-point kernel (1/4, 1/2, 1/4) along the sample axis.
    ///
    /// Suppresses per-sample misfit spikes before accumulation so the
    /// optimal path is not distracted by noise. Shape is preserved; edge
    /// samples use replicated neighbors.
    #[must_use]
    pub fn smoothed(&self, rounds: usize) -> Self {
        let n = self.n_samples;
        let nl = self.lags.count();
        let mut curr = self.values.clone();
        let mut next = vec![0.0_f64; n * nl];

        for _ in 0..rounds {
            for i in 0..n {
                let im = i.saturating_sub(1);
                let ip = (i + 1).min(n - 1);
                for l in 0..nl {
                    next[i * nl + l] = 0.25 * curr[im * nl + l]
                        + 0.5 * curr[i * nl + l]
                        + 0.25 * curr[ip * nl + l];
                }
            }
            std::mem::swap(&mut curr, &mut next);
        }

        Self {
            n_samples: n,
            lags: self.lags,
            values: curr,
        }
    }
}
