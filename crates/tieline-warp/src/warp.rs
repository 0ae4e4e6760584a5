//! Warping pass configuration and shift estimation.

use rayon::prelude::*;
use tracing::{debug, instrument};

use crate::accumulate::AccumulatedCost;
use crate::error::WarpError;
use crate::lag::LagRange;
use crate::shift::{ShiftField, ShiftTrace};
use crate::smooth::ExponentialSmoother;
use crate::surface::{ErrorExtrapolation, ErrorSurface};
use crate::trace::{Image, TraceView};

/// Configuration for one warping pass: error surface, strain-limited
/// accumulation, backtrack, and optional shift smoothing.
///
/// Construct via [`WarpConfig::new`], then chain `with_*` methods to
/// override defaults.
///
/// # Defaults
///
/// | Parameter | Default |
/// |---|---|
/// | `error_smoothing` | 0 rounds |
/// | `shift_smoothing` | none |
/// | `extrapolation` | [`ErrorExtrapolation::Reflect`] |
#[derive(Debug, Clone, Copy)]
pub struct WarpConfig {
    lags: LagRange,
    strain_max: f64,
    error_smoothing: usize,
    shift_smoothing: Option<f64>,
    extrapolation: ErrorExtrapolation,
}

impl WarpConfig {
    /// Create a warping pass over the given lag range with the given
    /// maximum strain, in lag indices per sample step.
    ///
    /// The accumulator's reachable window is `floor(strain_max)`; a strain
    /// limit below one therefore locks the path to a constant lag, which is
    /// the bulk-static case.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`WarpError::InvalidStrain`] | `strain_max` is not positive and finite |
    pub fn new(lags: LagRange, strain_max: f64) -> Result<Self, WarpError> {
        if !strain_max.is_finite() || strain_max <= 0.0 {
            return Err(WarpError::InvalidStrain { strain_max });
        }
        Ok(Self {
            lags,
            strain_max,
            error_smoothing: 0,
            shift_smoothing: None,
            extrapolation: ErrorExtrapolation::Reflect,
        })
    }

    /// Set the number of error smoothing rounds applied before
    /// accumulation.
    #[must_use]
    pub fn with_error_smoothing(mut self, rounds: usize) -> Self {
        self.error_smoothing = rounds;
        self
    }

    /// Enable shift smoothing with half-width `sigma` samples.
    ///
    /// # Errors
    ///
    /// Returns [`WarpError::InvalidSmoothing`] if `sigma` is not positive
    /// and finite.
    pub fn with_shift_smoothing(mut self, sigma: f64) -> Result<Self, WarpError> {
        if !sigma.is_finite() || sigma <= 0.0 {
            return Err(WarpError::InvalidSmoothing { sigma });
        }
        self.shift_smoothing = Some(sigma);
        Ok(self)
    }

    /// Set the out-of-range extrapolation policy for the error surface.
    #[must_use]
    pub fn with_extrapolation(mut self, extrapolation: ErrorExtrapolation) -> Self {
        self.extrapolation = extrapolation;
        self
    }

    /// Return the lag range.
    #[must_use]
    pub fn lags(&self) -> LagRange {
        self.lags
    }

    /// Return the configured maximum strain.
    #[must_use]
    pub fn strain_max(&self) -> f64 {
        self.strain_max
    }

    /// Return the accumulator's reachable window in lag indices per sample
    /// step.
    #[must_use]
    pub fn strain_window(&self) -> usize {
        self.strain_max.floor() as usize
    }

    /// Return the error surface extrapolation policy.
    #[must_use]
    pub fn extrapolation(&self) -> ErrorExtrapolation {
        self.extrapolation
    }

    /// Estimate shifts aligning candidate `g` to reference `f`.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`WarpError::SampleCountMismatch`] | `f` and `g` differ in sample count |
    /// | [`WarpError::InvalidSmoothing`] | Configured shift smoothing sigma is invalid |
    #[instrument(skip(self, f, g), fields(n = f.len()))]
    pub fn find_shifts(
        &self,
        f: TraceView<'_>,
        g: TraceView<'_>,
    ) -> Result<ShiftTrace, WarpError> {
        let errors = ErrorSurface::compute(f, g, self.lags, self.extrapolation)?;
        self.solve(errors)
    }

    /// Estimate per-trace shifts for an image pair. Each trace owns its own
    /// scratch surfaces; traces are processed in parallel with no shared
    /// mutable state.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`WarpError::TraceCountMismatch`] | `f` and `g` differ in trace count |
    /// | [`WarpError::SampleCountMismatch`] | `f` and `g` differ in sample count |
    #[instrument(skip(self, f, g), fields(n = f.n_samples(), n2 = f.n_traces()))]
    pub fn find_shifts_image(&self, f: &Image, g: &Image) -> Result<ShiftField, WarpError> {
        if f.n_traces() != g.n_traces() {
            return Err(WarpError::TraceCountMismatch {
                expected: f.n_traces(),
                got: g.n_traces(),
            });
        }
        let rows: Vec<Vec<f64>> = f
            .as_rows()
            .par_iter()
            .zip(g.as_rows().par_iter())
            .map(|(ft, gt)| {
                let fv = TraceView::new_unchecked(f.sampling(), ft);
                let gv = TraceView::new_unchecked(g.sampling(), gt);
                self.find_shifts(fv, gv).map(ShiftTrace::into_values)
            })
            .collect::<Result<_, _>>()?;
        Ok(ShiftField::new_unchecked(f.sampling(), rows))
    }

    /// Estimate one shift trace for an image pair from trace-averaged
    /// errors and broadcast-ready output: the bulk correction shared by
    /// every trace.
    ///
    /// # Errors
    ///
    /// Same conditions as [`find_shifts_image`][Self::find_shifts_image].
    #[instrument(skip(self, f, g), fields(n = f.n_samples(), n2 = f.n_traces()))]
    pub fn find_shifts_stacked(&self, f: &Image, g: &Image) -> Result<ShiftTrace, WarpError> {
        let errors = ErrorSurface::compute_stacked(f, g, self.lags, self.extrapolation)?;
        self.solve(errors)
    }

    fn solve(&self, errors: ErrorSurface) -> Result<ShiftTrace, WarpError> {
        let errors = if self.error_smoothing > 0 {
            errors.smoothed(self.error_smoothing)
        } else {
            errors
        };
        let cost = AccumulatedCost::accumulate(&errors, self.strain_window());
        let shifts = cost.backtrack_reverse();
        debug!(
            min = shifts.min(),
            max = shifts.max(),
            "shift path extracted"
        );
        match self.shift_smoothing {
            Some(sigma) => {
                let smoother = ExponentialSmoother::new(sigma)?;
                Ok(shifts.smoothed(&smoother))
            }
            None => Ok(shifts),
        }
    }
}
