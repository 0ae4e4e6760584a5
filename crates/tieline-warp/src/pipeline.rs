//! Two-pass registration pipeline.

use tracing::{info, instrument};

use crate::attributes::RatioConfig;
use crate::compose::{ShiftComposer, apply_shifts_image};
use crate::error::WarpError;
use crate::interp::SincInterpolator;
use crate::shift::{ShiftField, ShiftTrace};
use crate::trace::Image;
use crate::warp::WarpConfig;

/// Configuration of the full two-pass registration.
///
/// The coarse pass solves one strain-limited path on trace-averaged errors
/// over a wide lag range and broadcasts the resulting bulk correction; the
/// fine pass re-registers every trace of the once-warped candidate over a
/// narrow lag range. The two shift fields are composed by resampling, and
/// ratio attributes are estimated from the combined field.
#[derive(Debug, Clone, Copy)]
pub struct RegistrationConfig {
    coarse: WarpConfig,
    fine: WarpConfig,
    ratio: RatioConfig,
    interpolator: SincInterpolator,
}

impl RegistrationConfig {
    /// Create a registration configuration.
    ///
    /// `sampling_ratio` is the step ratio between the candidate and
    /// reference axes, used by the attribute estimator.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`WarpError::InvalidSamplingRatio`] | `sampling_ratio` is not positive and finite |
    pub fn new(
        coarse: WarpConfig,
        fine: WarpConfig,
        sampling_ratio: f64,
    ) -> Result<Self, WarpError> {
        Ok(Self {
            coarse,
            fine,
            ratio: RatioConfig::new(sampling_ratio)?,
            interpolator: SincInterpolator::default(),
        })
    }

    /// Override the interpolator used for warping and composition.
    #[must_use]
    pub fn with_interpolator(mut self, interpolator: SincInterpolator) -> Self {
        self.interpolator = interpolator;
        self
    }

    /// Override the attribute estimator.
    #[must_use]
    pub fn with_ratio(mut self, ratio: RatioConfig) -> Self {
        self.ratio = ratio;
        self
    }

    /// Return the coarse pass configuration.
    #[must_use]
    pub fn coarse(&self) -> WarpConfig {
        self.coarse
    }

    /// Return the fine pass configuration.
    #[must_use]
    pub fn fine(&self) -> WarpConfig {
        self.fine
    }

    /// Register candidate image `g` to reference image `f`.
    ///
    /// Inputs must already share a sample grid (stretch the reference with
    /// [`crate::prep::stretch`] first when the axes were recorded at
    /// different steps).
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`WarpError::TraceCountMismatch`] | `f` and `g` differ in trace count |
    /// | [`WarpError::SampleCountMismatch`] | `f` and `g` differ in sample count |
    /// | [`WarpError::InvalidSmoothing`] | A configured smoothing sigma is invalid |
    #[instrument(skip(self, f, g), fields(n = f.n_samples(), n2 = f.n_traces()))]
    pub fn run(&self, f: &Image, g: &Image) -> Result<RegistrationResult, WarpError> {
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

        // Pass one: bulk correction from stacked errors, broadcast to all
        // traces, applied to the candidate.
        let coarse_shifts = self.coarse.find_shifts_stacked(f, g)?;
        info!(
            min = coarse_shifts.min(),
            max = coarse_shifts.max(),
            "coarse shifts"
        );
        let coarse_field = ShiftField::broadcast(&coarse_shifts, g.n_traces(), f.sampling());
        let first_warp = apply_shifts_image(g, &coarse_field, &self.interpolator)?;

        // Pass two: per-trace residual shifts against the once-warped
        // candidate.
        let fine_shifts = self.fine.find_shifts_image(f, &first_warp)?;
        info!(min = fine_shifts.min(), max = fine_shifts.max(), "fine shifts");
        let registered = apply_shifts_image(&first_warp, &fine_shifts, &self.interpolator)?;

        // Compose: the coarse contribution is resampled at the positions
        // the fine field points at, then summed.
        let composer = ShiftComposer::new(self.interpolator);
        let combined_shifts = composer.compose(&coarse_field, &fine_shifts)?;

        let average_ratio = self.ratio.average(&combined_shifts)?;
        let interval_ratio = self.ratio.interval(&combined_shifts)?;
        info!("registration complete");

        Ok(RegistrationResult {
            coarse_shifts,
            fine_shifts,
            combined_shifts,
            first_warp,
            registered,
            average_ratio,
            interval_ratio,
        })
    }
}

/// Everything the two-pass registration produces.
#[derive(Debug, Clone)]
pub struct RegistrationResult {
    /// Bulk shift trace from pass one, shared by every trace.
    pub coarse_shifts: ShiftTrace,
    /// Per-trace residual shifts from pass two.
    pub fine_shifts: ShiftField,
    /// Composed total shifts.
    pub combined_shifts: ShiftField,
    /// Candidate image after the coarse correction.
    pub first_warp: Image,
    /// Candidate image after both corrections.
    pub registered: Image,
    /// Average (origin-to-sample) ratio attribute.
    pub average_ratio: Image,
    /// Interval (local) ratio attribute.
    pub interval_ratio: Image,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lag::LagRange;
    use crate::sampling::Sampling;

    fn configs() -> RegistrationConfig {
        let coarse = WarpConfig::new(LagRange::new(0, 8).unwrap(), 1.0)
            .unwrap()
            .with_shift_smoothing(4.0)
            .unwrap();
        let fine = WarpConfig::new(LagRange::symmetric(3).unwrap(), 1.0)
            .unwrap()
            .with_error_smoothing(2)
            .with_shift_smoothing(1.0)
            .unwrap();
        RegistrationConfig::new(coarse, fine, 1.5).unwrap()
    }

    fn wiggle(n: usize, phase: f64) -> Vec<f64> {
        (0..n)
            .map(|i| (i as f64 * 0.37 + phase).sin() + 0.4 * (i as f64 * 0.11 + phase).cos())
            .collect()
    }

    #[test]
    fn rejects_shape_mismatch() {
        let s8 = Sampling::unit(8).unwrap();
        let f = Image::new(s8, vec![wiggle(8, 0.0); 2]).unwrap();
        let g = Image::new(s8, vec![wiggle(8, 0.0); 3]).unwrap();
        assert!(matches!(
            configs().run(&f, &g),
            Err(WarpError::TraceCountMismatch { expected: 2, got: 3 })
        ));
    }

    #[test]
    fn identical_images_register_with_near_zero_shifts() {
        let n = 64;
        let sampling = Sampling::unit(n).unwrap();
        let rows: Vec<Vec<f64>> = (0..4).map(|t| wiggle(n, t as f64 * 0.2)).collect();
        let f = Image::new(sampling, rows.clone()).unwrap();
        let g = Image::new(sampling, rows).unwrap();
        let result = configs().run(&f, &g).unwrap();
        // Smoothing spreads edge effects, so allow a small tolerance.
        for t in 0..4 {
            for &u in result.combined_shifts.trace(t) {
                assert!(u.abs() < 0.5, "shift {u}");
            }
        }
    }

    #[test]
    fn result_shapes_match_inputs() {
        let n = 48;
        let sampling = Sampling::unit(n).unwrap();
        let f_rows: Vec<Vec<f64>> = (0..3).map(|t| wiggle(n, t as f64 * 0.3)).collect();
        let g_rows: Vec<Vec<f64>> = (0..3).map(|t| wiggle(n, t as f64 * 0.3 + 1.0)).collect();
        let f = Image::new(sampling, f_rows).unwrap();
        let g = Image::new(sampling, g_rows).unwrap();
        let result = configs().run(&f, &g).unwrap();
        assert_eq!(result.coarse_shifts.len(), n);
        assert_eq!(result.fine_shifts.n_traces(), 3);
        assert_eq!(result.combined_shifts.n_samples(), n);
        assert_eq!(result.registered.n_traces(), 3);
        assert_eq!(result.average_ratio.n_samples(), n);
        assert_eq!(result.interval_ratio.n_traces(), 3);
    }
}
