//! Ratio attributes derived from a combined shift field.

use rayon::prelude::*;
use tracing::instrument;

use crate::error::WarpError;
use crate::shift::ShiftField;
use crate::smooth::{ExponentialSmoother, gaussian_derivative};
use crate::trace::Image;

/// Estimator for velocity-ratio style attributes.
///
/// Given a combined shift field and the sampling-ratio constant `c` between
/// the two registered axes, both attributes are affine-transformed by
/// `2c - 1 + 2c * ratio` and then smoothed by repeated exponential passes
/// to suppress derivative noise.
///
/// # Defaults
///
/// | Parameter | Default |
/// |---|---|
/// | `derivative_sigma` | 1.0 |
/// | `smoothing_sigma` | 1.0 |
/// | `smoothing_passes` | 8 |
#[derive(Debug, Clone, Copy)]
pub struct RatioConfig {
    sampling_ratio: f64,
    derivative_sigma: f64,
    smoothing_sigma: f64,
    smoothing_passes: usize,
}

impl RatioConfig {
    /// Create a ratio estimator for the given sampling-ratio constant.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`WarpError::InvalidSamplingRatio`] | `sampling_ratio` is not positive and finite |
    pub fn new(sampling_ratio: f64) -> Result<Self, WarpError> {
        if !sampling_ratio.is_finite() || sampling_ratio <= 0.0 {
            return Err(WarpError::InvalidSamplingRatio {
                ratio: sampling_ratio,
            });
        }
        Ok(Self {
            sampling_ratio,
            derivative_sigma: 1.0,
            smoothing_sigma: 1.0,
            smoothing_passes: 8,
        })
    }

    /// Set the sigma of the smoothed differentiator used by
    /// [`interval`][Self::interval].
    ///
    /// # Errors
    ///
    /// Returns [`WarpError::InvalidSmoothing`] if `sigma` is not positive
    /// and finite.
    pub fn with_derivative_sigma(mut self, sigma: f64) -> Result<Self, WarpError> {
        if !sigma.is_finite() || sigma <= 0.0 {
            return Err(WarpError::InvalidSmoothing { sigma });
        }
        self.derivative_sigma = sigma;
        Ok(self)
    }

    /// Set the sigma of the post-transform exponential smoothing.
    ///
    /// # Errors
    ///
    /// Returns [`WarpError::InvalidSmoothing`] if `sigma` is not positive
    /// and finite.
    pub fn with_smoothing_sigma(mut self, sigma: f64) -> Result<Self, WarpError> {
        if !sigma.is_finite() || sigma <= 0.0 {
            return Err(WarpError::InvalidSmoothing { sigma });
        }
        self.smoothing_sigma = sigma;
        Ok(self)
    }

    /// Set the number of post-transform smoothing passes. Zero disables
    /// the smoothing entirely.
    #[must_use]
    pub fn with_smoothing_passes(mut self, passes: usize) -> Self {
        self.smoothing_passes = passes;
        self
    }

    /// Return the sampling-ratio constant.
    #[must_use]
    pub fn sampling_ratio(&self) -> f64 {
        self.sampling_ratio
    }

    /// Average ratio: the shift divided by a ramp proportional to sample
    /// index, the mean stretch from the origin to each sample.
    ///
    /// The ramp starts at one, so the attribute is well-defined at sample
    /// zero.
    #[instrument(skip(self, shifts), fields(n2 = shifts.n_traces()))]
    pub fn average(&self, shifts: &ShiftField) -> Result<Image, WarpError> {
        let smoother = ExponentialSmoother::new(self.smoothing_sigma)?;
        let rows: Vec<Vec<f64>> = shifts
            .as_rows()
            .par_iter()
            .map(|u| {
                let mut ut: Vec<f64> = u
                    .iter()
                    .enumerate()
                    .map(|(i, &v)| v / (1.0 + i as f64))
                    .collect();
                self.transform_and_smooth(&mut ut, &smoother);
                ut
            })
            .collect();
        Ok(Image::new_unchecked(shifts.sampling(), rows))
    }

    /// Interval ratio: the derivative of the shift with respect to sample
    /// position, the local position-specific stretch.
    #[instrument(skip(self, shifts), fields(n2 = shifts.n_traces()))]
    pub fn interval(&self, shifts: &ShiftField) -> Result<Image, WarpError> {
        let smoother = ExponentialSmoother::new(self.smoothing_sigma)?;
        // Validate the derivative sigma once before fanning out.
        gaussian_derivative(&[0.0], self.derivative_sigma)?;
        let rows: Vec<Vec<f64>> = shifts
            .as_rows()
            .par_iter()
            .map(|u| {
                let mut ut = gaussian_derivative(u, self.derivative_sigma)
                    .expect("sigma validated above");
                self.transform_and_smooth(&mut ut, &smoother);
                ut
            })
            .collect();
        Ok(Image::new_unchecked(shifts.sampling(), rows))
    }

    fn transform_and_smooth(&self, ut: &mut [f64], smoother: &ExponentialSmoother) {
        let c = self.sampling_ratio;
        for v in ut.iter_mut() {
            *v = 2.0 * c - 1.0 + 2.0 * c * *v;
        }
        smoother.apply_repeated(ut, self.smoothing_passes);
    }
}
