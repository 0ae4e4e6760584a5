//! Band-limited interpolation and uniform resampling.

use std::f64::consts::PI;

use crate::error::WarpError;

/// Windowed-sinc interpolator for uniformly sampled signals.
///
/// Positions are expressed in sample units. Sample reads beyond either end
/// clamp to the edge sample, so extrapolation is constant. Tap weights are
/// renormalized per position, which makes constants interpolate exactly and
/// integer positions reproduce the stored samples.
#[derive(Debug, Clone, Copy)]
pub struct SincInterpolator {
    half_width: usize,
}

impl SincInterpolator {
    /// Create an interpolator using `half_width` taps on each side of the
    /// interpolation point.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`WarpError::InvalidHalfWidth`] | `half_width` is zero |
    pub fn new(half_width: usize) -> Result<Self, WarpError> {
        if half_width == 0 {
            return Err(WarpError::InvalidHalfWidth);
        }
        Ok(Self { half_width })
    }

    /// Return the number of taps on each side.
    #[must_use]
    pub fn half_width(&self) -> usize {
        self.half_width
    }

    /// Interpolate `samples` at fractional position `x`.
    ///
    /// # Panics
    ///
    /// Panics if `samples` is empty.
    #[must_use]
    pub fn interpolate(&self, samples: &[f64], x: f64) -> f64 {
        let n = samples.len();
        assert!(n > 0, "cannot interpolate an empty signal");

        // Exactly on a sample (or beyond the ends): no kernel needed.
        let nearest = x.round();
        if (x - nearest).abs() < 1e-12 {
            let j = (nearest as i64).clamp(0, n as i64 - 1) as usize;
            return samples[j];
        }

        let hw = self.half_width as i64;
        let i0 = x.floor() as i64;
        let mut num = 0.0_f64;
        let mut den = 0.0_f64;
        for j in (i0 - hw + 1)..=(i0 + hw) {
            let t = x - j as f64;
            let w = windowed_sinc(t, self.half_width as f64);
            let s = samples[j.clamp(0, n as i64 - 1) as usize];
            num += w * s;
            den += w;
        }
        num / den
    }

    /// Interpolate `samples` at every position in `positions`.
    #[must_use]
    pub fn resample(&self, samples: &[f64], positions: &[f64]) -> Vec<f64> {
        positions
            .iter()
            .map(|&x| self.interpolate(samples, x))
            .collect()
    }

    /// Uniformly resample `samples` at rate `1/rate`: output sample `i`
    /// takes the value of the input at position `i / rate`. A rate above
    /// one stretches (supersamples) the signal; output length equals input
    /// length, later samples extrapolating constantly once `i / rate`
    /// passes the end.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`WarpError::InvalidSamplingRatio`] | `rate` is not positive and finite |
    pub fn stretch(&self, samples: &[f64], rate: f64) -> Result<Vec<f64>, WarpError> {
        if !rate.is_finite() || rate <= 0.0 {
            return Err(WarpError::InvalidSamplingRatio { ratio: rate });
        }
        Ok((0..samples.len())
            .map(|i| self.interpolate(samples, i as f64 / rate))
            .collect())
    }
}

impl Default for SincInterpolator {
    /// Eight taps per side.
    fn default() -> Self {
        Self { half_width: 8 }
    }
}

/// Hann-windowed sinc kernel with support `[-half, half]`.
fn windowed_sinc(t: f64, half: f64) -> f64 {
    if t.abs() >= half {
        return 0.0;
    }
    let sinc = if t == 0.0 { 1.0 } else { (PI * t).sin() / (PI * t) };
    let hann = 0.5 * (1.0 + (PI * t / half).cos());
    sinc * hann
}
