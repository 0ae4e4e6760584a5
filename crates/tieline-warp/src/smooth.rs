//! Recursive exponential smoothing and smoothed differentiation.

use crate::error::WarpError;

/// Zero-phase exponential smoother: a single-pole recursive filter applied
/// forward then backward, parameterized by a Gaussian-equivalent sigma in
/// samples. Constants pass through unchanged.
#[derive(Debug, Clone, Copy)]
pub struct ExponentialSmoother {
    a: f64,
}

impl ExponentialSmoother {
    /// Create a smoother with half-width `sigma` samples.
    ///
    /// The pole `a` is chosen so the two-sided impulse response has the
    /// variance of a Gaussian with the given sigma: `sigma^2 = 2a/(1-a)^2`.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`WarpError::InvalidSmoothing`] | `sigma` is not positive and finite |
    pub fn new(sigma: f64) -> Result<Self, WarpError> {
        if !sigma.is_finite() || sigma <= 0.0 {
            return Err(WarpError::InvalidSmoothing { sigma });
        }
        let ss = sigma * sigma;
        let a = (1.0 + ss - (1.0 + 2.0 * ss).sqrt()) / ss;
        Ok(Self { a })
    }

    /// Return the filter pole.
    #[must_use]
    pub fn pole(&self) -> f64 {
        self.a
    }

    /// Return a smoothed copy of `x`.
    #[must_use]
    pub fn apply(&self, x: &[f64]) -> Vec<f64> {
        let mut y = x.to_vec();
        self.apply_in_place(&mut y);
        y
    }

    /// Smooth `x` in place.
    ///
    /// Forward pass then backward pass, each initialized from the edge
    /// sample (zero-slope boundaries).
    pub fn apply_in_place(&self, x: &mut [f64]) {
        let n = x.len();
        if n < 2 {
            return;
        }
        let a = self.a;
        let b = 1.0 - a;
        for i in 1..n {
            x[i] = a * x[i - 1] + b * x[i];
        }
        for i in (0..n - 1).rev() {
            x[i] = a * x[i + 1] + b * x[i];
        }
    }

    /// Apply `passes` repeated smoothing passes in place.
    pub fn apply_repeated(&self, x: &mut [f64], passes: usize) {
        for _ in 0..passes {
            self.apply_in_place(x);
        }
    }
}

/// Differentiate `x` with a derivative-of-Gaussian kernel of the given
/// sigma, truncated at four sigma and normalized so a unit ramp yields
/// exactly one away from the edges. Edge samples use clamped neighbors.
///
/// # Errors
///
/// | Variant | Condition |
/// |---|---|
/// | [`WarpError::InvalidSmoothing`] | `sigma` is not positive and finite |
pub fn gaussian_derivative(x: &[f64], sigma: f64) -> Result<Vec<f64>, WarpError> {
    if !sigma.is_finite() || sigma <= 0.0 {
        return Err(WarpError::InvalidSmoothing { sigma });
    }
    let n = x.len();
    let m = (4.0 * sigma).ceil() as i64;

    // Antisymmetric taps h[k] = c * (-k) * exp(-k^2 / 2 sigma^2); the
    // normalization c makes the response to a ramp of unit slope equal one.
    let mut norm = 0.0_f64;
    for k in 1..=m {
        let kf = k as f64;
        norm += 2.0 * kf * kf * (-kf * kf / (2.0 * sigma * sigma)).exp();
    }
    let c = 1.0 / norm;

    let mut y = vec![0.0_f64; n];
    for (i, yi) in y.iter_mut().enumerate() {
        let mut acc = 0.0;
        for k in 1..=m {
            let kf = k as f64;
            let w = c * kf * (-kf * kf / (2.0 * sigma * sigma)).exp();
            let behind = x[(i as i64 - k).clamp(0, n as i64 - 1) as usize];
            let ahead = x[(i as i64 + k).clamp(0, n as i64 - 1) as usize];
            acc += w * (ahead - behind);
        }
        *yi = acc;
    }
    Ok(y)
}
