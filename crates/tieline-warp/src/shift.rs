//! Shift fields: the durable output of a warping pass.

use rayon::prelude::*;

use crate::error::WarpError;
use crate::sampling::Sampling;
use crate::smooth::ExponentialSmoother;

/// Per-sample shifts for a single trace, in samples.
///
/// Immutable once produced; smoothing and composition allocate new values.
#[derive(Debug, Clone, PartialEq)]
pub struct ShiftTrace(Vec<f64>);

impl ShiftTrace {
    /// Create a shift trace, validating that it is non-empty and finite.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`WarpError::EmptyTrace`] | `values` is empty |
    /// | [`WarpError::NonFiniteSample`] | Any value is NaN or infinite |
    pub fn new(values: Vec<f64>) -> Result<Self, WarpError> {
        if values.is_empty() {
            return Err(WarpError::EmptyTrace);
        }
        if let Some(index) = values.iter().position(|v| !v.is_finite()) {
            return Err(WarpError::NonFiniteSample { index });
        }
        Ok(Self(values))
    }

    pub(crate) fn new_unchecked(values: Vec<f64>) -> Self {
        Self(values)
    }

    /// Return the shifts as a slice.
    #[must_use]
    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }

    /// Return the number of samples.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Return true if the trace has no samples. Always `false` for traces
    /// built via [`ShiftTrace::new`].
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Return a smoothed copy. The smoother removes sample-to-sample jitter
    /// while preserving the large-scale trend; it does not re-check the
    /// strain bound, so smoothed shifts may violate it mildly. That trade is
    /// deliberate and opted into by calling this.
    #[must_use]
    pub fn smoothed(&self, smoother: &ExponentialSmoother) -> Self {
        Self(smoother.apply(&self.0))
    }

    /// Minimum shift value.
    #[must_use]
    pub fn min(&self) -> f64 {
        self.0.iter().copied().fold(f64::INFINITY, f64::min)
    }

    /// Maximum shift value.
    #[must_use]
    pub fn max(&self) -> f64 {
        self.0.iter().copied().fold(f64::NEG_INFINITY, f64::max)
    }

    /// Consume and return the inner vector.
    #[must_use]
    pub fn into_values(self) -> Vec<f64> {
        self.0
    }
}

impl AsRef<[f64]> for ShiftTrace {
    fn as_ref(&self) -> &[f64] {
        &self.0
    }
}

/// Per-sample shifts for every trace of an image, in samples, with the
/// sample-axis sampling of the image they register.
#[derive(Debug, Clone, PartialEq)]
pub struct ShiftField {
    sampling: Sampling,
    traces: Vec<Vec<f64>>,
}

impl ShiftField {
    /// Create a shift field from per-trace shift vectors.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`WarpError::EmptyTrace`] | `traces` is empty |
    /// | [`WarpError::SampleCountMismatch`] | Any trace length differs from `sampling.count()` |
    /// | [`WarpError::NonFiniteSample`] | Any value is NaN or infinite |
    pub fn new(sampling: Sampling, traces: Vec<Vec<f64>>) -> Result<Self, WarpError> {
        if traces.is_empty() {
            return Err(WarpError::EmptyTrace);
        }
        for trace in &traces {
            if trace.len() != sampling.count() {
                return Err(WarpError::SampleCountMismatch {
                    expected: sampling.count(),
                    got: trace.len(),
                });
            }
            if let Some(index) = trace.iter().position(|v| !v.is_finite()) {
                return Err(WarpError::NonFiniteSample { index });
            }
        }
        Ok(Self { sampling, traces })
    }

    pub(crate) fn new_unchecked(sampling: Sampling, traces: Vec<Vec<f64>>) -> Self {
        debug_assert!(traces.iter().all(|t| t.len() == sampling.count()));
        Self { sampling, traces }
    }

    /// Replicate one shift trace across `n_traces` traces, e.g. to broadcast
    /// a stacked bulk correction over a whole image.
    #[must_use]
    pub fn broadcast(trace: &ShiftTrace, n_traces: usize, sampling: Sampling) -> Self {
        debug_assert_eq!(trace.len(), sampling.count());
        Self {
            sampling,
            traces: vec![trace.as_slice().to_vec(); n_traces],
        }
    }

    /// Return the sample-axis sampling descriptor.
    #[must_use]
    pub fn sampling(&self) -> Sampling {
        self.sampling
    }

    /// Return the number of traces.
    #[must_use]
    pub fn n_traces(&self) -> usize {
        self.traces.len()
    }

    /// Return the number of samples per trace.
    #[must_use]
    pub fn n_samples(&self) -> usize {
        self.sampling.count()
    }

    /// Borrow the shifts of trace `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index >= n_traces()`.
    #[must_use]
    pub fn trace(&self, index: usize) -> &[f64] {
        &self.traces[index]
    }

    /// Return the raw per-trace shift vectors.
    #[must_use]
    pub fn as_rows(&self) -> &[Vec<f64>] {
        &self.traces
    }

    /// Return a copy with every trace smoothed independently.
    ///
    /// Same caveat as [`ShiftTrace::smoothed`]: the strain bound is not
    /// re-checked after smoothing.
    #[must_use]
    pub fn smoothed(&self, smoother: &ExponentialSmoother) -> Self {
        let traces: Vec<Vec<f64>> = self
            .traces
            .par_iter()
            .map(|t| smoother.apply(t))
            .collect();
        Self {
            sampling: self.sampling,
            traces,
        }
    }

    /// Minimum shift value over the whole field.
    #[must_use]
    pub fn min(&self) -> f64 {
        self.traces
            .iter()
            .flatten()
            .copied()
            .fold(f64::INFINITY, f64::min)
    }

    /// Maximum shift value over the whole field.
    #[must_use]
    pub fn max(&self) -> f64 {
        self.traces
            .iter()
            .flatten()
            .copied()
            .fold(f64::NEG_INFINITY, f64::max)
    }

    /// Consume and return the per-trace shift vectors.
    #[must_use]
    pub fn into_rows(self) -> Vec<Vec<f64>> {
        self.traces
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_empty() {
        assert!(matches!(ShiftTrace::new(vec![]), Err(WarpError::EmptyTrace)));
    }

    #[test]
    fn rejects_nan() {
        let result = ShiftTrace::new(vec![0.0, f64::NAN]);
        assert!(matches!(result, Err(WarpError::NonFiniteSample { index: 1 })));
    }

    #[test]
    fn min_max() {
        let u = ShiftTrace::new(vec![-1.0, 4.0, 2.0]).unwrap();
        assert_eq!(u.min(), -1.0);
        assert_eq!(u.max(), 4.0);
    }

    #[test]
    fn broadcast_replicates_trace() {
        let sampling = Sampling::unit(3).unwrap();
        let u = ShiftTrace::new(vec![1.0, 2.0, 3.0]).unwrap();
        let field = ShiftField::broadcast(&u, 4, sampling);
        assert_eq!(field.n_traces(), 4);
        for i in 0..4 {
            assert_eq!(field.trace(i), &[1.0, 2.0, 3.0]);
        }
    }

    #[test]
    fn field_rejects_ragged_rows() {
        let sampling = Sampling::unit(2).unwrap();
        let result = ShiftField::new(sampling, vec![vec![0.0, 0.0], vec![0.0]]);
        assert!(matches!(
            result,
            Err(WarpError::SampleCountMismatch { expected: 2, got: 1 })
        ));
    }

    #[test]
    fn smoothing_preserves_constant_field() {
        let sampling = Sampling::unit(8).unwrap();
        let field = ShiftField::new(sampling, vec![vec![3.0; 8]; 2]).unwrap();
        let smoother = ExponentialSmoother::new(2.0).unwrap();
        let out = field.smoothed(&smoother);
        for t in 0..2 {
            for &v in out.trace(t) {
                assert!((v - 3.0).abs() < 1e-12);
            }
        }
    }
}
