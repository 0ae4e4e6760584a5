//! Validated signal types: single traces and 2D images.

use crate::error::WarpError;
use crate::sampling::Sampling;

/// Owned, validated seismic trace. Non-empty, all samples finite, with an
/// explicit sampling descriptor.
#[derive(Debug, Clone, PartialEq)]
pub struct Trace {
    sampling: Sampling,
    values: Vec<f64>,
}

impl Trace {
    /// Create a trace, validating that `values` matches the sampling count
    /// and contains only finite samples.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`WarpError::SampleCountMismatch`] | `values.len() != sampling.count()` |
    /// | [`WarpError::NonFiniteSample`] | Any sample is NaN or infinite |
    pub fn new(sampling: Sampling, values: Vec<f64>) -> Result<Self, WarpError> {
        if values.len() != sampling.count() {
            return Err(WarpError::SampleCountMismatch {
                expected: sampling.count(),
                got: values.len(),
            });
        }
        if let Some(index) = values.iter().position(|v| !v.is_finite()) {
            return Err(WarpError::NonFiniteSample { index });
        }
        Ok(Self { sampling, values })
    }

    /// Create a trace from values already known to be finite.
    pub(crate) fn new_unchecked(sampling: Sampling, values: Vec<f64>) -> Self {
        debug_assert_eq!(values.len(), sampling.count());
        Self { sampling, values }
    }

    /// Borrow this trace as a zero-copy view.
    #[must_use]
    pub fn as_view(&self) -> TraceView<'_> {
        TraceView {
            sampling: self.sampling,
            values: &self.values,
        }
    }

    /// Return the sampling descriptor.
    #[must_use]
    pub fn sampling(&self) -> Sampling {
        self.sampling
    }

    /// Return the number of samples.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Return true if the trace has no samples. Always `false` for traces
    /// built via [`Trace::new`]; provided for the `len_without_is_empty`
    /// convention.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Consume and return the inner sample vector.
    #[must_use]
    pub fn into_values(self) -> Vec<f64> {
        self.values
    }
}

impl AsRef<[f64]> for Trace {
    fn as_ref(&self) -> &[f64] {
        &self.values
    }
}

/// Borrowed view of a trace: sampling descriptor plus sample slice.
#[derive(Debug, Clone, Copy)]
pub struct TraceView<'a> {
    sampling: Sampling,
    values: &'a [f64],
}

impl<'a> TraceView<'a> {
    /// Create a view over a raw slice with the given sampling.
    ///
    /// # Errors
    ///
    /// Same validation as [`Trace::new`].
    pub fn new(sampling: Sampling, values: &'a [f64]) -> Result<Self, WarpError> {
        if values.len() != sampling.count() {
            return Err(WarpError::SampleCountMismatch {
                expected: sampling.count(),
                got: values.len(),
            });
        }
        if let Some(index) = values.iter().position(|v| !v.is_finite()) {
            return Err(WarpError::NonFiniteSample { index });
        }
        Ok(Self { sampling, values })
    }

    pub(crate) fn new_unchecked(sampling: Sampling, values: &'a [f64]) -> Self {
        Self { sampling, values }
    }

    /// Return the underlying slice.
    #[must_use]
    pub fn as_slice(&self) -> &'a [f64] {
        self.values
    }

    /// Return the sampling descriptor.
    #[must_use]
    pub fn sampling(&self) -> Sampling {
        self.sampling
    }

    /// Return the number of samples.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Return true if the view has no samples. Always `false` for views
    /// built via [`TraceView::new`].
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// A 2D seismic section: an ordered sequence of traces sharing one
/// per-trace sampling. Trace order is the second axis and is deterministic.
#[derive(Debug, Clone, PartialEq)]
pub struct Image {
    sampling: Sampling,
    traces: Vec<Vec<f64>>,
}

impl Image {
    /// Create an image from per-trace sample vectors.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`WarpError::EmptyTrace`] | `traces` is empty |
    /// | [`WarpError::SampleCountMismatch`] | Any trace length differs from `sampling.count()` |
    /// | [`WarpError::NonFiniteSample`] | Any sample is NaN or infinite |
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

    /// Return the per-trace sampling descriptor.
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

    /// Borrow trace `index` as a zero-copy view.
    ///
    /// # Panics
    ///
    /// Panics if `index >= n_traces()`.
    #[must_use]
    pub fn trace(&self, index: usize) -> TraceView<'_> {
        TraceView {
            sampling: self.sampling,
            values: &self.traces[index],
        }
    }

    /// Iterate over trace views in trace order.
    pub fn traces(&self) -> impl Iterator<Item = TraceView<'_>> {
        self.traces.iter().map(|t| TraceView {
            sampling: self.sampling,
            values: t,
        })
    }

    /// Return the raw per-trace sample vectors.
    #[must_use]
    pub fn as_rows(&self) -> &[Vec<f64>] {
        &self.traces
    }

    /// Consume and return the per-trace sample vectors.
    #[must_use]
    pub fn into_rows(self) -> Vec<Vec<f64>> {
        self.traces
    }

    /// Minimum sample value over the whole image.
    #[must_use]
    pub fn min(&self) -> f64 {
        self.traces
            .iter()
            .flatten()
            .copied()
            .fold(f64::INFINITY, f64::min)
    }

    /// Maximum sample value over the whole image.
    #[must_use]
    pub fn max(&self) -> f64 {
        self.traces
            .iter()
            .flatten()
            .copied()
            .fold(f64::NEG_INFINITY, f64::max)
    }
}
