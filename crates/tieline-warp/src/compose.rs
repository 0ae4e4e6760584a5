//! Applying shift fields to signals and composing shift fields.

use rayon::prelude::*;
use tracing::instrument;

use crate::error::WarpError;
use crate::interp::SincInterpolator;
use crate::shift::{ShiftField, ShiftTrace};
use crate::trace::{Image, Trace, TraceView};

/// Warp a trace by a shift field: `h[i] = g(i + u[i])`, band-limited.
///
/// # Errors
///
/// | Variant | Condition |
/// |---|---|
/// | [`WarpError::SampleCountMismatch`] | `shifts` and `g` differ in length |
pub fn apply_shifts(
    g: TraceView<'_>,
    shifts: &ShiftTrace,
    interpolator: &SincInterpolator,
) -> Result<Trace, WarpError> {
    if shifts.len() != g.len() {
        return Err(WarpError::SampleCountMismatch {
            expected: g.len(),
            got: shifts.len(),
        });
    }
    let gs = g.as_slice();
    let warped: Vec<f64> = shifts
        .as_slice()
        .iter()
        .enumerate()
        .map(|(i, &u)| interpolator.interpolate(gs, i as f64 + u))
        .collect();
    Ok(Trace::new_unchecked(g.sampling(), warped))
}

/// Warp every trace of an image by the matching trace of a shift field.
///
/// Traces are independent and processed in parallel.
///
/// # Errors
///
/// | Variant | Condition |
/// |---|---|
/// | [`WarpError::TraceCountMismatch`] | `shifts` and `g` differ in trace count |
/// | [`WarpError::SampleCountMismatch`] | `shifts` and `g` differ in sample count |
#[instrument(skip(g, shifts, interpolator), fields(n2 = g.n_traces()))]
pub fn apply_shifts_image(
    g: &Image,
    shifts: &ShiftField,
    interpolator: &SincInterpolator,
) -> Result<Image, WarpError> {
    if shifts.n_traces() != g.n_traces() {
        return Err(WarpError::TraceCountMismatch {
            expected: g.n_traces(),
            got: shifts.n_traces(),
        });
    }
    if shifts.n_samples() != g.n_samples() {
        return Err(WarpError::SampleCountMismatch {
            expected: g.n_samples(),
            got: shifts.n_samples(),
        });
    }
    let rows: Vec<Vec<f64>> = g
        .as_rows()
        .par_iter()
        .zip(shifts.as_rows().par_iter())
        .map(|(gt, ut)| {
            ut.iter()
                .enumerate()
                .map(|(i, &u)| interpolator.interpolate(gt, i as f64 + u))
                .collect()
        })
        .collect();
    Ok(Image::new_unchecked(g.sampling(), rows))
}

/// Composes two shift fields computed in sequence into one combined field.
///
/// The first field warped the raw candidate; the second was computed
/// against that already-warped signal. The combined shift is therefore
/// `first(i + second[i]) + second[i]`: the first field's contribution is
/// resampled at the position the second field points at, then summed. A
/// naive element-wise sum would be wrong because the two fields were
/// measured on different intermediate signals.
#[derive(Debug, Clone, Copy, Default)]
pub struct ShiftComposer {
    interpolator: SincInterpolator,
}

impl ShiftComposer {
    /// Create a composer using the given interpolator.
    #[must_use]
    pub fn new(interpolator: SincInterpolator) -> Self {
        Self { interpolator }
    }

    /// Compose two single-trace shift sequences.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`WarpError::SampleCountMismatch`] | `first` and `second` differ in length |
    pub fn compose_trace(
        &self,
        first: &ShiftTrace,
        second: &ShiftTrace,
    ) -> Result<ShiftTrace, WarpError> {
        if first.len() != second.len() {
            return Err(WarpError::SampleCountMismatch {
                expected: first.len(),
                got: second.len(),
            });
        }
        Ok(ShiftTrace::new_unchecked(self.compose_row(
            first.as_slice(),
            second.as_slice(),
        )))
    }

    /// Compose two shift fields trace by trace.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`WarpError::TraceCountMismatch`] | `first` and `second` differ in trace count |
    /// | [`WarpError::SampleCountMismatch`] | `first` and `second` differ in sample count |
    #[instrument(skip(self, first, second), fields(n2 = first.n_traces()))]
    pub fn compose(
        &self,
        first: &ShiftField,
        second: &ShiftField,
    ) -> Result<ShiftField, WarpError> {
        if first.n_traces() != second.n_traces() {
            return Err(WarpError::TraceCountMismatch {
                expected: first.n_traces(),
                got: second.n_traces(),
            });
        }
        if first.n_samples() != second.n_samples() {
            return Err(WarpError::SampleCountMismatch {
                expected: first.n_samples(),
                got: second.n_samples(),
            });
        }
        let rows: Vec<Vec<f64>> = first
            .as_rows()
            .par_iter()
            .zip(second.as_rows().par_iter())
            .map(|(u1, u2)| self.compose_row(u1, u2))
            .collect();
        Ok(ShiftField::new_unchecked(first.sampling(), rows))
    }

    fn compose_row(&self, first: &[f64], second: &[f64]) -> Vec<f64> {
        second
            .iter()
            .enumerate()
            .map(|(i, &u2)| self.interpolator.interpolate(first, i as f64 + u2) + u2)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sampling::Sampling;

    fn shift_trace(values: Vec<f64>) -> ShiftTrace {
        ShiftTrace::new(values).unwrap()
    }

    #[test]
    fn constant_fields_compose_to_their_sum() {
        let composer = ShiftComposer::default();
        let a = shift_trace(vec![3.0; 12]);
        let b = shift_trace(vec![-1.5; 12]);
        let c = composer.compose_trace(&a, &b).unwrap();
        for &v in c.as_slice() {
            assert!((v - 1.5).abs() < 1e-12);
        }
    }

    #[test]
    fn zero_second_field_is_identity() {
        let composer = ShiftComposer::default();
        let a = shift_trace(vec![0.0, 1.0, 2.0, 3.0, 2.0, 1.0, 0.0, 0.0]);
        let b = shift_trace(vec![0.0; 8]);
        let c = composer.compose_trace(&a, &b).unwrap();
        for (got, expected) in c.as_slice().iter().zip(a.as_slice()) {
            assert!((got - expected).abs() < 1e-12);
        }
    }

    #[test]
    fn compose_rejects_length_mismatch() {
        let composer = ShiftComposer::default();
        let a = shift_trace(vec![0.0; 4]);
        let b = shift_trace(vec![0.0; 5]);
        assert!(matches!(
            composer.compose_trace(&a, &b),
            Err(WarpError::SampleCountMismatch { expected: 4, got: 5 })
        ));
    }

    #[test]
    fn apply_zero_shifts_is_identity() {
        let sampling = Sampling::unit(10).unwrap();
        let values: Vec<f64> = (0..10).map(|i| (i as f64 * 0.5).sin()).collect();
        let g = Trace::new(sampling, values.clone()).unwrap();
        let u = shift_trace(vec![0.0; 10]);
        let h = apply_shifts(g.as_view(), &u, &SincInterpolator::default()).unwrap();
        for (got, expected) in h.as_ref().iter().zip(&values) {
            assert!((got - expected).abs() < 1e-12);
        }
    }

    #[test]
    fn apply_integer_shift_translates_samples() {
        let sampling = Sampling::unit(12).unwrap();
        let values: Vec<f64> = (0..12).map(|i| i as f64).collect();
        let g = Trace::new(sampling, values).unwrap();
        let u = shift_trace(vec![3.0; 12]);
        let h = apply_shifts(g.as_view(), &u, &SincInterpolator::default()).unwrap();
        for i in 0..9 {
            assert!((h.as_ref()[i] - (i as f64 + 3.0)).abs() < 1e-12);
        }
        // Beyond the end the candidate extrapolates constantly.
        assert!((h.as_ref()[11] - 11.0).abs() < 1e-12);
    }

    #[test]
    fn apply_shifts_image_matches_per_trace() {
        let sampling = Sampling::unit(8).unwrap();
        let rows: Vec<Vec<f64>> = (0..3)
            .map(|t| (0..8).map(|i| ((i + t) as f64 * 0.7).cos()).collect())
            .collect();
        let g = Image::new(sampling, rows).unwrap();
        let field = ShiftField::new(sampling, vec![vec![1.0; 8]; 3]).unwrap();
        let si = SincInterpolator::default();
        let h = apply_shifts_image(&g, &field, &si).unwrap();
        for t in 0..3 {
            let u = shift_trace(vec![1.0; 8]);
            let ht = apply_shifts(g.trace(t), &u, &si).unwrap();
            assert_eq!(h.trace(t).as_slice(), ht.as_ref());
        }
    }

    #[test]
    fn apply_shifts_image_rejects_shape_mismatch() {
        let sampling = Sampling::unit(4).unwrap();
        let g = Image::new(sampling, vec![vec![0.0; 4]; 2]).unwrap();
        let field = ShiftField::new(sampling, vec![vec![0.0; 4]; 3]).unwrap();
        let result = apply_shifts_image(&g, &field, &SincInterpolator::default());
        assert!(matches!(
            result,
            Err(WarpError::TraceCountMismatch { expected: 2, got: 3 })
        ));
    }
}
