//! Amplitude and sampling preprocessing for image pairs.

use rayon::prelude::*;
use tracing::instrument;

use crate::error::WarpError;
use crate::interp::SincInterpolator;
use crate::smooth::ExponentialSmoother;
use crate::trace::Image;

/// Guard against division by a vanishing local amplitude.
const RMS_FLOOR: f64 = 1e-30;

/// Normalize RMS amplitude within overlapping windows of half-width
/// `half_width` samples: each sample is divided by the square root of the
/// exponentially smoothed local power.
///
/// Quiet zones (smoothed power at or below the floor) map to zero rather
/// than blowing up.
///
/// # Errors
///
/// | Variant | Condition |
/// |---|---|
/// | [`WarpError::InvalidSmoothing`] | `half_width` is not positive and finite |
#[instrument(skip(image), fields(n2 = image.n_traces()))]
pub fn normalize_rms(image: &Image, half_width: f64) -> Result<Image, WarpError> {
    let smoother = ExponentialSmoother::new(half_width)?;
    let rows: Vec<Vec<f64>> = image
        .as_rows()
        .par_iter()
        .map(|trace| {
            let mut power: Vec<f64> = trace.iter().map(|&v| v * v).collect();
            smoother.apply_in_place(&mut power);
            trace
                .iter()
                .zip(&power)
                .map(|(&v, &p)| if p > RMS_FLOOR { v / p.sqrt() } else { 0.0 })
                .collect()
        })
        .collect();
    Ok(Image::new_unchecked(image.sampling(), rows))
}

/// Stretch (supersample) the time sampling of every trace by `rate`,
/// band-limited: output sample `i` takes the input value at `i / rate`.
///
/// Used to bring the reference image onto the candidate's effective grid
/// before pass one when the two axes were recorded at different steps.
///
/// # Errors
///
/// | Variant | Condition |
/// |---|---|
/// | [`WarpError::InvalidSamplingRatio`] | `rate` is not positive and finite |
#[instrument(skip(image, interpolator), fields(n2 = image.n_traces(), rate))]
pub fn stretch(
    image: &Image,
    rate: f64,
    interpolator: &SincInterpolator,
) -> Result<Image, WarpError> {
    if !rate.is_finite() || rate <= 0.0 {
        return Err(WarpError::InvalidSamplingRatio { ratio: rate });
    }
    let rows: Vec<Vec<f64>> = image
        .as_rows()
        .par_iter()
        .map(|trace| {
            interpolator
                .stretch(trace, rate)
                .expect("rate validated above")
        })
        .collect();
    Ok(Image::new_unchecked(image.sampling(), rows))
}
