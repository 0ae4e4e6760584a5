//! Strain-limited dynamic warping for seismic trace registration.
//!
//! Pure math library — zero I/O. Provides alignment error surfaces with
//! boundary extrapolation, strain-limited forward accumulation and reverse
//! backtracking, shift smoothing and composition, band-limited shift
//! application, velocity-ratio attribute estimation, and the two-pass
//! registration pipeline that ties the stages together.

mod accumulate;
mod attributes;
mod backtrack;
mod compose;
mod error;
mod interp;
mod lag;
mod pipeline;
mod prep;
mod sampling;
mod shift;
mod smooth;
mod surface;
mod synth;
mod trace;
mod warp;

pub use accumulate::AccumulatedCost;
pub use attributes::RatioConfig;
pub use compose::{ShiftComposer, apply_shifts, apply_shifts_image};
pub use error::WarpError;
pub use interp::SincInterpolator;
pub use lag::LagRange;
pub use pipeline::{RegistrationConfig, RegistrationResult};
pub use prep::{normalize_rms, stretch};
pub use sampling::Sampling;
pub use shift::{ShiftField, ShiftTrace};
pub use smooth::{ExponentialSmoother, gaussian_derivative};
pub use surface::{ErrorExtrapolation, ErrorSurface};
pub use synth::{ShiftProfile, SyntheticConfig, SyntheticPair};
pub use trace::{Image, Trace, TraceView};
pub use warp::WarpConfig;
