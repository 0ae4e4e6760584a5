//! Error types for warping configuration and input validation.

/// Errors from configuration validation and signal construction.
///
/// All variants are configuration errors in the sense of the registration
/// pipeline: they are surfaced immediately and never retried. The core
/// computation itself cannot fail once its inputs validate.
#[derive(Debug, thiserror::Error)]
pub enum WarpError {
    /// Returned when an empty slice is provided as a trace.
    #[error("trace must be non-empty")]
    EmptyTrace,

    /// Returned when a trace contains NaN, infinity, or negative infinity.
    #[error("non-finite sample at index {index}")]
    NonFiniteSample {
        /// Position of the first non-finite sample found.
        index: usize,
    },

    /// Returned when a sampling descriptor has zero count or a non-positive
    /// or non-finite step.
    #[error("invalid sampling: count {count}, delta {delta}")]
    InvalidSampling {
        /// Sample count.
        count: usize,
        /// Sample step.
        delta: f64,
    },

    /// Returned when two traces that must share a sample count do not.
    #[error("sample count mismatch: expected {expected}, got {got}")]
    SampleCountMismatch {
        /// Sample count of the reference signal.
        expected: usize,
        /// Sample count of the offending signal.
        got: usize,
    },

    /// Returned when two images that must share a trace count do not.
    #[error("trace count mismatch: expected {expected}, got {got}")]
    TraceCountMismatch {
        /// Trace count of the reference image.
        expected: usize,
        /// Trace count of the offending image.
        got: usize,
    },

    /// Returned when a lag range has `min > max`.
    #[error("invalid lag range: min {min} > max {max}")]
    InvalidLagRange {
        /// Minimum lag in samples.
        min: i64,
        /// Maximum lag in samples.
        max: i64,
    },

    /// Returned when the maximum strain is zero, negative, or non-finite.
    #[error("invalid strain limit: {strain_max} (must be positive and finite)")]
    InvalidStrain {
        /// The rejected strain limit.
        strain_max: f64,
    },

    /// Returned when a smoothing width is zero, negative, or non-finite.
    #[error("invalid smoothing width: {sigma} (must be positive and finite)")]
    InvalidSmoothing {
        /// The rejected smoothing sigma.
        sigma: f64,
    },

    /// Returned when an interpolator half-width is zero.
    #[error("invalid interpolator half-width: must be at least 1")]
    InvalidHalfWidth,

    /// Returned when the sampling-ratio constant is zero, negative, or
    /// non-finite.
    #[error("invalid sampling ratio: {ratio} (must be positive and finite)")]
    InvalidSamplingRatio {
        /// The rejected ratio.
        ratio: f64,
    },
}
