//! I/O error types for tieline-io.

use std::path::PathBuf;

/// Errors from flat binary image reading and writing.
#[derive(Debug, thiserror::Error)]
pub enum IoError {
    /// Returned when the input file does not exist or is unreadable.
    #[error("file not found: {path}")]
    FileNotFound {
        /// Path that was attempted.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// Returned when the file size does not match the declared dimensions.
    #[error("size mismatch in {path}: expected {expected} bytes for the declared dimensions, got {got}")]
    SizeMismatch {
        /// Path to the binary file.
        path: PathBuf,
        /// Expected size in bytes.
        expected: u64,
        /// Actual size in bytes.
        got: u64,
    },

    /// Returned when a stored sample is NaN or infinite.
    #[error("non-finite sample in {path}: trace {trace}, sample {sample}")]
    NonFiniteSample {
        /// Path to the binary file.
        path: PathBuf,
        /// Trace index of the offending sample.
        trace: usize,
        /// Sample index within the trace.
        sample: usize,
    },

    /// Returned when the declared dimensions are rejected by the core.
    #[error("invalid dimensions for {path}")]
    InvalidDimensions {
        /// Path to the binary file.
        path: PathBuf,
        /// Underlying validation error.
        source: tieline_warp::WarpError,
    },

    /// Returned when the output directory cannot be created.
    #[error("cannot create output directory {path}")]
    OutputDirCreate {
        /// Path that was attempted.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// Returned when an output file cannot be written.
    #[error("cannot write file {path}")]
    WriteFile {
        /// Path that was attempted.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },
}
