//! Flat binary image reader.

use std::fs;
use std::path::{Path, PathBuf};

use tieline_warp::{Image, Sampling};
use tracing::{info, instrument};

use crate::IoError;

/// Reads images stored as flat little-endian f32 arrays, trace after trace,
/// each trace `sampling.count()` samples long. Dimensions are not stored in
/// the file; the caller supplies them, by convention of the surrounding
/// processing scripts.
pub struct ImageReader {
    path: PathBuf,
}

impl ImageReader {
    /// Create a reader for the given path.
    #[must_use]
    pub fn new(path: &Path) -> Self {
        Self {
            path: path.to_path_buf(),
        }
    }

    /// Read an image of `n_traces` traces with the given per-trace sampling.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`IoError::FileNotFound`] | The file cannot be opened or read |
    /// | [`IoError::SizeMismatch`] | File size differs from `4 * count * n_traces` bytes |
    /// | [`IoError::NonFiniteSample`] | A stored sample is NaN or infinite |
    /// | [`IoError::InvalidDimensions`] | The core rejects the assembled image |
    #[instrument(skip(self), fields(path = %self.path.display(), n = sampling.count(), n2 = n_traces))]
    pub fn read(&self, sampling: Sampling, n_traces: usize) -> Result<Image, IoError> {
        let bytes = fs::read(&self.path).map_err(|e| IoError::FileNotFound {
            path: self.path.clone(),
            source: e,
        })?;

        let n = sampling.count();
        let expected = 4 * (n as u64) * (n_traces as u64);
        if bytes.len() as u64 != expected {
            return Err(IoError::SizeMismatch {
                path: self.path.clone(),
                expected,
                got: bytes.len() as u64,
            });
        }

        let mut traces = Vec::with_capacity(n_traces);
        for t in 0..n_traces {
            let mut trace = Vec::with_capacity(n);
            for i in 0..n {
                let offset = 4 * (t * n + i);
                let raw = f32::from_le_bytes(
                    bytes[offset..offset + 4]
                        .try_into()
                        .expect("slice length is four"),
                );
                if !raw.is_finite() {
                    return Err(IoError::NonFiniteSample {
                        path: self.path.clone(),
                        trace: t,
                        sample: i,
                    });
                }
                trace.push(f64::from(raw));
            }
            traces.push(trace);
        }

        let image = Image::new(sampling, traces).map_err(|e| IoError::InvalidDimensions {
            path: self.path.clone(),
            source: e,
        })?;
        info!(n_traces, n_samples = n, "image read");
        Ok(image)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_is_reported() {
        let reader = ImageReader::new(Path::new("/nonexistent/image.dat"));
        let sampling = Sampling::unit(4).unwrap();
        assert!(matches!(
            reader.read(sampling, 1),
            Err(IoError::FileNotFound { .. })
        ));
    }
}
