//! Flat binary image writer.

use std::fs;
use std::path::{Path, PathBuf};

use tieline_warp::{Image, ShiftField};
use tracing::{debug, info, instrument};

use crate::IoError;

/// Writes images and shift fields as flat little-endian f32 arrays into an
/// output directory, trace after trace. The directory is created on
/// construction if it does not exist.
pub struct ImageWriter {
    output_dir: PathBuf,
}

impl ImageWriter {
    /// Create a writer targeting the given directory.
    ///
    /// # Errors
    ///
    /// Returns [`IoError::OutputDirCreate`] if the directory cannot be
    /// created.
    #[instrument(fields(dir = %output_dir.display()))]
    pub fn new(output_dir: &Path) -> Result<Self, IoError> {
        fs::create_dir_all(output_dir).map_err(|e| IoError::OutputDirCreate {
            path: output_dir.to_path_buf(),
            source: e,
        })?;
        debug!("output directory ready");
        Ok(Self {
            output_dir: output_dir.to_path_buf(),
        })
    }

    /// Write an image to `{name}` inside the output directory and return
    /// the full path.
    ///
    /// # Errors
    ///
    /// Returns [`IoError::WriteFile`] if the file cannot be written.
    #[instrument(skip(self, image), fields(name))]
    pub fn write_image(&self, name: &str, image: &Image) -> Result<PathBuf, IoError> {
        self.write_rows(name, image.as_rows())
    }

    /// Write a shift field to `{name}` inside the output directory and
    /// return the full path.
    ///
    /// # Errors
    ///
    /// Returns [`IoError::WriteFile`] if the file cannot be written.
    #[instrument(skip(self, field), fields(name))]
    pub fn write_field(&self, name: &str, field: &ShiftField) -> Result<PathBuf, IoError> {
        self.write_rows(name, field.as_rows())
    }

    fn write_rows(&self, name: &str, rows: &[Vec<f64>]) -> Result<PathBuf, IoError> {
        let path = self.output_dir.join(name);
        let n: usize = rows.iter().map(Vec::len).sum();
        let mut bytes = Vec::with_capacity(4 * n);
        for row in rows {
            for &v in row {
                bytes.extend_from_slice(&(v as f32).to_le_bytes());
            }
        }
        fs::write(&path, &bytes).map_err(|e| IoError::WriteFile {
            path: path.clone(),
            source: e,
        })?;
        info!(path = %path.display(), bytes = bytes.len(), "array written");
        Ok(path)
    }
}
