//! Flat binary image I/O for tieline.
//!
//! The surrounding processing scripts exchange seismic sections as flat
//! little-endian f32 arrays of known dimensions. This crate implements that
//! convention: the reader takes dimensions from the caller, the writer
//! emits traces back to back with no header.

mod error;
mod reader;
mod writer;

pub use error::IoError;
pub use reader::ImageReader;
pub use writer::ImageWriter;
