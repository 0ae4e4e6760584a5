//! Round-trip tests for flat binary image I/O.

use tempfile::TempDir;

use tieline_io::{ImageReader, ImageWriter, IoError};
use tieline_warp::{Image, Sampling, ShiftField};

fn sample_image() -> Image {
    let sampling = Sampling::new(8, 0.004, 0.0).unwrap();
    let rows: Vec<Vec<f64>> = (0..3)
        .map(|t| (0..8).map(|i| (t * 8 + i) as f64 * 0.25 - 2.0).collect())
        .collect();
    Image::new(sampling, rows).unwrap()
}

#[test]
fn image_survives_a_write_read_cycle() {
    let dir = TempDir::new().unwrap();
    let writer = ImageWriter::new(dir.path()).unwrap();
    let image = sample_image();

    let path = writer.write_image("section.dat", &image).unwrap();
    assert!(path.exists());

    let read_back = ImageReader::new(&path)
        .read(image.sampling(), image.n_traces())
        .unwrap();
    assert_eq!(read_back.n_traces(), 3);
    assert_eq!(read_back.n_samples(), 8);
    for t in 0..3 {
        for (a, b) in read_back
            .trace(t)
            .as_slice()
            .iter()
            .zip(image.trace(t).as_slice())
        {
            // f32 storage loses precision below ~1e-7 relative.
            assert!((a - b).abs() < 1e-6, "{a} vs {b}");
        }
    }
}

#[test]
fn shift_field_round_trips_through_the_image_reader() {
    let dir = TempDir::new().unwrap();
    let writer = ImageWriter::new(dir.path()).unwrap();
    let sampling = Sampling::unit(6).unwrap();
    let field = ShiftField::new(
        sampling,
        vec![vec![0.0, 0.5, 1.0, 1.5, 2.0, 2.5], vec![1.0; 6]],
    )
    .unwrap();

    let path = writer.write_field("shifts.dat", &field).unwrap();
    let read_back = ImageReader::new(&path).read(sampling, 2).unwrap();
    for (a, b) in read_back.trace(0).as_slice().iter().zip(field.trace(0)) {
        assert!((a - b).abs() < 1e-6);
    }
}

#[test]
fn wrong_dimensions_are_rejected() {
    let dir = TempDir::new().unwrap();
    let writer = ImageWriter::new(dir.path()).unwrap();
    let image = sample_image();
    let path = writer.write_image("section.dat", &image).unwrap();

    // Declare one trace too many.
    let result = ImageReader::new(&path).read(image.sampling(), 4);
    assert!(matches!(result, Err(IoError::SizeMismatch { expected, got, .. })
        if expected == 4 * 8 * 4 && got == 3 * 8 * 4));
}

#[test]
fn non_finite_samples_are_rejected() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("bad.dat");
    let mut bytes = Vec::new();
    bytes.extend_from_slice(&1.0_f32.to_le_bytes());
    bytes.extend_from_slice(&f32::NAN.to_le_bytes());
    bytes.extend_from_slice(&3.0_f32.to_le_bytes());
    bytes.extend_from_slice(&4.0_f32.to_le_bytes());
    std::fs::write(&path, &bytes).unwrap();

    let sampling = Sampling::unit(2).unwrap();
    let result = ImageReader::new(&path).read(sampling, 2);
    assert!(matches!(
        result,
        Err(IoError::NonFiniteSample { trace: 0, sample: 1, .. })
    ));
}

#[test]
fn nested_output_directory_is_created() {
    let dir = TempDir::new().unwrap();
    let nested = dir.path().join("a").join("b");
    let writer = ImageWriter::new(&nested).unwrap();
    let path = writer.write_image("x.dat", &sample_image()).unwrap();
    assert!(path.starts_with(&nested));
    assert!(path.exists());
}
