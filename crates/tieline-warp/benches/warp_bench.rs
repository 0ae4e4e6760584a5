//! Criterion benchmarks for tieline-warp: single-trace shift estimation,
//! image registration, and band-limited resampling.

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};

use tieline_warp::{
    Image, LagRange, RegistrationConfig, Sampling, ShiftProfile, SincInterpolator,
    SyntheticConfig, Trace, WarpConfig,
};

fn make_trace(n: usize, phase: f64) -> Trace {
    let sampling = Sampling::unit(n).unwrap();
    let values: Vec<f64> = (0..n)
        .map(|i| (i as f64 * 0.31 + phase).sin() + 0.5 * (i as f64 * 0.11).cos())
        .collect();
    Trace::new(sampling, values).unwrap()
}

fn bench_find_shifts(c: &mut Criterion) {
    let lengths = [256_usize, 1024, 4096];
    let radii = [8_i64, 32];

    let mut group = c.benchmark_group("find_shifts");

    for &len in &lengths {
        for &radius in &radii {
            let id = BenchmarkId::new(format!("len{len}"), format!("lag{radius}"));
            let f = make_trace(len, 0.0);
            let g = make_trace(len, 1.0);
            let config = WarpConfig::new(LagRange::symmetric(radius).unwrap(), 1.0).unwrap();
            group.bench_with_input(id, &(f, g, config), |bencher, (f, g, config)| {
                bencher.iter(|| config.find_shifts(f.as_view(), g.as_view()).unwrap());
            });
        }
    }

    group.finish();
}

fn bench_find_shifts_image(c: &mut Criterion) {
    let sampling = Sampling::unit(512).unwrap();
    let f_rows: Vec<Vec<f64>> = (0..64)
        .map(|t| make_trace(512, t as f64 * 0.1).into_values())
        .collect();
    let g_rows: Vec<Vec<f64>> = (0..64)
        .map(|t| make_trace(512, t as f64 * 0.1 + 0.7).into_values())
        .collect();
    let f = Image::new(sampling, f_rows).unwrap();
    let g = Image::new(sampling, g_rows).unwrap();
    let config = WarpConfig::new(LagRange::symmetric(10).unwrap(), 1.0).unwrap();

    c.bench_function("find_shifts_image_64x512_lag10", |b| {
        b.iter(|| config.find_shifts_image(&f, &g).unwrap());
    });
}

fn bench_two_pass_registration(c: &mut Criterion) {
    let pair = SyntheticConfig::new(512, 16)
        .unwrap()
        .with_reflectivity_density(0.15)
        .with_profile(ShiftProfile::Ramp(6.0))
        .generate();
    let coarse = WarpConfig::new(LagRange::new(0, 16).unwrap(), 1.0)
        .unwrap()
        .with_shift_smoothing(4.0)
        .unwrap();
    let fine = WarpConfig::new(LagRange::symmetric(4).unwrap(), 1.0)
        .unwrap()
        .with_error_smoothing(2)
        .with_shift_smoothing(1.0)
        .unwrap();
    let config = RegistrationConfig::new(coarse, fine, 1.5).unwrap();

    c.bench_function("registration_16x512", |b| {
        b.iter(|| config.run(&pair.reference, &pair.candidate).unwrap());
    });
}

fn bench_sinc_resample(c: &mut Criterion) {
    let values = make_trace(4096, 0.0).into_values();
    let positions: Vec<f64> = (0..4096).map(|i| i as f64 + 0.37).collect();
    let si = SincInterpolator::default();

    c.bench_function("sinc_resample_4096", |b| {
        b.iter(|| si.resample(&values, &positions));
    });
}

criterion_group!(
    benches,
    bench_find_shifts,
    bench_find_shifts_image,
    bench_two_pass_registration,
    bench_sinc_resample
);
criterion_main!(benches);
