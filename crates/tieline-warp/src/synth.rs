//! Deterministic synthetic image pairs for demos and round-trip tests.

use rand::Rng;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tracing::instrument;

use crate::error::WarpError;
use crate::interp::SincInterpolator;
use crate::sampling::Sampling;
use crate::shift::ShiftField;
use crate::trace::Image;

/// Shape of the shift applied when synthesizing the reference from the
/// candidate.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ShiftProfile {
    /// The same shift at every sample.
    Constant(f64),
    /// A smooth raised-cosine ramp from zero at the first sample to the
    /// given value at the last.
    Ramp(f64),
}

impl ShiftProfile {
    fn value(&self, i: usize, n: usize) -> f64 {
        match *self {
            Self::Constant(k) => k,
            Self::Ramp(k) => {
                if n < 2 {
                    return 0.0;
                }
                let t = i as f64 / (n - 1) as f64;
                k * 0.5 * (1.0 - (std::f64::consts::PI * t).cos())
            }
        }
    }
}

/// Generator for a reflectivity-style image pair with a known applied
/// shift. Fully determined by its seed.
///
/// The candidate image is sparse reflectivity convolved with a Ricker
/// wavelet; the reference is the candidate resampled through the shift
/// profile, so running the warping core on `(reference, candidate)` should
/// recover the profile.
///
/// # Defaults
///
/// | Parameter | Default |
/// |---|---|
/// | `seed` | 42 |
/// | `wavelet_freq` | 0.08 cycles/sample |
/// | `reflectivity_density` | 0.1 |
/// | `noise` | 0.0 |
/// | `profile` | `ShiftProfile::Constant(0.0)` |
#[derive(Debug, Clone, Copy)]
pub struct SyntheticConfig {
    n_samples: usize,
    n_traces: usize,
    seed: u64,
    wavelet_freq: f64,
    reflectivity_density: f64,
    noise: f64,
    profile: ShiftProfile,
}

impl SyntheticConfig {
    /// Create a generator for `n_traces` traces of `n_samples` samples.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`WarpError::InvalidSampling`] | `n_samples` is zero |
    /// | [`WarpError::EmptyTrace`] | `n_traces` is zero |
    pub fn new(n_samples: usize, n_traces: usize) -> Result<Self, WarpError> {
        Sampling::unit(n_samples)?;
        if n_traces == 0 {
            return Err(WarpError::EmptyTrace);
        }
        Ok(Self {
            n_samples,
            n_traces,
            seed: 42,
            wavelet_freq: 0.08,
            reflectivity_density: 0.1,
            noise: 0.0,
            profile: ShiftProfile::Constant(0.0),
        })
    }

    /// Set the RNG seed.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Set the Ricker wavelet peak frequency in cycles per sample.
    #[must_use]
    pub fn with_wavelet_freq(mut self, freq: f64) -> Self {
        self.wavelet_freq = freq;
        self
    }

    /// Set the fraction of samples carrying a reflector.
    #[must_use]
    pub fn with_reflectivity_density(mut self, density: f64) -> Self {
        self.reflectivity_density = density;
        self
    }

    /// Set the uniform noise amplitude added to both images.
    #[must_use]
    pub fn with_noise(mut self, noise: f64) -> Self {
        self.noise = noise;
        self
    }

    /// Set the applied shift profile.
    #[must_use]
    pub fn with_profile(mut self, profile: ShiftProfile) -> Self {
        self.profile = profile;
        self
    }

    /// Generate the pair.
    #[must_use]
    #[instrument(skip(self), fields(n = self.n_samples, n2 = self.n_traces, seed = self.seed))]
    pub fn generate(&self) -> SyntheticPair {
        let n = self.n_samples;
        let sampling = Sampling::unit(n).expect("validated in new");
        let mut rng = ChaCha8Rng::seed_from_u64(self.seed);
        let interpolator = SincInterpolator::default();

        // One shared reflectivity sequence keeps traces laterally coherent,
        // like reflectors in a real section; each trace jitters amplitudes.
        let base: Vec<f64> = (0..n)
            .map(|_| {
                if rng.gen_range(0.0..1.0) < self.reflectivity_density {
                    rng.gen_range(-1.0..1.0)
                } else {
                    0.0
                }
            })
            .collect();

        let wavelet = ricker(self.wavelet_freq);
        let shifts: Vec<f64> = (0..n).map(|i| self.profile.value(i, n)).collect();
        let positions: Vec<f64> = shifts
            .iter()
            .enumerate()
            .map(|(i, &u)| i as f64 + u)
            .collect();

        let mut candidate_rows = Vec::with_capacity(self.n_traces);
        let mut reference_rows = Vec::with_capacity(self.n_traces);
        for _ in 0..self.n_traces {
            let reflectivity: Vec<f64> = base
                .iter()
                .map(|&r| {
                    if r == 0.0 {
                        0.0
                    } else {
                        r * rng.gen_range(0.8..1.2)
                    }
                })
                .collect();
            let candidate = convolve_same(&reflectivity, &wavelet);
            let mut reference = interpolator.resample(&candidate, &positions);
            if self.noise > 0.0 {
                for v in &mut reference {
                    *v += rng.gen_range(-self.noise..self.noise);
                }
            }
            let candidate = if self.noise > 0.0 {
                let mut c = candidate;
                for v in &mut c {
                    *v += rng.gen_range(-self.noise..self.noise);
                }
                c
            } else {
                candidate
            };
            candidate_rows.push(candidate);
            reference_rows.push(reference);
        }

        SyntheticPair {
            reference: Image::new_unchecked(sampling, reference_rows),
            candidate: Image::new_unchecked(sampling, candidate_rows),
            shifts: ShiftField::new_unchecked(
                sampling,
                vec![shifts; self.n_traces],
            ),
        }
    }
}

/// A generated pair plus the shift field that relates them.
#[derive(Debug, Clone)]
pub struct SyntheticPair {
    /// Reference image: the candidate resampled through the shifts.
    pub reference: Image,
    /// Candidate image to be registered to the reference.
    pub candidate: Image,
    /// The applied shift field, identical on every trace.
    pub shifts: ShiftField,
}

/// Ricker wavelet with the given peak frequency, truncated where its
/// envelope becomes negligible.
fn ricker(freq: f64) -> Vec<f64> {
    let half = (1.5 / freq).ceil() as i64;
    (-half..=half)
        .map(|k| {
            let x = std::f64::consts::PI * freq * k as f64;
            let x2 = x * x;
            (1.0 - 2.0 * x2) * (-x2).exp()
        })
        .collect()
}

/// Same-length convolution with a centered kernel; edges truncate.
fn convolve_same(x: &[f64], kernel: &[f64]) -> Vec<f64> {
    let n = x.len() as i64;
    let half = (kernel.len() / 2) as i64;
    (0..n)
        .map(|i| {
            kernel
                .iter()
                .enumerate()
                .map(|(k, &w)| {
                    let j = i + k as i64 - half;
                    if (0..n).contains(&j) { w * x[j as usize] } else { 0.0 }
                })
                .sum()
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_degenerate_dimensions() {
        assert!(SyntheticConfig::new(0, 4).is_err());
        assert!(matches!(
            SyntheticConfig::new(64, 0),
            Err(WarpError::EmptyTrace)
        ));
    }

    #[test]
    fn same_seed_reproduces_the_pair() {
        let config = SyntheticConfig::new(64, 3)
            .unwrap()
            .with_seed(7)
            .with_noise(0.01);
        let a = config.generate();
        let b = config.generate();
        assert_eq!(a.reference, b.reference);
        assert_eq!(a.candidate, b.candidate);
    }

    #[test]
    fn different_seeds_differ() {
        let a = SyntheticConfig::new(64, 1).unwrap().with_seed(1).generate();
        let b = SyntheticConfig::new(64, 1).unwrap().with_seed(2).generate();
        assert_ne!(a.candidate, b.candidate);
    }

    #[test]
    fn zero_profile_makes_identical_images() {
        let pair = SyntheticConfig::new(96, 2).unwrap().generate();
        for t in 0..2 {
            let r = pair.reference.trace(t);
            let c = pair.candidate.trace(t);
            for (a, b) in r.as_slice().iter().zip(c.as_slice()) {
                assert!((a - b).abs() < 1e-10);
            }
        }
    }

    #[test]
    fn constant_profile_fills_shift_field() {
        let pair = SyntheticConfig::new(32, 2)
            .unwrap()
            .with_profile(ShiftProfile::Constant(2.5))
            .generate();
        for t in 0..2 {
            for &u in pair.shifts.trace(t) {
                assert_eq!(u, 2.5);
            }
        }
    }

    #[test]
    fn ramp_profile_is_monotone_and_bounded() {
        let pair = SyntheticConfig::new(64, 1)
            .unwrap()
            .with_profile(ShiftProfile::Ramp(5.0))
            .generate();
        let u = pair.shifts.trace(0);
        assert_eq!(u[0], 0.0);
        assert!((u[63] - 5.0).abs() < 1e-12);
        for pair in u.windows(2) {
            assert!(pair[1] >= pair[0] - 1e-12);
        }
    }

    #[test]
    fn ricker_peaks_at_center() {
        let w = ricker(0.08);
        let mid = w.len() / 2;
        assert_eq!(w[mid], 1.0);
        assert!(w.iter().all(|&v| v <= 1.0));
    }

    #[test]
    fn traces_are_laterally_coherent() {
        // Shared reflectivity means traces correlate strongly.
        let pair = SyntheticConfig::new(128, 2).unwrap().with_seed(11).generate();
        let a = pair.candidate.trace(0);
        let b = pair.candidate.trace(1);
        let dot: f64 = a.as_slice().iter().zip(b.as_slice()).map(|(x, y)| x * y).sum();
        let na: f64 = a.as_slice().iter().map(|x| x * x).sum::<f64>().sqrt();
        let nb: f64 = b.as_slice().iter().map(|x| x * x).sum::<f64>().sqrt();
        if na > 0.0 && nb > 0.0 {
            assert!(dot / (na * nb) > 0.8);
        }
    }
}
