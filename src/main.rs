use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use tracing::info;

use tieline_io::{ImageReader, ImageWriter};
use tieline_warp::{
    ErrorExtrapolation, LagRange, RegistrationConfig, Sampling, ShiftProfile, SincInterpolator,
    SyntheticConfig, WarpConfig, normalize_rms, stretch,
};

#[derive(Parser)]
#[command(name = "tieline")]
#[command(about = "Two-pass dynamic-warping registration of seismic image pairs")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Enable verbose (debug-level) logging
    #[arg(long, global = true)]
    verbose: bool,

    /// Suppress all output except errors
    #[arg(long, global = true)]
    quiet: bool,

    /// Number of threads for parallel computation (defaults to all cores)
    #[arg(long, global = true)]
    threads: Option<usize>,
}

/// Shared tuning parameters for the two-pass registration.
#[derive(Args, Debug, Clone)]
struct TuningArgs {
    /// Maximum lag of the coarse pass, in samples (range is [0, max])
    #[arg(long, default_value_t = 160)]
    coarse_shift_max: i64,

    /// Maximum lag of the fine pass, in samples (range is [-max, max])
    #[arg(long, default_value_t = 10)]
    fine_shift_max: i64,

    /// Maximum strain of the coarse pass, in lag indices per sample
    #[arg(long, default_value_t = 1.0)]
    coarse_strain: f64,

    /// Maximum strain of the fine pass, in lag indices per sample
    #[arg(long, default_value_t = 1.0)]
    fine_strain: f64,

    /// Error smoothing rounds applied before the fine-pass accumulation
    #[arg(long, default_value_t = 2)]
    error_smoothing: usize,

    /// Shift smoothing half-width of the coarse pass, in samples
    #[arg(long, default_value_t = 4.0)]
    coarse_shift_smoothing: f64,

    /// Shift smoothing half-width of the fine pass, in samples
    #[arg(long, default_value_t = 1.0)]
    fine_shift_smoothing: f64,

    /// RMS gain half-width in samples (0 disables amplitude balancing)
    #[arg(long, default_value_t = 100.0)]
    gain_half_width: f64,

    /// Error extrapolation at trace edges: "reflect" or "clamp"
    #[arg(long, default_value = "reflect")]
    extrapolation: String,
}

#[derive(Subcommand)]
enum Command {
    /// Register a candidate image to a reference image and derive ratio attributes
    Warp {
        /// Path to the reference image (flat binary f32, trace-major)
        #[arg(long)]
        reference: PathBuf,

        /// Path to the candidate image (flat binary f32, trace-major)
        #[arg(long)]
        candidate: PathBuf,

        /// Samples per trace in both images
        #[arg(long)]
        samples: usize,

        /// Trace count in both images
        #[arg(long)]
        traces: usize,

        /// Time step of the reference image, in seconds
        #[arg(long, default_value_t = 1.0)]
        reference_delta: f64,

        /// Time step of the candidate image, in seconds
        #[arg(long, default_value_t = 1.0)]
        candidate_delta: f64,

        /// Output directory for result arrays
        #[arg(long, default_value = ".")]
        output_dir: PathBuf,

        #[command(flatten)]
        tuning: TuningArgs,
    },

    /// Generate a deterministic synthetic image pair with a known shift
    Synth {
        /// Output directory for the generated arrays
        #[arg(long, default_value = ".")]
        output_dir: PathBuf,

        /// Samples per trace
        #[arg(long, default_value_t = 501)]
        samples: usize,

        /// Trace count
        #[arg(long, default_value_t = 32)]
        traces: usize,

        /// RNG seed for reproducibility
        #[arg(long, default_value_t = 42)]
        seed: u64,

        /// Final value of the smooth ramp shift, in samples
        #[arg(long, default_value_t = 8.0)]
        shift_max: f64,

        /// Apply this constant shift instead of the ramp
        #[arg(long)]
        constant_shift: Option<f64>,

        /// Uniform noise amplitude added to both images
        #[arg(long, default_value_t = 0.0)]
        noise: f64,

        /// Ricker wavelet peak frequency, in cycles per sample
        #[arg(long, default_value_t = 0.08)]
        wavelet_freq: f64,

        /// Fraction of samples carrying a reflector
        #[arg(long, default_value_t = 0.1)]
        density: f64,
    },
}

// --- JSON stdout output structs ---

#[derive(Serialize)]
struct WarpOutput {
    n_samples: usize,
    n_traces: usize,
    sampling_ratio: f64,
    coarse_shift_min: f64,
    coarse_shift_max: f64,
    combined_shift_min: f64,
    combined_shift_max: f64,
    average_ratio_min: f64,
    average_ratio_max: f64,
    interval_ratio_min: f64,
    interval_ratio_max: f64,
    outputs: Vec<String>,
}

#[derive(Serialize)]
struct SynthOutput {
    n_samples: usize,
    n_traces: usize,
    seed: u64,
    shift_min: f64,
    shift_max: f64,
    outputs: Vec<String>,
}

fn parse_extrapolation(s: &str) -> Result<ErrorExtrapolation> {
    match s {
        "reflect" => Ok(ErrorExtrapolation::Reflect),
        "clamp" => Ok(ErrorExtrapolation::Clamp),
        other => anyhow::bail!("unknown extrapolation: {other} (expected reflect or clamp)"),
    }
}

fn build_registration(tuning: &TuningArgs, sampling_ratio: f64) -> Result<RegistrationConfig> {
    let extrapolation = parse_extrapolation(&tuning.extrapolation)?;

    let mut coarse = WarpConfig::new(
        LagRange::new(0, tuning.coarse_shift_max)?,
        tuning.coarse_strain,
    )?
    .with_extrapolation(extrapolation);
    if tuning.coarse_shift_smoothing > 0.0 {
        coarse = coarse.with_shift_smoothing(tuning.coarse_shift_smoothing)?;
    }

    let mut fine = WarpConfig::new(
        LagRange::symmetric(tuning.fine_shift_max)?,
        tuning.fine_strain,
    )?
    .with_extrapolation(extrapolation)
    .with_error_smoothing(tuning.error_smoothing);
    if tuning.fine_shift_smoothing > 0.0 {
        fine = fine.with_shift_smoothing(tuning.fine_shift_smoothing)?;
    }

    Ok(RegistrationConfig::new(coarse, fine, sampling_ratio)?)
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = match (cli.verbose, cli.quiet) {
        (true, _) => "debug",
        (_, true) => "error",
        _ => "info",
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    // Configure Rayon thread pool
    if let Some(threads) = cli.threads {
        rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .build_global()
            .context("failed to configure thread pool")?;
        info!(threads, "thread pool configured");
    }

    match cli.command {
        Command::Warp {
            reference,
            candidate,
            samples,
            traces,
            reference_delta,
            candidate_delta,
            output_dir,
            tuning,
        } => {
            let f_sampling = Sampling::new(samples, reference_delta, 0.0)?;
            let g_sampling = Sampling::new(samples, candidate_delta, 0.0)?;

            let mut f = ImageReader::new(&reference)
                .read(f_sampling, traces)
                .context("failed to read reference image")?;
            let mut g = ImageReader::new(&candidate)
                .read(g_sampling, traces)
                .context("failed to read candidate image")?;
            info!(samples, traces, "images loaded");

            if tuning.gain_half_width > 0.0 {
                f = normalize_rms(&f, tuning.gain_half_width)?;
                g = normalize_rms(&g, tuning.gain_half_width)?;
                info!(half_width = tuning.gain_half_width, "amplitudes balanced");
            }

            // Bring the reference onto the candidate's effective grid.
            let sampling_ratio = candidate_delta / reference_delta;
            if (sampling_ratio - 1.0).abs() > 1e-12 {
                f = stretch(&f, sampling_ratio, &SincInterpolator::default())?;
                info!(sampling_ratio, "reference stretched");
            }

            let config = build_registration(&tuning, sampling_ratio)?;
            let result = config.run(&f, &g).context("registration failed")?;

            let writer = ImageWriter::new(&output_dir)?;
            let mut outputs = Vec::new();
            for (name, image) in [
                ("registered.dat", &result.registered),
                ("first_warp.dat", &result.first_warp),
                ("vpvs_average.dat", &result.average_ratio),
                ("vpvs_interval.dat", &result.interval_ratio),
            ] {
                outputs.push(writer.write_image(name, image)?.display().to_string());
            }
            outputs.push(
                writer
                    .write_field("shifts.dat", &result.combined_shifts)?
                    .display()
                    .to_string(),
            );

            let output = WarpOutput {
                n_samples: samples,
                n_traces: traces,
                sampling_ratio,
                coarse_shift_min: result.coarse_shifts.min(),
                coarse_shift_max: result.coarse_shifts.max(),
                combined_shift_min: result.combined_shifts.min(),
                combined_shift_max: result.combined_shifts.max(),
                average_ratio_min: result.average_ratio.min(),
                average_ratio_max: result.average_ratio.max(),
                interval_ratio_min: result.interval_ratio.min(),
                interval_ratio_max: result.interval_ratio.max(),
                outputs,
            };
            println!("{}", serde_json::to_string_pretty(&output)?);
        }

        Command::Synth {
            output_dir,
            samples,
            traces,
            seed,
            shift_max,
            constant_shift,
            noise,
            wavelet_freq,
            density,
        } => {
            let profile = match constant_shift {
                Some(k) => ShiftProfile::Constant(k),
                None => ShiftProfile::Ramp(shift_max),
            };
            let pair = SyntheticConfig::new(samples, traces)?
                .with_seed(seed)
                .with_profile(profile)
                .with_noise(noise)
                .with_wavelet_freq(wavelet_freq)
                .with_reflectivity_density(density)
                .generate();
            info!(samples, traces, seed, "synthetic pair generated");

            let writer = ImageWriter::new(&output_dir)?;
            let outputs = vec![
                writer
                    .write_image("reference.dat", &pair.reference)?
                    .display()
                    .to_string(),
                writer
                    .write_image("candidate.dat", &pair.candidate)?
                    .display()
                    .to_string(),
                writer
                    .write_field("applied_shifts.dat", &pair.shifts)?
                    .display()
                    .to_string(),
            ];

            let output = SynthOutput {
                n_samples: samples,
                n_traces: traces,
                seed,
                shift_min: pair.shifts.min(),
                shift_max: pair.shifts.max(),
                outputs,
            };
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
    }

    Ok(())
}
