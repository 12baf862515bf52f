use clap::{Parser, ValueEnum};
use peaklets::{Family, Mode, PeakTransform};
use sanity_check::{
    heatmap, read_signal, save_png, synthetic_peaks, write_csv, ColorMap, PngDepth, Report,
};
use std::error::Error;
use std::path::PathBuf;

/// Decompose a signal with peaklets, check the result and optionally export it.
#[derive(Parser)]
struct Args {
    /// Signal to decompose: a WAV file or a text file of numbers
    #[arg(required_unless_present = "synthetic")]
    input: Option<PathBuf>,

    /// Use a generated signal of this many samples instead of a file
    #[arg(long, conflicts_with = "input")]
    synthetic: Option<usize>,

    /// Seed for the generated signal
    #[arg(long, default_value_t = 0)]
    seed: u64,

    /// Kernel family (parabola, truncated-parabola)
    #[arg(long, default_value = "parabola")]
    family: Family,

    /// Decomposition mode
    #[arg(long, value_enum, default_value_t = ModeArg::Peel)]
    mode: ModeArg,

    /// Relative reconstruction tolerance
    #[arg(long, default_value_t = 1e-9)]
    tolerance: f64,

    /// Write the per-scale components as CSV
    #[arg(long)]
    csv: Option<PathBuf>,

    /// Write a scale/sample heatmap as PNG
    #[arg(long)]
    png: Option<PathBuf>,

    /// Color map for the PNG
    #[arg(long, value_enum, default_value_t = ColorMap::Inferno)]
    colormap: ColorMap,

    /// Bit depth for the PNG
    #[arg(long, value_enum, default_value_t = PngDepth::Eight)]
    png_depth: PngDepth,
}

#[derive(ValueEnum, Clone, Copy)]
enum ModeArg {
    Peel,
    SinglePass,
}

impl From<ModeArg> for Mode {
    fn from(m: ModeArg) -> Self {
        match m {
            ModeArg::Peel => Mode::Peel,
            ModeArg::SinglePass => Mode::SinglePass,
        }
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();
    let signal = match (&args.input, args.synthetic) {
        (_, Some(len)) => synthetic_peaks(len, args.seed),
        (Some(path), None) => read_signal(path)?,
        (None, None) => return Err("no input given".into()),
    };

    let transform = PeakTransform::new(signal.len(), &args.family)?.with_mode(args.mode.into());
    let d = transform.decompose(&signal)?;
    let report = Report::new(&signal, &d);

    println!(
        "{} samples, {} scales ({} family, {:?})",
        report.len,
        report.scales,
        args.family,
        d.mode
    );
    println!("max reconstruction error: {:.3e}", report.max_error);
    println!("smallest component value: {:.3e}", report.min_component);
    if report.nan_samples > 0 {
        println!("missing samples: {}", report.nan_samples);
    }

    if let Some(path) = &args.csv {
        write_csv(path, &d)?;
        println!("wrote {}", path.display());
    }
    if let Some(path) = &args.png {
        save_png(&heatmap(&d, args.colormap), path, args.png_depth)?;
        println!("wrote {}", path.display());
    }

    if !report.passed(args.tolerance) {
        return Err(format!("check failed: {:?}", report).into());
    }
    println!("ok");
    Ok(())
}
