use clap::ValueEnum;
use hound::{SampleFormat, WavReader};
use image::{
    codecs::png::{CompressionType, FilterType, PngEncoder},
    ColorType, EncodableLayout, ImageBuffer, ImageEncoder, Rgb,
};
use peaklets::Decomposition;
use rand::{rngs::StdRng, Rng, SeedableRng};
use std::error::Error;
use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::Path;

#[derive(ValueEnum, Clone, Copy, Debug)]
pub enum PngDepth {
    Eight,
    Sixteen,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
pub enum ColorMap {
    Gray,
    Viridis,
    Plasma,
    Inferno,
}

/// Load a signal from a WAV file or a text file of numbers.
///
/// WAV channels are averaged and rectified, since the transform expects
/// non-negative input. Text files hold numbers separated by whitespace or
/// commas; lines starting with `#` are skipped and `NaN` marks a missing
/// sample.
pub fn read_signal(path: &Path) -> Result<Vec<f64>, Box<dyn Error>> {
    if path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("wav"))
    {
        return read_wav(path);
    }
    let text = fs::read_to_string(path)?;
    Ok(parse_text(&text)?)
}

pub fn parse_text(text: &str) -> Result<Vec<f64>, std::num::ParseFloatError> {
    text.lines()
        .filter(|line| !line.trim_start().starts_with('#'))
        .flat_map(|line| line.split(|c: char| c == ',' || c.is_whitespace()))
        .filter(|token| !token.is_empty())
        .map(str::parse)
        .collect()
}

fn read_wav(path: &Path) -> Result<Vec<f64>, Box<dyn Error>> {
    let mut reader = WavReader::open(path)?;
    let spec = reader.spec();
    let interleaved: Vec<f64> = match spec.sample_format {
        SampleFormat::Float => reader
            .samples::<f32>()
            .map(|s| s.map(f64::from))
            .collect::<Result<_, _>>()?,
        SampleFormat::Int => {
            let full_scale = (1i64 << (spec.bits_per_sample - 1)) as f64;
            reader
                .samples::<i32>()
                .map(|s| s.map(|v| v as f64 / full_scale))
                .collect::<Result<_, _>>()?
        }
    };
    let channels = usize::from(spec.channels.max(1));
    Ok(interleaved
        .chunks(channels)
        .map(|frame| (frame.iter().sum::<f64>() / channels as f64).abs())
        .collect())
}

/// Sparse random peaks smeared over their neighbours on a noisy floor.
pub fn synthetic_peaks(len: usize, seed: u64) -> Vec<f64> {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut signal: Vec<f64> = (0..len).map(|_| rng.gen::<f64>().powi(40)).collect();
    for _ in 0..4 {
        let prev = signal.clone();
        for i in 0..len {
            signal[i] += 0.5 * (prev[(i + len - 1) % len] + prev[(i + 1) % len]);
        }
    }
    for v in signal.iter_mut() {
        *v += 0.1 + 0.5 * rng.gen::<f64>();
    }
    signal
}

/// Outcome of checking one decomposition against its input.
#[derive(Debug, Clone, PartialEq)]
pub struct Report {
    pub len: usize,
    pub scales: usize,
    pub max_error: f64,
    pub min_component: f64,
    pub nan_samples: usize,
    pub peak: f64,
}

impl Report {
    pub fn new(signal: &[f64], d: &Decomposition<f64>) -> Self {
        let min_component = d
            .transform
            .iter()
            .flatten()
            .filter(|v| !v.is_nan())
            .cloned()
            .fold(f64::INFINITY, f64::min);
        Self {
            len: signal.len(),
            scales: d.num_scales(),
            max_error: d.max_reconstruction_error(signal),
            min_component,
            nan_samples: signal.iter().filter(|v| v.is_nan()).count(),
            peak: signal
                .iter()
                .filter(|v| !v.is_nan())
                .cloned()
                .fold(0.0, f64::max),
        }
    }

    /// Components are non-negative and reconstruct within `tolerance` relative
    /// to the signal peak.
    pub fn passed(&self, tolerance: f64) -> bool {
        self.min_component >= 0.0 && self.max_error <= tolerance * self.peak.max(1.0)
    }
}

/// Write one row per sample and one column per scale.
pub fn write_csv(path: &Path, d: &Decomposition<f64>) -> io::Result<()> {
    let mut out = BufWriter::new(File::create(path)?);
    write!(out, "sample")?;
    for s in d.scales() {
        write!(out, ",scale_{s:.3}")?;
    }
    writeln!(out)?;
    for j in 0..d.len() {
        write!(out, "{j}")?;
        for row in &d.transform {
            write!(out, ",{}", row[j])?;
        }
        writeln!(out)?;
    }
    out.flush()
}

fn map_color(value: f64, max: f64, cmap: ColorMap) -> [u16; 3] {
    if value.is_nan() {
        return [0, 0, 0];
    }
    let t = (value / max).clamp(0.0, 1.0).sqrt();
    let c = match cmap {
        ColorMap::Gray => {
            let g = (t * 65535.0).round() as u16;
            return [g, g, g];
        }
        ColorMap::Viridis => colorous::VIRIDIS.eval_continuous(t),
        ColorMap::Plasma => colorous::PLASMA.eval_continuous(t),
        ColorMap::Inferno => colorous::INFERNO.eval_continuous(t),
    };
    [
        u16::from(c.r) * 257,
        u16::from(c.g) * 257,
        u16::from(c.b) * 257,
    ]
}

/// Samples along x, scales along y with the coarsest at the top.
pub fn heatmap(d: &Decomposition<f64>, cmap: ColorMap) -> ImageBuffer<Rgb<u16>, Vec<u16>> {
    let width = d.len() as u32;
    let height = d.num_scales() as u32;
    let max = d
        .transform
        .iter()
        .flatten()
        .filter(|v| !v.is_nan())
        .cloned()
        .fold(0.0f64, f64::max);
    let max = if max > 0.0 { max } else { 1.0 };
    ImageBuffer::from_fn(width, height, |x, y| {
        let scale = d.num_scales() - 1 - y as usize;
        Rgb(map_color(d.transform[scale][x as usize], max, cmap))
    })
}

pub fn save_png(
    img: &ImageBuffer<Rgb<u16>, Vec<u16>>,
    path: &Path,
    depth: PngDepth,
) -> Result<(), Box<dyn Error>> {
    let file = File::create(path)?;
    let encoder = PngEncoder::new_with_quality(file, CompressionType::Best, FilterType::Adaptive);
    let (w, h) = (img.width(), img.height());
    match depth {
        PngDepth::Eight => {
            let img8: ImageBuffer<Rgb<u8>, Vec<u8>> = ImageBuffer::from_fn(w, h, |x, y| {
                let p = img.get_pixel(x, y);
                Rgb([
                    (p.0[0] >> 8) as u8,
                    (p.0[1] >> 8) as u8,
                    (p.0[2] >> 8) as u8,
                ])
            });
            encoder.write_image(img8.as_raw(), w, h, ColorType::Rgb8)?;
        }
        PngDepth::Sixteen => {
            encoder.write_image(img.as_raw().as_bytes(), w, h, ColorType::Rgb16)?;
        }
    }
    Ok(())
}
