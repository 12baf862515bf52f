//! Compares the parabola and truncated-parabola kernel families on one signal.

use peaklets::{pnpt_with, Family, KernelSet, Mode, PeakletError};

fn main() -> Result<(), PeakletError> {
    let len = 96;
    let signal: Vec<f64> = (0..len)
        .map(|i| {
            let x = i as f64;
            0.1 + 3.0 * (-(x - 30.0).powi(2) / 8.0).exp() + (-(x - 70.0).powi(2) / 60.0).exp()
        })
        .collect();

    for family in [Family::Parabola, Family::TruncatedParabola] {
        let set = KernelSet::<f64>::generate(len, &family)?;
        let widths: Vec<usize> = set.kernels().iter().map(|k| k.len()).collect();
        println!("{family}: kernel widths {:?}", widths);

        for mode in [Mode::Peel, Mode::SinglePass] {
            let d = pnpt_with(&signal, family, mode)?;
            let energy: Vec<String> = d
                .transform
                .iter()
                .map(|row| format!("{:.2}", row.iter().sum::<f64>()))
                .collect();
            println!("  {:?}: mass per scale [{}]", mode, energy.join(", "));
        }
    }
    Ok(())
}
