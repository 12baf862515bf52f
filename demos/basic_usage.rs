//! Basic usage example for peaklets
//!
//! Decomposes a small signal with the default parabola peaklets, prints the
//! per-scale components and checks that they add back up to the input.

use peaklets::{pnpt, PeakletError};

fn main() -> Result<(), PeakletError> {
    println!("=== peaklets Basic Usage Example ===\n");

    let signal = vec![
        0.2, 0.3, 0.2, 1.5, 4.0, 1.5, 0.2, 0.3, 0.6, 1.0, 1.2, 1.0, 0.6, 0.3, 0.2, 0.2,
    ];
    println!("Input: {:?}\n", signal);

    let d = pnpt(&signal)?;
    for (scale, row) in d.scales().iter().zip(&d.transform) {
        let formatted: Vec<String> = row.iter().map(|v| format!("{v:.2}")).collect();
        println!("scale {:6.2}: [{}]", scale, formatted.join(", "));
    }

    println!(
        "\nmax reconstruction error: {:.3e}",
        d.max_reconstruction_error(&signal)
    );
    Ok(())
}
