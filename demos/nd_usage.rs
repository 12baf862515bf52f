//! N-d usage example for peaklets
//! Decomposes every row of a small 2-d array along its last axis.

use peaklets::nd::decompose_axis;
use peaklets::{Family, Mode, PeakletError};

fn main() -> Result<(), PeakletError> {
    let (rows, cols) = (3, 32);
    let data: Vec<f32> = (0..rows * cols)
        .map(|i| {
            let (r, c) = (i / cols, i % cols);
            1.0 + ((c as f32 - 8.0 * (r + 1) as f32).abs() < 3.0) as u8 as f32 * 2.0
        })
        .collect();

    let d = decompose_axis(&data, &[rows, cols], 1, Family::Parabola, Mode::Peel)?;
    println!("transform shape: {:?}", d.transform_shape());
    for s in 0..d.num_scales() {
        let mass: f32 = d.component(s).iter().sum();
        println!("scale {:6.2}: total {:.3}", d.scales()[s], mass);
    }
    Ok(())
}
