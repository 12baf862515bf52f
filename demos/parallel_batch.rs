//! Decomposes a batch of rows on the Rayon thread pool.
//!
//! Run with `cargo run --example parallel_batch --features parallel`.

use std::time::Instant;

use peaklets::batch::{decompose_batch, decompose_batch_parallel};
use peaklets::config::parallel_threads;
use peaklets::{Family, PeakTransform, PeakletError};

fn main() -> Result<(), PeakletError> {
    let len = 4096;
    let rows: Vec<Vec<f64>> = (0..32)
        .map(|r| {
            (0..len)
                .map(|i| {
                    let x = (i * (r + 3)) as f64 * 0.01;
                    1.0 + x.sin().powi(16) * 5.0
                })
                .collect()
        })
        .collect();
    let t = PeakTransform::new(len, &Family::Parabola)?;

    let start = Instant::now();
    let seq = decompose_batch(&t, &rows)?;
    let seq_time = start.elapsed();

    let start = Instant::now();
    let par = decompose_batch_parallel(&t, &rows)?;
    let par_time = start.elapsed();

    assert_eq!(seq, par);
    println!(
        "{} rows x {} samples: sequential {:?}, parallel {:?} on {} threads",
        rows.len(),
        len,
        seq_time,
        par_time,
        parallel_threads()
    );
    Ok(())
}
