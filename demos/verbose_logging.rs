//! Demonstrates enabling verbose logging for peaklets.
use peaklets::{KernelPlanner, Family, Mode};

fn main() {
    env_logger::builder()
        .filter_level(log::LevelFilter::Trace)
        .init();

    let mut planner = KernelPlanner::<f64>::new();
    let t = planner.transform(64, Family::Parabola, Mode::Peel).unwrap();
    let signal: Vec<f64> = (0..64).map(|i| 1.0 + (i % 7) as f64).collect();
    t.decompose(&signal).unwrap();
    planner.get(64, Family::Parabola).unwrap();
}
