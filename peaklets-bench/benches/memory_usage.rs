#[cfg(target_os = "linux")]
use criterion::{criterion_group, criterion_main, Criterion};
#[cfg(target_os = "linux")]
use peaklets::{Family, KernelPlanner, Mode};
#[cfg(target_os = "linux")]
use procfs::process::Process;
use std::hint::black_box;

#[cfg(target_os = "linux")]
fn memory_usage_benchmark(c: &mut Criterion) {
    c.bench_function("pnpt_memory_usage", |b| {
        b.iter(|| {
            let len = 1 << 14;
            let mut planner = KernelPlanner::<f32>::new();
            let t = planner.transform(len, Family::Parabola, Mode::Peel).unwrap();
            let signal: Vec<f32> = (0..len).map(|i| 1.0 + (i % 97) as f32).collect();
            let process = Process::myself().unwrap();
            let before = process.statm().unwrap().resident;
            let d = t.decompose(&signal).unwrap();
            let after = process.statm().unwrap().resident;
            black_box(d);
            black_box(after.saturating_sub(before));
        });
    });
}

#[cfg(target_os = "linux")]
criterion_group!(benches, memory_usage_benchmark);
#[cfg(target_os = "linux")]
criterion_main!(benches);

#[cfg(not(target_os = "linux"))]
fn main() {
    black_box(());
}
