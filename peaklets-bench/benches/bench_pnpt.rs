use std::hint::black_box;

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use peaklets::{Family, KernelSet, Mode, PeakTransform};
use rand::{rngs::StdRng, Rng, SeedableRng};

fn noisy_peaks(len: usize) -> Vec<f64> {
    let mut rng = StdRng::seed_from_u64(1);
    let mut signal: Vec<f64> = (0..len).map(|_| rng.gen::<f64>().powi(40)).collect();
    for _ in 0..4 {
        let prev = signal.clone();
        for i in 0..len {
            signal[i] += 0.5 * (prev[(i + len - 1) % len] + prev[(i + 1) % len]);
        }
    }
    signal.iter().map(|v| v + 0.1 + 0.5 * rng.gen::<f64>()).collect()
}

fn bench_kernels(c: &mut Criterion) {
    let mut g = c.benchmark_group("kernel_set");
    for &size in &[256usize, 2048, 16384] {
        for family in [Family::Parabola, Family::TruncatedParabola] {
            g.bench_with_input(BenchmarkId::new(family.to_string(), size), &size, |b, &n| {
                b.iter(|| KernelSet::<f64>::generate(black_box(n), &family).unwrap());
            });
        }
    }
    g.finish();
}

fn bench_modes(c: &mut Criterion) {
    let mut g = c.benchmark_group("pnpt");
    g.sample_size(20);
    for &size in &[256usize, 1024, 4096] {
        let signal = noisy_peaks(size);
        for mode in [Mode::Peel, Mode::SinglePass] {
            let t = PeakTransform::<f64>::new(size, &Family::Parabola)
                .unwrap()
                .with_mode(mode);
            g.bench_with_input(BenchmarkId::new(format!("{mode:?}"), size), &signal, |b, s| {
                b.iter(|| t.decompose(black_box(s)).unwrap());
            });
        }
    }
    g.finish();
}

fn bench_precision(c: &mut Criterion) {
    let mut g = c.benchmark_group("precision");
    let size = 2048;
    let signal = noisy_peaks(size);
    let signal32: Vec<f32> = signal.iter().map(|&v| v as f32).collect();
    let t64 = PeakTransform::<f64>::new(size, &Family::Parabola).unwrap();
    let t32 = PeakTransform::<f32>::new(size, &Family::Parabola).unwrap();
    g.bench_function("f64", |b| b.iter(|| t64.decompose(black_box(&signal)).unwrap()));
    g.bench_function("f32", |b| b.iter(|| t32.decompose(black_box(&signal32)).unwrap()));
    g.finish();
}

criterion_group!(benches, bench_kernels, bench_modes, bench_precision);
criterion_main!(benches);
