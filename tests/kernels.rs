use peaklets::kernel::WIDTH_ROUNDING_GUARD;
use peaklets::{Family, KernelFamily, KernelSet, Parabola, PeakletError, TruncatedParabola};

fn lengths<T: peaklets::Float>(set: &KernelSet<T>) -> Vec<usize> {
    set.kernels().iter().map(|k| k.len()).collect()
}

#[test]
/// The half-octave ladder for 64 samples stops before the 91-tap kernel.
fn parabola_ladder_for_64_samples() {
    let set = KernelSet::<f64>::generate(64, &Parabola).unwrap();
    assert_eq!(
        lengths(&set),
        vec![1, 3, 3, 5, 7, 11, 15, 23, 31, 45, 63]
    );
    assert_eq!(set.kernel(0), &[1.0]);
    assert_eq!(set.family(), "parabola");
    assert_eq!(set.radius(10), 31);
}

#[test]
/// Scales strictly increase even where two kernels share a length.
fn parabola_scales_strictly_increase() {
    let set = KernelSet::<f64>::generate(1000, &Parabola).unwrap();
    assert!(set.scales().windows(2).all(|w| w[1] > w[0]));
    assert!(lengths(&set).windows(2).all(|w| w[1] >= w[0]));
    assert!(set.kernels().last().unwrap().len() <= 1000);
}

#[test]
/// Every parabola kernel peaks at 1, is symmetric and stays strictly positive.
fn parabola_kernels_are_positive_peaklets() {
    let set = KernelSet::<f64>::generate(513, &Parabola).unwrap();
    for kernel in &set.kernels()[1..] {
        let r = kernel.len() / 2;
        assert_eq!(kernel[r], 1.0);
        assert!(kernel.iter().all(|&v| v > 0.0));
        for k in 0..r {
            assert_eq!(kernel[k], kernel[kernel.len() - 1 - k]);
            assert!(kernel[k] <= kernel[k + 1]);
        }
    }
}

#[test]
/// Without the guard an even power of sqrt(2) would give a zero edge tap.
fn rounding_guard_drops_exact_roots() {
    assert!(WIDTH_ROUNDING_GUARD < 1.0);
    for s in [4.0, 8.0, 16.0, 32.0, 64.0] {
        let n = Parabola.kernel_len(s);
        assert_eq!(n, s as usize - 1);
        let kernel = Parabola.kernel(s, n);
        assert!(kernel[0] > 0.0);
    }
}

#[test]
/// Truncated kernels use the Padovan-like ladder and never dip below one half.
fn truncated_family_geometry() {
    let set = KernelSet::<f64>::generate(64, &TruncatedParabola).unwrap();
    assert_eq!(lengths(&set), vec![1, 3, 5, 5, 7, 11, 17, 23, 35, 51]);
    for kernel in &set.kernels()[1..] {
        assert!(kernel.iter().all(|&v| v >= 0.5 && v <= 1.0));
    }
    assert_eq!(set.family(), "truncated-parabola");
}

#[test]
/// Three samples is the shortest signal either family accepts.
fn shortest_supported_signal() {
    for (family, expected) in [
        (Family::Parabola, vec![1, 3, 3]),
        (Family::TruncatedParabola, vec![1, 3]),
    ] {
        let set = KernelSet::<f32>::generate(3, &family).unwrap();
        assert_eq!(lengths(&set), expected);
        match KernelSet::<f32>::generate(2, &family) {
            Err(PeakletError::SignalTooShort { len: 2, min: 3 }) => {}
            other => panic!("unexpected result: {:?}", other),
        }
    }
}

#[test]
/// Caller-built sets go through the same checks as generated ones.
fn custom_sets_are_validated() {
    let ok = KernelSet::<f64>::from_parts(
        5,
        vec![1.0, 3.0],
        vec![vec![1.0], vec![0.5, 1.0, 0.5]],
    )
    .unwrap();
    assert_eq!(ok.family(), "custom");

    let cases: Vec<(Vec<f64>, Vec<Vec<f64>>, usize)> = vec![
        (vec![1.0, 3.0], vec![vec![1.0], vec![1.0, 0.5]], 1),
        (vec![1.0, 3.0], vec![vec![2.0], vec![0.5, 1.0, 0.5]], 0),
        (vec![1.0, 3.0], vec![vec![1.0], vec![0.0, 1.0, 0.0]], 1),
        (vec![1.0, 3.0], vec![vec![1.0], vec![0.5, 1.0, 0.25]], 1),
        (vec![1.0, 3.0], vec![vec![1.0], vec![1.0, 0.5, 1.0]], 1),
        (vec![1.0, 1.0], vec![vec![1.0], vec![0.5, 1.0, 0.5]], 1),
        (vec![1.0, 9.0], vec![vec![1.0], vec![0.5; 7]], 1),
    ];
    for (scales, kernels, index) in cases {
        match KernelSet::<f64>::from_parts(5, scales, kernels) {
            Err(PeakletError::InvalidKernel { index: i, .. }) => assert_eq!(i, index),
            other => panic!("unexpected result: {:?}", other),
        }
    }
}

#[test]
/// Family names round-trip through Display and FromStr.
fn family_names_parse() {
    for family in [Family::Parabola, Family::TruncatedParabola] {
        assert_eq!(family.to_string().parse::<Family>(), Ok(family));
    }
    assert_eq!("fwhm".parse::<Family>(), Ok(Family::TruncatedParabola));
    match "gaussian".parse::<Family>() {
        Err(PeakletError::UnknownFamily(name)) => assert_eq!(name, "gaussian"),
        other => panic!("unexpected result: {:?}", other),
    }
}

#[test]
/// Kernel sets depend on nothing but the length and the family.
fn generation_is_deterministic() {
    for len in [3usize, 10, 257, 4096] {
        for family in [Family::Parabola, Family::TruncatedParabola] {
            let a = KernelSet::<f64>::generate(len, &family).unwrap();
            let b = KernelSet::<f64>::generate(len, &family).unwrap();
            assert_eq!(a, b);
        }
    }
}

/// Parabola on `s` taps without the rounding guard, so both edge taps are zero.
struct UnguardedParabola;

impl KernelFamily for UnguardedParabola {
    fn name(&self) -> &'static str {
        "unguarded-parabola"
    }
    fn scales(&self, _len: usize) -> Vec<f64> {
        vec![1.0, 4.0]
    }
    fn kernel_len(&self, scale: f64) -> usize {
        scale as usize + 1
    }
    fn kernel(&self, scale: f64, kernel_len: usize) -> Vec<f64> {
        let r = (kernel_len / 2) as i64;
        (-r..=r)
            .map(|x| {
                let t = 2.0 * x as f64 / scale;
                (1.0 + t) * (1.0 - t)
            })
            .collect()
    }
    fn min_len(&self) -> usize {
        5
    }
}

#[test]
/// A third-party family is held to the same invariants as the built-in ones.
fn broken_family_is_rejected() {
    let kernel = UnguardedParabola.kernel(4.0, UnguardedParabola.kernel_len(4.0));
    assert_eq!(kernel, vec![0.0, 0.75, 1.0, 0.75, 0.0]);
    match KernelSet::<f64>::generate(8, &UnguardedParabola) {
        Err(PeakletError::InvalidKernel { index: 1, .. }) => {}
        other => panic!("unexpected result: {:?}", other),
    }
    match peaklets::PeakTransform::<f32>::new(8, &UnguardedParabola) {
        Err(PeakletError::InvalidKernel { index: 1, .. }) => {}
        other => panic!("unexpected result: {:?}", other),
    }
}
