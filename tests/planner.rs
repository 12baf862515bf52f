use std::sync::Arc;

use peaklets::{Family, KernelPlanner, KernelSet, Mode};

#[test]
/// Families and lengths are cached separately and handed out as shared sets.
fn planner_caches_per_length_and_family() {
    let mut planner = KernelPlanner::<f64>::new();
    let a = planner.get(256, Family::Parabola).unwrap();
    let b = planner.get(256, Family::TruncatedParabola).unwrap();
    let c = planner.get(100, Family::Parabola).unwrap();
    assert_eq!(planner.cached(), 3);
    assert!(!Arc::ptr_eq(&a, &b));
    assert_eq!(*a, KernelSet::generate(256, &Family::Parabola).unwrap());
    assert_eq!(c.len(), 100);

    let again = planner.get(256, Family::TruncatedParabola).unwrap();
    assert!(Arc::ptr_eq(&b, &again));
    assert_eq!(planner.cached(), 3);

    planner.clear();
    assert_eq!(planner.cached(), 0);
}

#[test]
/// Transforms from the planner reuse the cached kernels.
fn planner_transforms_share_kernels() {
    let mut planner = KernelPlanner::<f32>::default();
    let t = planner.transform(64, Family::Parabola, Mode::SinglePass).unwrap();
    assert_eq!(t.mode(), Mode::SinglePass);
    let cached = planner.get(64, Family::Parabola).unwrap();
    assert!(Arc::ptr_eq(t.kernels(), &cached));

    let signal: Vec<f32> = (0..64).map(|i| 1.0 + (i % 9) as f32).collect();
    let d = t.decompose(&signal).unwrap();
    assert!(Arc::ptr_eq(&d.kernels, &cached));
    assert!(d.max_reconstruction_error(&signal) < 1e-4);
}
