use std::sync::Arc;

use peaklets::batch::{decompose_batch, decompose_rows};
use peaklets::{Family, Mode, PeakTransform, PeakletError};
use rand::{rngs::StdRng, Rng, SeedableRng};

fn rows(count: usize, len: usize) -> Vec<Vec<f64>> {
    let mut rng = StdRng::seed_from_u64(5);
    (0..count)
        .map(|_| (0..len).map(|_| rng.gen::<f64>().powi(6) * 4.0).collect())
        .collect()
}

#[test]
/// Batch results equal decomposing each row on its own.
fn batch_matches_single_rows() {
    let data = rows(6, 90);
    let t = PeakTransform::<f64>::new(90, &Family::Parabola).unwrap();
    let out = decompose_batch(&t, &data).unwrap();
    assert_eq!(out.len(), data.len());
    for (d, row) in out.iter().zip(&data) {
        assert_eq!(d, &t.decompose(row).unwrap());
        assert!(Arc::ptr_eq(&d.kernels, t.kernels()));
    }
}

#[test]
/// Rows can be borrowed slices as well as owned vectors.
fn batch_accepts_slices() {
    let data = rows(3, 40);
    let slices: Vec<&[f64]> = data.iter().map(|r| r.as_slice()).collect();
    let a = decompose_rows(&slices, Family::TruncatedParabola, Mode::SinglePass).unwrap();
    let b = decompose_rows(&data, Family::TruncatedParabola, Mode::SinglePass).unwrap();
    assert_eq!(a, b);
}

#[test]
/// Empty batches are fine, short or ragged rows are not.
fn batch_errors() {
    let empty: Vec<Vec<f32>> = Vec::new();
    assert!(decompose_rows(&empty, Family::Parabola, Mode::Peel)
        .unwrap()
        .is_empty());

    let short = vec![vec![1.0f32, 2.0]];
    assert_eq!(
        decompose_rows(&short, Family::Parabola, Mode::Peel).unwrap_err(),
        PeakletError::SignalTooShort { len: 2, min: 3 }
    );

    let mut ragged = rows(3, 20);
    ragged[2].pop();
    match decompose_rows(&ragged, Family::Parabola, Mode::Peel) {
        Err(PeakletError::LengthMismatch {
            expected: 20,
            actual: 19,
        }) => {}
        other => panic!("unexpected result: {:?}", other),
    }
}
