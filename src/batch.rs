//! Batch decomposition.
//!
//! Rows are independent: they share one read-only kernel set and nothing
//! else, so the parallel variant needs no synchronisation beyond collecting
//! results in input order.

extern crate alloc;
use alloc::vec::Vec;

use crate::error::PeakletError;
use crate::kernel::Family;
use crate::num::Float;
use crate::transform::{Decomposition, Mode, PeakTransform};

/// Decompose every row with `transform`. Every row must have
/// `transform.len()` samples.
pub fn decompose_batch<T, R>(
    transform: &PeakTransform<T>,
    rows: &[R],
) -> Result<Vec<Decomposition<T>>, PeakletError>
where
    T: Float,
    R: AsRef<[T]>,
{
    crate::vlog_debug!("batch: {} rows, sequential", rows.len());
    rows.iter().map(|row| transform.decompose(row.as_ref())).collect()
}

/// Decompose equally long rows, building the kernel set from the first row's
/// length. An empty batch yields an empty result.
pub fn decompose_rows<T, R>(
    rows: &[R],
    family: Family,
    mode: Mode,
) -> Result<Vec<Decomposition<T>>, PeakletError>
where
    T: Float,
    R: AsRef<[T]>,
{
    let Some(first) = rows.first() else {
        return Ok(Vec::new());
    };
    let transform = PeakTransform::new(first.as_ref().len(), &family)?.with_mode(mode);
    decompose_batch(&transform, rows)
}

/// Decompose rows on the Rayon thread pool.
///
/// Requires the `parallel` feature. Falls back to [`decompose_batch`] when
/// the batch is smaller than [`parallel_batch_threshold`] or only one thread
/// is configured. Results are returned in input order and are identical to
/// the sequential ones.
///
/// [`parallel_batch_threshold`]: crate::config::parallel_batch_threshold
///
/// # Examples
/// ```
/// use peaklets::batch::decompose_batch_parallel;
/// use peaklets::{Family, PeakTransform};
///
/// let rows = vec![vec![1.0f64; 32]; 8];
/// let t = PeakTransform::new(32, &Family::Parabola).unwrap();
/// let out = decompose_batch_parallel(&t, &rows).unwrap();
/// assert_eq!(out.len(), 8);
/// ```
#[cfg(feature = "parallel")]
pub fn decompose_batch_parallel<T, R>(
    transform: &PeakTransform<T>,
    rows: &[R],
) -> Result<Vec<Decomposition<T>>, PeakletError>
where
    T: Float,
    R: AsRef<[T]> + Sync,
{
    use rayon::prelude::*;
    if !crate::config::use_parallel_batch(rows.len()) {
        return decompose_batch(transform, rows);
    }
    crate::vlog_debug!(
        "batch: {} rows over {} threads",
        rows.len(),
        crate::config::parallel_threads()
    );
    rows.par_iter()
        .with_min_len(crate::config::min_items_per_job(rows.len()))
        .map(|row| transform.decompose(row.as_ref()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec;

    #[test]
    fn empty_batch_is_empty() {
        let rows: Vec<Vec<f64>> = Vec::new();
        assert!(decompose_rows(&rows, Family::Parabola, Mode::Peel)
            .unwrap()
            .is_empty());
    }

    #[test]
    fn ragged_batch_is_rejected() {
        let rows = vec![vec![1.0f64; 16], vec![1.0; 15]];
        assert_eq!(
            decompose_rows(&rows, Family::Parabola, Mode::Peel).unwrap_err(),
            PeakletError::LengthMismatch {
                expected: 16,
                actual: 15
            }
        );
    }
}
