//! Decomposition along one axis of an N-dimensional array
//!
//! - Row-major (C order) flat buffers described by a shape slice
//! - Every 1D lane along the chosen axis is decomposed independently
//! - Outputs gain a leading scale axis: `[num_scales, ..shape]` for the
//!   components, `[num_scales + 1, ..shape]` for the filters
//! - no_std + alloc compatible

extern crate alloc;
use alloc::sync::Arc;
use alloc::vec;
use alloc::vec::Vec;

use crate::error::PeakletError;
use crate::kernel::{Family, KernelSet};
use crate::num::Float;
use crate::transform::{Decomposition, Mode, PeakTransform};

/// Per-scale outputs of [`decompose_axis`], stored row-major.
#[derive(Debug, Clone, PartialEq)]
pub struct NdDecomposition<T: Float> {
    /// Shape of the input array.
    pub shape: Vec<usize>,
    /// Axis the transform ran along.
    pub axis: usize,
    /// Components with shape `[num_scales, ..shape]`.
    pub transform: Vec<T>,
    /// Filters with shape `[num_scales + 1, ..shape]`.
    pub filters: Vec<T>,
    pub kernels: Arc<KernelSet<T>>,
    pub mode: Mode,
}

impl<T: Float> NdDecomposition<T> {
    pub fn scales(&self) -> &[f64] {
        self.kernels.scales()
    }

    pub fn num_scales(&self) -> usize {
        self.kernels.num_scales()
    }

    /// Shape of [`transform`](Self::transform).
    pub fn transform_shape(&self) -> Vec<usize> {
        let mut shape = Vec::with_capacity(self.shape.len() + 1);
        shape.push(self.num_scales());
        shape.extend_from_slice(&self.shape);
        shape
    }

    /// Shape of [`filters`](Self::filters).
    pub fn filters_shape(&self) -> Vec<usize> {
        let mut shape = self.transform_shape();
        shape[0] += 1;
        shape
    }

    /// Component of scale `index`, shaped like the input.
    pub fn component(&self, index: usize) -> &[T] {
        let size = self.transform.len() / self.num_scales();
        &self.transform[index * size..(index + 1) * size]
    }

    /// Filter level `index`, shaped like the input.
    pub fn filter(&self, index: usize) -> &[T] {
        let size = self.filters.len() / (self.num_scales() + 1);
        &self.filters[index * size..(index + 1) * size]
    }
}

/// Geometry of the 1D lanes along one axis.
#[derive(Debug, Clone, Copy)]
struct Lanes {
    /// Samples per lane (`shape[axis]`).
    len: usize,
    /// Product of the dimensions after the axis, i.e. the lane stride.
    inner: usize,
    /// Total number of elements.
    total: usize,
}

impl Lanes {
    fn new(data_len: usize, shape: &[usize], axis: usize) -> Result<Self, PeakletError> {
        if axis >= shape.len() {
            return Err(PeakletError::AxisOutOfRange {
                axis,
                ndim: shape.len(),
            });
        }
        let total = shape
            .iter()
            .try_fold(1usize, |acc, &d| acc.checked_mul(d))
            .ok_or(PeakletError::InvalidShape {
                expected: usize::MAX,
                actual: data_len,
            })?;
        if total != data_len {
            return Err(PeakletError::InvalidShape {
                expected: total,
                actual: data_len,
            });
        }
        let inner = shape[axis + 1..]
            .iter()
            .try_fold(1usize, |acc, &d| acc.checked_mul(d))
            .ok_or(PeakletError::InvalidShape {
                expected: usize::MAX,
                actual: data_len,
            })?;
        Ok(Self {
            len: shape[axis],
            inner,
            total,
        })
    }

    fn count(&self) -> usize {
        if self.len == 0 {
            0
        } else {
            self.total / self.len
        }
    }

    /// Flat index of the first sample of lane `lane`.
    fn base(&self, lane: usize) -> usize {
        let outer = lane / self.inner;
        let within = lane % self.inner;
        outer * self.len * self.inner + within
    }

    fn gather<T: Float>(&self, data: &[T]) -> Vec<Vec<T>> {
        (0..self.count())
            .map(|lane| {
                let base = self.base(lane);
                (0..self.len).map(|k| data[base + k * self.inner]).collect()
            })
            .collect()
    }

    fn scatter<T: Float>(&self, rows: &[Vec<Vec<T>>], out: &mut [T]) {
        for (lane, levels) in rows.iter().enumerate() {
            let base = self.base(lane);
            for (s, level) in levels.iter().enumerate() {
                let plane = &mut out[s * self.total..(s + 1) * self.total];
                for (k, &v) in level.iter().enumerate() {
                    plane[base + k * self.inner] = v;
                }
            }
        }
    }
}

/// Decompose every lane of `data` along `axis`.
///
/// `data` is a row-major buffer of the given `shape`. Kernels are built once
/// for `shape[axis]` and shared by every lane.
pub fn decompose_axis<T: Float>(
    data: &[T],
    shape: &[usize],
    axis: usize,
    family: Family,
    mode: Mode,
) -> Result<NdDecomposition<T>, PeakletError> {
    let lanes = Lanes::new(data.len(), shape, axis)?;
    let transform = PeakTransform::new(lanes.len, &family)?.with_mode(mode);
    decompose_axis_with(&transform, data, shape, axis)
}

/// [`decompose_axis`] with an existing transform, whose length must equal
/// `shape[axis]`.
pub fn decompose_axis_with<T: Float>(
    transform: &PeakTransform<T>,
    data: &[T],
    shape: &[usize],
    axis: usize,
) -> Result<NdDecomposition<T>, PeakletError> {
    let lanes = checked_lanes(transform, data, shape, axis)?;
    let rows = lanes.gather(data);
    let decomps = crate::batch::decompose_batch(transform, &rows)?;
    Ok(assemble(transform, lanes, shape, axis, decomps))
}

/// [`decompose_axis_with`] with lanes dispatched to the Rayon thread pool.
///
/// Requires the `parallel` feature.
#[cfg(feature = "parallel")]
pub fn decompose_axis_parallel<T: Float>(
    transform: &PeakTransform<T>,
    data: &[T],
    shape: &[usize],
    axis: usize,
) -> Result<NdDecomposition<T>, PeakletError> {
    let lanes = checked_lanes(transform, data, shape, axis)?;
    let rows = lanes.gather(data);
    let decomps = crate::batch::decompose_batch_parallel(transform, &rows)?;
    Ok(assemble(transform, lanes, shape, axis, decomps))
}

fn checked_lanes<T: Float>(
    transform: &PeakTransform<T>,
    data: &[T],
    shape: &[usize],
    axis: usize,
) -> Result<Lanes, PeakletError> {
    let lanes = Lanes::new(data.len(), shape, axis)?;
    if lanes.len != transform.len() {
        return Err(PeakletError::LengthMismatch {
            expected: transform.len(),
            actual: lanes.len,
        });
    }
    Ok(lanes)
}

fn assemble<T: Float>(
    transform: &PeakTransform<T>,
    lanes: Lanes,
    shape: &[usize],
    axis: usize,
    decomps: Vec<Decomposition<T>>,
) -> NdDecomposition<T> {
    let scales = transform.kernels().num_scales();
    let mut components = vec![T::zero(); scales * lanes.total];
    let mut filters = vec![T::zero(); (scales + 1) * lanes.total];
    let (t_rows, f_rows): (Vec<_>, Vec<_>) = decomps
        .into_iter()
        .map(|d| (d.transform, d.filters))
        .unzip();
    lanes.scatter(&t_rows, &mut components);
    lanes.scatter(&f_rows, &mut filters);
    NdDecomposition {
        shape: shape.to_vec(),
        axis,
        transform: components,
        filters,
        kernels: Arc::clone(transform.kernels()),
        mode: transform.mode(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lane_bases_cover_middle_axis() {
        let lanes = Lanes::new(2 * 3 * 4, &[2, 3, 4], 1).unwrap();
        assert_eq!(lanes.count(), 8);
        assert_eq!(lanes.inner, 4);
        assert_eq!(lanes.base(0), 0);
        assert_eq!(lanes.base(3), 3);
        assert_eq!(lanes.base(4), 12);
    }

    #[test]
    fn bad_axis_and_shape_are_rejected() {
        let data = vec![1.0f64; 12];
        assert_eq!(
            decompose_axis(&data, &[3, 4], 2, Family::Parabola, Mode::Peel).unwrap_err(),
            PeakletError::AxisOutOfRange { axis: 2, ndim: 2 }
        );
        assert_eq!(
            decompose_axis(&data, &[3, 5], 1, Family::Parabola, Mode::Peel).unwrap_err(),
            PeakletError::InvalidShape {
                expected: 15,
                actual: 12
            }
        );
    }

    #[test]
    fn empty_array_with_huge_trailing_dims_is_rejected() {
        let shape = [0, 3, usize::MAX, 2];
        assert_eq!(
            Lanes::new(0, &shape, 1).unwrap_err(),
            PeakletError::InvalidShape {
                expected: usize::MAX,
                actual: 0
            }
        );
        let lanes = Lanes::new(0, &[0, 3, 4], 1).unwrap();
        assert_eq!(lanes.count(), 0);
    }
}
