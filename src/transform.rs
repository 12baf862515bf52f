//! Positive nonlinear peak transform.
//!
//! For each scale the engine slides the scale's peaklet over the signal. At
//! every window centre it takes the largest multiple of the peaklet that fits
//! under the data on the in-bounds part of the window (a NaN-skipping minimum
//! of `data / kernel`), and the scale's envelope is the element-wise maximum of
//! all those placements. Windows are clipped at the signal edges, never
//! wrapped or padded.
//!
//! [`Mode::Peel`] subtracts each envelope from a residual, coarsest scale
//! first, and hands whatever is left to the unit scale. [`Mode::SinglePass`]
//! fits every scale against the original signal and takes successive
//! differences of the monotone envelope stack.
//!
//! ## NaN samples
//!
//! NaN samples are skipped by every window minimum and never spread to other
//! positions. A NaN sample shows up as NaN in `transform[0]` at its own
//! position; in peel mode every filter level is NaN there too, in single-pass
//! mode only `filters[0]` is.

extern crate alloc;
use alloc::sync::Arc;
use alloc::vec;
use alloc::vec::Vec;
use core::ops::Range;

use crate::error::PeakletError;
use crate::kernel::{Family, KernelFamily, KernelSet};
use crate::num::{clamp_non_negative, Float};

/// Which decomposition to compute.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Mode {
    /// Coarse-to-fine residual peeling. Scales are strictly sequential.
    #[default]
    Peel,
    /// Every scale fitted against the original signal, components taken as
    /// differences of the running-maximum envelope stack. Scales are
    /// independent of one another.
    SinglePass,
}

/// Result of decomposing one signal.
#[derive(Debug, Clone, PartialEq)]
pub struct Decomposition<T: Float> {
    /// Per-scale components, `num_scales` rows of `len` samples, finest first.
    pub transform: Vec<Vec<T>>,
    /// Cumulative signals, `num_scales + 1` rows, `filters[i] - filters[i + 1]
    /// == transform[i]`. `filters[0]` is the input; in single-pass mode it is
    /// raised to the envelope stack where rounding lifts an envelope above it.
    pub filters: Vec<Vec<T>>,
    /// Kernels used for the decomposition.
    pub kernels: Arc<KernelSet<T>>,
    pub mode: Mode,
}

impl<T: Float> Decomposition<T> {
    pub fn scales(&self) -> &[f64] {
        self.kernels.scales()
    }

    pub fn num_scales(&self) -> usize {
        self.transform.len()
    }

    /// Number of samples per component.
    pub fn len(&self) -> usize {
        self.kernels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Component of scale `index`. Panics if `index >= num_scales()`.
    pub fn component(&self, index: usize) -> &[T] {
        &self.transform[index]
    }

    /// Sum of all components, which reproduces the input signal.
    pub fn reconstruct(&self) -> Vec<T> {
        let mut out = vec![T::zero(); self.len()];
        for row in self.transform.iter().rev() {
            for (o, &v) in out.iter_mut().zip(row) {
                *o = *o + v;
            }
        }
        out
    }

    /// Largest absolute difference between `signal` and [`reconstruct`],
    /// ignoring positions where `signal` is NaN.
    ///
    /// [`reconstruct`]: Decomposition::reconstruct
    pub fn max_reconstruction_error(&self, signal: &[T]) -> f64 {
        self.reconstruct()
            .iter()
            .zip(signal)
            .filter(|(_, s)| !s.is_nan())
            .map(|(&r, &s)| (r - s).to_f64())
            .fold(0.0, |acc, e| libm::fmax(acc, libm::fabs(e)))
    }
}

/// Peak transform bound to one kernel set.
///
/// The kernel set is shared behind an [`Arc`], so cloning a transform or
/// decomposing many signals never recomputes kernels.
#[derive(Debug, Clone)]
pub struct PeakTransform<T: Float> {
    kernels: Arc<KernelSet<T>>,
    mode: Mode,
}

impl<T: Float> PeakTransform<T> {
    /// Build kernels of `family` for signals of `len` samples.
    pub fn new<F: KernelFamily + ?Sized>(len: usize, family: &F) -> Result<Self, PeakletError> {
        Ok(Self::with_kernels(Arc::new(KernelSet::generate(len, family)?)))
    }

    /// Use an existing (possibly caller-built) kernel set.
    pub fn with_kernels(kernels: Arc<KernelSet<T>>) -> Self {
        Self {
            kernels,
            mode: Mode::default(),
        }
    }

    pub fn with_mode(mut self, mode: Mode) -> Self {
        self.mode = mode;
        self
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn kernels(&self) -> &Arc<KernelSet<T>> {
        &self.kernels
    }

    /// Signal length this transform accepts.
    pub fn len(&self) -> usize {
        self.kernels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Decompose `signal`, which must have exactly [`len`](Self::len) samples.
    pub fn decompose(&self, signal: &[T]) -> Result<Decomposition<T>, PeakletError> {
        if signal.len() != self.len() {
            return Err(PeakletError::LengthMismatch {
                expected: self.len(),
                actual: signal.len(),
            });
        }
        crate::vlog_debug!(
            "decompose: mode={:?} len={} scales={}",
            self.mode,
            signal.len(),
            self.kernels.num_scales()
        );
        let (transform, filters) = match self.mode {
            Mode::Peel => peel(signal, &self.kernels),
            Mode::SinglePass => single_pass(signal, &self.kernels),
        };
        Ok(Decomposition {
            transform,
            filters,
            kernels: Arc::clone(&self.kernels),
            mode: self.mode,
        })
    }
}

/// Decompose `signal` with parabola peaklets and residual peeling.
pub fn pnpt<T: Float>(signal: &[T]) -> Result<Decomposition<T>, PeakletError> {
    pnpt_with(signal, Family::Parabola, Mode::Peel)
}

/// Decompose `signal` with the given kernel family and mode.
pub fn pnpt_with<T: Float>(
    signal: &[T],
    family: Family,
    mode: Mode,
) -> Result<Decomposition<T>, PeakletError> {
    PeakTransform::new(signal.len(), &family)?
        .with_mode(mode)
        .decompose(signal)
}

fn peel<T: Float>(signal: &[T], kernels: &KernelSet<T>) -> (Vec<Vec<T>>, Vec<Vec<T>>) {
    let scales = kernels.num_scales();
    let mut residual = signal.to_vec();
    let mut transform: Vec<Vec<T>> = vec![Vec::new(); scales];
    // Each subtraction is a barrier: scale i fits under what scale i + 1 left.
    for i in (1..scales).rev() {
        let component = envelope(&residual, kernels.kernel(i));
        for (r, &c) in residual.iter_mut().zip(&component) {
            *r = *r - c;
        }
        crate::vlog_trace!("peel: scale {} width {}", i, kernels.kernel(i).len());
        transform[i] = component;
    }
    transform[0] = residual;
    for row in transform.iter_mut() {
        clamp_non_negative(row);
    }

    let mut filters = Vec::with_capacity(scales + 1);
    let mut acc = signal.to_vec();
    filters.push(acc.clone());
    for row in &transform {
        for (a, &t) in acc.iter_mut().zip(row) {
            *a = *a - t;
        }
        let mut level = acc.clone();
        clamp_non_negative(&mut level);
        filters.push(level);
    }
    (transform, filters)
}

fn single_pass<T: Float>(signal: &[T], kernels: &KernelSet<T>) -> (Vec<Vec<T>>, Vec<Vec<T>>) {
    let scales = kernels.num_scales();
    let mut filters: Vec<Vec<T>> = Vec::with_capacity(scales + 1);
    filters.push(signal.to_vec());
    filters.extend(scale_envelopes(signal, kernels));
    filters.push(vec![T::zero(); signal.len()]);

    // Running maximum from the coarse end makes the stack monotone, so every
    // difference below is non-negative.
    for i in (0..scales).rev() {
        let (finer, coarser) = filters.split_at_mut(i + 1);
        for (f, &c) in finer[i].iter_mut().zip(&coarser[0]) {
            if !f.is_nan() {
                *f = f.nan_max(c);
            }
        }
    }

    let transform: Vec<Vec<T>> = filters
        .windows(2)
        .map(|pair| {
            let mut row: Vec<T> = pair[0]
                .iter()
                .zip(&pair[1])
                .map(|(&fine, &coarse)| fine - coarse)
                .collect();
            clamp_non_negative(&mut row);
            row
        })
        .collect();
    (transform, filters)
}

/// Envelopes of scales `1..num_scales` fitted against `signal`.
#[cfg(not(feature = "parallel"))]
fn scale_envelopes<T: Float>(signal: &[T], kernels: &KernelSet<T>) -> Vec<Vec<T>> {
    (1..kernels.num_scales())
        .map(|i| envelope(signal, kernels.kernel(i)))
        .collect()
}

#[cfg(feature = "parallel")]
fn scale_envelopes<T: Float>(signal: &[T], kernels: &KernelSet<T>) -> Vec<Vec<T>> {
    use rayon::prelude::*;
    if crate::config::parallel_threads() <= 1 {
        return (1..kernels.num_scales())
            .map(|i| envelope(signal, kernels.kernel(i)))
            .collect();
    }
    (1..kernels.num_scales())
        .into_par_iter()
        .map(|i| envelope(signal, kernels.kernel(i)))
        .collect()
}

/// Max-envelope of every placement of `kernel` that fits under `data`.
pub(crate) fn envelope<T: Float>(data: &[T], kernel: &[T]) -> Vec<T> {
    #[cfg(feature = "parallel")]
    {
        if crate::config::use_parallel_windows(data.len()) {
            return envelope_parallel(data, kernel, crate::config::parallel_block_size());
        }
    }
    envelope_sequential(data, kernel)
}

pub(crate) fn envelope_sequential<T: Float>(data: &[T], kernel: &[T]) -> Vec<T> {
    let mut out = vec![T::zero(); data.len()];
    envelope_into(data, kernel, 0..data.len(), &mut out, 0);
    out
}

/// Splits the window centres into blocks, builds each block's envelope over
/// its own span, then merges the partial envelopes with an element-wise max.
/// Produces exactly the sequential result.
#[cfg(feature = "parallel")]
pub(crate) fn envelope_parallel<T: Float>(data: &[T], kernel: &[T], block: usize) -> Vec<T> {
    use rayon::prelude::*;
    let n = data.len();
    let r = kernel.len() / 2;
    let block = block.max(1);
    let starts: Vec<usize> = (0..n).step_by(block).collect();
    crate::vlog_trace!("parallel window pass: len={} blocks={}", n, starts.len());
    let partials: Vec<(usize, Vec<T>)> = starts
        .par_iter()
        .with_min_len(crate::config::min_items_per_job(starts.len()))
        .map(|&start| {
            let end = (start + block).min(n);
            let span_lo = start.saturating_sub(r);
            let span_hi = (end + r).min(n);
            let mut buf = vec![T::zero(); span_hi - span_lo];
            envelope_into(data, kernel, start..end, &mut buf, span_lo);
            (span_lo, buf)
        })
        .collect();
    let mut out = vec![T::zero(); n];
    for (lo, buf) in partials {
        for (o, &v) in out[lo..].iter_mut().zip(&buf) {
            *o = o.nan_max(v);
        }
    }
    out
}

/// Accumulate the placements centred on `centres` into `out`, which holds
/// absolute positions `offset..offset + out.len()`. `out` must cover every
/// position those windows touch.
fn envelope_into<T: Float>(
    data: &[T],
    kernel: &[T],
    centres: Range<usize>,
    out: &mut [T],
    offset: usize,
) {
    let n = data.len();
    let r = kernel.len() / 2;
    let nan = T::from_f64(f64::NAN);
    for j0 in centres {
        let lo = j0.saturating_sub(r);
        let hi = (j0 + r + 1).min(n);
        let taps = &kernel[lo + r - j0..hi + r - j0];
        let window = &data[lo..hi];
        let alpha = window
            .iter()
            .zip(taps)
            .fold(nan, |acc, (&d, &k)| acc.nan_min(d / k));
        if alpha.is_nan() {
            continue;
        }
        for (o, &k) in out[lo - offset..hi - offset].iter_mut().zip(taps) {
            *o = o.nan_max(alpha * k);
        }
    }
}


#[cfg(all(feature = "internal-tests", test))]
mod prop_tests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn prop_peel_reconstructs(ref signal in proptest::collection::vec(0.0f64..100.0, 3..300)) {
            let d = pnpt(signal).unwrap();
            let scale = signal.iter().cloned().fold(1.0, f64::max);
            prop_assert!(d.max_reconstruction_error(signal) <= 1e-9 * scale);
            prop_assert!(d.transform.iter().flatten().all(|&v| v >= 0.0));
            prop_assert!(d.filters.iter().flatten().all(|&v| v >= 0.0));
        }

        #[test]
        fn prop_single_pass_reconstructs(ref signal in proptest::collection::vec(0.0f64..100.0, 3..300)) {
            let d = pnpt_with(signal, Family::Parabola, Mode::SinglePass).unwrap();
            let scale = signal.iter().cloned().fold(1.0, f64::max);
            prop_assert!(d.max_reconstruction_error(signal) <= 1e-9 * scale);
            prop_assert!(d.transform.iter().flatten().all(|&v| v >= 0.0));
        }

        #[test]
        fn prop_filters_telescope(
            ref signal in proptest::collection::vec(0.0f64..10.0, 3..200),
            truncated in any::<bool>(),
        ) {
            let family = if truncated { Family::TruncatedParabola } else { Family::Parabola };
            let d = pnpt_with(signal, family, Mode::Peel).unwrap();
            prop_assert_eq!(&d.filters[0], signal);
            for i in 0..d.num_scales() {
                for j in 0..signal.len() {
                    let diff = d.filters[i][j] - d.filters[i + 1][j];
                    prop_assert!((diff - d.transform[i][j]).abs() <= 1e-9 * 10.0);
                }
            }
        }
    }
}
