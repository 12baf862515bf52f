//! Peaklet kernel generation.
//!
//! A kernel family maps a signal length to an increasing sequence of scales and
//! one symmetric, unimodal, strictly positive kernel per scale. Index 0 is always
//! the unit scale whose kernel is `[1.0]`.
//!
//! Scale geometry is computed in `f64` regardless of the sample type, so `f32`
//! and `f64` signals of the same length get kernels of identical length.

use alloc::format;
use alloc::string::ToString;
use alloc::vec;
use alloc::vec::Vec;
use core::fmt;
use core::str::FromStr;

use crate::error::PeakletError;
use crate::num::Float;

/// Factor applied to `scale / 2` before flooring it into a kernel radius.
///
/// When `scale / 2` is an exact integer (every even power of `sqrt(2)`), the
/// kernel edge would land exactly on the parabola's root and the edge value
/// would be `0`. Scaling by `1 - 1e-14` pulls such values just below the
/// integer so the radius drops by one and every kernel value stays strictly
/// positive. The offset is about 45 ulps at `1.0`, well above the rounding
/// error of `pow(sqrt(2), k)` for any scale that fits in memory, and far below
/// the distance of any non-integer `scale / 2` from the next integer.
pub const WIDTH_ROUNDING_GUARD: f64 = 1.0 - 1e-14;

/// Fewest scales a usable kernel set can hold: the unit scale plus one peaklet.
pub const MIN_SCALES: usize = 2;

/// Relative tolerance used when checking caller-supplied kernels for symmetry.
const SYMMETRY_TOLERANCE: f64 = 1e-12;

/// A pluggable family of peaklet kernels.
///
/// Implementations must produce strictly increasing scales, odd kernel
/// lengths that never decrease with the scale, and kernels that are positive,
/// symmetric and non-increasing away from the centre.
pub trait KernelFamily {
    /// Short identifier used in logs and diagnostics.
    fn name(&self) -> &'static str;
    /// Scales for a signal of `len` samples, narrowest first. Every scale's
    /// kernel must fit in `len` samples.
    fn scales(&self, len: usize) -> Vec<f64>;
    /// Odd number of taps used for `scale`.
    fn kernel_len(&self, scale: f64) -> usize;
    /// Kernel values for `scale` sampled on `kernel_len` centred taps.
    fn kernel(&self, scale: f64, kernel_len: usize) -> Vec<f64>;
    /// Shortest signal for which [`KernelFamily::scales`] yields at least
    /// [`MIN_SCALES`] scales.
    fn min_len(&self) -> usize;
}

/// Centred tap offsets `-r..=r` for an odd `kernel_len`.
fn taps(kernel_len: usize) -> impl Iterator<Item = f64> {
    let r = (kernel_len / 2) as i64;
    (-r..=r).map(|x| x as f64)
}

/// Downward parabola peaklets on a half-octave scale ladder.
///
/// Scales are `sqrt(2)^(2 + i)` for `i < floor(2 log2(len))`, trimmed from the
/// top until the widest kernel fits. Each kernel is `(1 + 2x/s)(1 - 2x/s)`,
/// equal to `1` at the centre and approaching `0` at the edges.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Parabola;

impl KernelFamily for Parabola {
    fn name(&self) -> &'static str {
        "parabola"
    }

    fn scales(&self, len: usize) -> Vec<f64> {
        if len < 2 {
            return Vec::new();
        }
        // May overshoot by one scale; trimmed below.
        let count = libm::floor(2.0 * libm::log2(len as f64)) as usize;
        let mut scales: Vec<f64> = (0..count)
            .map(|i| libm::pow(core::f64::consts::SQRT_2, (2 + i) as f64))
            .collect();
        while scales.last().is_some_and(|&s| self.kernel_len(s) > len) {
            scales.pop();
        }
        scales
    }

    fn kernel_len(&self, scale: f64) -> usize {
        2 * libm::floor(WIDTH_ROUNDING_GUARD * (scale / 2.0)) as usize + 1
    }

    fn kernel(&self, scale: f64, kernel_len: usize) -> Vec<f64> {
        taps(kernel_len)
            .map(|x| (1.0 + 2.0 * x / scale) * (1.0 - 2.0 * x / scale))
            .collect()
    }

    fn min_len(&self) -> usize {
        3
    }
}

/// Parabola peaklets riding on a constant half-height offset.
///
/// The scale is the kernel's full width at half maximum: kernels are
/// `0.5 + 0.5 (1 + 2x/s)(1 - 2x/s)`, truncated at `|x| <= s/2`, so edge values
/// never drop below `0.5`. Scales follow `1, 2, 4, s[n-1] + s[n-3], ...`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TruncatedParabola;

impl KernelFamily for TruncatedParabola {
    fn name(&self) -> &'static str {
        "truncated-parabola"
    }

    fn scales(&self, len: usize) -> Vec<f64> {
        let mut scales: Vec<f64> = Vec::new();
        loop {
            let next = match scales.len() {
                0 => 1.0,
                1 => 2.0,
                2 => 4.0,
                n => scales[n - 1] + scales[n - 3],
            };
            if self.kernel_len(next) > len {
                break;
            }
            scales.push(next);
        }
        scales
    }

    fn kernel_len(&self, scale: f64) -> usize {
        2 * libm::floor(scale / 2.0) as usize + 1
    }

    fn kernel(&self, scale: f64, kernel_len: usize) -> Vec<f64> {
        taps(kernel_len)
            .map(|x| 0.5 + 0.5 * (1.0 + 2.0 * x / scale) * (1.0 - 2.0 * x / scale))
            .collect()
    }

    fn min_len(&self) -> usize {
        3
    }
}

/// Selector for the built-in kernel families.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Family {
    #[default]
    Parabola,
    TruncatedParabola,
}

impl KernelFamily for Family {
    fn name(&self) -> &'static str {
        match self {
            Family::Parabola => Parabola.name(),
            Family::TruncatedParabola => TruncatedParabola.name(),
        }
    }
    fn scales(&self, len: usize) -> Vec<f64> {
        match self {
            Family::Parabola => Parabola.scales(len),
            Family::TruncatedParabola => TruncatedParabola.scales(len),
        }
    }
    fn kernel_len(&self, scale: f64) -> usize {
        match self {
            Family::Parabola => Parabola.kernel_len(scale),
            Family::TruncatedParabola => TruncatedParabola.kernel_len(scale),
        }
    }
    fn kernel(&self, scale: f64, kernel_len: usize) -> Vec<f64> {
        match self {
            Family::Parabola => Parabola.kernel(scale, kernel_len),
            Family::TruncatedParabola => TruncatedParabola.kernel(scale, kernel_len),
        }
    }
    fn min_len(&self) -> usize {
        match self {
            Family::Parabola => Parabola.min_len(),
            Family::TruncatedParabola => TruncatedParabola.min_len(),
        }
    }
}

impl fmt::Display for Family {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Family {
    type Err = PeakletError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "parabola" => Ok(Family::Parabola),
            "truncated-parabola" | "truncated_parabola" | "fwhm" => {
                Ok(Family::TruncatedParabola)
            }
            _ => Err(PeakletError::UnknownFamily(s.to_string())),
        }
    }
}

/// Scales and kernels for one signal length.
///
/// Depends only on the length and the family, never on signal values, so a
/// single set is shared by every row of a batch.
#[derive(Debug, Clone, PartialEq)]
pub struct KernelSet<T: Float> {
    len: usize,
    family: &'static str,
    scales: Vec<f64>,
    kernels: Vec<Vec<T>>,
}

impl<T: Float> KernelSet<T> {
    /// Build the kernel set of `family` for signals of `len` samples.
    ///
    /// Fails with [`PeakletError::SignalTooShort`] when fewer than
    /// [`MIN_SCALES`] scales fit in `len`, and with
    /// [`PeakletError::InvalidKernel`] when the family's output breaks an
    /// invariant checked by [`KernelSet::validate`].
    pub fn generate<F: KernelFamily + ?Sized>(len: usize, family: &F) -> Result<Self, PeakletError> {
        let scales = family.scales(len);
        if scales.len() < MIN_SCALES {
            return Err(PeakletError::SignalTooShort {
                len,
                min: family.min_len(),
            });
        }
        let kernels: Vec<Vec<T>> = scales
            .iter()
            .enumerate()
            .map(|(i, &s)| {
                if i == 0 {
                    vec![T::one()]
                } else {
                    family
                        .kernel(s, family.kernel_len(s))
                        .into_iter()
                        .map(T::from_f64)
                        .collect()
                }
            })
            .collect();
        crate::vlog_debug!(
            "generated {} kernel set: len={} scales={} widest={}",
            family.name(),
            len,
            scales.len(),
            kernels.last().map_or(0, |k| k.len())
        );
        let set = Self {
            len,
            family: family.name(),
            scales,
            kernels,
        };
        set.validate()?;
        Ok(set)
    }

    /// Assemble a kernel set from caller-supplied parts after checking every
    /// structural invariant (see [`KernelSet::validate`]).
    pub fn from_parts(
        len: usize,
        scales: Vec<f64>,
        kernels: Vec<Vec<T>>,
    ) -> Result<Self, PeakletError> {
        let set = Self {
            len,
            family: "custom",
            scales,
            kernels,
        };
        set.validate()?;
        Ok(set)
    }

    /// Check the invariants the transform engine relies on: one kernel per
    /// scale, at least [`MIN_SCALES`] scales, kernel 0 is `[1.0]`, scales
    /// strictly increasing, kernel lengths odd, non-decreasing and no longer
    /// than the signal, kernel values strictly positive, symmetric and
    /// non-increasing away from the centre.
    pub fn validate(&self) -> Result<(), PeakletError> {
        let invalid = |index: usize, reason: alloc::string::String| PeakletError::InvalidKernel {
            index,
            reason,
        };
        if self.scales.len() != self.kernels.len() {
            return Err(invalid(
                self.scales.len().min(self.kernels.len()),
                format!(
                    "{} scales but {} kernels",
                    self.scales.len(),
                    self.kernels.len()
                ),
            ));
        }
        if self.kernels.len() < MIN_SCALES {
            return Err(invalid(
                0,
                format!("at least {MIN_SCALES} scales are required"),
            ));
        }
        if self.kernels[0].len() != 1 || self.kernels[0][0] != T::one() {
            return Err(invalid(0, "unit scale kernel must be [1.0]".to_string()));
        }
        for (i, (&scale, kernel)) in self.scales.iter().zip(&self.kernels).enumerate() {
            if !(scale > 0.0) {
                return Err(invalid(i, format!("scale {scale} is not positive")));
            }
            if i > 0 {
                let prev_scale = self.scales[i - 1];
                if !(scale > prev_scale) {
                    return Err(invalid(
                        i,
                        format!("scale {scale} does not exceed previous scale {prev_scale}"),
                    ));
                }
                let prev_len = self.kernels[i - 1].len();
                if kernel.len() < prev_len {
                    return Err(invalid(
                        i,
                        format!("length {} is shorter than previous {}", kernel.len(), prev_len),
                    ));
                }
            }
            check_kernel(kernel, self.len).map_err(|reason| invalid(i, reason))?;
        }
        Ok(())
    }

    /// Signal length the set was built for.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Always `false`: a valid set holds at least [`MIN_SCALES`] kernels.
    pub fn is_empty(&self) -> bool {
        self.kernels.is_empty()
    }

    pub fn num_scales(&self) -> usize {
        self.scales.len()
    }

    pub fn scales(&self) -> &[f64] {
        &self.scales
    }

    pub fn kernels(&self) -> &[Vec<T>] {
        &self.kernels
    }

    /// Kernel of scale `index`. Panics if `index >= num_scales()`.
    pub fn kernel(&self, index: usize) -> &[T] {
        &self.kernels[index]
    }

    /// Half-width `R` of kernel `index`, so the kernel spans `2R + 1` taps.
    pub fn radius(&self, index: usize) -> usize {
        self.kernels[index].len() / 2
    }

    /// Name of the family that produced the set, `"custom"` for
    /// [`KernelSet::from_parts`].
    pub fn family(&self) -> &'static str {
        self.family
    }
}

fn check_kernel<T: Float>(kernel: &[T], len: usize) -> Result<(), alloc::string::String> {
    let n = kernel.len();
    if n % 2 == 0 {
        return Err(format!("length {n} is not odd"));
    }
    if n > len {
        return Err(format!("length {n} exceeds signal length {len}"));
    }
    if let Some(pos) = kernel.iter().position(|&v| !(v > T::zero())) {
        return Err(format!("value at tap {pos} is not strictly positive"));
    }
    let centre = n / 2;
    for k in 0..centre {
        let a = kernel[centre - 1 - k].to_f64();
        let b = kernel[centre + 1 + k].to_f64();
        let scale = libm::fmax(libm::fabs(a), libm::fabs(b));
        if libm::fabs(a - b) > SYMMETRY_TOLERANCE * scale {
            return Err(format!("taps at offset {} differ ({a} vs {b})", k + 1));
        }
    }
    for k in centre..n - 1 {
        if kernel[k + 1] > kernel[k] {
            return Err(format!("values increase away from the centre at tap {}", k + 1));
        }
    }
    Ok(())
}


#[cfg(all(feature = "internal-tests", test))]
mod prop_tests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn prop_generated_sets_validate(len in 3usize..5000, truncated in any::<bool>()) {
            let family = if truncated { Family::TruncatedParabola } else { Family::Parabola };
            let set = KernelSet::<f64>::generate(len, &family).unwrap();
            prop_assert!(set.validate().is_ok());
            prop_assert!(set.kernels().last().unwrap().len() <= len);
        }

        #[test]
        fn prop_f32_and_f64_share_geometry(len in 3usize..2048) {
            let a = KernelSet::<f32>::generate(len, &Parabola).unwrap();
            let b = KernelSet::<f64>::generate(len, &Parabola).unwrap();
            prop_assert_eq!(a.scales(), b.scales());
            for (ka, kb) in a.kernels().iter().zip(b.kernels()) {
                prop_assert_eq!(ka.len(), kb.len());
            }
        }
    }
}
