//! Sample type abstraction shared by the kernel generator and the transform engine.

// Minimal float trait for generic sample types (no_std, math through libm)
pub trait Float:
    Copy
    + Clone
    + PartialEq
    + PartialOrd
    + core::fmt::Debug
    + core::ops::Add<Output = Self>
    + core::ops::Sub<Output = Self>
    + core::ops::Mul<Output = Self>
    + core::ops::Div<Output = Self>
    + core::ops::Neg<Output = Self>
    + Send
    + Sync
    + 'static
{
    fn zero() -> Self;
    fn one() -> Self;
    /// Convert from `f64`, rounding to the nearest representable value.
    fn from_f64(x: f64) -> Self;
    fn to_f64(self) -> f64;

    #[inline(always)]
    #[allow(clippy::eq_op)]
    fn is_nan(self) -> bool {
        self != self
    }

    /// Minimum that ignores NaN operands. Returns NaN only when both are NaN.
    #[inline(always)]
    fn nan_min(self, other: Self) -> Self {
        if self.is_nan() || other < self {
            other
        } else {
            self
        }
    }

    /// Maximum that ignores NaN operands. Returns NaN only when both are NaN.
    #[inline(always)]
    fn nan_max(self, other: Self) -> Self {
        if self.is_nan() || other > self {
            other
        } else {
            self
        }
    }
}

impl Float for f32 {
    fn zero() -> Self {
        0.0
    }
    fn one() -> Self {
        1.0
    }
    fn from_f64(x: f64) -> Self {
        x as f32
    }
    fn to_f64(self) -> f64 {
        self as f64
    }
}

impl Float for f64 {
    fn zero() -> Self {
        0.0
    }
    fn one() -> Self {
        1.0
    }
    fn from_f64(x: f64) -> Self {
        x
    }
    fn to_f64(self) -> f64 {
        self
    }
}

/// Clamp negative values to zero in place. NaN entries are left as they are.
#[inline]
pub fn clamp_non_negative<T: Float>(values: &mut [T]) {
    for v in values.iter_mut() {
        if *v < T::zero() {
            *v = T::zero();
        }
    }
}
