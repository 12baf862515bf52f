use alloc::string::String;
use core::fmt;

/// Errors raised while building kernels or decomposing signals.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PeakletError {
    /// The signal is too short to hold any peaklet wider than the unit scale.
    SignalTooShort { len: usize, min: usize },
    /// A signal's length does not match the length the kernels were built for.
    LengthMismatch { expected: usize, actual: usize },
    /// A caller-supplied kernel breaks a structural invariant.
    InvalidKernel { index: usize, reason: String },
    /// A flat buffer does not hold as many elements as its shape describes.
    InvalidShape { expected: usize, actual: usize },
    /// The requested axis does not exist.
    AxisOutOfRange { axis: usize, ndim: usize },
    /// A kernel family name could not be parsed.
    UnknownFamily(String),
}

impl fmt::Display for PeakletError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PeakletError::SignalTooShort { len, min } => write!(
                f,
                "signal of length {len} is too short, at least {min} samples are needed"
            ),
            PeakletError::LengthMismatch { expected, actual } => {
                write!(f, "expected a signal of length {expected}, got {actual}")
            }
            PeakletError::InvalidKernel { index, reason } => {
                write!(f, "kernel {index} is invalid: {reason}")
            }
            PeakletError::InvalidShape { expected, actual } => write!(
                f,
                "shape describes {expected} elements but the buffer holds {actual}"
            ),
            PeakletError::AxisOutOfRange { axis, ndim } => {
                write!(f, "axis {axis} is out of range for {ndim} dimensions")
            }
            PeakletError::UnknownFamily(name) => write!(f, "unknown kernel family `{name}`"),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for PeakletError {}
