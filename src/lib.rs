//! # peaklets - Positive nonlinear peak transform for Rust
//!
//! Decomposes a one-dimensional, non-negative signal into a sum of
//! non-negative "peaklet" components at multiple scales. Unlike wavelet
//! decompositions, every component is itself non-negative, which suits
//! inherently positive data such as photon counts, intensities or sensor
//! envelopes.
//!
//! ## Features
//!
//! - **Exact reconstruction**: the per-scale components sum back to the input
//! - **Pluggable kernel families**: parabola (default) and truncated parabola
//! - **Two decompositions**: coarse-to-fine residual peeling and the
//!   single-pass max-envelope variant
//! - **Batch and N-d processing** along any axis of a row-major buffer
//! - **Parallel processing** across rows and within a scale (optional)
//! - `no_std` + `alloc`
//!
//! ## Cargo Features
//!
//! - `std` (default): `std::error::Error` impls and environment configuration
//! - `parallel`: Rayon-backed batch, N-d and within-scale execution
//! - `verbose-logging`: emit `log` records from the planner and engine
//! - `internal-tests`: property-based test suites
//!
//! ## Example
//!
//! ```
//! use peaklets::pnpt;
//!
//! let signal: Vec<f64> = vec![0.2, 0.3, 1.0, 4.0, 1.0, 0.3, 0.2, 0.2, 0.5, 0.2];
//! let d = pnpt(&signal).unwrap();
//! let recon = d.reconstruct();
//! for (a, b) in signal.iter().zip(&recon) {
//!     assert!((a - b).abs() < 1e-12);
//! }
//! assert!(d.transform.iter().flatten().all(|&v| v >= 0.0));
//! ```
//!
//! ## License
//!
//! Licensed under either of MIT or Apache-2.0 at your option.

#![no_std]
extern crate alloc;
#[cfg(feature = "std")]
extern crate std;

#[cfg(feature = "verbose-logging")]
#[doc(hidden)]
#[macro_export]
macro_rules! vlog_debug {
    ($($arg:tt)*) => { log::debug!($($arg)*) };
}

#[cfg(not(feature = "verbose-logging"))]
#[doc(hidden)]
#[macro_export]
macro_rules! vlog_debug {
    ($($arg:tt)*) => {
        if false {
            let _ = format_args!($($arg)*);
        }
    };
}

#[cfg(feature = "verbose-logging")]
#[doc(hidden)]
#[macro_export]
macro_rules! vlog_trace {
    ($($arg:tt)*) => { log::trace!($($arg)*) };
}

#[cfg(not(feature = "verbose-logging"))]
#[doc(hidden)]
#[macro_export]
macro_rules! vlog_trace {
    ($($arg:tt)*) => {
        if false {
            let _ = format_args!($($arg)*);
        }
    };
}

#[cfg(feature = "verbose-logging")]
#[doc(hidden)]
#[macro_export]
macro_rules! vlog_warn {
    ($($arg:tt)*) => { log::warn!($($arg)*) };
}

#[cfg(not(feature = "verbose-logging"))]
#[doc(hidden)]
#[macro_export]
macro_rules! vlog_warn {
    ($($arg:tt)*) => {
        if false {
            let _ = format_args!($($arg)*);
        }
    };
}

/// Sample type abstraction and NaN-aware helpers.
pub mod num;

/// Error type shared by every module.
pub mod error;

/// Peaklet kernel families and kernel sets
///
/// Parabola and truncated-parabola families plus validation of
/// caller-supplied kernels.
pub mod kernel;

/// Peak transform engine
///
/// Residual-peeling and single-pass decompositions of a single signal.
pub mod transform;

/// Kernel set cache keyed by signal length and family.
pub mod planner;

/// Batch decomposition of independent rows sharing one kernel set.
pub mod batch;

/// Decomposition along one axis of an N-dimensional row-major buffer.
pub mod nd;

/// Runtime tuning of the parallel paths
///
/// Thresholds and thread counts read from the environment with
/// programmatic overrides.
#[cfg(feature = "parallel")]
pub mod config;

pub use error::PeakletError;
pub use kernel::{Family, KernelFamily, KernelSet, Parabola, TruncatedParabola};
pub use num::Float;
pub use planner::KernelPlanner;
pub use transform::{pnpt, pnpt_with, Decomposition, Mode, PeakTransform};
