//! Tuning knobs for the parallel execution paths.
//!
//! Each value is read once from its environment variable and can be replaced
//! at runtime through the matching setter. Passing `0` to a setter removes the
//! override and restores the environment or built-in default.

use core::sync::atomic::{AtomicUsize, Ordering};
use std::sync::OnceLock;

/// Environment variable overriding the number of worker threads.
pub const ENV_THREADS: &str = "PEAKLETS_PAR_THREADS";
/// Environment variable overriding the minimum batch size run in parallel.
pub const ENV_BATCH_THRESHOLD: &str = "PEAKLETS_PAR_BATCH_THRESHOLD";
/// Environment variable overriding the minimum signal length whose window
/// pass is split across threads.
pub const ENV_WINDOW_THRESHOLD: &str = "PEAKLETS_PAR_WINDOW_THRESHOLD";
/// Environment variable overriding the number of window centres per block.
pub const ENV_BLOCK_SIZE: &str = "PEAKLETS_PAR_BLOCK_SIZE";

const DEFAULT_BATCH_THRESHOLD: usize = 2;
const DEFAULT_WINDOW_THRESHOLD: usize = 4096;
const DEFAULT_BLOCK_SIZE: usize = 512;

static THREADS_OVERRIDE: AtomicUsize = AtomicUsize::new(0);
static BATCH_THRESHOLD_OVERRIDE: AtomicUsize = AtomicUsize::new(0);
static WINDOW_THRESHOLD_OVERRIDE: AtomicUsize = AtomicUsize::new(0);
static BLOCK_SIZE_OVERRIDE: AtomicUsize = AtomicUsize::new(0);
static PARALLEL_ENV: OnceLock<ParallelEnv> = OnceLock::new();

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct ParallelEnv {
    threads: usize,
    batch_threshold: usize,
    window_threshold: usize,
    block_size: usize,
}

fn env_usize(name: &str, default: usize) -> usize {
    match std::env::var(name) {
        Ok(raw) => match raw.trim().parse::<usize>() {
            Ok(v) if v > 0 => v,
            _ => {
                crate::vlog_warn!("ignoring {}={:?}, using default {}", name, raw, default);
                default
            }
        },
        Err(_) => default,
    }
}

fn parallel_env() -> &'static ParallelEnv {
    PARALLEL_ENV.get_or_init(|| {
        let env = ParallelEnv {
            threads: env_usize(ENV_THREADS, num_cpus::get().max(1)),
            batch_threshold: env_usize(ENV_BATCH_THRESHOLD, DEFAULT_BATCH_THRESHOLD),
            window_threshold: env_usize(ENV_WINDOW_THRESHOLD, DEFAULT_WINDOW_THRESHOLD),
            block_size: env_usize(ENV_BLOCK_SIZE, DEFAULT_BLOCK_SIZE),
        };
        crate::vlog_debug!("parallel configuration: {:?}", env);
        env
    })
}

fn resolve(over: &AtomicUsize, fallback: impl FnOnce(&ParallelEnv) -> usize) -> usize {
    match over.load(Ordering::Relaxed) {
        0 => fallback(parallel_env()),
        v => v,
    }
}

/// Override the number of threads the parallel paths may use. With a single
/// thread every path runs sequentially.
pub fn set_parallel_threads(threads: usize) {
    THREADS_OVERRIDE.store(threads, Ordering::Relaxed);
}

/// Override the minimum number of rows before a batch is spread over threads.
pub fn set_parallel_batch_threshold(rows: usize) {
    BATCH_THRESHOLD_OVERRIDE.store(rows, Ordering::Relaxed);
}

/// Override the minimum signal length before one scale's window pass is
/// split into blocks evaluated on separate threads.
pub fn set_parallel_window_threshold(len: usize) {
    WINDOW_THRESHOLD_OVERRIDE.store(len, Ordering::Relaxed);
}

/// Override the number of window centres handled by one parallel block.
pub fn set_parallel_block_size(centres: usize) {
    BLOCK_SIZE_OVERRIDE.store(centres, Ordering::Relaxed);
}

pub fn parallel_threads() -> usize {
    resolve(&THREADS_OVERRIDE, |env| env.threads)
}

pub fn parallel_batch_threshold() -> usize {
    resolve(&BATCH_THRESHOLD_OVERRIDE, |env| env.batch_threshold)
}

pub fn parallel_window_threshold() -> usize {
    resolve(&WINDOW_THRESHOLD_OVERRIDE, |env| env.window_threshold)
}

pub fn parallel_block_size() -> usize {
    resolve(&BLOCK_SIZE_OVERRIDE, |env| env.block_size)
}

pub(crate) fn use_parallel_batch(rows: usize) -> bool {
    parallel_threads() > 1 && rows >= parallel_batch_threshold()
}

pub(crate) fn use_parallel_windows(len: usize) -> bool {
    parallel_threads() > 1 && len >= parallel_window_threshold()
}

/// Minimum number of items per Rayon job so that at most
/// [`parallel_threads`] jobs are spawned for `items` work items.
pub(crate) fn min_items_per_job(items: usize) -> usize {
    items.div_ceil(parallel_threads()).max(1)
}

#[cfg(feature = "internal-tests")]
#[doc(hidden)]
pub fn __test_parallel_env() -> (usize, usize, usize, usize) {
    let env = parallel_env();
    (
        env.threads,
        env.batch_threshold,
        env.window_threshold,
        env.block_size,
    )
}
