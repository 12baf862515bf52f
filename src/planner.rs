//! Kernel set cache.
//!
//! Kernels depend only on the signal length and the family, so a planner
//! builds each set once and hands out shared [`Arc`] handles afterwards.

use alloc::sync::Arc;
use hashbrown::HashMap;

use crate::error::PeakletError;
use crate::kernel::{Family, KernelSet};
use crate::num::Float;
use crate::transform::{Mode, PeakTransform};

pub struct KernelPlanner<T: Float> {
    cache: HashMap<(usize, Family), Arc<KernelSet<T>>>,
}

impl<T: Float> Default for KernelPlanner<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Float> KernelPlanner<T> {
    pub fn new() -> Self {
        Self {
            cache: HashMap::new(),
        }
    }

    /// Kernel set for signals of `len` samples, built on first request.
    ///
    /// Failed builds are not cached.
    pub fn get(&mut self, len: usize, family: Family) -> Result<Arc<KernelSet<T>>, PeakletError> {
        if let Some(set) = self.cache.get(&(len, family)) {
            crate::vlog_trace!("kernel cache hit: len={} family={}", len, family);
            return Ok(Arc::clone(set));
        }
        let set = Arc::new(KernelSet::generate(len, &family)?);
        self.cache.insert((len, family), Arc::clone(&set));
        Ok(set)
    }

    /// A transform sharing the cached kernel set for `len` and `family`.
    pub fn transform(
        &mut self,
        len: usize,
        family: Family,
        mode: Mode,
    ) -> Result<PeakTransform<T>, PeakletError> {
        Ok(PeakTransform::with_kernels(self.get(len, family)?).with_mode(mode))
    }

    /// Number of cached kernel sets.
    pub fn cached(&self) -> usize {
        self.cache.len()
    }

    pub fn clear(&mut self) {
        self.cache.clear();
    }
}
