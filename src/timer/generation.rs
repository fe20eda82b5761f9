//! Run generation guard.
//!
//! Every timer run is tagged with the generation current when it started.
//! Side effects go through [`Generation::run_if_current`], which holds the
//! lock while the effect executes. Bumping the counter takes the same lock,
//! so once [`Generation::advance`] returns no superseded run can write.

use std::sync::{Arc, Mutex, MutexGuard};

/// Shared, monotonically increasing run counter.
#[derive(Debug, Clone, Default)]
pub struct Generation {
    current: Arc<Mutex<u64>>,
}

impl Generation {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, u64> {
        self.current
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Invalidates every earlier generation and returns the new one.
    pub fn advance(&self) -> u64 {
        let mut current = self.lock();
        *current += 1;
        *current
    }

    /// Returns the current generation.
    pub fn current(&self) -> u64 {
        *self.lock()
    }

    /// Returns true if `generation` has not been superseded.
    pub fn is_current(&self, generation: u64) -> bool {
        *self.lock() == generation
    }

    /// Runs `effect` only if `generation` is still current.
    pub fn run_if_current<R>(&self, generation: u64, effect: impl FnOnce() -> R) -> Option<R> {
        let current = self.lock();
        if *current != generation {
            return None;
        }
        let result = effect();
        drop(current);
        Some(result)
    }
}
