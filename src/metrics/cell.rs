use std::sync::atomic::{AtomicU64, Ordering};

/// Counter bumped from `&self` paths.
///
/// `peek` and friends run under the cache's shared read lock, so several
/// threads may record at once. Relaxed atomics keep that sound; the counts
/// are observational and impose no ordering on cache state.
#[repr(transparent)]
#[derive(Debug, Default)]
pub struct MetricsCell(AtomicU64);

impl MetricsCell {
    #[inline]
    pub fn new() -> Self {
        Self(AtomicU64::new(0))
    }

    #[inline]
    pub fn get(&self) -> u64 {
        self.0.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn incr(&self) {
        self.0.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn reset(&self) {
        self.0.store(0, Ordering::Relaxed);
    }
}
