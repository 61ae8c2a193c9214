use crate::cache::EvictionCause;
use crate::metrics::cell::MetricsCell;
use crate::metrics::traits::{CoreMetricsRecorder, EvictionMetricsRecorder, ReadMetricsRecorder};

/// Counter block embedded in [`EvictingCore`](crate::cache::EvictingCore).
#[derive(Debug, Default)]
pub struct EvictingMetrics {
    pub get_calls: u64,
    pub get_hits: u64,
    pub get_misses: u64,
    pub insert_calls: u64,
    pub insert_updates: u64,
    pub insert_new: u64,
    pub evict_calls: u64,
    pub evicted_by_capacity: u64,
    pub evicted_by_cost: u64,
    pub remove_calls: u64,
    pub remove_found: u64,
    pub pop_lru_calls: u64,
    pub pop_lru_found: u64,
    pub touch_calls: u64,
    pub touch_found: u64,
    pub clear_calls: u64,
    pub bound_changes: u64,
    pub peek_calls: MetricsCell,
    pub peek_found: MetricsCell,
}

impl EvictingMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Zeroes every counter.
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

impl CoreMetricsRecorder for EvictingMetrics {
    fn record_get_hit(&mut self) {
        self.get_calls += 1;
        self.get_hits += 1;
    }

    fn record_get_miss(&mut self) {
        self.get_calls += 1;
        self.get_misses += 1;
    }

    fn record_insert_call(&mut self) {
        self.insert_calls += 1;
    }

    fn record_insert_new(&mut self) {
        self.insert_new += 1;
    }

    fn record_insert_update(&mut self) {
        self.insert_updates += 1;
    }

    fn record_evict_call(&mut self) {
        self.evict_calls += 1;
    }

    fn record_evicted_entry(&mut self, cause: EvictionCause) {
        match cause {
            EvictionCause::Capacity => self.evicted_by_capacity += 1,
            EvictionCause::Cost => self.evicted_by_cost += 1,
        }
    }

    fn record_clear(&mut self) {
        self.clear_calls += 1;
    }
}

impl EvictionMetricsRecorder for EvictingMetrics {
    fn record_remove_call(&mut self) {
        self.remove_calls += 1;
    }

    fn record_remove_found(&mut self) {
        self.remove_found += 1;
    }

    fn record_pop_lru_call(&mut self) {
        self.pop_lru_calls += 1;
    }

    fn record_pop_lru_found(&mut self) {
        self.pop_lru_found += 1;
    }

    fn record_touch_call(&mut self) {
        self.touch_calls += 1;
    }

    fn record_touch_found(&mut self) {
        self.touch_found += 1;
    }

    fn record_bound_change(&mut self) {
        self.bound_changes += 1;
    }
}

impl ReadMetricsRecorder for EvictingMetrics {
    fn record_peek_call(&self) {
        self.peek_calls.incr();
    }

    fn record_peek_found(&self) {
        self.peek_found.incr();
    }
}
