/// Point-in-time copy of an evicting cache's counters and gauges.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct EvictingMetricsSnapshot {
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
    pub peek_calls: u64,
    pub peek_found: u64,
    pub clear_calls: u64,
    pub bound_changes: u64,

    // gauges captured at snapshot time
    pub cache_len: usize,
    pub total_cost: u64,
    pub capacity: Option<usize>,
    pub cost_limit: Option<u64>,
}

impl EvictingMetricsSnapshot {
    /// Entries evicted for either bound.
    pub fn evicted_entries(&self) -> u64 {
        self.evicted_by_capacity + self.evicted_by_cost
    }

    /// `get` hit ratio in `[0.0, 1.0]`; `0.0` before the first `get`.
    pub fn hit_ratio(&self) -> f64 {
        if self.get_calls == 0 {
            0.0
        } else {
            self.get_hits as f64 / self.get_calls as f64
        }
    }
}
