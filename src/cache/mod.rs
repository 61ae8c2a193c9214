//! Evicting key-value cache.
//!
//! ## Architecture
//!
//! ```text
//!   EvictingCache<K, V>  (Clone; clones share one cache)
//!     └── Arc<RwLock<EvictingCore<K, Arc<V>>>>      single lock domain
//!
//!   EvictingCore<K, V>
//!     index:  FxHashMap<K, SlotId>      "a" -> id_2   "b" -> id_0   "c" -> id_1
//!     order:  IntrusiveList<Entry { key, value, cost }>
//!
//!             head (MRU) ─► [c, cost 1] ◄──► [a, cost 4] ◄──► [b, cost 0] ◄── tail (LRU)
//!
//!     total_cost = 5      capacity: Option<usize>      cost_limit: Option<u64>
//! ```
//!
//! ## Eviction
//!
//! Runs after every insert and after a bound is tightened:
//!
//! 1. while `len > capacity`, evict the tail (LRU) entry;
//! 2. while `total_cost > cost_limit`, evict the least recently used entry
//!    with a non-zero cost. Positive-cost entries are also linked on a
//!    second recency chain, so the victim is its tail. Zero-cost entries
//!    are never evicted for cost.
//!
//! Recency is positional, so entries that were inserted and never touched
//! leave in insertion order.
//!
//! ## Thread Safety
//!
//! - [`EvictingCore`]: `&mut self` for every mutation; wrap it yourself or
//!   use [`EvictingCache`].
//! - [`EvictingCache`]: promoting operations (`get`, `insert*`, `touch`,
//!   `remove`, `clear`, ...) take the write lock; pure observers (`peek`,
//!   `contains`, `len`, ...) take the read lock.

mod concurrent;
mod engine;

use std::fmt;

pub use self::concurrent::EvictingCache;
pub use self::engine::EvictingCore;

/// Which bound forced an entry out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EvictionCause {
    /// Entry count exceeded `capacity`.
    Capacity,
    /// Summed cost exceeded `cost_limit`.
    Cost,
}

impl EvictionCause {
    pub fn as_str(self) -> &'static str {
        match self {
            EvictionCause::Capacity => "capacity",
            EvictionCause::Cost => "cost",
        }
    }
}

impl fmt::Display for EvictionCause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
