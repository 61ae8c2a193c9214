//! # Cache Trait Hierarchy
//!
//! Policy-agnostic seams over the evicting cache. Code that only needs
//! "a cache" can be written against [`CoreCache`]. Code that needs removal,
//! LRU introspection, or cost accounting asks for the narrower trait.
//!
//! ```text
//!                 ┌────────────────────────────────────┐
//!                 │          CoreCache<K, V>           │
//!                 │  insert / get / contains / len     │
//!                 │  is_empty / clear                  │
//!                 └─────────────────┬──────────────────┘
//!                                   │
//!                 ┌─────────────────▼──────────────────┐
//!                 │        MutableCache<K, V>          │
//!                 │  remove / remove_batch             │
//!                 └────────┬──────────────────┬────────┘
//!                          │                  │
//!        ┌─────────────────▼──────┐   ┌───────▼────────────────────┐
//!        │  LruCacheTrait<K, V>   │   │   CostAwareCache<K, V>     │
//!        │  pop_lru / peek_lru    │   │  insert_with_cost          │
//!        │  touch                 │   │  total_cost / cost_limit   │
//!        └────────────────────────┘   │  cost_of                   │
//!                                     └────────────────────────────┘
//!
//!   ConcurrentCache: marker (Send + Sync) for caches usable through `&self`
//!   from several threads.
//! ```
//!
//! [`EvictingCore`](crate::cache::EvictingCore) implements every `&mut self`
//! trait. [`EvictingCache`](crate::cache::EvictingCache) takes `&self`
//! everywhere, so it offers the same operations as inherent methods and
//! implements only [`ConcurrentCache`].
//!
//! ## Example Usage
//!
//! ```
//! use evictkit::cache::EvictingCore;
//! use evictkit::traits::{CoreCache, CostAwareCache, MutableCache};
//!
//! fn warm<C: CoreCache<u64, String>>(cache: &mut C, rows: &[(u64, &str)]) {
//!     for (id, name) in rows {
//!         cache.insert(*id, name.to_string());
//!     }
//! }
//!
//! fn invalidate<C: MutableCache<u64, String>>(cache: &mut C, ids: &[u64]) {
//!     cache.remove_batch(ids);
//! }
//!
//! let mut cache = EvictingCore::new(16);
//! warm(&mut cache, &[(1, "ada"), (2, "grace")]);
//! invalidate(&mut cache, &[1]);
//! assert_eq!(cache.len(), 1);
//! assert_eq!(CostAwareCache::total_cost(&cache), 1);
//! ```

/// Operations every cache supports.
///
/// `K` and `V` carry no bounds here; implementations add what they need
/// (the evicting cache requires `K: Eq + Hash + Clone`).
pub trait CoreCache<K, V> {
    /// Inserts or replaces `key`, returning the replaced value.
    ///
    /// May evict other entries (or, under a cost bound, the new entry
    /// itself) before returning.
    fn insert(&mut self, key: K, value: V) -> Option<V>;

    /// Looks up `key`. A hit may update eviction order.
    fn get(&mut self, key: &K) -> Option<&V>;

    /// Checks for `key` without touching eviction order.
    fn contains(&self, key: &K) -> bool;

    /// Number of entries currently held.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Removes every entry.
    fn clear(&mut self);
}

/// Caches that support removing an arbitrary key.
pub trait MutableCache<K, V>: CoreCache<K, V> {
    /// Removes `key`, returning its value. Missing keys are a no-op.
    fn remove(&mut self, key: &K) -> Option<V>;

    /// Removes each key in order; the result lines up with `keys`.
    fn remove_batch(&mut self, keys: &[K]) -> Vec<Option<V>> {
        keys.iter().map(|k| self.remove(k)).collect()
    }
}

/// Recency-ordered caches.
pub trait LruCacheTrait<K, V>: MutableCache<K, V> {
    /// Removes and returns the least recently used entry.
    fn pop_lru(&mut self) -> Option<(K, V)>;

    /// The least recently used entry, without changing order.
    fn peek_lru(&self) -> Option<(&K, &V)>;

    /// Promotes `key` to most recently used. Returns `false` if absent.
    fn touch(&mut self, key: &K) -> bool;
}

/// Caches that weigh entries by a caller-supplied cost.
pub trait CostAwareCache<K, V>: MutableCache<K, V> {
    /// Inserts with an explicit cost. A cost of `0` exempts the entry from
    /// cost-driven eviction; it still counts toward the entry capacity.
    fn insert_with_cost(&mut self, key: K, value: V, cost: u64) -> Option<V>;

    /// Sum of the costs of all current entries.
    fn total_cost(&self) -> u64;

    /// Configured cost budget, if any.
    fn cost_limit(&self) -> Option<u64>;

    /// Cost recorded for `key`, if present.
    fn cost_of(&self, key: &K) -> Option<u64>;
}

/// Marker for caches that are safe to share across threads and mutate
/// through `&self`.
pub trait ConcurrentCache: Send + Sync {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::{EvictingCache, EvictingCore};

    fn fill<C: CoreCache<u32, u32>>(cache: &mut C, n: u32) {
        for i in 0..n {
            cache.insert(i, i * 10);
        }
    }

    fn drain_lru<C: LruCacheTrait<u32, u32>>(cache: &mut C) -> Vec<u32> {
        let mut keys = Vec::new();
        while let Some((k, _)) = cache.pop_lru() {
            keys.push(k);
        }
        keys
    }

    #[test]
    fn core_cache_through_generic_fn() {
        let mut cache = EvictingCore::new(3);
        fill(&mut cache, 5);
        assert_eq!(CoreCache::len(&cache), 3);
        assert!(!CoreCache::contains(&cache, &0));
        assert_eq!(CoreCache::get(&mut cache, &4), Some(&40));
        CoreCache::clear(&mut cache);
        assert!(CoreCache::is_empty(&cache));
    }

    #[test]
    fn lru_trait_drains_in_recency_order() {
        let mut cache = EvictingCore::unbounded();
        fill(&mut cache, 4);
        assert!(LruCacheTrait::touch(&mut cache, &1));
        assert_eq!(LruCacheTrait::peek_lru(&cache), Some((&0, &0)));
        assert_eq!(drain_lru(&mut cache), vec![0, 2, 3, 1]);
    }

    #[test]
    fn remove_batch_lines_up_with_keys() {
        let mut cache = EvictingCore::new(8);
        fill(&mut cache, 3);
        let removed = MutableCache::remove_batch(&mut cache, &[2, 9, 0]);
        assert_eq!(removed, vec![Some(20), None, Some(0)]);
        assert_eq!(CoreCache::len(&cache), 1);
    }

    #[test]
    fn cost_aware_trait_reports_costs() {
        let mut cache = EvictingCore::with_cost_limit(10);
        CostAwareCache::insert_with_cost(&mut cache, 1u32, 1u32, 4);
        CostAwareCache::insert_with_cost(&mut cache, 2u32, 2u32, 0);
        assert_eq!(CostAwareCache::total_cost(&cache), 4);
        assert_eq!(CostAwareCache::cost_limit(&cache), Some(10));
        assert_eq!(CostAwareCache::cost_of(&cache, &2), Some(0));
        assert_eq!(CostAwareCache::cost_of(&cache, &3), None);
    }

    #[test]
    fn concurrent_cache_marker_is_implemented() {
        fn assert_concurrent<C: ConcurrentCache>() {}
        assert_concurrent::<EvictingCache<u64, String>>();
    }
}
