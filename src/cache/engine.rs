use std::fmt;
use std::hash::Hash;
use std::mem;

use rustc_hash::FxHashMap;
use tracing::{debug, trace, warn};

use crate::builder::CacheConfig;
use crate::cache::EvictionCause;
use crate::ds::{IntrusiveList, SlotId};
use crate::error::{ConfigError, InvariantError};
#[cfg(feature = "metrics")]
use crate::metrics::metrics_impl::EvictingMetrics;
#[cfg(feature = "metrics")]
use crate::metrics::snapshot::EvictingMetricsSnapshot;
#[cfg(feature = "metrics")]
use crate::metrics::traits::{
    CoreMetricsRecorder, EvictionMetricsRecorder, MetricsSnapshotProvider, ReadMetricsRecorder,
};
use crate::traits::{CoreCache, CostAwareCache, LruCacheTrait, MutableCache};

/// Upper bound on up-front allocation; larger caches grow on demand and
/// shrink back to this on `clear`.
const PREALLOC_LIMIT: usize = 4096;

/// Unit of storage: the key is kept alongside the value so eviction from the
/// list tail can find the index entry to drop.
struct Entry<K, V> {
    key: K,
    value: V,
    cost: u64,
    /// Node in the cost chain; `Some` exactly when `cost > 0`.
    cost_node: Option<SlotId>,
}

/// Single-threaded LRU cache bounded by entry count and/or summed cost.
///
/// Every operation is O(1) apart from the evictions it triggers, each of
/// which is O(1) as well. Entries with a positive cost are threaded on a
/// second recency chain, so cost eviction takes that chain's tail directly
/// and never walks over zero-cost entries.
///
/// # Key contract
///
/// `K`'s `Hash` and `Eq` must not change while the key is cached. Breaking
/// that is a caller bug: the cache stays memory safe, but lookups for that
/// key stop working and [`check_invariants`](Self::check_invariants)
/// reports the mismatch.
///
/// # Example
///
/// ```
/// use evictkit::cache::EvictingCore;
///
/// let mut cache = EvictingCore::new(2);
/// cache.insert("a", 1);
/// cache.insert("b", 2);
/// cache.insert("c", 3);
///
/// assert_eq!(cache.get(&"a"), None); // evicted first, never touched
/// assert_eq!(cache.get(&"b"), Some(&2));
/// assert_eq!(cache.get(&"c"), Some(&3));
/// ```
pub struct EvictingCore<K, V> {
    map: FxHashMap<K, SlotId>,
    list: IntrusiveList<Entry<K, V>>,
    // Positive-cost entries only, same relative order as `list`.
    cost_list: IntrusiveList<SlotId>,
    // u128 so a sum of u64 costs cannot overflow.
    total_cost: u128,
    capacity: Option<usize>,
    cost_limit: Option<u64>,
    default_cost: u64,
    #[cfg(feature = "metrics")]
    metrics: EvictingMetrics,
}

impl<K, V> EvictingCore<K, V>
where
    K: Eq + Hash + Clone,
{
    /// Creates a cache holding at most `capacity` entries.
    ///
    /// A capacity of `0` is honoured: every insert is evicted immediately.
    #[inline]
    pub fn new(capacity: usize) -> Self {
        Self::from_config(CacheConfig::with_capacity(capacity))
    }

    /// Creates a cache whose summed cost stays within `cost_limit`.
    ///
    /// # Panics
    ///
    /// Panics if `cost_limit` is below
    /// [`DEFAULT_COST`](crate::builder::DEFAULT_COST); use
    /// [`try_with_config`](Self::try_with_config) to pick another default cost.
    pub fn with_cost_limit(cost_limit: u64) -> Self {
        Self::with_config(CacheConfig::with_cost_limit(cost_limit))
    }

    /// Creates a cache with both an entry and a cost bound.
    ///
    /// # Panics
    ///
    /// Panics if `cost_limit` is below
    /// [`DEFAULT_COST`](crate::builder::DEFAULT_COST).
    pub fn with_bounds(capacity: usize, cost_limit: u64) -> Self {
        Self::with_config(CacheConfig::bounded(capacity, cost_limit))
    }

    /// Creates a cache that never evicts.
    pub fn unbounded() -> Self {
        Self::from_config(CacheConfig::unbounded())
    }

    /// Creates a cache from `config`.
    ///
    /// # Panics
    ///
    /// Panics if `config` is invalid; see [`CacheConfig::validate`].
    pub fn with_config(config: CacheConfig) -> Self {
        match Self::try_with_config(config) {
            Ok(cache) => cache,
            Err(e) => panic!("{}", e),
        }
    }

    /// Creates a cache from `config`, rejecting invalid configurations.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if [`CacheConfig::validate`] fails.
    pub fn try_with_config(config: CacheConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self::from_config(config))
    }

    fn from_config(config: CacheConfig) -> Self {
        let prealloc = prealloc_for(config.capacity);
        Self {
            map: FxHashMap::with_capacity_and_hasher(prealloc, Default::default()),
            list: IntrusiveList::with_capacity(prealloc),
            cost_list: IntrusiveList::with_capacity(prealloc),
            total_cost: 0,
            capacity: config.capacity,
            cost_limit: config.cost_limit,
            default_cost: config.default_cost,
            #[cfg(feature = "metrics")]
            metrics: EvictingMetrics::new(),
        }
    }

    // -----------------------------------------------------------------------
    // Bounds
    // -----------------------------------------------------------------------

    #[inline]
    pub fn capacity(&self) -> Option<usize> {
        self.capacity
    }

    #[inline]
    pub fn cost_limit(&self) -> Option<u64> {
        self.cost_limit
    }

    /// Cost charged by [`insert`](Self::insert) and [`set`](Self::set).
    #[inline]
    pub fn default_cost(&self) -> u64 {
        self.default_cost
    }

    /// Current configuration, reflecting any runtime bound changes.
    pub fn config(&self) -> CacheConfig {
        CacheConfig {
            capacity: self.capacity,
            cost_limit: self.cost_limit,
            default_cost: self.default_cost,
        }
    }

    /// Replaces the entry bound and evicts down to it immediately.
    ///
    /// Returns the number of entries evicted.
    pub fn set_capacity(&mut self, capacity: Option<usize>) -> usize {
        #[cfg(feature = "metrics")]
        self.metrics.record_bound_change();

        debug!(old = ?self.capacity, new = ?capacity, "capacity changed");
        self.capacity = capacity;
        self.evict_to_bounds()
    }

    /// Replaces the cost bound and evicts down to it immediately.
    ///
    /// Unlike construction this does not reject a limit below the default
    /// cost; default-cost inserts are then evicted as soon as they land.
    /// Returns the number of entries evicted.
    pub fn set_cost_limit(&mut self, cost_limit: Option<u64>) -> usize {
        #[cfg(feature = "metrics")]
        self.metrics.record_bound_change();

        debug!(old = ?self.cost_limit, new = ?cost_limit, "cost limit changed");
        if let Some(limit) = cost_limit {
            if self.default_cost > limit {
                warn!(
                    default_cost = self.default_cost,
                    cost_limit = limit,
                    "cost limit below default cost; default inserts will not be retained"
                );
            }
        }
        self.cost_limit = cost_limit;
        self.evict_to_bounds()
    }

    // -----------------------------------------------------------------------
    // Observers (no recency change)
    // -----------------------------------------------------------------------

    #[inline]
    pub fn len(&self) -> usize {
        self.map.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Sum of the costs of all entries.
    #[inline]
    pub fn total_cost(&self) -> u64 {
        u64::try_from(self.total_cost).unwrap_or(u64::MAX)
    }

    #[inline]
    pub fn contains(&self, key: &K) -> bool {
        self.map.contains_key(key)
    }

    /// Cost recorded for `key`.
    pub fn cost_of(&self, key: &K) -> Option<u64> {
        let id = *self.map.get(key)?;
        self.list.get(id).map(|entry| entry.cost)
    }

    /// Looks up `key` without promoting it.
    pub fn peek(&self, key: &K) -> Option<&V> {
        #[cfg(feature = "metrics")]
        self.metrics.record_peek_call();

        let id = *self.map.get(key)?;
        let value = self.list.get(id).map(|entry| &entry.value);

        #[cfg(feature = "metrics")]
        if value.is_some() {
            self.metrics.record_peek_found();
        }

        value
    }

    /// The entry next in line for capacity eviction.
    pub fn peek_lru(&self) -> Option<(&K, &V)> {
        self.list.back().map(|entry| (&entry.key, &entry.value))
    }

    /// Iterates entries from most to least recently used, without promoting.
    pub fn iter(&self) -> impl Iterator<Item = (&K, &V)> + '_ {
        self.list.iter().map(|entry| (&entry.key, &entry.value))
    }

    // -----------------------------------------------------------------------
    // Lookup
    // -----------------------------------------------------------------------

    /// Looks up `key`, promoting it to most recently used on a hit.
    ///
    /// A miss is `None`, never an error.
    pub fn get(&mut self, key: &K) -> Option<&V> {
        let id = match self.map.get(key) {
            Some(&id) => id,
            None => {
                #[cfg(feature = "metrics")]
                self.metrics.record_get_miss();
                return None;
            },
        };

        #[cfg(feature = "metrics")]
        self.metrics.record_get_hit();

        self.promote(id);
        self.list.get(id).map(|entry| &entry.value)
    }

    /// Like [`get`](Self::get) but yields a mutable reference.
    ///
    /// The entry's cost is not re-evaluated; re-insert to change it.
    pub fn get_mut(&mut self, key: &K) -> Option<&mut V> {
        let id = match self.map.get(key) {
            Some(&id) => id,
            None => {
                #[cfg(feature = "metrics")]
                self.metrics.record_get_miss();
                return None;
            },
        };

        #[cfg(feature = "metrics")]
        self.metrics.record_get_hit();

        self.promote(id);
        self.list.get_mut(id).map(|entry| &mut entry.value)
    }

    /// Promotes `key` without reading it. Returns `false` if absent.
    pub fn touch(&mut self, key: &K) -> bool {
        #[cfg(feature = "metrics")]
        self.metrics.record_touch_call();

        match self.map.get(key) {
            Some(&id) => {
                #[cfg(feature = "metrics")]
                self.metrics.record_touch_found();
                self.promote(id)
            },
            None => false,
        }
    }

    /// Moves `id` to the MRU end of both chains.
    fn promote(&mut self, id: SlotId) -> bool {
        if !self.list.move_to_front(id) {
            return false;
        }
        if let Some(node) = self.list.get(id).and_then(|entry| entry.cost_node) {
            self.cost_list.move_to_front(node);
        }
        true
    }

    // -----------------------------------------------------------------------
    // Mutation
    // -----------------------------------------------------------------------

    /// Inserts at the default cost. See [`insert_with_cost`](Self::insert_with_cost).
    #[inline]
    pub fn insert(&mut self, key: K, value: V) -> Option<V> {
        self.insert_with_cost(key, value, self.default_cost)
    }

    /// Inserts or replaces `key` with an explicit `cost`, then evicts until
    /// both bounds hold.
    ///
    /// The replaced entry's cost leaves the total before `cost` is added, and
    /// the entry becomes most recently used. A `cost` of `0` exempts the
    /// entry from cost eviction (it still counts toward capacity). An entry
    /// costing more than the whole budget is evicted before this returns,
    /// after every older positive-cost entry.
    ///
    /// Returns the replaced value, if any.
    ///
    /// # Example
    ///
    /// ```
    /// use evictkit::cache::EvictingCore;
    ///
    /// let mut cache = EvictingCore::with_cost_limit(10);
    /// cache.insert_with_cost("thumb", vec![0u8; 4], 4);
    /// cache.insert_with_cost("poster", vec![0u8; 8], 8); // evicts "thumb"
    ///
    /// assert!(!cache.contains(&"thumb"));
    /// assert_eq!(cache.total_cost(), 8);
    /// ```
    pub fn insert_with_cost(&mut self, key: K, value: V, cost: u64) -> Option<V> {
        #[cfg(feature = "metrics")]
        self.metrics.record_insert_call();

        if let Some(limit) = self.cost_limit {
            if cost > limit {
                warn!(cost, cost_limit = limit, "entry exceeds cost limit and will be evicted");
            }
        }

        if let Some(&id) = self.map.get(&key) {
            if let Some(entry) = self.list.get_mut(id) {
                #[cfg(feature = "metrics")]
                self.metrics.record_insert_update();

                self.total_cost = self.total_cost - u128::from(entry.cost) + u128::from(cost);
                entry.cost = cost;
                let previous = mem::replace(&mut entry.value, value);

                // Join, leave, or move within the cost chain.
                match (entry.cost_node, cost > 0) {
                    (Some(node), true) => {
                        self.cost_list.move_to_front(node);
                    },
                    (Some(node), false) => {
                        self.cost_list.remove(node);
                        entry.cost_node = None;
                    },
                    (None, true) => entry.cost_node = Some(self.cost_list.push_front(id)),
                    (None, false) => {},
                }
                self.list.move_to_front(id);
                self.evict_to_bounds();
                return Some(previous);
            }
            // Index pointed at a freed slot; drop it and insert afresh.
            self.map.remove(&key);
        }

        #[cfg(feature = "metrics")]
        self.metrics.record_insert_new();

        let id = self.list.push_front(Entry {
            key: key.clone(),
            value,
            cost,
            cost_node: None,
        });
        if cost > 0 {
            let node = self.cost_list.push_front(id);
            if let Some(entry) = self.list.get_mut(id) {
                entry.cost_node = Some(node);
            }
        }
        self.map.insert(key, id);
        self.total_cost += u128::from(cost);
        self.evict_to_bounds();
        None
    }

    /// Assignment-style access: `Some(v)` inserts at the default cost,
    /// `None` removes. Returns the previous value.
    pub fn set(&mut self, key: K, value: Option<V>) -> Option<V> {
        match value {
            Some(value) => self.insert(key, value),
            None => self.remove(&key),
        }
    }

    /// Removes `key`, returning its value. A missing key is a no-op.
    pub fn remove(&mut self, key: &K) -> Option<V> {
        #[cfg(feature = "metrics")]
        self.metrics.record_remove_call();

        let id = *self.map.get(key)?;
        let entry = self.list.remove(id)?;
        self.release(&entry);

        #[cfg(feature = "metrics")]
        self.metrics.record_remove_found();

        Some(entry.value)
    }

    /// Removes and returns the least recently used entry.
    pub fn pop_lru(&mut self) -> Option<(K, V)> {
        #[cfg(feature = "metrics")]
        self.metrics.record_pop_lru_call();

        let entry = self.list.pop_back()?;
        self.release(&entry);

        #[cfg(feature = "metrics")]
        self.metrics.record_pop_lru_found();

        Some((entry.key, entry.value))
    }

    /// Removes every entry and resets the cost total. Idempotent.
    ///
    /// Storage grown past the preallocation is released.
    pub fn clear(&mut self) {
        #[cfg(feature = "metrics")]
        self.metrics.record_clear();

        let dropped = self.map.len();
        let keep = prealloc_for(self.capacity);
        self.map.clear();
        self.map.shrink_to(keep);
        self.list.clear();
        self.list.shrink_to(keep);
        self.cost_list.clear();
        self.cost_list.shrink_to(keep);
        self.total_cost = 0;
        debug!(dropped, "cache cleared");
    }

    // -----------------------------------------------------------------------
    // Eviction
    // -----------------------------------------------------------------------

    /// Evicts until the entry and cost bounds hold; returns the count.
    ///
    /// Each eviction is O(1): capacity takes the tail of the recency list,
    /// cost takes the tail of the cost chain.
    fn evict_to_bounds(&mut self) -> usize {
        if self.capacity.is_none() && self.cost_limit.is_none() {
            return 0;
        }

        #[cfg(feature = "metrics")]
        self.metrics.record_evict_call();

        let mut evicted = 0;

        if let Some(capacity) = self.capacity {
            while self.map.len() > capacity {
                let Some(entry) = self.list.pop_back() else { break };
                self.release(&entry);
                self.log_eviction(&entry, EvictionCause::Capacity);
                evicted += 1;
            }
        }

        if let Some(limit) = self.cost_limit {
            let limit = u128::from(limit);
            while self.total_cost > limit {
                // Empty chain means only zero-cost entries remain.
                let Some(&id) = self.cost_list.back() else { break };
                let Some(entry) = self.list.remove(id) else { break };
                self.release(&entry);
                self.log_eviction(&entry, EvictionCause::Cost);
                evicted += 1;
            }
        }

        evicted
    }

    fn log_eviction(&mut self, entry: &Entry<K, V>, cause: EvictionCause) {
        #[cfg(feature = "metrics")]
        self.metrics.record_evicted_entry(cause);

        trace!(
            %cause,
            cost = entry.cost,
            len = self.map.len(),
            total_cost = self.total_cost(),
            "evicted entry"
        );
    }

    /// Drops the index entry, cost-chain node and cost of an entry that has
    /// already left the recency list.
    fn release(&mut self, entry: &Entry<K, V>) {
        self.map.remove(&entry.key);
        if let Some(node) = entry.cost_node {
            self.cost_list.remove(node);
        }
        self.total_cost -= u128::from(entry.cost);
    }

    // -----------------------------------------------------------------------
    // Diagnostics
    // -----------------------------------------------------------------------

    /// Verifies that the index, the recency list and the cost chain agree
    /// entry for entry, that the cost total matches the entries, and that
    /// both bounds hold.
    ///
    /// # Errors
    ///
    /// Returns [`InvariantError`] describing the first violation found.
    pub fn check_invariants(&self) -> Result<(), InvariantError>
    where
        K: fmt::Debug,
    {
        self.list.check_links()?;
        self.cost_list.check_links()?;

        if self.map.len() != self.list.len() {
            return Err(InvariantError::new(format!(
                "index has {} keys but recency list has {} nodes",
                self.map.len(),
                self.list.len()
            )));
        }

        let mut cost_sum: u128 = 0;
        let mut costed = Vec::with_capacity(self.cost_list.len());
        let mut cursor = self.list.front_id();
        while let Some(id) = cursor {
            let entry = self
                .list
                .get(id)
                .ok_or_else(|| InvariantError::new(format!("stale node {:?} in list", id)))?;
            match self.map.get(&entry.key) {
                Some(&mapped) if mapped == id => {},
                Some(&mapped) => {
                    return Err(InvariantError::new(format!(
                        "key {:?} indexes {:?} but lives in {:?}",
                        entry.key, mapped, id
                    )));
                },
                None => {
                    return Err(InvariantError::new(format!(
                        "key {:?} is in the recency list but not the index",
                        entry.key
                    )));
                },
            }
            match (entry.cost_node, entry.cost > 0) {
                (Some(node), true) if self.cost_list.get(node) == Some(&id) => costed.push(id),
                (None, false) => {},
                _ => {
                    return Err(InvariantError::new(format!(
                        "key {:?} with cost {} has cost-chain node {:?}",
                        entry.key, entry.cost, entry.cost_node
                    )));
                },
            }
            cost_sum += u128::from(entry.cost);
            cursor = self.list.next_id(id);
        }

        if !self.cost_list.iter().copied().eq(costed.iter().copied()) {
            return Err(InvariantError::new(format!(
                "cost chain ({} nodes) is out of recency order with {} positive-cost entries",
                self.cost_list.len(),
                costed.len()
            )));
        }
        if cost_sum != self.total_cost {
            return Err(InvariantError::new(format!(
                "total_cost {} != sum of entry costs {}",
                self.total_cost, cost_sum
            )));
        }
        if let Some(capacity) = self.capacity {
            if self.map.len() > capacity {
                return Err(InvariantError::new(format!(
                    "{} entries exceed capacity {}",
                    self.map.len(),
                    capacity
                )));
            }
        }
        if let Some(limit) = self.cost_limit {
            if self.total_cost > u128::from(limit) {
                return Err(InvariantError::new(format!(
                    "total_cost {} exceeds cost_limit {}",
                    self.total_cost, limit
                )));
            }
        }
        Ok(())
    }
}

fn prealloc_for(capacity: Option<usize>) -> usize {
    capacity.map_or(0, |c| c.min(PREALLOC_LIMIT))
}

#[cfg(feature = "metrics")]
impl<K, V> EvictingCore<K, V>
where
    K: Eq + Hash + Clone,
{
    pub fn metrics_snapshot(&self) -> EvictingMetricsSnapshot {
        EvictingMetricsSnapshot {
            get_calls: self.metrics.get_calls,
            get_hits: self.metrics.get_hits,
            get_misses: self.metrics.get_misses,
            insert_calls: self.metrics.insert_calls,
            insert_updates: self.metrics.insert_updates,
            insert_new: self.metrics.insert_new,
            evict_calls: self.metrics.evict_calls,
            evicted_by_capacity: self.metrics.evicted_by_capacity,
            evicted_by_cost: self.metrics.evicted_by_cost,
            remove_calls: self.metrics.remove_calls,
            remove_found: self.metrics.remove_found,
            pop_lru_calls: self.metrics.pop_lru_calls,
            pop_lru_found: self.metrics.pop_lru_found,
            touch_calls: self.metrics.touch_calls,
            touch_found: self.metrics.touch_found,
            peek_calls: self.metrics.peek_calls.get(),
            peek_found: self.metrics.peek_found.get(),
            clear_calls: self.metrics.clear_calls,
            bound_changes: self.metrics.bound_changes,
            cache_len: self.map.len(),
            total_cost: self.total_cost(),
            capacity: self.capacity,
            cost_limit: self.cost_limit,
        }
    }

    /// Zeroes all counters; cache contents are untouched.
    pub fn reset_metrics(&mut self) {
        self.metrics.reset();
    }
}

#[cfg(feature = "metrics")]
impl<K, V> MetricsSnapshotProvider<EvictingMetricsSnapshot> for EvictingCore<K, V>
where
    K: Eq + Hash + Clone,
{
    fn snapshot(&self) -> EvictingMetricsSnapshot {
        self.metrics_snapshot()
    }
}

impl<K, V> fmt::Debug for EvictingCore<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EvictingCore")
            .field("len", &self.map.len())
            .field("total_cost", &self.total_cost)
            .field("capacity", &self.capacity)
            .field("cost_limit", &self.cost_limit)
            .field("default_cost", &self.default_cost)
            .finish_non_exhaustive()
    }
}

impl<K, V> Extend<(K, V)> for EvictingCore<K, V>
where
    K: Eq + Hash + Clone,
{
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (key, value) in iter {
            self.insert(key, value);
        }
    }
}

impl<K, V> CoreCache<K, V> for EvictingCore<K, V>
where
    K: Eq + Hash + Clone,
{
    #[inline]
    fn insert(&mut self, key: K, value: V) -> Option<V> {
        EvictingCore::insert(self, key, value)
    }

    #[inline]
    fn get(&mut self, key: &K) -> Option<&V> {
        EvictingCore::get(self, key)
    }

    #[inline]
    fn contains(&self, key: &K) -> bool {
        EvictingCore::contains(self, key)
    }

    #[inline]
    fn len(&self) -> usize {
        EvictingCore::len(self)
    }

    fn clear(&mut self) {
        EvictingCore::clear(self)
    }
}

impl<K, V> MutableCache<K, V> for EvictingCore<K, V>
where
    K: Eq + Hash + Clone,
{
    #[inline]
    fn remove(&mut self, key: &K) -> Option<V> {
        EvictingCore::remove(self, key)
    }
}

impl<K, V> LruCacheTrait<K, V> for EvictingCore<K, V>
where
    K: Eq + Hash + Clone,
{
    fn pop_lru(&mut self) -> Option<(K, V)> {
        EvictingCore::pop_lru(self)
    }

    fn peek_lru(&self) -> Option<(&K, &V)> {
        EvictingCore::peek_lru(self)
    }

    fn touch(&mut self, key: &K) -> bool {
        EvictingCore::touch(self, key)
    }
}

impl<K, V> CostAwareCache<K, V> for EvictingCore<K, V>
where
    K: Eq + Hash + Clone,
{
    fn insert_with_cost(&mut self, key: K, value: V, cost: u64) -> Option<V> {
        EvictingCore::insert_with_cost(self, key, value, cost)
    }

    fn total_cost(&self) -> u64 {
        EvictingCore::total_cost(self)
    }

    fn cost_limit(&self) -> Option<u64> {
        EvictingCore::cost_limit(self)
    }

    fn cost_of(&self, key: &K) -> Option<u64> {
        EvictingCore::cost_of(self, key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keys<V>(cache: &EvictingCore<&'static str, V>) -> Vec<&'static str> {
        cache.iter().map(|(k, _)| *k).collect()
    }

    // ==============================================
    // Capacity eviction
    // ==============================================

    #[test]
    fn capacity_two_evicts_untouched_first() {
        let mut cache = EvictingCore::new(2);
        cache.insert("a", 1);
        cache.insert("b", 2);
        cache.insert("c", 3);

        assert_eq!(cache.get(&"a"), None);
        assert_eq!(cache.get(&"b"), Some(&2));
        assert_eq!(cache.get(&"c"), Some(&3));
        cache.check_invariants().unwrap();
    }

    #[test]
    fn read_promotes_recency() {
        let mut cache = EvictingCore::new(2);
        cache.insert("a", 1);
        cache.insert("b", 2);
        assert_eq!(cache.get(&"a"), Some(&1));
        cache.insert("c", 3);

        assert!(cache.contains(&"a"));
        assert!(!cache.contains(&"b"));
        assert!(cache.contains(&"c"));
    }

    #[test]
    fn peek_and_contains_do_not_promote() {
        let mut cache = EvictingCore::new(2);
        cache.insert("a", 1);
        cache.insert("b", 2);
        assert_eq!(cache.peek(&"a"), Some(&1));
        assert!(cache.contains(&"a"));
        cache.insert("c", 3);

        assert!(!cache.contains(&"a"));
        assert_eq!(keys(&cache), vec!["c", "b"]);
    }

    #[test]
    fn reinsert_promotes_and_replaces() {
        let mut cache = EvictingCore::new(2);
        cache.insert("a", 1);
        cache.insert("b", 2);
        assert_eq!(cache.insert("a", 10), Some(1));
        cache.insert("c", 3);

        assert_eq!(cache.len(), 2);
        assert_eq!(cache.peek(&"a"), Some(&10));
        assert!(!cache.contains(&"b"));
    }

    #[test]
    fn zero_capacity_holds_nothing() {
        let mut cache = EvictingCore::new(0);
        assert_eq!(cache.insert("a", 1), None);
        assert!(cache.is_empty());
        assert_eq!(cache.total_cost(), 0);
        cache.check_invariants().unwrap();
    }

    #[test]
    fn touch_and_pop_lru() {
        let mut cache = EvictingCore::unbounded();
        cache.insert("a", 1);
        cache.insert("b", 2);
        cache.insert("c", 3);

        assert!(cache.touch(&"a"));
        assert!(!cache.touch(&"zz"));
        assert_eq!(cache.peek_lru(), Some((&"b", &2)));
        assert_eq!(cache.pop_lru(), Some(("b", 2)));
        assert_eq!(cache.pop_lru(), Some(("c", 3)));
        assert_eq!(cache.pop_lru(), Some(("a", 1)));
        assert_eq!(cache.pop_lru(), None);
        assert_eq!(cache.total_cost(), 0);
    }

    // ==============================================
    // Cost eviction
    // ==============================================

    #[test]
    fn cost_limit_evicts_lru_until_within_budget() {
        let mut cache = EvictingCore::with_cost_limit(10);
        cache.insert_with_cost("a", 1, 4);
        cache.insert_with_cost("b", 2, 4);
        cache.insert_with_cost("c", 3, 4);

        assert!(!cache.contains(&"a"));
        assert_eq!(cache.total_cost(), 8);
        assert_eq!(keys(&cache), vec!["c", "b"]);
        cache.check_invariants().unwrap();
    }

    #[test]
    fn replacement_adjusts_total_cost() {
        let mut cache = EvictingCore::with_cost_limit(10);
        cache.insert_with_cost("a", 1, 3);
        cache.insert_with_cost("b", 2, 3);
        assert_eq!(cache.total_cost(), 6);

        assert_eq!(cache.insert_with_cost("a", 11, 7), Some(1));
        assert_eq!(cache.total_cost(), 10);
        assert_eq!(cache.cost_of(&"a"), Some(7));
        assert_eq!(cache.len(), 2);

        // Growing "b" pushes out "a" (now LRU), not "b" itself.
        cache.insert_with_cost("b", 22, 5);
        assert!(!cache.contains(&"a"));
        assert_eq!(cache.total_cost(), 5);
        cache.check_invariants().unwrap();
    }

    #[test]
    fn zero_cost_entries_survive_cost_pressure() {
        let mut cache = EvictingCore::with_cost_limit(5);
        cache.insert_with_cost("pinned", 0, 0);
        cache.insert_with_cost("a", 1, 3);
        cache.insert_with_cost("b", 2, 3);

        assert!(cache.contains(&"pinned"));
        assert!(!cache.contains(&"a"));
        assert_eq!(cache.total_cost(), 3);
        assert_eq!(cache.peek_lru(), Some((&"pinned", &0)));
        cache.check_invariants().unwrap();
    }

    #[test]
    fn zero_cost_entries_still_count_for_capacity() {
        let mut cache = EvictingCore::with_bounds(2, 100);
        cache.insert_with_cost("a", 1, 0);
        cache.insert_with_cost("b", 2, 0);
        cache.insert_with_cost("c", 3, 0);

        assert_eq!(cache.len(), 2);
        assert!(!cache.contains(&"a"));
    }

    #[test]
    fn cost_eviction_skips_large_zero_cost_block() {
        let mut cache: EvictingCore<u32, u32> = EvictingCore::with_cost_limit(8);
        for k in 0..10_000 {
            cache.insert_with_cost(k, k, 0);
        }
        for k in 10_000..11_000 {
            cache.insert_with_cost(k, k, 8);
            assert_eq!(cache.total_cost(), 8);
        }

        assert_eq!(cache.len(), 10_001);
        assert!((0..10_000).all(|k| cache.contains(&k)));
        assert!(cache.contains(&10_999));
        assert_eq!(cache.cost_list.len(), 1);
        assert_eq!(cache.peek_lru(), Some((&0, &0)));
        cache.check_invariants().unwrap();
    }

    #[test]
    fn cost_eviction_follows_recency_after_promotion_and_cost_changes() {
        let mut cache = EvictingCore::with_cost_limit(100);
        cache.insert_with_cost("a", 1, 10);
        cache.insert_with_cost("b", 2, 0);
        cache.insert_with_cost("c", 3, 10);
        cache.insert_with_cost("d", 4, 10);

        // "a" becomes most recent among costed entries.
        cache.get(&"a");
        // "b" joins the cost chain at the front, "c" leaves it.
        cache.insert_with_cost("b", 2, 10);
        cache.insert_with_cost("c", 3, 0);
        cache.touch(&"d");
        cache.check_invariants().unwrap();

        // Costed recency is now d, b, a; "c" is free.
        assert_eq!(cache.set_cost_limit(Some(10)), 2);
        assert_eq!(keys(&cache), vec!["d", "c"]);
        assert_eq!(cache.total_cost(), 10);
        cache.check_invariants().unwrap();
    }

    #[test]
    fn oversized_entry_is_evicted_last() {
        let mut cache = EvictingCore::with_cost_limit(10);
        cache.insert_with_cost("a", 1, 2);
        cache.insert_with_cost("free", 0, 0);
        cache.insert_with_cost("huge", 2, 50);

        assert!(!cache.contains(&"a"));
        assert!(!cache.contains(&"huge"));
        assert!(cache.contains(&"free"));
        assert_eq!(cache.total_cost(), 0);
        cache.check_invariants().unwrap();
    }

    #[test]
    fn capacity_runs_before_cost() {
        let mut cache = EvictingCore::with_bounds(2, 6);
        cache.insert_with_cost("a", 1, 1);
        cache.insert_with_cost("b", 2, 5);
        // Capacity evicts "a"; then 5 + 5 > 6 evicts "b".
        cache.insert_with_cost("c", 3, 5);

        assert_eq!(keys(&cache), vec!["c"]);
        assert_eq!(cache.total_cost(), 5);
    }

    #[test]
    fn huge_costs_do_not_overflow() {
        let mut cache = EvictingCore::unbounded();
        cache.insert_with_cost("a", (), u64::MAX);
        cache.insert_with_cost("b", (), u64::MAX);
        assert_eq!(cache.total_cost(), u64::MAX);
        cache.remove(&"a");
        assert_eq!(cache.total_cost(), u64::MAX);
        cache.remove(&"b");
        assert_eq!(cache.total_cost(), 0);
        cache.check_invariants().unwrap();
    }

    // ==============================================
    // Removal, clear, set
    // ==============================================

    #[test]
    fn remove_releases_cost_and_is_noop_when_absent() {
        let mut cache = EvictingCore::with_cost_limit(100);
        cache.insert_with_cost("a", 1, 30);
        assert_eq!(cache.remove(&"a"), Some(1));
        assert_eq!(cache.remove(&"a"), None);
        assert_eq!(cache.get(&"a"), None);
        assert_eq!(cache.total_cost(), 0);
    }

    #[test]
    fn clear_releases_storage_beyond_preallocation() {
        let mut cache: EvictingCore<u32, u32> = EvictingCore::with_cost_limit(u64::MAX);
        for k in 0..20_000 {
            cache.insert(k, k);
        }
        assert!(cache.list.capacity() >= 20_000);

        cache.clear();
        assert!(cache.list.capacity() < 20_000);
        assert!(cache.cost_list.capacity() < 20_000);

        cache.insert(1, 1);
        assert_eq!(cache.get(&1), Some(&1));
        cache.check_invariants().unwrap();
    }

    #[test]
    fn clear_is_idempotent() {
        let mut cache = EvictingCore::with_cost_limit(100);
        cache.insert_with_cost("a", 1, 30);
        cache.insert_with_cost("b", 2, 30);
        cache.clear();
        assert!(cache.is_empty());
        assert_eq!(cache.total_cost(), 0);
        cache.clear();
        assert!(cache.is_empty());
        assert_eq!(cache.total_cost(), 0);
        cache.check_invariants().unwrap();

        cache.insert("c", 3);
        assert_eq!(cache.get(&"c"), Some(&3));
    }

    #[test]
    fn set_inserts_and_removes() {
        let mut cache = EvictingCore::new(4);
        assert_eq!(cache.set("a", Some(1)), None);
        assert_eq!(cache.set("a", Some(2)), Some(1));
        assert_eq!(cache.cost_of(&"a"), Some(1));
        assert_eq!(cache.set("a", None), Some(2));
        assert_eq!(cache.set("a", None), None);
        assert!(cache.is_empty());
    }

    #[test]
    fn get_mut_promotes_and_mutates() {
        let mut cache = EvictingCore::new(2);
        cache.insert("a", vec![1]);
        cache.insert("b", vec![2]);
        cache.get_mut(&"a").unwrap().push(9);
        cache.insert("c", vec![3]);

        assert_eq!(cache.peek(&"a"), Some(&vec![1, 9]));
        assert!(!cache.contains(&"b"));
    }

    // ==============================================
    // Runtime bounds
    // ==============================================

    #[test]
    fn shrinking_capacity_evicts_immediately() {
        let mut cache = EvictingCore::new(5);
        cache.extend([("a", 1), ("b", 2), ("c", 3), ("d", 4)]);
        cache.get(&"a");

        assert_eq!(cache.set_capacity(Some(2)), 2);
        assert_eq!(keys(&cache), vec!["a", "d"]);
        assert_eq!(cache.capacity(), Some(2));

        assert_eq!(cache.set_capacity(None), 0);
        cache.insert("e", 5);
        cache.insert("f", 6);
        assert_eq!(cache.len(), 4);
    }

    #[test]
    fn tightening_cost_limit_evicts_immediately() {
        let mut cache = EvictingCore::unbounded();
        cache.insert_with_cost("a", 1, 5);
        cache.insert_with_cost("b", 2, 5);
        cache.insert_with_cost("c", 3, 5);

        assert_eq!(cache.set_cost_limit(Some(10)), 1);
        assert!(!cache.contains(&"a"));
        assert_eq!(cache.cost_limit(), Some(10));
        assert_eq!(cache.config().cost_limit, Some(10));
        cache.check_invariants().unwrap();
    }

    #[test]
    fn unbounded_never_evicts() {
        let mut cache = EvictingCore::unbounded();
        for i in 0..10_000u32 {
            cache.insert(i, i);
        }
        assert_eq!(cache.len(), 10_000);
        assert!((0..10_000u32).all(|i| cache.peek(&i) == Some(&i)));
    }

    #[test]
    fn try_with_config_validates() {
        let bad = CacheConfig::with_cost_limit(1).default_cost(2);
        assert!(EvictingCore::<u8, u8>::try_with_config(bad).is_err());

        let cache = EvictingCore::<u8, u8>::try_with_config(CacheConfig::with_cost_limit(0).default_cost(0))
            .unwrap();
        assert_eq!(cache.default_cost(), 0);
    }

    #[test]
    #[should_panic(expected = "exceeds cost_limit")]
    fn with_cost_limit_zero_panics() {
        let _ = EvictingCore::<u8, u8>::with_cost_limit(0);
    }

    // ==============================================
    // Diagnostics
    // ==============================================

    #[test]
    fn debug_output_is_summary() {
        let mut cache = EvictingCore::new(3);
        cache.insert("a", 1);
        let dbg = format!("{:?}", cache);
        assert!(dbg.contains("EvictingCore"));
        assert!(dbg.contains("len: 1"));
    }

    #[cfg(feature = "metrics")]
    #[test]
    fn metrics_track_hits_and_evictions() {
        let mut cache = EvictingCore::with_bounds(2, 10);
        cache.insert_with_cost("a", 1, 1);
        cache.insert_with_cost("b", 2, 1);
        cache.insert_with_cost("c", 3, 1);
        cache.insert_with_cost("d", 4, 10);
        cache.get(&"d");
        cache.get(&"zz");
        cache.peek(&"d");
        cache.insert_with_cost("d", 5, 2);

        let snap = cache.metrics_snapshot();
        assert_eq!(snap.insert_calls, 5);
        assert_eq!(snap.insert_new, 4);
        assert_eq!(snap.insert_updates, 1);
        assert_eq!(snap.get_hits, 1);
        assert_eq!(snap.get_misses, 1);
        assert_eq!(snap.peek_calls, 1);
        assert_eq!(snap.peek_found, 1);
        assert_eq!(snap.evicted_by_capacity, 2);
        assert_eq!(snap.evicted_by_cost, 1);
        assert_eq!(snap.cache_len, 1);
        assert_eq!(snap.total_cost, 2);
        assert_eq!(MetricsSnapshotProvider::snapshot(&cache), snap);

        cache.reset_metrics();
        assert_eq!(cache.metrics_snapshot().insert_calls, 0);
    }
}
