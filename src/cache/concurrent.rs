use std::fmt;
use std::hash::Hash;
use std::sync::Arc;

use parking_lot::RwLock;

use super::engine::EvictingCore;
use crate::builder::CacheConfig;
use crate::error::{ConfigError, InvariantError};
#[cfg(feature = "metrics")]
use crate::metrics::snapshot::EvictingMetricsSnapshot;
#[cfg(feature = "metrics")]
use crate::metrics::traits::MetricsSnapshotProvider;
use crate::traits::ConcurrentCache;

/// Thread-safe [`EvictingCore`] behind a single [`parking_lot::RwLock`].
///
/// Values are stored as `Arc<V>` so lookups can hand them out without
/// holding the lock. Cloning the cache is cheap and every clone shares the
/// same entries.
///
/// Each call takes the lock once, so every operation is atomic with respect
/// to the others: no caller ever observes a half-applied insert or an
/// in-progress eviction. Operations that change recency (`get`, `touch`,
/// every insert) need the write lock even though they look like reads.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use std::thread;
///
/// use evictkit::cache::EvictingCache;
///
/// let cache = EvictingCache::new(128);
/// let handles: Vec<_> = (0..4u64)
///     .map(|t| {
///         let cache = cache.clone();
///         thread::spawn(move || {
///             for i in 0..32 {
///                 cache.insert(t * 100 + i, format!("row-{}", i));
///             }
///         })
///     })
///     .collect();
/// for h in handles {
///     h.join().unwrap();
/// }
///
/// assert_eq!(cache.len(), 128);
/// let row: Option<Arc<String>> = cache.get(&301);
/// assert_eq!(row.as_deref().map(String::as_str), Some("row-1"));
/// ```
pub struct EvictingCache<K, V> {
    inner: Arc<RwLock<EvictingCore<K, Arc<V>>>>,
}

impl<K, V> Clone for EvictingCache<K, V> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<K, V> EvictingCache<K, V>
where
    K: Eq + Hash + Clone,
{
    /// Creates a cache holding at most `capacity` entries.
    pub fn new(capacity: usize) -> Self {
        Self::from_core(EvictingCore::new(capacity))
    }

    /// Creates a cache whose summed cost stays within `cost_limit`.
    ///
    /// # Panics
    ///
    /// Panics if `cost_limit` is below the default cost of `1`.
    pub fn with_cost_limit(cost_limit: u64) -> Self {
        Self::from_core(EvictingCore::with_cost_limit(cost_limit))
    }

    /// # Panics
    ///
    /// Panics if `cost_limit` is below the default cost of `1`.
    pub fn with_bounds(capacity: usize, cost_limit: u64) -> Self {
        Self::from_core(EvictingCore::with_bounds(capacity, cost_limit))
    }

    pub fn unbounded() -> Self {
        Self::from_core(EvictingCore::unbounded())
    }

    /// # Panics
    ///
    /// Panics if `config` is invalid; see [`CacheConfig::validate`].
    pub fn with_config(config: CacheConfig) -> Self {
        Self::from_core(EvictingCore::with_config(config))
    }

    /// # Errors
    ///
    /// Returns [`ConfigError`] if [`CacheConfig::validate`] fails.
    pub fn try_with_config(config: CacheConfig) -> Result<Self, ConfigError> {
        EvictingCore::try_with_config(config).map(Self::from_core)
    }

    fn from_core(core: EvictingCore<K, Arc<V>>) -> Self {
        Self {
            inner: Arc::new(RwLock::new(core)),
        }
    }

    // -----------------------------------------------------------------------
    // Write-locked
    // -----------------------------------------------------------------------

    /// Inserts at the default cost, returning the replaced value.
    pub fn insert(&self, key: K, value: V) -> Option<Arc<V>> {
        self.inner.write().insert(key, Arc::new(value))
    }

    /// Inserts with an explicit cost, returning the replaced value.
    ///
    /// See [`EvictingCore::insert_with_cost`] for the eviction rules.
    pub fn insert_with_cost(&self, key: K, value: V, cost: u64) -> Option<Arc<V>> {
        self.inner.write().insert_with_cost(key, Arc::new(value), cost)
    }

    /// Inserts an already shared value at the default cost.
    pub fn insert_arc(&self, key: K, value: Arc<V>) -> Option<Arc<V>> {
        self.inner.write().insert(key, value)
    }

    pub fn insert_arc_with_cost(&self, key: K, value: Arc<V>, cost: u64) -> Option<Arc<V>> {
        self.inner.write().insert_with_cost(key, value, cost)
    }

    /// Looks up `key`, promoting it on a hit.
    pub fn get(&self, key: &K) -> Option<Arc<V>> {
        self.inner.write().get(key).cloned()
    }

    /// Promotes `key` without reading it. Returns `false` if absent.
    pub fn touch(&self, key: &K) -> bool {
        self.inner.write().touch(key)
    }

    pub fn remove(&self, key: &K) -> Option<Arc<V>> {
        self.inner.write().remove(key)
    }

    /// `Some(v)` inserts at the default cost, `None` removes.
    pub fn set(&self, key: K, value: Option<V>) -> Option<Arc<V>> {
        self.inner.write().set(key, value.map(Arc::new))
    }

    pub fn pop_lru(&self) -> Option<(K, Arc<V>)> {
        self.inner.write().pop_lru()
    }

    pub fn clear(&self) {
        self.inner.write().clear();
    }

    /// Replaces the entry bound, evicting immediately. Returns the number
    /// of entries evicted.
    pub fn set_capacity(&self, capacity: Option<usize>) -> usize {
        self.inner.write().set_capacity(capacity)
    }

    /// Replaces the cost bound, evicting immediately. Returns the number
    /// of entries evicted.
    pub fn set_cost_limit(&self, cost_limit: Option<u64>) -> usize {
        self.inner.write().set_cost_limit(cost_limit)
    }

    // -----------------------------------------------------------------------
    // Read-locked
    // -----------------------------------------------------------------------

    /// Looks up `key` without promoting it.
    pub fn peek(&self, key: &K) -> Option<Arc<V>> {
        self.inner.read().peek(key).cloned()
    }

    pub fn peek_lru(&self) -> Option<(K, Arc<V>)> {
        self.inner
            .read()
            .peek_lru()
            .map(|(k, v)| (k.clone(), Arc::clone(v)))
    }

    pub fn contains(&self, key: &K) -> bool {
        self.inner.read().contains(key)
    }

    pub fn len(&self) -> usize {
        self.inner.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.read().is_empty()
    }

    pub fn total_cost(&self) -> u64 {
        self.inner.read().total_cost()
    }

    pub fn cost_of(&self, key: &K) -> Option<u64> {
        self.inner.read().cost_of(key)
    }

    pub fn capacity(&self) -> Option<usize> {
        self.inner.read().capacity()
    }

    pub fn cost_limit(&self) -> Option<u64> {
        self.inner.read().cost_limit()
    }

    pub fn default_cost(&self) -> u64 {
        self.inner.read().default_cost()
    }

    pub fn config(&self) -> CacheConfig {
        self.inner.read().config()
    }

    /// Keys from most to least recently used, copied out under the read lock.
    pub fn keys(&self) -> Vec<K> {
        self.inner.read().iter().map(|(k, _)| k.clone()).collect()
    }

    /// See [`EvictingCore::check_invariants`].
    ///
    /// # Errors
    ///
    /// Returns [`InvariantError`] describing the first violation found.
    pub fn check_invariants(&self) -> Result<(), InvariantError>
    where
        K: fmt::Debug,
    {
        self.inner.read().check_invariants()
    }
}

#[cfg(feature = "metrics")]
impl<K, V> EvictingCache<K, V>
where
    K: Eq + Hash + Clone,
{
    pub fn metrics_snapshot(&self) -> EvictingMetricsSnapshot {
        self.inner.read().metrics_snapshot()
    }

    pub fn reset_metrics(&self) {
        self.inner.write().reset_metrics();
    }
}

#[cfg(feature = "metrics")]
impl<K, V> MetricsSnapshotProvider<EvictingMetricsSnapshot> for EvictingCache<K, V>
where
    K: Eq + Hash + Clone,
{
    fn snapshot(&self) -> EvictingMetricsSnapshot {
        self.metrics_snapshot()
    }
}

impl<K, V> fmt::Debug for EvictingCache<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.inner.try_read() {
            Some(core) => f.debug_tuple("EvictingCache").field(&*core).finish(),
            None => f.write_str("EvictingCache { <locked> }"),
        }
    }
}

impl<K, V> ConcurrentCache for EvictingCache<K, V>
where
    K: Send + Sync,
    V: Send + Sync,
{
}
