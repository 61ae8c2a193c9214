//! Cache configuration and builder.
//!
//! A cache has two optional bounds: an entry `capacity` and a summed
//! `cost_limit`. Leaving both unset is legal, but only on request: the
//! builder refuses to guess, so a forgotten bound is a [`ConfigError`]
//! rather than a cache that quietly grows forever.
//!
//! | Field          | Type            | Default | Meaning                                   |
//! |----------------|-----------------|---------|-------------------------------------------|
//! | `capacity`     | `Option<usize>` | -       | Max entries; LRU evicted beyond it        |
//! | `cost_limit`   | `Option<u64>`   | -       | Max summed cost; LRU non-zero-cost evicted |
//! | `default_cost` | `u64`           | `1`     | Cost used by `insert` / `set`             |
//!
//! ## Example
//!
//! ```
//! use evictkit::builder::CacheBuilder;
//!
//! let cache = CacheBuilder::new()
//!     .capacity(1_000)
//!     .cost_limit(64 * 1024)
//!     .build::<String, Vec<u8>>();
//!
//! cache.insert_with_cost("logo".to_string(), vec![0u8; 512], 512);
//! assert_eq!(cache.total_cost(), 512);
//! ```

use std::hash::Hash;

use crate::cache::{EvictingCache, EvictingCore};
use crate::error::ConfigError;

/// Cost charged by `insert` when no explicit cost is given.
pub const DEFAULT_COST: u64 = 1;

/// Bounds and defaults for an evicting cache.
///
/// There is deliberately no `Default` impl: pick one of the constructors so
/// the bound (or its absence) is spelled out at the call site.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheConfig {
    pub capacity: Option<usize>,
    pub cost_limit: Option<u64>,
    pub default_cost: u64,
}

impl CacheConfig {
    /// Entry-count bound only.
    pub const fn with_capacity(capacity: usize) -> Self {
        Self {
            capacity: Some(capacity),
            cost_limit: None,
            default_cost: DEFAULT_COST,
        }
    }

    /// Cost bound only.
    pub const fn with_cost_limit(cost_limit: u64) -> Self {
        Self {
            capacity: None,
            cost_limit: Some(cost_limit),
            default_cost: DEFAULT_COST,
        }
    }

    /// Both bounds.
    pub const fn bounded(capacity: usize, cost_limit: u64) -> Self {
        Self {
            capacity: Some(capacity),
            cost_limit: Some(cost_limit),
            default_cost: DEFAULT_COST,
        }
    }

    /// No bounds; eviction never triggers.
    pub const fn unbounded() -> Self {
        Self {
            capacity: None,
            cost_limit: None,
            default_cost: DEFAULT_COST,
        }
    }

    /// Overrides the cost charged by `insert`.
    pub const fn default_cost(mut self, cost: u64) -> Self {
        self.default_cost = cost;
        self
    }

    pub const fn is_unbounded(&self) -> bool {
        self.capacity.is_none() && self.cost_limit.is_none()
    }

    /// Rejects configurations whose default-cost inserts could never be
    /// retained.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if `default_cost` exceeds `cost_limit`.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(limit) = self.cost_limit {
            if self.default_cost > limit {
                return Err(ConfigError::new(format!(
                    "default_cost {} exceeds cost_limit {}; every default insert would be evicted",
                    self.default_cost, limit
                )));
            }
        }
        Ok(())
    }
}

/// Fluent builder for [`EvictingCore`] and [`EvictingCache`].
///
/// At least one of [`capacity`](Self::capacity), [`cost_limit`](Self::cost_limit)
/// or [`unbounded`](Self::unbounded) must be called.
#[derive(Debug, Clone, Default)]
pub struct CacheBuilder {
    capacity: Option<usize>,
    cost_limit: Option<u64>,
    default_cost: Option<u64>,
    unbounded: bool,
}

impl CacheBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Maximum number of entries.
    pub fn capacity(mut self, capacity: usize) -> Self {
        self.capacity = Some(capacity);
        self
    }

    /// Maximum summed cost of all entries.
    pub fn cost_limit(mut self, cost_limit: u64) -> Self {
        self.cost_limit = Some(cost_limit);
        self
    }

    /// Cost charged by `insert` / `set`; defaults to [`DEFAULT_COST`].
    pub fn default_cost(mut self, cost: u64) -> Self {
        self.default_cost = Some(cost);
        self
    }

    /// Opts in to a cache with no bounds at all.
    pub fn unbounded(mut self) -> Self {
        self.unbounded = true;
        self
    }

    /// Resolves the builder into a validated [`CacheConfig`].
    ///
    /// # Errors
    ///
    /// - no bound was set and [`unbounded`](Self::unbounded) was not called;
    /// - [`unbounded`](Self::unbounded) was combined with a bound;
    /// - any error from [`CacheConfig::validate`].
    pub fn config(&self) -> Result<CacheConfig, ConfigError> {
        let has_bound = self.capacity.is_some() || self.cost_limit.is_some();
        match (has_bound, self.unbounded) {
            (false, false) => {
                return Err(ConfigError::new(
                    "no capacity or cost_limit configured; call unbounded() to opt in to an unbounded cache",
                ));
            },
            (true, true) => {
                return Err(ConfigError::new(
                    "unbounded() cannot be combined with capacity or cost_limit",
                ));
            },
            _ => {},
        }

        let config = CacheConfig {
            capacity: self.capacity,
            cost_limit: self.cost_limit,
            default_cost: self.default_cost.unwrap_or(DEFAULT_COST),
        };
        config.validate()?;
        Ok(config)
    }

    /// Builds a single-threaded [`EvictingCore`].
    ///
    /// # Errors
    ///
    /// See [`config`](Self::config).
    pub fn try_build_core<K, V>(&self) -> Result<EvictingCore<K, V>, ConfigError>
    where
        K: Eq + Hash + Clone,
    {
        EvictingCore::try_with_config(self.config()?)
    }

    /// Builds a single-threaded [`EvictingCore`].
    ///
    /// # Panics
    ///
    /// Panics on an invalid configuration; see [`try_build_core`](Self::try_build_core).
    pub fn build_core<K, V>(&self) -> EvictingCore<K, V>
    where
        K: Eq + Hash + Clone,
    {
        match self.try_build_core() {
            Ok(cache) => cache,
            Err(e) => panic!("{}", e),
        }
    }

    /// Builds a thread-safe [`EvictingCache`].
    ///
    /// # Errors
    ///
    /// See [`config`](Self::config).
    pub fn try_build<K, V>(&self) -> Result<EvictingCache<K, V>, ConfigError>
    where
        K: Eq + Hash + Clone,
    {
        EvictingCache::try_with_config(self.config()?)
    }

    /// Builds a thread-safe [`EvictingCache`].
    ///
    /// # Panics
    ///
    /// Panics on an invalid configuration; see [`try_build`](Self::try_build).
    pub fn build<K, V>(&self) -> EvictingCache<K, V>
    where
        K: Eq + Hash + Clone,
    {
        match self.try_build() {
            Ok(cache) => cache,
            Err(e) => panic!("{}", e),
        }
    }
}
