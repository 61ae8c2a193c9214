//! Error types for evictkit.
//!
//! Cache operations themselves never fail: a miss is `None`, and removing a
//! missing key is a no-op. Errors only appear at the edges.
//!
//! - [`ConfigError`]: a [`CacheConfig`](crate::builder::CacheConfig) or
//!   [`CacheBuilder`](crate::builder::CacheBuilder) describes a cache that
//!   cannot honour its own bounds (or names no bound at all).
//! - [`InvariantError`]: `check_invariants` found the key index, recency
//!   list, and cost total out of agreement.
//!
//! ## Example Usage
//!
//! ```
//! use evictkit::builder::CacheBuilder;
//! use evictkit::error::ConfigError;
//!
//! // No bound and no explicit `unbounded()` is rejected.
//! let err: ConfigError = CacheBuilder::new().try_build_core::<u64, u64>().unwrap_err();
//! assert!(err.message().contains("unbounded"));
//!
//! let cache = CacheBuilder::new().capacity(8).try_build_core::<u64, u64>();
//! assert!(cache.is_ok());
//! ```

use std::fmt;

// ---------------------------------------------------------------------------
// InvariantError
// ---------------------------------------------------------------------------

/// Internal structure of a cache is inconsistent.
///
/// Returned by [`EvictingCore::check_invariants`](crate::cache::EvictingCore::check_invariants).
/// Outside of bugs this only happens when a key's `Hash`/`Eq` changed while
/// it was cached.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvariantError(String);

impl InvariantError {
    #[inline]
    pub fn new(msg: impl Into<String>) -> Self {
        Self(msg.into())
    }

    #[inline]
    pub fn message(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for InvariantError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::error::Error for InvariantError {}

// ---------------------------------------------------------------------------
// ConfigError
// ---------------------------------------------------------------------------

/// Cache configuration was rejected.
///
/// Produced by [`CacheConfig::validate`](crate::builder::CacheConfig::validate),
/// the builder's `try_build*` methods and
/// [`EvictingCore::try_with_config`](crate::cache::EvictingCore::try_with_config).
///
/// # Example
///
/// ```
/// use evictkit::builder::CacheConfig;
///
/// let err = CacheConfig::with_cost_limit(4).default_cost(10).validate().unwrap_err();
/// assert!(err.to_string().contains("default_cost"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigError(String);

impl ConfigError {
    #[inline]
    pub fn new(msg: impl Into<String>) -> Self {
        Self(msg.into())
    }

    #[inline]
    pub fn message(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::error::Error for ConfigError {}
