pub use crate::builder::{CacheBuilder, CacheConfig, DEFAULT_COST};
pub use crate::cache::{EvictingCache, EvictingCore, EvictionCause};
pub use crate::error::{ConfigError, InvariantError};
#[cfg(feature = "metrics")]
pub use crate::metrics::snapshot::EvictingMetricsSnapshot;
pub use crate::traits::{
    ConcurrentCache, CoreCache, CostAwareCache, LruCacheTrait, MutableCache,
};
