//! evictkit: in-memory key-value cache with deterministic LRU eviction
//! under an entry-count bound, a summed-cost bound, or both.
//!
//! - [`cache::EvictingCore`]: single-threaded engine (`&mut self`).
//! - [`cache::EvictingCache`]: shareable handle, one `RwLock` around the core.
//! - [`builder::CacheBuilder`]: fluent construction with validation.
//!
//! ```
//! use evictkit::prelude::*;
//!
//! let mut cache = CacheBuilder::new()
//!     .capacity(2)
//!     .cost_limit(10)
//!     .build_core::<&str, u32>();
//!
//! cache.insert_with_cost("a", 1, 4);
//! cache.insert_with_cost("b", 2, 4);
//! cache.get(&"a");
//! cache.insert_with_cost("c", 3, 4); // over both bounds; "b" is LRU
//!
//! assert!(!cache.contains(&"b"));
//! assert_eq!(cache.total_cost(), 8);
//! ```
//!
//! Eviction events are emitted through `tracing` (`trace` per evicted
//! entry, `debug` for bound changes and clears, `warn` for entries that
//! exceed the cost limit on their own).

pub mod builder;
pub mod cache;
pub mod ds;
pub mod error;

#[cfg(feature = "metrics")]
pub mod metrics;

pub mod prelude;
pub mod traits;
