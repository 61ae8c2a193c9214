//! Metrics traits.
//!
//! - **Recorders** only write counters. `&mut self` recorders are used from
//!   paths that already hold the cache mutably; [`ReadMetricsRecorder`]
//!   covers `&self` paths such as `peek`.
//! - **Providers** turn counters plus live gauges into a snapshot.
//! - **Exporters** publish a snapshot to a monitoring backend.

use crate::cache::EvictionCause;

/// Counters every cache records.
pub trait CoreMetricsRecorder {
    fn record_get_hit(&mut self);
    fn record_get_miss(&mut self);
    fn record_insert_call(&mut self);
    fn record_insert_new(&mut self);
    fn record_insert_update(&mut self);
    fn record_evict_call(&mut self);
    fn record_evicted_entry(&mut self, cause: EvictionCause);
    fn record_clear(&mut self);
}

/// LRU and cost bookkeeping beyond the core counters.
pub trait EvictionMetricsRecorder: CoreMetricsRecorder {
    fn record_remove_call(&mut self);
    fn record_remove_found(&mut self);
    fn record_pop_lru_call(&mut self);
    fn record_pop_lru_found(&mut self);
    fn record_touch_call(&mut self);
    fn record_touch_found(&mut self);
    fn record_bound_change(&mut self);
}

/// Counters recorded from `&self` methods (interior mutability).
pub trait ReadMetricsRecorder {
    fn record_peek_call(&self);
    fn record_peek_found(&self);
}

/// Snapshot current metrics (bench/test and export input).
pub trait MetricsSnapshotProvider<S> {
    fn snapshot(&self) -> S;
}

/// Publish metrics to a monitoring backend.
pub trait MetricsExporter<S> {
    fn export(&self, snapshot: &S);
}
