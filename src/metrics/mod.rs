//! Counters, snapshots, and export for [`EvictingCore`](crate::cache::EvictingCore)
//! and [`EvictingCache`](crate::cache::EvictingCache).
//!
//! Recording, snapshotting, and export are split into separate traits so
//! the cache only ever writes counters:
//!
//! ```text
//!   EvictingCore ──record_*()──► EvictingMetrics
//!                                     │
//!                       metrics_snapshot() (adds len / cost gauges)
//!                                     ▼
//!                          EvictingMetricsSnapshot ──► MetricsExporter
//!                                                      (PrometheusTextExporter)
//! ```
//!
//! Compiled only with the `metrics` feature (enabled by default).

pub mod cell;
pub mod exporter;
pub mod metrics_impl;
pub mod snapshot;
pub mod traits;

pub use exporter::PrometheusTextExporter;
pub use metrics_impl::EvictingMetrics;
pub use snapshot::EvictingMetricsSnapshot;
pub use traits::{
    CoreMetricsRecorder, EvictionMetricsRecorder, MetricsExporter, MetricsSnapshotProvider,
    ReadMetricsRecorder,
};
