use std::io::Write;

use parking_lot::Mutex;

use crate::metrics::snapshot::EvictingMetricsSnapshot;
use crate::metrics::traits::MetricsExporter;

/// Prometheus text-format exporter.
///
/// Writes `# TYPE` headers and samples in the text exposition format so the
/// output can be served from a scrape endpoint or forwarded to an
/// OpenTelemetry collector. Write errors are ignored: metrics export must
/// never affect the cache.
///
/// # Example
///
/// ```
/// use evictkit::cache::EvictingCore;
/// use evictkit::metrics::{MetricsExporter, PrometheusTextExporter};
///
/// let mut cache = EvictingCore::new(2);
/// cache.insert("a", 1);
///
/// let exporter = PrometheusTextExporter::new("sessions", Vec::new());
/// exporter.export(&cache.metrics_snapshot());
/// let text = String::from_utf8(exporter.into_inner()).unwrap();
/// assert!(text.contains("sessions_entries 1"));
/// ```
#[derive(Debug)]
pub struct PrometheusTextExporter<W: Write + Send> {
    prefix: String,
    writer: Mutex<W>,
}

impl<W: Write + Send> PrometheusTextExporter<W> {
    pub fn new(prefix: impl Into<String>, writer: W) -> Self {
        Self {
            prefix: prefix.into(),
            writer: Mutex::new(writer),
        }
    }

    /// Consumes the exporter and returns the underlying writer.
    pub fn into_inner(self) -> W {
        self.writer.into_inner()
    }

    fn write_sample(&self, kind: &str, name: &str, value: u64) {
        let mut writer = self.writer.lock();
        let _ = writeln!(writer, "# TYPE {} {}", name, kind);
        let _ = writeln!(writer, "{} {}", name, value);
    }

    fn write_counter(&self, suffix: &str, value: u64) {
        self.write_sample("counter", &self.metric_name(suffix), value);
    }

    fn write_gauge(&self, suffix: &str, value: u64) {
        self.write_sample("gauge", &self.metric_name(suffix), value);
    }

    fn metric_name(&self, suffix: &str) -> String {
        if self.prefix.is_empty() {
            suffix.to_string()
        } else {
            format!("{}_{}", self.prefix, suffix)
        }
    }
}

impl<W: Write + Send> MetricsExporter<EvictingMetricsSnapshot> for PrometheusTextExporter<W> {
    fn export(&self, snapshot: &EvictingMetricsSnapshot) {
        self.write_counter("get_calls_total", snapshot.get_calls);
        self.write_counter("get_hits_total", snapshot.get_hits);
        self.write_counter("get_misses_total", snapshot.get_misses);
        self.write_counter("insert_calls_total", snapshot.insert_calls);
        self.write_counter("insert_updates_total", snapshot.insert_updates);
        self.write_counter("insert_new_total", snapshot.insert_new);
        self.write_counter("evict_calls_total", snapshot.evict_calls);
        self.write_counter("evicted_capacity_total", snapshot.evicted_by_capacity);
        self.write_counter("evicted_cost_total", snapshot.evicted_by_cost);
        self.write_counter("remove_calls_total", snapshot.remove_calls);
        self.write_counter("remove_found_total", snapshot.remove_found);
        self.write_counter("pop_lru_calls_total", snapshot.pop_lru_calls);
        self.write_counter("pop_lru_found_total", snapshot.pop_lru_found);
        self.write_counter("touch_calls_total", snapshot.touch_calls);
        self.write_counter("touch_found_total", snapshot.touch_found);
        self.write_counter("peek_calls_total", snapshot.peek_calls);
        self.write_counter("peek_found_total", snapshot.peek_found);
        self.write_counter("clear_calls_total", snapshot.clear_calls);
        self.write_counter("bound_changes_total", snapshot.bound_changes);

        self.write_gauge("entries", snapshot.cache_len as u64);
        self.write_gauge("total_cost", snapshot.total_cost);
        // Unset bounds are omitted rather than exported as a sentinel.
        if let Some(capacity) = snapshot.capacity {
            self.write_gauge("capacity", capacity as u64);
        }
        if let Some(cost_limit) = snapshot.cost_limit {
            self.write_gauge("cost_limit", cost_limit);
        }
    }
}
