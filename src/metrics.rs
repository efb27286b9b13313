// src/metrics.rs
// Best-effort counters for the visitor gate.
// Stores counters in the key-value store and renders them as plain text for
// whatever the host wants to scrape them with.

use crate::store::KeyValueStore;

const METRICS_PREFIX: &str = "metrics:";

/// Counters we track.
#[derive(Debug, Clone, Copy)]
pub enum MetricName {
    PageLoads,
    TrapsShown,
    AttemptsRecorded,
    Escalations,
    Passes,
}

impl MetricName {
    fn as_str(&self) -> &'static str {
        match self {
            MetricName::PageLoads => "page_loads_total",
            MetricName::TrapsShown => "traps_shown_total",
            MetricName::AttemptsRecorded => "attempts_recorded_total",
            MetricName::Escalations => "escalations_total",
            MetricName::Passes => "passes_total",
        }
    }
}

const ALL_METRICS: [MetricName; 5] = [
    MetricName::PageLoads,
    MetricName::TrapsShown,
    MetricName::AttemptsRecorded,
    MetricName::Escalations,
    MetricName::Passes,
];

/// Increment a counter, optionally with a reason label. A failed read or
/// write loses the increment; counters are advisory.
pub fn increment(store: &impl KeyValueStore, metric: MetricName, label: Option<&str>) {
    let key = match label {
        Some(l) => format!("{}{}:{}", METRICS_PREFIX, metric.as_str(), l),
        None => format!("{}{}", METRICS_PREFIX, metric.as_str()),
    };
    let current = get_counter(store, &key);
    let _ = store.set(&key, current.saturating_add(1).to_string().as_bytes());
}

fn get_counter(store: &impl KeyValueStore, key: &str) -> u64 {
    store
        .get(key)
        .ok()
        .flatten()
        .and_then(|raw| String::from_utf8(raw).ok())
        .and_then(|s| s.parse().ok())
        .unwrap_or(0)
}

/// Plain-text counter dump, one `gate_<name> <value>` line per metric.
pub fn render_metrics(store: &impl KeyValueStore) -> String {
    let mut output = String::new();
    output.push_str("# Visitor Gate Metrics\n");
    for metric in ALL_METRICS {
        let key = format!("{}{}", METRICS_PREFIX, metric.as_str());
        output.push_str(&format!("gate_{} {}\n", metric.as_str(), get_counter(store, &key)));
    }
    output
}
