//! Metric sinks that training and evaluation publish named scores to.

use serde::{Deserialize, Serialize};

/// Destination for named scalar metrics.
pub trait MetricsSink {
    fn log_metric(&mut self, name: &str, value: f64);
}

/// Discards every metric.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopSink;

impl MetricsSink for NoopSink {
    fn log_metric(&mut self, _name: &str, _value: f64) {}
}

/// A metric as recorded by [`InMemorySink`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricRecord {
    pub name: String,
    pub value: f64,
    pub logged_at: chrono::DateTime<chrono::Utc>,
}

/// Keeps metrics in insertion order.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InMemorySink {
    pub records: Vec<MetricRecord>,
}

impl InMemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Latest value logged under `name`.
    pub fn get(&self, name: &str) -> Option<f64> {
        self.records
            .iter()
            .rev()
            .find(|r| r.name == name)
            .map(|r| r.value)
    }

    pub fn names(&self) -> Vec<&str> {
        self.records.iter().map(|r| r.name.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl MetricsSink for InMemorySink {
    fn log_metric(&mut self, name: &str, value: f64) {
        self.records.push(MetricRecord {
            name: name.to_string(),
            value,
            logged_at: chrono::Utc::now(),
        });
    }
}

/// Emits each metric as a tracing event.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl MetricsSink for TracingSink {
    fn log_metric(&mut self, name: &str, value: f64) {
        tracing::info!(metric = name, value, "Logged metric");
    }
}

/// Forwards to the inner sink only when `enabled`.
pub(crate) struct Gated<'a> {
    pub inner: &'a mut dyn MetricsSink,
    pub enabled: bool,
}

impl MetricsSink for Gated<'_> {
    fn log_metric(&mut self, name: &str, value: f64) {
        if self.enabled {
            self.inner.log_metric(name, value);
        }
    }
}
