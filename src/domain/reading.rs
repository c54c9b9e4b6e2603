// Reading domain model - one timestamped snapshot from one source
use super::metric::{CanonicalMetric, SourceKind};
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq)]
pub struct Reading {
    pub timestamp: DateTime<Utc>,
    pub source: SourceKind,
    /// Canonical metric -> value. A key mapped to `None` was reported but carried no number.
    pub fields: BTreeMap<CanonicalMetric, Option<f64>>,
    /// Free-text attributes such as the weather icon code or category.
    pub tags: BTreeMap<String, String>,
}

impl Reading {
    pub fn new(timestamp: DateTime<Utc>, source: SourceKind) -> Self {
        Self {
            timestamp,
            source,
            fields: BTreeMap::new(),
            tags: BTreeMap::new(),
        }
    }

    pub fn with_field(mut self, metric: CanonicalMetric, value: f64) -> Self {
        self.fields.insert(metric, Some(value));
        self
    }

    pub fn value(&self, metric: CanonicalMetric) -> Option<f64> {
        self.fields.get(&metric).copied().flatten()
    }

    pub fn tag(&self, key: &str) -> Option<&str> {
        self.tags.get(key).map(String::as_str)
    }
}

/// Newest reading of a series. Ties keep the later position, so the last of
/// duplicate timestamps wins.
pub fn latest(readings: &[Reading]) -> Option<&Reading> {
    readings.iter().max_by(|a, b| a.timestamp.cmp(&b.timestamp))
}
