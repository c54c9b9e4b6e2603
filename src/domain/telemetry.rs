// Time-series domain models
use super::fetch::SourceId;
use super::metric::{CanonicalMetric, SourceKind};
use chrono::{DateTime, Utc};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SeriesPoint {
    pub timestamp: DateTime<Utc>,
    pub value: f64,
}

impl SeriesPoint {
    pub fn new(timestamp: DateTime<Utc>, value: f64) -> Self {
        Self { timestamp, value }
    }

    pub fn time_ms(&self) -> i64 {
        self.timestamp.timestamp_millis()
    }
}

/// Where a dataset's data actually came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataOrigin {
    Source(SourceId),
    /// Generated placeholder; never real measurements
    Synthetic,
    Unavailable,
}

impl DataOrigin {
    pub fn is_synthetic(&self) -> bool {
        matches!(self, DataOrigin::Synthetic)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoDataReason {
    /// Nothing at or after `now - timeframe`
    EmptyWindow,
    /// The selected source never reports this metric
    UnsupportedMetric,
    /// The dataset itself could not be fetched
    DatasetUnavailable,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SeriesView {
    Points {
        source: SourceKind,
        metric: CanonicalMetric,
        title: String,
        synthetic: bool,
        points: Vec<SeriesPoint>,
    },
    NoData {
        source: SourceKind,
        metric: CanonicalMetric,
        reason: NoDataReason,
    },
}

impl SeriesView {
    pub fn points(&self) -> &[SeriesPoint] {
        match self {
            SeriesView::Points { points, .. } => points,
            SeriesView::NoData { .. } => &[],
        }
    }

    pub fn is_no_data(&self) -> bool {
        matches!(self, SeriesView::NoData { .. })
    }
}
