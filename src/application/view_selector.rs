// Time-series view selector - pure projection of history onto the current selection
use crate::application::fallback_orchestrator::DatasetOutcome;
use crate::application::schema;
use crate::domain::metric::SourceKind;
use crate::domain::reading::Reading;
use crate::domain::selection::Selection;
use crate::domain::telemetry::{DataOrigin, NoDataReason, SeriesPoint, SeriesView};
use chrono::{DateTime, Utc};

pub const MAX_POINTS_PER_SERIES: usize = 150;

#[derive(Debug, Clone, Copy)]
pub struct SeriesSource<'a> {
    pub readings: &'a [Reading],
    pub origin: DataOrigin,
}

impl<'a> From<&'a DatasetOutcome> for SeriesSource<'a> {
    fn from(outcome: &'a DatasetOutcome) -> Self {
        Self {
            readings: outcome.readings(),
            origin: outcome.origin,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct HistoryDatasets<'a> {
    pub outdoor: SeriesSource<'a>,
    pub indoor: SeriesSource<'a>,
}

impl<'a> HistoryDatasets<'a> {
    fn for_source(&self, source: SourceKind) -> &SeriesSource<'a> {
        match source {
            SourceKind::Outdoor => &self.outdoor,
            SourceKind::Indoor => &self.indoor,
        }
    }
}

/// Points of `selection.metric` from `selection.source` with
/// `timestamp >= now - selection.timeframe`, ascending and bounded.
///
/// Readings from the other source are never mixed in. An empty result is
/// reported as [`SeriesView::NoData`], never as an empty or zero-filled series.
pub fn select_series(
    selection: &Selection,
    datasets: &HistoryDatasets<'_>,
    now: DateTime<Utc>,
) -> SeriesView {
    let no_data = |reason| SeriesView::NoData {
        source: selection.source,
        metric: selection.metric,
        reason,
    };

    if !schema::supports(selection.source, selection.metric) {
        return no_data(NoDataReason::UnsupportedMetric);
    }

    let dataset = datasets.for_source(selection.source);
    if dataset.origin == DataOrigin::Unavailable {
        return no_data(NoDataReason::DatasetUnavailable);
    }

    let cutoff = now
        .checked_sub_signed(selection.timeframe)
        .unwrap_or(DateTime::<Utc>::MIN_UTC);
    let mut points: Vec<SeriesPoint> = dataset
        .readings
        .iter()
        .filter(|r| r.source == selection.source && r.timestamp >= cutoff)
        .filter_map(|r| {
            r.value(selection.metric)
                .map(|value| SeriesPoint::new(r.timestamp, value))
        })
        .collect();

    if points.is_empty() {
        return no_data(NoDataReason::EmptyWindow);
    }

    points.sort_by_key(|p| p.timestamp);

    SeriesView::Points {
        source: selection.source,
        metric: selection.metric,
        title: format!(
            "{} {}",
            selection.source.title(),
            selection.metric.label(selection.source)
        ),
        synthetic: dataset.origin.is_synthetic(),
        points: downsample_points(points, MAX_POINTS_PER_SERIES),
    }
}

/// Downsample time series points using bucket averaging
fn downsample_points(points: Vec<SeriesPoint>, max_points: usize) -> Vec<SeriesPoint> {
    if points.is_empty() || max_points == 0 || points.len() <= max_points {
        return points;
    }

    let bucket_size = points.len().div_ceil(max_points);
    let mut downsampled = Vec::with_capacity(max_points);

    for chunk in points.chunks(bucket_size) {
        // Middle point's timestamp, average value
        let mid_idx = chunk.len() / 2;
        let avg_value = chunk.iter().map(|p| p.value).sum::<f64>() / chunk.len() as f64;
        downsampled.push(SeriesPoint::new(chunk[mid_idx].timestamp, avg_value));
    }

    downsampled
}
