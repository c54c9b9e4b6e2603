// Selection state - the only value that outlives a single render
use super::metric::{CanonicalMetric, SourceKind};
use chrono::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeframePreset {
    Last24Hours,
    Last7Days,
    Last30Days,
}

impl TimeframePreset {
    pub fn duration(&self) -> Duration {
        match self {
            TimeframePreset::Last24Hours => Duration::hours(24),
            TimeframePreset::Last7Days => Duration::days(7),
            TimeframePreset::Last30Days => Duration::days(30),
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            TimeframePreset::Last24Hours => "Last 24 hours",
            TimeframePreset::Last7Days => "Last 7 days",
            TimeframePreset::Last30Days => "Last 30 days",
        }
    }
}

/// An explicit user action. Data refreshes never produce one.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SelectionEvent {
    Source(SourceKind),
    Metric(CanonicalMetric),
    Timeframe(Duration),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Selection {
    pub source: SourceKind,
    pub metric: CanonicalMetric,
    pub timeframe: Duration,
}

impl Default for Selection {
    fn default() -> Self {
        Self {
            source: SourceKind::Outdoor,
            metric: CanonicalMetric::Temperature,
            timeframe: TimeframePreset::Last24Hours.duration(),
        }
    }
}

/// Longest history window a selection may ask for.
pub const MAX_TIMEFRAME: Duration = Duration::days(365);

impl Selection {
    /// Apply one user event. Timeframes outside `(0, MAX_TIMEFRAME]` are
    /// rejected and leave the selection unchanged.
    pub fn apply(&mut self, event: SelectionEvent) -> bool {
        match event {
            SelectionEvent::Source(source) => self.source = source,
            SelectionEvent::Metric(metric) => self.metric = metric,
            SelectionEvent::Timeframe(timeframe) => {
                if timeframe <= Duration::zero() || timeframe > MAX_TIMEFRAME {
                    return false;
                }
                self.timeframe = timeframe;
            }
        }
        true
    }
}
