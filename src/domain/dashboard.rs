// Dashboard domain model - everything one render hands to the presentation layer
use super::fetch::{DatasetKind, FetchResult, SourceFailure};
use super::forecast::{DailyForecast, ForecastEntry};
use super::gauge::{AirQualityAssessment, GaugeValue};
use super::reading::Reading;
use super::selection::Selection;
use super::telemetry::SeriesView;
use chrono::{DateTime, FixedOffset, Utc};

#[derive(Debug, Clone)]
pub struct ConditionsPanel {
    pub dataset: DatasetKind,
    pub reading: FetchResult<Reading>,
    pub humidity: GaugeValue,
    pub air_quality: GaugeValue,
}

#[derive(Debug, Clone)]
pub struct ForecastPanel {
    /// Timezone basis the daily outlook was resolved in
    pub basis: FixedOffset,
    pub daily: FetchResult<Vec<DailyForecast>>,
    pub upcoming: FetchResult<Vec<ForecastEntry>>,
}

#[derive(Debug, Clone)]
pub struct DashboardSnapshot {
    pub generated_at: DateTime<Utc>,
    pub selection: Selection,
    pub outdoor: ConditionsPanel,
    pub indoor: ConditionsPanel,
    pub indoor_assessment: FetchResult<AirQualityAssessment>,
    pub forecast: ForecastPanel,
    pub series: SeriesView,
    pub failures: Vec<SourceFailure>,
}
