// Fallback orchestrator - resolves every dataset independently, degrading instead of failing
use crate::application::normalizer::{
    normalize, normalize_forecast, parse_air_quality, rejected_status,
};
use crate::application::schema::{self, TAG_SYNTHETIC};
use crate::application::source_fetcher::SourceFetcher;
use crate::application::transport::EndpointTable;
use crate::domain::fetch::{DatasetKind, EngineError, FetchResult, SourceFailure, SourceId};
use crate::domain::forecast::ForecastEntry;
use crate::domain::gauge::AirQualityAssessment;
use crate::domain::metric::{CanonicalMetric, SourceKind};
use crate::domain::reading::{Reading, latest};
use crate::domain::selection::MAX_TIMEFRAME;
use crate::domain::telemetry::DataOrigin;
use chrono::{DateTime, Duration, Timelike, Utc};
use serde_json::json;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RefreshRequest {
    pub now: DateTime<Utc>,
    /// Span requested from the history datasets, ending at `now`
    pub history_window: Duration,
}

impl RefreshRequest {
    /// Saturates at the earliest representable instant instead of overflowing.
    pub fn window_start(&self) -> DateTime<Utc> {
        self.now
            .checked_sub_signed(self.history_window)
            .unwrap_or(DateTime::<Utc>::MIN_UTC)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum NormalizedData {
    Readings(Vec<Reading>),
    Forecast(Vec<ForecastEntry>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct DatasetOutcome {
    pub kind: DatasetKind,
    pub data: NormalizedData,
    pub origin: DataOrigin,
    pub failures: Vec<SourceFailure>,
}

impl DatasetOutcome {
    pub fn readings(&self) -> &[Reading] {
        match &self.data {
            NormalizedData::Readings(readings) => readings,
            NormalizedData::Forecast(_) => &[],
        }
    }

    pub fn forecast(&self) -> &[ForecastEntry] {
        match &self.data {
            NormalizedData::Forecast(entries) => entries,
            NormalizedData::Readings(_) => &[],
        }
    }

    pub fn is_available(&self) -> bool {
        self.origin != DataOrigin::Unavailable
    }

    /// Most recent recorded cause, for the panel's "unable to fetch" message.
    pub fn last_error(&self) -> Option<&EngineError> {
        self.failures.last().map(|f| &f.error)
    }
}

/// Everything one refresh produced. Owned by the orchestrator's caller for one render.
#[derive(Debug, Clone)]
pub struct RefreshCycle {
    pub current_outdoor: DatasetOutcome,
    pub forecast: DatasetOutcome,
    pub current_indoor: DatasetOutcome,
    pub indoor_history: DatasetOutcome,
    pub outdoor_history: DatasetOutcome,
    pub air_quality: FetchResult<AirQualityAssessment>,
}

impl RefreshCycle {
    pub fn failures(&self) -> Vec<SourceFailure> {
        let mut failures: Vec<SourceFailure> = [
            &self.current_outdoor,
            &self.forecast,
            &self.current_indoor,
            &self.indoor_history,
            &self.outdoor_history,
        ]
        .iter()
        .flat_map(|outcome| outcome.failures.iter().cloned())
        .collect();

        if let Some(error) = self.air_quality.failure() {
            failures.push(SourceFailure::new(SourceId::AirQualityBatch, error.clone()));
        }
        failures
    }
}

pub struct FallbackOrchestrator {
    fetcher: SourceFetcher,
    endpoints: EndpointTable,
    location: Coordinates,
}

impl FallbackOrchestrator {
    pub fn new(fetcher: SourceFetcher, endpoints: EndpointTable, location: Coordinates) -> Self {
        Self {
            fetcher,
            endpoints,
            location,
        }
    }

    /// Resolve all five datasets concurrently, then the composite AQI request.
    /// No dataset's outcome depends on another's.
    pub async fn refresh(&self, request: &RefreshRequest) -> RefreshCycle {
        let (current_outdoor, forecast, current_indoor, indoor_history, outdoor_history) = futures::join!(
            self.resolve_dataset(DatasetKind::CurrentOutdoor, DatasetKind::CurrentOutdoor.sources(), request),
            self.resolve_dataset(DatasetKind::OutdoorForecast, DatasetKind::OutdoorForecast.sources(), request),
            self.resolve_dataset(DatasetKind::CurrentIndoor, DatasetKind::CurrentIndoor.sources(), request),
            self.resolve_dataset(DatasetKind::IndoorHistory, DatasetKind::IndoorHistory.sources(), request),
            self.resolve_dataset(DatasetKind::OutdoorHistory, DatasetKind::OutdoorHistory.sources(), request),
        );

        let air_quality = match latest(current_indoor.readings()) {
            Some(reading) => self.assess_air_quality(reading).await,
            None => FetchResult::Empty,
        };

        RefreshCycle {
            current_outdoor,
            forecast,
            current_indoor,
            indoor_history,
            outdoor_history,
            air_quality,
        }
    }

    /// Try `sources` in order until one yields data. Outdoor history ends in a
    /// synthetic placeholder; every other dataset degrades to empty.
    pub async fn resolve_dataset(
        &self,
        kind: DatasetKind,
        sources: &[SourceId],
        request: &RefreshRequest,
    ) -> DatasetOutcome {
        let mut failures = Vec::new();

        for &source in sources {
            match self.fetch_normalized(kind, source, request).await {
                Ok(data) => {
                    tracing::debug!("{} resolved from {}", kind.title(), source.as_str());
                    return DatasetOutcome {
                        kind,
                        data,
                        origin: DataOrigin::Source(source),
                        failures,
                    };
                }
                Err(error) => {
                    tracing::warn!("{} unavailable from {}: {}", kind.title(), source.as_str(), error);
                    failures.push(SourceFailure::new(source, error));
                }
            }
        }

        if kind.allows_synthetic() {
            tracing::warn!("{} falling back to synthetic placeholder", kind.title());
            return DatasetOutcome {
                kind,
                data: NormalizedData::Readings(synthetic_series(
                    SourceKind::Outdoor,
                    request.now,
                    request.history_window,
                )),
                origin: DataOrigin::Synthetic,
                failures,
            };
        }

        let data = match kind {
            DatasetKind::OutdoorForecast => NormalizedData::Forecast(Vec::new()),
            _ => NormalizedData::Readings(Vec::new()),
        };
        DatasetOutcome {
            kind,
            data,
            origin: DataOrigin::Unavailable,
            failures,
        }
    }

    /// Batch AQI computation keyed on the freshly normalized indoor reading.
    pub async fn assess_air_quality(&self, reading: &Reading) -> FetchResult<AirQualityAssessment> {
        let Some(endpoint) = self.endpoints.get(SourceId::AirQualityBatch) else {
            return FetchResult::Failed(not_configured(SourceId::AirQualityBatch));
        };

        let body = json!([{
            "temperature": reading.value(CanonicalMetric::Temperature),
            "humidity": reading.value(CanonicalMetric::Humidity),
            "co2eq": reading.value(CanonicalMetric::Co2),
            "tvoc": reading.value(CanonicalMetric::Tvoc),
        }]);

        match self.fetcher.submit(endpoint, self.location_params(), body).await {
            FetchResult::Ok(raw) => match parse_air_quality(&raw) {
                Ok(rows) => rows
                    .into_iter()
                    .next()
                    .map(FetchResult::Ok)
                    .unwrap_or(FetchResult::Empty),
                Err(error) => {
                    tracing::warn!("Air quality index unavailable: {}", error);
                    FetchResult::Failed(error)
                }
            },
            FetchResult::Empty => FetchResult::Empty,
            FetchResult::Failed(error) => FetchResult::Failed(error),
        }
    }

    async fn fetch_normalized(
        &self,
        kind: DatasetKind,
        source: SourceId,
        request: &RefreshRequest,
    ) -> Result<NormalizedData, EngineError> {
        let endpoint = self
            .endpoints
            .get(source)
            .ok_or_else(|| not_configured(source))?;
        let profile = schema::profile(source).ok_or_else(|| {
            EngineError::SchemaMismatch(format!("no field table for {}", source.as_str()))
        })?;

        let raw = match self
            .fetcher
            .fetch(endpoint, self.params(kind, source, request), endpoint.timeout)
            .await
        {
            FetchResult::Ok(raw) => raw,
            FetchResult::Empty => {
                return Err(EngineError::EmptyResult(format!(
                    "{} returned no data",
                    source.as_str()
                )));
            }
            FetchResult::Failed(error) => return Err(error),
        };

        let empty_cause = || match rejected_status(&raw) {
            Some(status) => EngineError::SchemaMismatch(format!("status={}", status)),
            None => EngineError::EmptyResult(format!("{} payload had no records", source.as_str())),
        };

        if kind == DatasetKind::OutdoorForecast {
            let entries = normalize_forecast(&raw, profile);
            if entries.is_empty() {
                return Err(empty_cause());
            }
            return Ok(NormalizedData::Forecast(entries));
        }

        let mut readings = normalize(&raw, profile);
        if readings.is_empty() {
            return Err(empty_cause());
        }
        if kind.is_history() {
            let start = request.window_start();
            readings.retain(|r| r.timestamp >= start && r.timestamp <= request.now);
            if readings.is_empty() {
                return Err(EngineError::EmptyResult(format!(
                    "{} had no readings in the requested window",
                    source.as_str()
                )));
            }
        }
        Ok(NormalizedData::Readings(readings))
    }

    fn location_params(&self) -> Vec<(String, String)> {
        vec![
            ("lat".to_string(), self.location.latitude.to_string()),
            ("lon".to_string(), self.location.longitude.to_string()),
        ]
    }

    fn params(
        &self,
        kind: DatasetKind,
        source: SourceId,
        request: &RefreshRequest,
    ) -> Vec<(String, String)> {
        let mut params = self.location_params();
        if kind.is_history() {
            params.push(("start".to_string(), request.window_start().timestamp().to_string()));
            params.push(("end".to_string(), request.now.timestamp().to_string()));
        }
        if source == SourceId::OutdoorHistoryPublic {
            params.push(("type".to_string(), "hour".to_string()));
        }
        params
    }
}

fn not_configured(source: SourceId) -> EngineError {
    EngineError::TransportFailure(format!("no endpoint configured for {}", source.as_str()))
}

/// Placeholder history at hourly granularity: one reading per whole hour of
/// `window` (at most [`MAX_TIMEFRAME`]), starting at `now - window`. Values
/// follow a fixed diurnal curve and every reading is tagged synthetic.
pub fn synthetic_series(source: SourceKind, now: DateTime<Utc>, window: Duration) -> Vec<Reading> {
    let window = window.min(MAX_TIMEFRAME);
    let Some(start) = now.checked_sub_signed(window) else {
        return Vec::new();
    };
    let hours = window.num_hours().max(0);

    (0..hours)
        .filter_map(|h| start.checked_add_signed(Duration::hours(h)))
        .map(|timestamp| {
            let hour_of_day = f64::from(timestamp.hour()) + f64::from(timestamp.minute()) / 60.0;
            // Warmest and driest mid-afternoon
            let phase = (hour_of_day - 15.0) / 24.0 * std::f64::consts::TAU;

            let mut reading = Reading::new(timestamp, source)
                .with_field(CanonicalMetric::Temperature, 12.0 + 6.0 * phase.cos())
                .with_field(CanonicalMetric::Humidity, 65.0 - 15.0 * phase.cos())
                .with_field(CanonicalMetric::Pressure, 1013.0);
            reading.tags.insert(TAG_SYNTHETIC.to_string(), "true".to_string());
            reading
        })
        .collect()
}
