// Dashboard service - Use case for rendering one dashboard snapshot
use crate::application::fallback_orchestrator::{
    DatasetOutcome, FallbackOrchestrator, RefreshCycle, RefreshRequest,
};
use crate::application::forecast_resolver::{ForecastResolver, ResolveMode};
use crate::application::gauge_calculator::{compute_gauge_value, with_assessment};
use crate::application::view_selector::{HistoryDatasets, select_series};
use crate::domain::dashboard::{ConditionsPanel, DashboardSnapshot, ForecastPanel};
use crate::domain::fetch::{EngineError, FetchResult};
use crate::domain::gauge::{GaugeKind, GaugeValue};
use crate::domain::reading::{Reading, latest};
use crate::domain::selection::Selection;
use chrono::{DateTime, Utc};
use std::sync::Arc;

#[derive(Debug, Clone, Copy)]
pub struct ForecastSettings {
    pub days_ahead: u32,
    pub slot_hour: f64,
    pub mode: ResolveMode,
    pub upcoming_entries: usize,
}

impl Default for ForecastSettings {
    fn default() -> Self {
        Self {
            days_ahead: 4,
            slot_hour: 12.0,
            mode: ResolveMode::ExactSlot,
            upcoming_entries: 4,
        }
    }
}

#[derive(Clone)]
pub struct DashboardService {
    orchestrator: Arc<FallbackOrchestrator>,
    resolver: ForecastResolver,
    forecast: ForecastSettings,
}

impl DashboardService {
    pub fn new(
        orchestrator: Arc<FallbackOrchestrator>,
        resolver: ForecastResolver,
        forecast: ForecastSettings,
    ) -> Self {
        Self {
            orchestrator,
            resolver,
            forecast,
        }
    }

    /// Refresh every dataset and render them for `selection`. Never fails:
    /// each panel carries its own outcome.
    pub async fn render(&self, selection: &Selection, now: DateTime<Utc>) -> DashboardSnapshot {
        let request = RefreshRequest {
            now,
            history_window: selection.timeframe,
        };
        let cycle = self.orchestrator.refresh(&request).await;

        let failures = cycle.failures();
        if !failures.is_empty() {
            tracing::info!("Rendered with {} degraded source(s)", failures.len());
        }

        self.build_snapshot(&cycle, selection, now)
    }

    pub fn build_snapshot(
        &self,
        cycle: &RefreshCycle,
        selection: &Selection,
        now: DateTime<Utc>,
    ) -> DashboardSnapshot {
        let outdoor_reading = latest_reading(&cycle.current_outdoor);
        let indoor_reading = match (latest_reading(&cycle.current_indoor), &cycle.air_quality) {
            (FetchResult::Ok(reading), FetchResult::Ok(assessment)) => {
                FetchResult::Ok(with_assessment(&reading, assessment))
            }
            (reading, _) => reading,
        };

        let series = select_series(
            selection,
            &HistoryDatasets {
                outdoor: (&cycle.outdoor_history).into(),
                indoor: (&cycle.indoor_history).into(),
            },
            now,
        );

        DashboardSnapshot {
            generated_at: now,
            selection: *selection,
            outdoor: conditions_panel(&cycle.current_outdoor, outdoor_reading),
            indoor: conditions_panel(&cycle.current_indoor, indoor_reading),
            indoor_assessment: cycle.air_quality.clone(),
            forecast: self.forecast_panel(&cycle.forecast, now),
            series,
            failures: cycle.failures(),
        }
    }

    fn forecast_panel(&self, outcome: &DatasetOutcome, now: DateTime<Utc>) -> ForecastPanel {
        if !outcome.is_available() {
            let cause = unavailable_cause(outcome);
            return ForecastPanel {
                basis: self.resolver.basis(),
                daily: FetchResult::Failed(cause.clone()),
                upcoming: FetchResult::Failed(cause),
            };
        }

        let entries = outcome.forecast();
        let today = self.resolver.local_date(now);
        ForecastPanel {
            basis: self.resolver.basis(),
            daily: FetchResult::Ok(self.resolver.daily_outlook(
                entries,
                today,
                self.forecast.days_ahead,
                self.forecast.slot_hour,
                self.forecast.mode,
            )),
            upcoming: FetchResult::Ok(self.resolver.next_chronological(
                entries,
                now,
                self.forecast.upcoming_entries,
            )),
        }
    }
}

fn latest_reading(outcome: &DatasetOutcome) -> FetchResult<Reading> {
    match latest(outcome.readings()) {
        Some(reading) => FetchResult::Ok(reading.clone()),
        None if outcome.failures.is_empty() => FetchResult::Empty,
        None => FetchResult::Failed(unavailable_cause(outcome)),
    }
}

fn unavailable_cause(outcome: &DatasetOutcome) -> EngineError {
    outcome.last_error().cloned().unwrap_or_else(|| {
        EngineError::EmptyResult(format!("no {} data", outcome.kind.title()))
    })
}

fn conditions_panel(outcome: &DatasetOutcome, reading: FetchResult<Reading>) -> ConditionsPanel {
    let gauge = |kind| match &reading {
        FetchResult::Ok(r) => compute_gauge_value(r, kind),
        _ => GaugeValue::Unavailable,
    };
    ConditionsPanel {
        dataset: outcome.kind,
        humidity: gauge(GaugeKind::Humidity),
        air_quality: gauge(GaugeKind::AirQualityIndex),
        reading,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::fallback_orchestrator::Coordinates;
    use crate::application::source_fetcher::SourceFetcher;
    use crate::application::source_fetcher::tests::{ScriptedTransport, endpoint};
    use crate::application::transport::EndpointTable;
    use crate::domain::fetch::SourceId;
    use crate::domain::metric::CanonicalMetric;
    use crate::domain::selection::SelectionEvent;
    use crate::domain::telemetry::SeriesView;
    use chrono::{Duration, TimeZone};
    use serde_json::json;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 10, 14, 30, 0).unwrap()
    }

    fn service(transport: ScriptedTransport) -> DashboardService {
        let endpoints = EndpointTable::new([
            endpoint(SourceId::CurrentOutdoor),
            endpoint(SourceId::ForecastOutdoor),
            endpoint(SourceId::CurrentIndoor),
            endpoint(SourceId::IndoorHistory),
            endpoint(SourceId::OutdoorHistoryInternal),
            endpoint(SourceId::OutdoorHistoryPublic),
            endpoint(SourceId::AirQualityBatch),
        ]);
        let orchestrator = FallbackOrchestrator::new(
            SourceFetcher::new(Arc::new(transport)),
            endpoints,
            Coordinates {
                latitude: 46.5369,
                longitude: 6.5848,
            },
        );
        DashboardService::new(
            Arc::new(orchestrator),
            ForecastResolver::default(),
            ForecastSettings::default(),
        )
    }

    fn forecast_payload() -> serde_json::Value {
        let list: Vec<_> = (0..40)
            .map(|i| {
                let ts = Utc.with_ymd_and_hms(2025, 6, 10, 0, 0, 0).unwrap() + Duration::hours(3 * i);
                json!({
                    "dt_txt": ts.format("%Y-%m-%d %H:%M:%S").to_string(),
                    "main": {"temp": 10.0 + i as f64},
                    "weather": [{"icon": "02d", "main": "Clouds"}]
                })
            })
            .collect();
        json!({ "list": list })
    }

    #[tokio::test]
    async fn test_render_with_everything_down_still_produces_a_snapshot() {
        let snapshot = service(ScriptedTransport::default())
            .render(&Selection::default(), now())
            .await;

        assert!(matches!(snapshot.outdoor.reading, FetchResult::Failed(_)));
        assert!(matches!(snapshot.indoor.reading, FetchResult::Failed(_)));
        assert_eq!(snapshot.outdoor.humidity, GaugeValue::Unavailable);
        assert!(matches!(snapshot.forecast.daily, FetchResult::Failed(_)));

        // Outdoor history is synthetic, so the chart still has a flagged series
        match &snapshot.series {
            SeriesView::Points { synthetic, points, .. } => {
                assert!(*synthetic);
                assert_eq!(points.len(), 24);
            }
            other => panic!("expected synthetic points, got {:?}", other),
        }
        assert!(snapshot.failures.len() >= 6);
    }

    #[tokio::test]
    async fn test_render_full_dashboard() {
        let transport = ScriptedTransport::default()
            .respond(
                SourceId::CurrentOutdoor,
                Ok(json!({"data": {
                    "timestamp": now().timestamp() - 300,
                    "outdoor_temperature": 23.1,
                    "outdoor_humidity": 48,
                    "outdoor_air_quality_index": 2
                }})),
            )
            .respond(SourceId::ForecastOutdoor, Ok(forecast_payload()))
            .respond(
                SourceId::CurrentIndoor,
                Ok(json!({"status": "success", "data": {
                    "timestamp": now().to_rfc3339(),
                    "indoor_temperature": 22.0,
                    "indoor_humidity": 41.0
                }})),
            )
            .respond(
                SourceId::AirQualityBatch,
                Ok(json!([{"index": 7, "label": "?", "description": ""}])),
            );

        let mut selection = Selection::default();
        selection.apply(SelectionEvent::Metric(CanonicalMetric::Humidity));
        let snapshot = service(transport).render(&selection, now()).await;

        assert_eq!(snapshot.selection, selection);
        assert_eq!(snapshot.outdoor.humidity, GaugeValue::Humidity(48.0));
        assert_eq!(snapshot.outdoor.air_quality, GaugeValue::AirQualityIndex(2));
        assert_eq!(snapshot.indoor.humidity, GaugeValue::Humidity(41.0));
        // Out-of-range batch index is never clamped into the gauge
        assert_eq!(snapshot.indoor.air_quality, GaugeValue::Unavailable);

        let daily = snapshot.forecast.daily.ok().unwrap();
        assert_eq!(daily.len(), 4);
        assert!(daily.iter().all(|d| d.entry.is_some()));
        assert_eq!(
            daily[0].entry.as_ref().unwrap().timestamp,
            Utc.with_ymd_and_hms(2025, 6, 11, 12, 0, 0).unwrap()
        );

        let upcoming = snapshot.forecast.upcoming.ok().unwrap();
        assert_eq!(upcoming.len(), 4);
        assert_eq!(
            upcoming[0].timestamp,
            Utc.with_ymd_and_hms(2025, 6, 10, 15, 0, 0).unwrap()
        );
    }
}
