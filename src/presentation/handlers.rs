// HTTP request handlers
use crate::domain::metric::{CanonicalMetric, SourceKind};
use crate::domain::selection::{MAX_TIMEFRAME, SelectionEvent};
use crate::infrastructure::json_mapper::{
    DashboardDto, SelectionDto, dashboard_to_json, selection_to_json,
};
use crate::presentation::app_state::AppState;
use axum::{Json, extract::State, http::StatusCode};
use chrono::{Duration, Utc};
use serde::Deserialize;
use std::sync::Arc;

#[derive(Debug, Default, Deserialize)]
pub struct SelectionUpdate {
    pub source: Option<String>,
    pub metric: Option<String>,
    pub timeframe_hours: Option<i64>,
}

impl SelectionUpdate {
    fn events(&self) -> Result<Vec<SelectionEvent>, String> {
        let mut events = Vec::new();
        if let Some(source) = &self.source {
            let source =
                SourceKind::parse(source).ok_or_else(|| format!("unknown source '{}'", source))?;
            events.push(SelectionEvent::Source(source));
        }
        if let Some(metric) = &self.metric {
            let metric =
                CanonicalMetric::parse(metric).ok_or_else(|| format!("unknown metric '{}'", metric))?;
            events.push(SelectionEvent::Metric(metric));
        }
        if let Some(hours) = self.timeframe_hours {
            let timeframe = Duration::try_hours(hours)
                .filter(|t| *t > Duration::zero() && *t <= MAX_TIMEFRAME)
                .ok_or_else(|| {
                    format!(
                        "timeframe_hours must be between 1 and {}, got {}",
                        MAX_TIMEFRAME.num_hours(),
                        hours
                    )
                })?;
            events.push(SelectionEvent::Timeframe(timeframe));
        }
        Ok(events)
    }
}

/// Health check endpoint
pub async fn health_check() -> &'static str {
    "ok"
}

/// Refresh every source and render with the current selection
pub async fn get_dashboard(State(state): State<Arc<AppState>>) -> Json<DashboardDto> {
    let selection = *state.selection.read().await;
    let snapshot = state
        .dashboard_service
        .render(&selection, Utc::now())
        .await;
    Json(dashboard_to_json(snapshot))
}

pub async fn get_selection(State(state): State<Arc<AppState>>) -> Json<SelectionDto> {
    Json(selection_to_json(&*state.selection.read().await))
}

/// Apply a user selection change. The update is all-or-nothing: any invalid
/// field leaves the stored selection untouched.
pub async fn update_selection(
    State(state): State<Arc<AppState>>,
    Json(update): Json<SelectionUpdate>,
) -> Result<Json<SelectionDto>, (StatusCode, String)> {
    let events = update
        .events()
        .map_err(|message| (StatusCode::BAD_REQUEST, message))?;

    let mut stored = state.selection.write().await;
    let mut next = *stored;
    for event in events {
        if !next.apply(event) {
            return Err((
                StatusCode::BAD_REQUEST,
                "selection change rejected".to_string(),
            ));
        }
    }
    *stored = next;

    tracing::info!(
        "Selection changed to {} {} over {}h",
        next.source.as_str(),
        next.metric.as_str(),
        next.timeframe.num_hours()
    );
    Ok(Json(selection_to_json(&next)))
}
