// Mapper to convert domain models to JSON response bodies
use crate::application::forecast_resolver::outlook_label;
use crate::application::schema::{TAG_WEATHER_CATEGORY, TAG_WEATHER_DESCRIPTION, TAG_WEATHER_ICON};
use crate::domain::dashboard::{ConditionsPanel, DashboardSnapshot, ForecastPanel};
use crate::domain::fetch::{FetchResult, SourceFailure};
use crate::domain::forecast::{DailyForecast, ForecastEntry, icon_url};
use crate::domain::gauge::{AirQualityAssessment, GaugeValue};
use crate::domain::reading::Reading;
use crate::domain::selection::Selection;
use crate::domain::telemetry::{NoDataReason, SeriesView};
use chrono::FixedOffset;
use serde::Serialize;

/// Panel outcome as seen by the client. A failed panel only ever says
/// which dataset it could not get; the cause stays in the logs.
#[derive(Debug, Serialize, PartialEq)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum PanelDto<T> {
    Ok { data: T },
    Empty { message: String },
    Failed { message: String },
}

#[derive(Debug, Serialize, PartialEq)]
pub struct SelectionDto {
    pub source: &'static str,
    pub metric: &'static str,
    pub metric_label: &'static str,
    pub timeframe_hours: i64,
}

#[derive(Debug, Serialize, PartialEq)]
pub struct MetricDto {
    pub key: &'static str,
    pub label: &'static str,
    pub value: Option<f64>,
}

#[derive(Debug, Serialize, PartialEq)]
pub struct ReadingDto {
    pub timestamp: String,
    pub metrics: Vec<MetricDto>,
    pub icon_url: Option<String>,
    pub category: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Serialize, PartialEq)]
pub struct GaugeDto {
    pub value: Option<f64>,
    pub remainder: Option<f64>,
    pub display: String,
}

#[derive(Debug, Serialize, PartialEq)]
pub struct ConditionsDto {
    pub reading: PanelDto<ReadingDto>,
    pub humidity: GaugeDto,
    pub air_quality: GaugeDto,
}

#[derive(Debug, Serialize, PartialEq)]
pub struct AssessmentDto {
    pub index: f64,
    pub label: String,
    pub description: String,
}

#[derive(Debug, Serialize, PartialEq)]
pub struct DayDto {
    pub label: String,
    pub temperature: Option<f64>,
    pub icon_url: Option<String>,
    pub category: Option<String>,
}

#[derive(Debug, Serialize, PartialEq)]
pub struct UpcomingDto {
    pub time: String,
    pub temperature: Option<f64>,
    pub icon_url: Option<String>,
}

#[derive(Debug, Serialize, PartialEq)]
pub struct ForecastDto {
    pub daily: PanelDto<Vec<DayDto>>,
    pub upcoming: PanelDto<Vec<UpcomingDto>>,
}

#[derive(Debug, Serialize, PartialEq)]
pub struct PointDto {
    pub time_ms: i64,
    pub value: f64,
}

#[derive(Debug, Serialize, PartialEq)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ChartDto {
    Points {
        title: String,
        synthetic: bool,
        points: Vec<PointDto>,
    },
    NoData {
        message: String,
    },
}

#[derive(Debug, Serialize, PartialEq)]
pub struct DashboardDto {
    pub generated_at: String,
    pub selection: SelectionDto,
    pub outdoor: ConditionsDto,
    pub indoor: ConditionsDto,
    pub indoor_assessment: PanelDto<AssessmentDto>,
    pub forecast: ForecastDto,
    pub chart: ChartDto,
    pub degraded_sources: Vec<String>,
}

pub fn dashboard_to_json(snapshot: DashboardSnapshot) -> DashboardDto {
    DashboardDto {
        generated_at: snapshot.generated_at.to_rfc3339(),
        selection: selection_to_json(&snapshot.selection),
        outdoor: conditions_to_json(snapshot.outdoor),
        indoor: conditions_to_json(snapshot.indoor),
        indoor_assessment: panel(snapshot.indoor_assessment, "air quality", assessment_to_json),
        forecast: forecast_to_json(snapshot.forecast),
        chart: series_to_json(snapshot.series),
        degraded_sources: snapshot
            .failures
            .iter()
            .map(|f: &SourceFailure| f.source.as_str().to_string())
            .collect(),
    }
}

pub fn selection_to_json(selection: &Selection) -> SelectionDto {
    SelectionDto {
        source: selection.source.as_str(),
        metric: selection.metric.as_str(),
        metric_label: selection.metric.label(selection.source),
        timeframe_hours: selection.timeframe.num_hours(),
    }
}

fn panel<T, U>(result: FetchResult<T>, title: &str, map: impl FnOnce(T) -> U) -> PanelDto<U> {
    match result {
        FetchResult::Ok(value) => PanelDto::Ok { data: map(value) },
        FetchResult::Empty => PanelDto::Empty {
            message: format!("no {} data", title),
        },
        FetchResult::Failed(_) => PanelDto::Failed {
            message: format!("unable to fetch {} data", title),
        },
    }
}

fn conditions_to_json(conditions: ConditionsPanel) -> ConditionsDto {
    let title = conditions.dataset.title();
    ConditionsDto {
        reading: panel(conditions.reading, title, reading_to_json),
        humidity: gauge_to_json(conditions.humidity),
        air_quality: gauge_to_json(conditions.air_quality),
    }
}

fn reading_to_json(reading: Reading) -> ReadingDto {
    let metrics = reading
        .fields
        .iter()
        .map(|(metric, value)| MetricDto {
            key: metric.as_str(),
            label: metric.label(reading.source),
            value: *value,
        })
        .collect();

    ReadingDto {
        timestamp: reading.timestamp.to_rfc3339(),
        metrics,
        icon_url: reading.tag(TAG_WEATHER_ICON).map(icon_url),
        category: reading.tag(TAG_WEATHER_CATEGORY).map(str::to_string),
        description: reading.tag(TAG_WEATHER_DESCRIPTION).map(str::to_string),
    }
}

fn gauge_to_json(gauge: GaugeValue) -> GaugeDto {
    let display = match gauge {
        GaugeValue::Humidity(value) => format!("{:.0}%", value),
        GaugeValue::AirQualityIndex(index) => format!("{}/6", index),
        GaugeValue::Unavailable => "N/A".to_string(),
    };
    let pair = gauge.display_pair();
    GaugeDto {
        value: pair.map(|(value, _)| value),
        remainder: pair.map(|(_, remainder)| remainder),
        display,
    }
}

fn assessment_to_json(assessment: AirQualityAssessment) -> AssessmentDto {
    AssessmentDto {
        index: assessment.index,
        label: assessment.label,
        description: assessment.description,
    }
}

fn forecast_to_json(forecast: ForecastPanel) -> ForecastDto {
    let basis = forecast.basis;
    ForecastDto {
        daily: panel(forecast.daily, "forecast", |days| {
            days.into_iter().map(day_to_json).collect()
        }),
        upcoming: panel(forecast.upcoming, "forecast", |entries| {
            entries
                .into_iter()
                .map(|entry| upcoming_to_json(entry, &basis))
                .collect()
        }),
    }
}

fn day_to_json(day: DailyForecast) -> DayDto {
    let label = outlook_label(day.date);
    match day.entry {
        Some(entry) => DayDto {
            label,
            temperature: entry.temperature,
            icon_url: entry.icon_url(),
            category: entry.weather_category,
        },
        None => DayDto {
            label,
            temperature: None,
            icon_url: None,
            category: None,
        },
    }
}

/// `Jun 11 03:00` in the outlook's timezone basis.
fn upcoming_to_json(entry: ForecastEntry, basis: &FixedOffset) -> UpcomingDto {
    UpcomingDto {
        time: entry
            .timestamp
            .with_timezone(basis)
            .format("%b %d %H:%M")
            .to_string(),
        temperature: entry.temperature,
        icon_url: entry.icon_url(),
    }
}

fn series_to_json(series: SeriesView) -> ChartDto {
    match series {
        SeriesView::Points {
            title,
            synthetic,
            points,
            ..
        } => ChartDto::Points {
            title,
            synthetic,
            points: points
                .iter()
                .map(|p| PointDto {
                    time_ms: p.time_ms(),
                    value: p.value,
                })
                .collect(),
        },
        SeriesView::NoData {
            source,
            metric,
            reason,
        } => {
            let message = match reason {
                NoDataReason::EmptyWindow => {
                    format!("no {} data in the selected timeframe", source.as_str())
                }
                NoDataReason::UnsupportedMetric => format!(
                    "{} is not reported by {} sensors",
                    metric.label(source),
                    source.as_str()
                ),
                NoDataReason::DatasetUnavailable => {
                    format!("unable to fetch {} history data", source.as_str())
                }
            };
            ChartDto::NoData { message }
        }
    }
}
