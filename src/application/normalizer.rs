// Unit & schema normalizer - raw payloads into canonical readings
use crate::application::schema::{
    SourceProfile, TAG_WEATHER_CATEGORY, TAG_WEATHER_ICON, TemperatureUnit,
};
use crate::domain::fetch::EngineError;
use crate::domain::forecast::ForecastEntry;
use crate::domain::gauge::AirQualityAssessment;
use crate::domain::metric::CanonicalMetric;
use crate::domain::reading::Reading;
use chrono::{DateTime, NaiveDateTime, Utc};
use serde_json::{Map, Value};

const KELVIN_OFFSET: f64 = 273.15;

/// Keys probed for a record's timestamp, in priority order.
const TIMESTAMP_KEYS: [&str; 4] = ["timestamp", "dt", "dt_txt", "time"];

/// ISO 8601 with a `+hhmm` offset, which RFC 3339 parsing rejects.
const OFFSET_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%z", "%Y-%m-%dT%H:%M:%S%.f%z"];

const NAIVE_FORMATS: [&str; 3] = [
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
];

pub fn kelvin_to_celsius(kelvin: f64) -> f64 {
    kelvin - KELVIN_OFFSET
}

/// Normalize one raw payload into readings sorted ascending by timestamp.
///
/// Accepts a flat record, a `{status, data}` envelope, a `{data}` wrapper, a
/// `{list: [...]}` collection or a bare array. Envelopes whose status is not
/// `success` yield nothing. Unknown keys are dropped and records without a
/// parseable timestamp are skipped. Duplicate timestamps are kept.
pub fn normalize(raw: &Value, profile: &SourceProfile) -> Vec<Reading> {
    let mut readings: Vec<Reading> = records(raw, Some(profile))
        .into_iter()
        .filter_map(|record| to_reading(record, profile))
        .collect();

    // Stable sort keeps duplicate timestamps in payload order
    readings.sort_by_key(|r| r.timestamp);
    readings
}

/// Forecast entries derived from normalized readings, so unit rules apply identically.
pub fn normalize_forecast(raw: &Value, profile: &SourceProfile) -> Vec<ForecastEntry> {
    normalize(raw, profile)
        .into_iter()
        .map(|reading| ForecastEntry {
            timestamp: reading.timestamp,
            temperature: reading.value(CanonicalMetric::Temperature),
            weather_icon: reading.tag(TAG_WEATHER_ICON).map(str::to_string),
            weather_category: reading.tag(TAG_WEATHER_CATEGORY).map(str::to_string),
        })
        .collect()
}

/// The status of a `{status, data}` envelope that was rejected, if any.
pub fn rejected_status(raw: &Value) -> Option<String> {
    let status = raw.as_object()?.get("status")?;
    match status.as_str() {
        Some("success") => None,
        Some(other) => Some(other.to_string()),
        None => Some(status.to_string()),
    }
}

/// Parse the batch air-quality response: parallel `{index, label, description}` rows.
pub fn parse_air_quality(raw: &Value) -> Result<Vec<AirQualityAssessment>, EngineError> {
    if let Some(status) = rejected_status(raw) {
        return Err(EngineError::SchemaMismatch(format!(
            "air quality status={}",
            status
        )));
    }

    let rows = match raw {
        Value::Array(rows) => rows,
        Value::Object(obj) => match obj.get("data") {
            Some(Value::Array(rows)) => rows,
            _ => {
                return Err(EngineError::SchemaMismatch(
                    "air quality response is not a list".to_string(),
                ));
            }
        },
        _ => {
            return Err(EngineError::SchemaMismatch(
                "air quality response is not a list".to_string(),
            ));
        }
    };

    rows.iter()
        .map(|row| {
            let index = row.get("index").and_then(numeric).ok_or_else(|| {
                EngineError::SchemaMismatch("air quality row without numeric index".to_string())
            })?;
            let text = |key: &str| {
                row.get(key)
                    .and_then(Value::as_str)
                    .unwrap_or_default()
                    .to_string()
            };
            Ok(AirQualityAssessment {
                index,
                label: text("label"),
                description: text("description"),
            })
        })
        .collect()
}

/// Epoch seconds, RFC 3339 strings (offset applied, then dropped) and naive
/// `YYYY-MM-DD HH:MM:SS` strings (taken as UTC).
pub fn parse_timestamp(value: &Value) -> Option<DateTime<Utc>> {
    match value {
        Value::Number(n) => {
            if let Some(secs) = n.as_i64() {
                DateTime::from_timestamp(secs, 0)
            } else {
                let secs = n.as_f64()?;
                let whole = secs.floor();
                let nanos = ((secs - whole) * 1e9) as u32;
                DateTime::from_timestamp(whole as i64, nanos)
            }
        }
        Value::String(s) => {
            let s = s.trim();
            if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
                return Some(dt.with_timezone(&Utc));
            }
            if let Some(dt) = OFFSET_FORMATS
                .iter()
                .find_map(|fmt| DateTime::parse_from_str(s, fmt).ok())
            {
                return Some(dt.with_timezone(&Utc));
            }
            if let Ok(secs) = s.parse::<i64>() {
                return DateTime::from_timestamp(secs, 0);
            }
            NAIVE_FORMATS
                .iter()
                .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
                .map(|naive| naive.and_utc())
        }
        _ => None,
    }
}

fn records<'a>(raw: &'a Value, profile: Option<&SourceProfile>) -> Vec<&'a Map<String, Value>> {
    match raw {
        Value::Array(items) => items.iter().filter_map(Value::as_object).collect(),
        Value::Object(obj) => {
            // A record already in native field names wins over any envelope reading
            if profile.is_some_and(|p| obj.keys().any(|k| p.recognises(k))) {
                return vec![obj];
            }
            if let Some(status) = obj.get("status") {
                if status.as_str() != Some("success") {
                    tracing::debug!("Dropping payload with status {}", status);
                    return Vec::new();
                }
                return obj
                    .get("data")
                    .map(|data| records(data, profile))
                    .unwrap_or_default();
            }
            if let Some(list @ Value::Array(_)) = obj.get("list") {
                return records(list, profile);
            }
            if let Some(data @ (Value::Object(_) | Value::Array(_))) = obj.get("data") {
                return records(data, profile);
            }
            vec![obj]
        }
        _ => Vec::new(),
    }
}

fn to_reading(record: &Map<String, Value>, profile: &SourceProfile) -> Option<Reading> {
    let timestamp = TIMESTAMP_KEYS
        .iter()
        .find_map(|key| record.get(*key).and_then(parse_timestamp))?;

    let mut flat = Vec::new();
    for (key, value) in record {
        flatten(key.clone(), value, &mut flat);
    }

    let mut reading = Reading::new(timestamp, profile.kind);
    for (path, value) in flat {
        if let Some(metric) = profile.metric_for(&path) {
            let mut number = numeric(value);
            if metric == CanonicalMetric::Temperature
                && profile.temperature_unit == TemperatureUnit::Kelvin
            {
                number = number.map(kelvin_to_celsius);
            }
            let slot = reading.fields.entry(metric).or_insert(None);
            if slot.is_none() {
                *slot = number;
            }
        } else if let Some(tag) = profile.tag_for(&path) {
            if let Some(text) = value.as_str() {
                reading.tags.insert(tag.to_string(), text.to_string());
            }
        }
    }

    Some(reading)
}

fn flatten<'a>(path: String, value: &'a Value, out: &mut Vec<(String, &'a Value)>) {
    match value {
        Value::Object(obj) => {
            for (key, child) in obj {
                flatten(format!("{}.{}", path, key), child, out);
            }
        }
        Value::Array(items) => {
            for (i, child) in items.iter().enumerate() {
                flatten(format!("{}.{}", path, i), child, out);
            }
        }
        _ => out.push((path, value)),
    }
}

fn numeric(value: &Value) -> Option<f64> {
    let number = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
        _ => None,
    }?;
    number.is_finite().then_some(number)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::schema::{TAG_WEATHER_DESCRIPTION, profile};
    use crate::domain::fetch::SourceId;
    use crate::domain::metric::SourceKind;
    use chrono::TimeZone;
    use serde_json::json;

    fn indoor_payload() -> Value {
        json!({
            "timestamp": "2025-03-01T10:15:00+01:00",
            "indoor_temperature": 21.4,
            "indoor_humidity": "44.5",
            "indoor_co2eq": 612,
            "indoor_motion_detected": true,
            "indoor_light_lux": null,
            "firmware": "1.2.0"
        })
    }

    #[test]
    fn test_flat_and_wrapped_shapes_agree() {
        let indoor = profile(SourceId::CurrentIndoor).unwrap();
        let flat = normalize(&indoor_payload(), indoor);
        let wrapped = normalize(&json!({"status": "success", "data": indoor_payload()}), indoor);

        assert_eq!(flat.len(), 1);
        assert_eq!(flat, wrapped);

        let reading = &flat[0];
        assert_eq!(reading.source, SourceKind::Indoor);
        assert_eq!(
            reading.timestamp,
            Utc.with_ymd_and_hms(2025, 3, 1, 9, 15, 0).unwrap()
        );
        assert_eq!(reading.value(CanonicalMetric::Temperature), Some(21.4));
        assert_eq!(reading.value(CanonicalMetric::Humidity), Some(44.5));
        assert_eq!(reading.value(CanonicalMetric::Co2), Some(612.0));
        assert_eq!(reading.value(CanonicalMetric::Motion), Some(1.0));
        assert!(reading.fields.contains_key(&CanonicalMetric::Light));
        assert_eq!(reading.value(CanonicalMetric::Light), None);
        assert_eq!(reading.fields.len(), 5);
    }

    #[test]
    fn test_non_success_status_is_empty_not_error() {
        let indoor = profile(SourceId::CurrentIndoor).unwrap();
        let raw = json!({"status": "error", "data": "invalid password"});
        assert!(normalize(&raw, indoor).is_empty());
        assert_eq!(rejected_status(&raw).as_deref(), Some("error"));
        assert_eq!(rejected_status(&indoor_payload()), None);
    }

    #[test]
    fn test_kelvin_is_converted_exactly_once() {
        let public = profile(SourceId::OutdoorHistoryPublic).unwrap();
        let raw = json!({"list": [{"dt": 1735689600, "main": {"temp": 288.15, "humidity": 70}}]});

        let first = normalize(&raw, public);
        let second = normalize(&raw, public);
        let celsius = first[0].value(CanonicalMetric::Temperature).unwrap();

        assert!((celsius - 15.0).abs() < 1e-6);
        assert_eq!(first, second);
        assert_eq!(first[0].value(CanonicalMetric::Humidity), Some(70.0));
    }

    #[test]
    fn test_celsius_sources_pass_through() {
        let forecast = profile(SourceId::ForecastOutdoor).unwrap();
        let raw = json!({"list": [{"dt_txt": "2025-06-02 12:00:00", "main": {"temp": 15.0}}]});
        let readings = normalize(&raw, forecast);
        assert_eq!(readings[0].value(CanonicalMetric::Temperature), Some(15.0));
    }

    #[test]
    fn test_output_is_sorted_and_keeps_duplicates() {
        let outdoor = profile(SourceId::OutdoorHistoryInternal).unwrap();
        let raw = json!({"status": "success", "data": [
            {"timestamp": 1700003600, "outdoor_temperature": 2.0},
            {"timestamp": 1700000000, "outdoor_temperature": 1.0},
            {"timestamp": 1700003600, "outdoor_temperature": 3.0},
            {"outdoor_temperature": 99.0}
        ]});

        let readings = normalize(&raw, outdoor);
        let temps: Vec<f64> = readings
            .iter()
            .filter_map(|r| r.value(CanonicalMetric::Temperature))
            .collect();
        assert_eq!(temps, vec![1.0, 2.0, 3.0]);
        assert!(readings.windows(2).all(|w| w[0].timestamp <= w[1].timestamp));
    }

    #[test]
    fn test_forecast_entries_carry_icon_and_category() {
        let forecast = profile(SourceId::ForecastOutdoor).unwrap();
        let raw = json!({"list": [{
            "dt_txt": "2025-06-02 12:00:00",
            "main": {"temp": 18.2},
            "weather": [{"icon": "10d", "main": "Rain", "description": "light rain"}]
        }]});

        let entries = normalize_forecast(&raw, forecast);
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].temperature, Some(18.2));
        assert_eq!(entries[0].weather_icon.as_deref(), Some("10d"));
        assert_eq!(entries[0].weather_category.as_deref(), Some("Rain"));

        let readings = normalize(&raw, forecast);
        assert_eq!(readings[0].tag(TAG_WEATHER_DESCRIPTION), Some("light rain"));
    }

    #[test]
    fn test_current_outdoor_data_wrapper() {
        let outdoor = profile(SourceId::CurrentOutdoor).unwrap();
        let raw = json!({"data": {
            "timestamp": 1735732800,
            "outdoor_temperature": 4.5,
            "outdoor_air_co": 201.9,
            "outdoor_weather_icon": "01d",
            "latitude": 46.5369
        }});

        let readings = normalize(&raw, outdoor);
        assert_eq!(readings.len(), 1);
        assert_eq!(readings[0].value(CanonicalMetric::Co2), Some(201.9));
        assert_eq!(readings[0].tag(TAG_WEATHER_ICON), Some("01d"));
    }

    #[test]
    fn test_parse_timestamp_variants() {
        let expected = Utc.with_ymd_and_hms(2025, 1, 1, 12, 0, 0).unwrap();
        assert_eq!(parse_timestamp(&json!(1735732800)), Some(expected));
        assert_eq!(parse_timestamp(&json!("2025-01-01T13:00:00+01:00")), Some(expected));
        assert_eq!(parse_timestamp(&json!("2025-01-01T13:00:00+0100")), Some(expected));
        assert_eq!(parse_timestamp(&json!("2025-01-01T11:00:00.000-0100")), Some(expected));
        assert_eq!(parse_timestamp(&json!("2025-01-01 12:00:00")), Some(expected));
        assert_eq!(parse_timestamp(&json!("1735732800")), Some(expected));
        assert_eq!(parse_timestamp(&json!("yesterday")), None);
        assert_eq!(parse_timestamp(&json!(null)), None);
    }

    #[test]
    fn test_parse_air_quality() {
        let raw = json!({"status": "success", "data": [
            {"index": 3, "label": "Moderate", "description": "Acceptable"}
        ]});
        let rows = parse_air_quality(&raw).unwrap();
        assert_eq!(rows[0].index, 3.0);
        assert_eq!(rows[0].label, "Moderate");

        assert!(matches!(
            parse_air_quality(&json!({"index": 3})),
            Err(EngineError::SchemaMismatch(_))
        ));
        assert!(matches!(
            parse_air_quality(&json!([{"label": "Good"}])),
            Err(EngineError::SchemaMismatch(_))
        ));
    }
}
