// Derived-metric calculator - bounded scalars for gauge display
use crate::domain::gauge::{AirQualityAssessment, GaugeKind, GaugeValue};
use crate::domain::metric::CanonicalMetric;
use crate::domain::reading::Reading;

const AQI_MIN: f64 = 1.0;
const AQI_MAX: f64 = 6.0;

pub fn compute_gauge_value(reading: &Reading, kind: GaugeKind) -> GaugeValue {
    match kind {
        GaugeKind::Humidity => humidity_gauge(reading.value(CanonicalMetric::Humidity)),
        GaugeKind::AirQualityIndex => {
            air_quality_gauge(reading.value(CanonicalMetric::AirQualityIndex))
        }
    }
}

/// Humidity is clamped into [0, 100].
pub fn humidity_gauge(value: Option<f64>) -> GaugeValue {
    match value {
        Some(v) if v.is_finite() => GaugeValue::Humidity(v.clamp(0.0, 100.0)),
        _ => GaugeValue::Unavailable,
    }
}

/// AQI must already be one of 1..=6. Anything else is unavailable: a clamped
/// index would misreport severity.
pub fn air_quality_gauge(value: Option<f64>) -> GaugeValue {
    match value {
        Some(v) if (AQI_MIN..=AQI_MAX).contains(&v) && v.fract() == 0.0 => {
            GaugeValue::AirQualityIndex(v as u8)
        }
        Some(v) => {
            tracing::debug!("AQI {} outside 1..=6, reporting unavailable", v);
            GaugeValue::Unavailable
        }
        None => GaugeValue::Unavailable,
    }
}

/// Copy of `reading` carrying the batch-computed index.
pub fn with_assessment(reading: &Reading, assessment: &AirQualityAssessment) -> Reading {
    let mut enriched = reading.clone();
    enriched
        .fields
        .insert(CanonicalMetric::AirQualityIndex, Some(assessment.index));
    enriched
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::metric::SourceKind;
    use chrono::{TimeZone, Utc};

    fn reading_with(metric: CanonicalMetric, value: f64) -> Reading {
        let ts = Utc.with_ymd_and_hms(2025, 6, 10, 12, 0, 0).unwrap();
        Reading::new(ts, SourceKind::Indoor).with_field(metric, value)
    }

    #[test]
    fn test_aqi_bounds() {
        for out_of_range in [0.0, 7.0, -1.0, 3.5] {
            assert_eq!(
                compute_gauge_value(
                    &reading_with(CanonicalMetric::AirQualityIndex, out_of_range),
                    GaugeKind::AirQualityIndex
                ),
                GaugeValue::Unavailable,
                "index {}",
                out_of_range
            );
        }
        assert_eq!(
            compute_gauge_value(
                &reading_with(CanonicalMetric::AirQualityIndex, 3.0),
                GaugeKind::AirQualityIndex
            ),
            GaugeValue::AirQualityIndex(3)
        );
        assert_eq!(
            compute_gauge_value(
                &reading_with(CanonicalMetric::Humidity, 40.0),
                GaugeKind::AirQualityIndex
            ),
            GaugeValue::Unavailable
        );
    }

    #[test]
    fn test_humidity_is_clamped() {
        let gauge = compute_gauge_value(
            &reading_with(CanonicalMetric::Humidity, 104.2),
            GaugeKind::Humidity,
        );
        assert_eq!(gauge, GaugeValue::Humidity(100.0));
        assert_eq!(gauge.display_pair(), Some((100.0, 0.0)));

        assert_eq!(humidity_gauge(Some(-3.0)), GaugeValue::Humidity(0.0));
        assert_eq!(humidity_gauge(Some(f64::NAN)), GaugeValue::Unavailable);
        assert_eq!(humidity_gauge(None), GaugeValue::Unavailable);
    }

    #[test]
    fn test_with_assessment_leaves_source_untouched() {
        let reading = reading_with(CanonicalMetric::Humidity, 40.0);
        let assessment = AirQualityAssessment {
            index: 2.0,
            label: "Good".to_string(),
            description: String::new(),
        };

        let enriched = with_assessment(&reading, &assessment);
        assert_eq!(
            compute_gauge_value(&enriched, GaugeKind::AirQualityIndex),
            GaugeValue::AirQualityIndex(2)
        );
        assert_eq!(reading.value(CanonicalMetric::AirQualityIndex), None);
    }
}
