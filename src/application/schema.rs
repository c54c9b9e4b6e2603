// Per-source field tables - the single source of truth for native key -> canonical metric
use crate::domain::fetch::SourceId;
use crate::domain::metric::{CanonicalMetric, SourceKind};

pub const TAG_WEATHER_ICON: &str = "weather_icon";
pub const TAG_WEATHER_CATEGORY: &str = "weather_category";
pub const TAG_WEATHER_DESCRIPTION: &str = "weather_description";
pub const TAG_SYNTHETIC: &str = "synthetic";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TemperatureUnit {
    Celsius,
    Kelvin,
}

#[derive(Debug)]
pub struct SourceProfile {
    pub kind: SourceKind,
    pub fields: &'static [(&'static str, CanonicalMetric)],
    pub tags: &'static [(&'static str, &'static str)],
    pub temperature_unit: TemperatureUnit,
}

impl SourceProfile {
    pub fn metric_for(&self, key: &str) -> Option<CanonicalMetric> {
        self.fields
            .iter()
            .find(|(native, _)| *native == key)
            .map(|(_, metric)| *metric)
    }

    pub fn tag_for(&self, key: &str) -> Option<&'static str> {
        self.tags
            .iter()
            .find(|(native, _)| *native == key)
            .map(|(_, tag)| *tag)
    }

    pub fn recognises(&self, key: &str) -> bool {
        self.metric_for(key).is_some() || self.tag_for(key).is_some()
    }
}

// `outdoor_air_co` is carbon monoxide. It lives in the co2 family and is
// labelled "CO", never "CO2".
const OUTDOOR_APP_FIELDS: &[(&str, CanonicalMetric)] = &[
    ("outdoor_temperature", CanonicalMetric::Temperature),
    ("outdoor_humidity", CanonicalMetric::Humidity),
    ("outdoor_pressure", CanonicalMetric::Pressure),
    ("outdoor_air_co", CanonicalMetric::Co2),
    ("outdoor_rain_1h", CanonicalMetric::Rain),
    ("outdoor_wind_speed", CanonicalMetric::WindSpeed),
    ("outdoor_wind_deg", CanonicalMetric::WindDirection),
    ("outdoor_cloud_coverage", CanonicalMetric::CloudCoverage),
    ("outdoor_air_quality_index", CanonicalMetric::AirQualityIndex),
];

const OUTDOOR_APP_TAGS: &[(&str, &str)] = &[
    ("outdoor_weather_icon", TAG_WEATHER_ICON),
    ("outdoor_weather_category", TAG_WEATHER_CATEGORY),
    ("outdoor_weather", TAG_WEATHER_DESCRIPTION),
];

const INDOOR_FIELDS: &[(&str, CanonicalMetric)] = &[
    ("indoor_temperature", CanonicalMetric::Temperature),
    ("indoor_humidity", CanonicalMetric::Humidity),
    ("indoor_pressure", CanonicalMetric::Pressure),
    ("indoor_co2eq", CanonicalMetric::Co2),
    ("indoor_tvoc", CanonicalMetric::Tvoc),
    ("indoor_ethanol", CanonicalMetric::Ethanol),
    ("indoor_h2", CanonicalMetric::H2),
    ("indoor_light_lux", CanonicalMetric::Light),
    ("indoor_motion_detected", CanonicalMetric::Motion),
    ("indoor_air_quality_index", CanonicalMetric::AirQualityIndex),
];

/// OpenWeatherMap-style nested records (forecast list and public history).
const OWM_FIELDS: &[(&str, CanonicalMetric)] = &[
    ("main.temp", CanonicalMetric::Temperature),
    ("main.humidity", CanonicalMetric::Humidity),
    ("main.pressure", CanonicalMetric::Pressure),
    ("rain.1h", CanonicalMetric::Rain),
    ("wind.speed", CanonicalMetric::WindSpeed),
    ("wind.deg", CanonicalMetric::WindDirection),
    ("clouds.all", CanonicalMetric::CloudCoverage),
];

const OWM_TAGS: &[(&str, &str)] = &[
    ("weather.0.icon", TAG_WEATHER_ICON),
    ("weather.0.main", TAG_WEATHER_CATEGORY),
    ("weather.0.description", TAG_WEATHER_DESCRIPTION),
];

static OUTDOOR_APP: SourceProfile = SourceProfile {
    kind: SourceKind::Outdoor,
    fields: OUTDOOR_APP_FIELDS,
    tags: OUTDOOR_APP_TAGS,
    temperature_unit: TemperatureUnit::Celsius,
};

// The application backend requests the forecast in metric units.
static FORECAST: SourceProfile = SourceProfile {
    kind: SourceKind::Outdoor,
    fields: OWM_FIELDS,
    tags: OWM_TAGS,
    temperature_unit: TemperatureUnit::Celsius,
};

static PUBLIC_HISTORY: SourceProfile = SourceProfile {
    kind: SourceKind::Outdoor,
    fields: OWM_FIELDS,
    tags: OWM_TAGS,
    temperature_unit: TemperatureUnit::Kelvin,
};

static INDOOR: SourceProfile = SourceProfile {
    kind: SourceKind::Indoor,
    fields: INDOOR_FIELDS,
    tags: &[],
    temperature_unit: TemperatureUnit::Celsius,
};

/// Normalization profile for a reading source. The AQI batch endpoint has none.
pub fn profile(source: SourceId) -> Option<&'static SourceProfile> {
    match source {
        SourceId::CurrentOutdoor | SourceId::OutdoorHistoryInternal => Some(&OUTDOOR_APP),
        SourceId::ForecastOutdoor => Some(&FORECAST),
        SourceId::OutdoorHistoryPublic => Some(&PUBLIC_HISTORY),
        SourceId::CurrentIndoor | SourceId::IndoorHistory => Some(&INDOOR),
        SourceId::AirQualityBatch => None,
    }
}

/// Whether any source of `kind` reports `metric`.
pub fn supports(kind: SourceKind, metric: CanonicalMetric) -> bool {
    let tables: &[&[(&str, CanonicalMetric)]] = match kind {
        SourceKind::Outdoor => &[OUTDOOR_APP_FIELDS, OWM_FIELDS],
        SourceKind::Indoor => &[INDOOR_FIELDS],
    };
    tables
        .iter()
        .any(|table| table.iter().any(|(_, m)| *m == metric))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_each_native_key_maps_to_one_metric() {
        for table in [OUTDOOR_APP_FIELDS, INDOOR_FIELDS, OWM_FIELDS] {
            for (i, (key, _)) in table.iter().enumerate() {
                assert!(
                    table[i + 1..].iter().all(|(other, _)| other != key),
                    "duplicate native key {}",
                    key
                );
            }
        }
    }

    #[test]
    fn test_indoor_co2eq_and_outdoor_co_share_the_family() {
        let indoor = profile(SourceId::CurrentIndoor).unwrap();
        let outdoor = profile(SourceId::CurrentOutdoor).unwrap();
        assert_eq!(indoor.metric_for("indoor_co2eq"), Some(CanonicalMetric::Co2));
        assert_eq!(outdoor.metric_for("outdoor_air_co"), Some(CanonicalMetric::Co2));
        assert_eq!(indoor.metric_for("indoor_co2"), None);
    }

    #[test]
    fn test_supports_is_per_source() {
        assert!(supports(SourceKind::Indoor, CanonicalMetric::Tvoc));
        assert!(!supports(SourceKind::Outdoor, CanonicalMetric::Tvoc));
        assert!(supports(SourceKind::Outdoor, CanonicalMetric::WindSpeed));
        assert!(!supports(SourceKind::Indoor, CanonicalMetric::WindSpeed));
    }

    #[test]
    fn test_only_public_history_is_kelvin() {
        assert_eq!(
            profile(SourceId::OutdoorHistoryPublic).unwrap().temperature_unit,
            TemperatureUnit::Kelvin
        );
        assert_eq!(
            profile(SourceId::ForecastOutdoor).unwrap().temperature_unit,
            TemperatureUnit::Celsius
        );
        assert!(profile(SourceId::AirQualityBatch).is_none());
    }
}
