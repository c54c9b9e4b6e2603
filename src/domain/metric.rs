// Canonical metric vocabulary and source kinds

/// Which side of the window a reading was taken on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SourceKind {
    Outdoor,
    Indoor,
}

impl SourceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SourceKind::Outdoor => "outdoor",
            SourceKind::Indoor => "indoor",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "outdoor" => Some(SourceKind::Outdoor),
            "indoor" => Some(SourceKind::Indoor),
            _ => None,
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            SourceKind::Outdoor => "Outdoor",
            SourceKind::Indoor => "Indoor",
        }
    }
}

/// The fixed set of physical quantities tracked across all sources.
///
/// Indoor CO₂-equivalent and outdoor carbon monoxide both land in [`CanonicalMetric::Co2`]
/// (the "co2 family"), but they are different gases. Series are only ever compared
/// within one [`SourceKind`], and [`CanonicalMetric::label`] names the gas per source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum CanonicalMetric {
    Temperature,
    Humidity,
    Pressure,
    Co2,
    Rain,
    WindSpeed,
    WindDirection,
    CloudCoverage,
    AirQualityIndex,
    Tvoc,
    Ethanol,
    H2,
    Light,
    Motion,
}

impl CanonicalMetric {
    pub const ALL: [CanonicalMetric; 14] = [
        CanonicalMetric::Temperature,
        CanonicalMetric::Humidity,
        CanonicalMetric::Pressure,
        CanonicalMetric::Co2,
        CanonicalMetric::Rain,
        CanonicalMetric::WindSpeed,
        CanonicalMetric::WindDirection,
        CanonicalMetric::CloudCoverage,
        CanonicalMetric::AirQualityIndex,
        CanonicalMetric::Tvoc,
        CanonicalMetric::Ethanol,
        CanonicalMetric::H2,
        CanonicalMetric::Light,
        CanonicalMetric::Motion,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            CanonicalMetric::Temperature => "temperature",
            CanonicalMetric::Humidity => "humidity",
            CanonicalMetric::Pressure => "pressure",
            CanonicalMetric::Co2 => "co2",
            CanonicalMetric::Rain => "rain",
            CanonicalMetric::WindSpeed => "wind_speed",
            CanonicalMetric::WindDirection => "wind_direction",
            CanonicalMetric::CloudCoverage => "cloud_coverage",
            CanonicalMetric::AirQualityIndex => "air_quality_index",
            CanonicalMetric::Tvoc => "tvoc",
            CanonicalMetric::Ethanol => "ethanol",
            CanonicalMetric::H2 => "h2",
            CanonicalMetric::Light => "light",
            CanonicalMetric::Motion => "motion",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|m| m.as_str() == s)
    }

    /// Chart/tile title, naming the gas actually measured by `source`.
    pub fn label(&self, source: SourceKind) -> &'static str {
        match (self, source) {
            (CanonicalMetric::Temperature, _) => "Temperature (°C)",
            (CanonicalMetric::Humidity, _) => "Humidity (%)",
            (CanonicalMetric::Pressure, _) => "Pressure (hPa)",
            (CanonicalMetric::Co2, SourceKind::Outdoor) => "CO (ppm)",
            (CanonicalMetric::Co2, SourceKind::Indoor) => "CO₂eq (ppm)",
            (CanonicalMetric::Rain, _) => "Rain (1h mm)",
            (CanonicalMetric::WindSpeed, _) => "Wind (m/s)",
            (CanonicalMetric::WindDirection, _) => "Wind direction (°)",
            (CanonicalMetric::CloudCoverage, _) => "Clouds (%)",
            (CanonicalMetric::AirQualityIndex, _) => "AQI",
            (CanonicalMetric::Tvoc, _) => "TVOC (ppb)",
            (CanonicalMetric::Ethanol, _) => "Ethanol (ppm)",
            (CanonicalMetric::H2, _) => "H₂ (ppb)",
            (CanonicalMetric::Light, _) => "Light (lux)",
            (CanonicalMetric::Motion, _) => "Motion detected",
        }
    }
}
