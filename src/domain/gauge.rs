// Gauge-ready scalar values

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GaugeKind {
    Humidity,
    AirQualityIndex,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GaugeValue {
    /// Percentage in [0, 100]
    Humidity(f64),
    /// Enumerated index in [1, 6]
    AirQualityIndex(u8),
    Unavailable,
}

impl GaugeValue {
    /// `(value, remainder)` pair for donut rendering.
    pub fn display_pair(&self) -> Option<(f64, f64)> {
        match self {
            GaugeValue::Humidity(value) => Some((*value, 100.0 - value)),
            GaugeValue::AirQualityIndex(index) => {
                let index = f64::from(*index);
                Some((index, 6.0 - index))
            }
            GaugeValue::Unavailable => None,
        }
    }
}

/// One row of the batch air-quality computation response.
#[derive(Debug, Clone, PartialEq)]
pub struct AirQualityAssessment {
    pub index: f64,
    pub label: String,
    pub description: String,
}
