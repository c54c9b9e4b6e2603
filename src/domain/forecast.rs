// Forecast domain model
use chrono::{DateTime, NaiveDate, Utc};

const ICON_BASE_URL: &str = "http://openweathermap.org/img/wn";

#[derive(Debug, Clone, PartialEq)]
pub struct ForecastEntry {
    pub timestamp: DateTime<Utc>,
    pub temperature: Option<f64>,
    pub weather_icon: Option<String>,
    pub weather_category: Option<String>,
}

impl ForecastEntry {
    pub fn icon_url(&self) -> Option<String> {
        self.weather_icon.as_deref().map(icon_url)
    }
}

pub fn icon_url(icon: &str) -> String {
    format!("{}/{}@2x.png", ICON_BASE_URL, icon)
}

/// One day of the multi-day outlook; `entry` is `None` when no sample qualified.
#[derive(Debug, Clone, PartialEq)]
pub struct DailyForecast {
    pub date: NaiveDate,
    pub entry: Option<ForecastEntry>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_icon_url() {
        let entry = ForecastEntry {
            timestamp: Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap(),
            temperature: Some(21.5),
            weather_icon: Some("04d".to_string()),
            weather_category: Some("Clouds".to_string()),
        };
        assert_eq!(
            entry.icon_url().as_deref(),
            Some("http://openweathermap.org/img/wn/04d@2x.png")
        );
    }
}
