use crate::application::dashboard_service::ForecastSettings;
use crate::application::fallback_orchestrator::Coordinates;
use crate::application::forecast_resolver::ResolveMode;
use crate::application::transport::{Credential, Endpoint, EndpointTable, Method};
use crate::domain::fetch::SourceId;
use anyhow::{Context, bail};
use chrono::FixedOffset;
use serde::Deserialize;
use std::fmt;
use std::time::Duration;

/// A credential value that never shows up in logs.
#[derive(Deserialize, Clone, PartialEq, Eq)]
#[serde(transparent)]
pub struct Secret(String);

impl Secret {
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Secret(***)")
    }
}

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct DashboardConfig {
    pub server: ServerSettings,
    pub location: LocationSettings,
    pub backend: BackendSettings,
    pub public_history: PublicHistorySettings,
    pub forecast: ForecastConfig,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ServerSettings {
    pub bind: String,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            bind: "0.0.0.0:8080".to_string(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct LocationSettings {
    pub latitude: f64,
    pub longitude: f64,
}

impl Default for LocationSettings {
    fn default() -> Self {
        Self {
            latitude: 46.5369,
            longitude: 6.5848,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct BackendSettings {
    pub base_url: String,
    /// Sent as a header to the indoor and AQI endpoints
    pub shared_secret: Option<Secret>,
    pub live_timeout_secs: u64,
    pub bulk_timeout_secs: u64,
    pub paths: EndpointPaths,
}

impl Default for BackendSettings {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000".to_string(),
            shared_secret: None,
            live_timeout_secs: 5,
            bulk_timeout_secs: 30,
            paths: EndpointPaths::default(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct EndpointPaths {
    pub current_outdoor: String,
    pub forecast_outdoor: String,
    pub current_indoor: String,
    pub indoor_history: String,
    pub outdoor_history: String,
    pub air_quality: String,
}

impl Default for EndpointPaths {
    fn default() -> Self {
        Self {
            current_outdoor: "/get-current-outdoor-weather".to_string(),
            forecast_outdoor: "/get-forecast-outdoor-weather".to_string(),
            current_indoor: "/get_indoor_weather_json".to_string(),
            indoor_history: "/get-historical-indoor-weather".to_string(),
            outdoor_history: "/get-historical-outdoor-weather".to_string(),
            air_quality: "/compute-aqi".to_string(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct PublicHistorySettings {
    pub base_url: String,
    pub api_key: Option<Secret>,
    pub timeout_secs: u64,
}

impl Default for PublicHistorySettings {
    fn default() -> Self {
        Self {
            base_url: "https://history.openweathermap.org/data/2.5/history/city".to_string(),
            api_key: None,
            timeout_secs: 10,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ForecastConfig {
    pub days_ahead: u32,
    pub slot_hour: f64,
    /// `exact_slot` or `nearest`
    pub mode: String,
    pub upcoming_entries: usize,
    /// Timezone basis for forecast day boundaries
    pub utc_offset_minutes: i32,
}

impl Default for ForecastConfig {
    fn default() -> Self {
        Self {
            days_ahead: 4,
            slot_hour: 12.0,
            mode: "exact_slot".to_string(),
            upcoming_entries: 4,
            utc_offset_minutes: 0,
        }
    }
}

/// Load `config/dashboard.*` (optional) overlaid with `DASHBOARD__*` environment variables.
pub fn load_dashboard_config() -> anyhow::Result<DashboardConfig> {
    let settings = config::Config::builder()
        .add_source(config::File::with_name("config/dashboard").required(false))
        .add_source(
            config::Environment::with_prefix("DASHBOARD")
                .separator("__")
                .try_parsing(true),
        )
        .build()
        .context("Failed to read dashboard configuration")?;

    Ok(settings.try_deserialize()?)
}

impl DashboardConfig {
    pub fn coordinates(&self) -> Coordinates {
        Coordinates {
            latitude: self.location.latitude,
            longitude: self.location.longitude,
        }
    }

    pub fn endpoint_table(&self) -> EndpointTable {
        let backend = &self.backend;
        let live = Duration::from_secs(backend.live_timeout_secs);
        let bulk = Duration::from_secs(backend.bulk_timeout_secs);
        let secret = match &backend.shared_secret {
            Some(secret) => Credential::SharedSecret(secret.expose().to_string()),
            None => Credential::None,
        };
        let public_key = match &self.public_history.api_key {
            Some(key) => Credential::ApiKeyParam {
                param: "appid".to_string(),
                value: key.expose().to_string(),
            },
            None => Credential::None,
        };

        let internal = |source, path: &str, method, timeout, credential| Endpoint {
            source,
            url: join_url(&backend.base_url, path),
            method,
            timeout,
            credential,
        };

        EndpointTable::new([
            internal(
                SourceId::CurrentOutdoor,
                &backend.paths.current_outdoor,
                Method::Get,
                live,
                Credential::None,
            ),
            internal(
                SourceId::ForecastOutdoor,
                &backend.paths.forecast_outdoor,
                Method::Get,
                live,
                Credential::None,
            ),
            internal(
                SourceId::CurrentIndoor,
                &backend.paths.current_indoor,
                Method::Get,
                live,
                secret.clone(),
            ),
            internal(
                SourceId::IndoorHistory,
                &backend.paths.indoor_history,
                Method::Get,
                bulk,
                secret.clone(),
            ),
            internal(
                SourceId::OutdoorHistoryInternal,
                &backend.paths.outdoor_history,
                Method::Get,
                bulk,
                Credential::None,
            ),
            internal(
                SourceId::AirQualityBatch,
                &backend.paths.air_quality,
                Method::Post,
                live,
                secret,
            ),
            Endpoint {
                source: SourceId::OutdoorHistoryPublic,
                url: self.public_history.base_url.clone(),
                method: Method::Get,
                timeout: Duration::from_secs(self.public_history.timeout_secs),
                credential: public_key,
            },
        ])
    }

    pub fn forecast_settings(&self) -> anyhow::Result<ForecastSettings> {
        let forecast = &self.forecast;
        let mode = match forecast.mode.as_str() {
            "exact_slot" => ResolveMode::ExactSlot,
            "nearest" => ResolveMode::Nearest,
            other => bail!("Unknown forecast mode '{}'", other),
        };
        if !(0.0..24.0).contains(&forecast.slot_hour) {
            bail!("forecast.slot_hour must be within [0, 24), got {}", forecast.slot_hour);
        }
        Ok(ForecastSettings {
            days_ahead: forecast.days_ahead,
            slot_hour: forecast.slot_hour,
            mode,
            upcoming_entries: forecast.upcoming_entries,
        })
    }

    pub fn forecast_basis(&self) -> anyhow::Result<FixedOffset> {
        FixedOffset::east_opt(self.forecast.utc_offset_minutes * 60).with_context(|| {
            format!(
                "forecast.utc_offset_minutes out of range: {}",
                self.forecast.utc_offset_minutes
            )
        })
    }
}

fn join_url(base: &str, path: &str) -> String {
    format!(
        "{}/{}",
        base.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}
