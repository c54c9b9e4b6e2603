// Fetch outcomes as data - nothing past the orchestrator ever sees a raised error
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum EngineError {
    /// Network failure, timeout or non-2xx status
    #[error("transport failure: {0}")]
    TransportFailure(String),

    /// Payload did not have the expected shape
    #[error("schema mismatch: {0}")]
    SchemaMismatch(String),

    /// Well-formed response that carried no data
    #[error("empty result: {0}")]
    EmptyResult(String),

    /// Input outside the range a consumer accepts
    #[error("out of range: {0}")]
    OutOfRangeInput(String),
}

#[derive(Debug, Clone, PartialEq)]
pub enum FetchResult<T> {
    Ok(T),
    Empty,
    Failed(EngineError),
}

impl<T> FetchResult<T> {
    pub fn ok(&self) -> Option<&T> {
        match self {
            FetchResult::Ok(value) => Some(value),
            _ => None,
        }
    }

    pub fn is_ok(&self) -> bool {
        matches!(self, FetchResult::Ok(_))
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> FetchResult<U> {
        match self {
            FetchResult::Ok(value) => FetchResult::Ok(f(value)),
            FetchResult::Empty => FetchResult::Empty,
            FetchResult::Failed(err) => FetchResult::Failed(err),
        }
    }

    pub fn failure(&self) -> Option<&EngineError> {
        match self {
            FetchResult::Failed(err) => Some(err),
            _ => None,
        }
    }
}

/// Every upstream endpoint the engine reads from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SourceId {
    CurrentOutdoor,
    ForecastOutdoor,
    CurrentIndoor,
    IndoorHistory,
    OutdoorHistoryInternal,
    OutdoorHistoryPublic,
    AirQualityBatch,
}

impl SourceId {
    pub fn as_str(&self) -> &'static str {
        match self {
            SourceId::CurrentOutdoor => "current_outdoor",
            SourceId::ForecastOutdoor => "forecast_outdoor",
            SourceId::CurrentIndoor => "current_indoor",
            SourceId::IndoorHistory => "indoor_history",
            SourceId::OutdoorHistoryInternal => "outdoor_history_internal",
            SourceId::OutdoorHistoryPublic => "outdoor_history_public",
            SourceId::AirQualityBatch => "air_quality_batch",
        }
    }
}

/// Logical grouping of readings shown on one panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DatasetKind {
    CurrentOutdoor,
    OutdoorForecast,
    CurrentIndoor,
    IndoorHistory,
    OutdoorHistory,
}

impl DatasetKind {
    /// Sources in priority order.
    pub fn sources(&self) -> &'static [SourceId] {
        match self {
            DatasetKind::CurrentOutdoor => &[SourceId::CurrentOutdoor],
            DatasetKind::OutdoorForecast => &[SourceId::ForecastOutdoor],
            DatasetKind::CurrentIndoor => &[SourceId::CurrentIndoor],
            DatasetKind::IndoorHistory => &[SourceId::IndoorHistory],
            DatasetKind::OutdoorHistory => &[
                SourceId::OutdoorHistoryInternal,
                SourceId::OutdoorHistoryPublic,
            ],
        }
    }

    pub fn allows_synthetic(&self) -> bool {
        matches!(self, DatasetKind::OutdoorHistory)
    }

    pub fn is_history(&self) -> bool {
        matches!(self, DatasetKind::IndoorHistory | DatasetKind::OutdoorHistory)
    }

    /// Human name used in "unable to fetch ... data" messages.
    pub fn title(&self) -> &'static str {
        match self {
            DatasetKind::CurrentOutdoor => "outdoor",
            DatasetKind::OutdoorForecast => "forecast",
            DatasetKind::CurrentIndoor => "indoor",
            DatasetKind::IndoorHistory => "indoor history",
            DatasetKind::OutdoorHistory => "outdoor history",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SourceFailure {
    pub source: SourceId,
    pub error: EngineError,
}

impl SourceFailure {
    pub fn new(source: SourceId, error: EngineError) -> Self {
        Self { source, error }
    }
}

impl std::fmt::Display for SourceFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.source.as_str(), self.error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_outdoor_history_has_a_fallback_chain() {
        assert_eq!(DatasetKind::OutdoorHistory.sources().len(), 2);
        assert_eq!(
            DatasetKind::OutdoorHistory.sources()[0],
            SourceId::OutdoorHistoryInternal
        );
        for kind in [
            DatasetKind::CurrentOutdoor,
            DatasetKind::OutdoorForecast,
            DatasetKind::CurrentIndoor,
            DatasetKind::IndoorHistory,
        ] {
            assert_eq!(kind.sources().len(), 1);
            assert!(!kind.allows_synthetic());
        }
    }

    #[test]
    fn test_fetch_result_map_keeps_failure() {
        let failed: FetchResult<u8> =
            FetchResult::Failed(EngineError::TransportFailure("timeout".to_string()));
        let mapped = failed.map(|v| v as u32 * 2);
        assert_eq!(
            mapped.failure(),
            Some(&EngineError::TransportFailure("timeout".to_string()))
        );
        assert_eq!(FetchResult::Ok(2).map(|v| v + 1), FetchResult::Ok(3));
    }

    #[test]
    fn test_source_failure_display() {
        let failure = SourceFailure::new(
            SourceId::CurrentIndoor,
            EngineError::SchemaMismatch("status=error".to_string()),
        );
        assert_eq!(
            failure.to_string(),
            "current_indoor: schema mismatch: status=error"
        );
    }
}
