// Application layer - The aggregation and resolution engine
pub mod dashboard_service;
pub mod fallback_orchestrator;
pub mod forecast_resolver;
pub mod gauge_calculator;
pub mod normalizer;
pub mod schema;
pub mod source_fetcher;
pub mod transport;
pub mod view_selector;
