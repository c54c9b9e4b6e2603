// Main entry point - Dependency injection and server setup
mod domain;
mod application;
mod infrastructure;
mod presentation;

use std::{net::SocketAddr, sync::Arc};
use anyhow::Context;
use axum::{routing::get, Router};
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use crate::application::dashboard_service::DashboardService;
use crate::application::fallback_orchestrator::FallbackOrchestrator;
use crate::application::forecast_resolver::ForecastResolver;
use crate::application::source_fetcher::SourceFetcher;
use crate::infrastructure::config::load_dashboard_config;
use crate::infrastructure::http_transport::ReqwestTransport;
use crate::presentation::app_state::AppState;
use crate::presentation::handlers::{get_dashboard, get_selection, health_check, update_selection};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    // Load configuration
    let config = load_dashboard_config()?;
    if config.backend.shared_secret.is_none() {
        tracing::warn!("No backend shared secret configured; indoor and AQI requests will be rejected upstream");
    }
    if config.public_history.api_key.is_none() {
        tracing::warn!("No public history API key configured; outdoor history has no second source");
    }

    // Transport and engine (infrastructure + application layers)
    let transport = Arc::new(ReqwestTransport::new()?);
    let orchestrator = FallbackOrchestrator::new(
        SourceFetcher::new(transport),
        config.endpoint_table(),
        config.coordinates(),
    );
    let dashboard_service = DashboardService::new(
        Arc::new(orchestrator),
        ForecastResolver::new(config.forecast_basis()?),
        config.forecast_settings()?,
    );

    // Create application state
    let state = Arc::new(AppState::new(dashboard_service));

    // Build router (presentation layer)
    let router = Router::new()
        .route("/healthz", get(health_check))
        .route("/dashboard", get(get_dashboard))
        .route("/selection", get(get_selection).post(update_selection))
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    // Start server
    let addr: SocketAddr = config
        .server
        .bind
        .parse()
        .with_context(|| format!("Invalid bind address '{}'", config.server.bind))?;
    tracing::info!("Starting weather-dashboard service on {}", addr);

    axum::serve(tokio::net::TcpListener::bind(addr).await?, router).await?;

    Ok(())
}
