//! CyberDash API Server Entry Point
//!
//! Loads configuration, seeds the roster, starts the alert drift task and
//! serves the Axum router until Ctrl-C.

use chrono::Utc;
use cyberdash_api::{
    create_api_router, drift_task, ApiConfig, ApiError, ApiResult, AppState, DriftEmitterConfig,
};
use tokio::sync::watch;

use cyberdash_api::telemetry::{init_tracer, shutdown_tracer, TelemetryConfig};

#[tokio::main]
async fn main() -> ApiResult<()> {
    let telemetry_config = TelemetryConfig::default();
    init_tracer(&telemetry_config)?;

    let mut api_config = ApiConfig::from_env()?;
    tracing::debug!(config = ?api_config, "Loaded API configuration");
    if telemetry_config.is_production() && api_config.cors_origins.is_empty() {
        tracing::warn!("CORS origins not configured in production; allowing all origins");
    }
    // Timestamps in a live roster are relative to startup.
    api_config.anchor = Some(Utc::now());

    let state = AppState::from_config(&api_config)?;

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let drift = tokio::spawn(drift_task(
        state.store.clone(),
        state.hub.clone(),
        DriftEmitterConfig {
            tick: api_config.drift_interval,
            seed: None,
        },
        shutdown_rx,
    ));

    let app = create_api_router(state, &api_config);

    let addr = api_config.bind_addr()?;
    tracing::info!(%addr, "Starting CyberDash API server");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| ApiError::internal_error(format!("Failed to bind {}: {}", addr, e)))?;

    let server = axum::serve(listener, app);
    tokio::select! {
        result = server => {
            result.map_err(|e| ApiError::internal_error(format!("Server error: {}", e)))?;
        }
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("Shutdown signal received");
        }
    }

    let _ = shutdown_tx.send(true);
    if let Err(e) = drift.await {
        tracing::warn!(error = %e, "Alert drift task did not stop cleanly");
    }

    shutdown_tracer();
    Ok(())
}
