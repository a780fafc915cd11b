//! REST API Routes Module
//!
//! Includes:
//! - Agent roster routes under /api/agents
//! - Chat completion at /api/chat
//! - Live alert stream (SSE) at /api/alerts
//! - Health check endpoints (Kubernetes-compatible)
//! - OpenAPI document at /openapi.json
//! - CORS support for browser-based clients

pub mod agents;
pub mod alerts;
pub mod chat;
pub mod health;

use std::time::Duration;

use axum::{
    http::{header, HeaderValue, Method},
    middleware::from_fn,
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::config::ApiConfig;
use crate::state::AppState;
use crate::telemetry::observability_middleware;

pub use agents::create_router as agents_router;
pub use alerts::create_router as alerts_router;
pub use chat::create_router as chat_router;
pub use health::create_router as health_router;

// ============================================================================
// OPENAPI ENDPOINT
// ============================================================================

/// Handler for /openapi.json endpoint.
#[cfg(feature = "openapi")]
async fn openapi_json() -> impl axum::response::IntoResponse {
    use utoipa::OpenApi;
    axum::Json(crate::openapi::ApiDoc::openapi())
}

// ============================================================================
// CORS LAYER
// ============================================================================

/// Build the CORS layer from ApiConfig.
///
/// With no configured origins every origin is allowed.
fn build_cors_layer(config: &ApiConfig) -> CorsLayer {
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::DELETE, Method::OPTIONS])
        .max_age(Duration::from_secs(config.cors_max_age_secs));

    if config.cors_origins.is_empty() {
        tracing::info!("CORS: allowing all origins");
        cors.allow_origin(Any).allow_headers(Any)
    } else {
        tracing::info!(origins = ?config.cors_origins, "CORS: restricting origins");
        let origins: Vec<HeaderValue> = config
            .cors_origins
            .iter()
            .filter_map(|o| o.parse().ok())
            .collect();
        cors.allow_origin(origins)
            .allow_headers([header::CONTENT_TYPE, header::ACCEPT])
    }
}

// ============================================================================
// ROUTER
// ============================================================================

/// Create the complete API router.
///
/// # Middleware Order (outer to inner)
/// 1. CORS - handles preflight requests
/// 2. TraceLayer - tower-http request spans
/// 3. Observability - normalized-path request logging
pub fn create_api_router(state: AppState, config: &ApiConfig) -> Router {
    let api_routes = Router::new()
        .nest("/agents", agents::create_router())
        .nest("/chat", chat::create_router())
        .nest("/alerts", alerts::create_router());

    #[allow(unused_mut)]
    let mut router = Router::new()
        .nest("/api", api_routes)
        .nest("/health", health::create_router());

    #[cfg(feature = "openapi")]
    {
        router = router.route("/openapi.json", axum::routing::get(openapi_json));
    }

    router
        .with_state(state)
        .layer(from_fn(observability_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(build_cors_layer(config))
}
