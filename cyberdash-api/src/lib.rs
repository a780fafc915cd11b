//! CyberDash API - HTTP layer for the CyberDash dashboard
//!
//! Serves the seeded agent roster, relays chat conversations to the configured
//! model, and streams live alert drift over Server-Sent Events. All state is
//! in memory and owned by [`AppState`].

pub mod config;
pub mod error;
pub mod events;
pub mod jobs;
pub mod macros;
#[cfg(feature = "openapi")]
pub mod openapi;
pub mod routes;
pub mod state;
pub mod store;
pub mod telemetry;

// Re-export commonly used types
pub use config::ApiConfig;
pub use error::{ApiError, ApiResult, ErrorCode};
pub use events::AlertHub;
pub use jobs::{drift_task, DriftEmitterConfig, DriftMetrics};
#[cfg(feature = "openapi")]
pub use openapi::ApiDoc;
pub use routes::create_api_router;
pub use state::AppState;
pub use store::{AgentListing, AgentStore, PageRequest};
