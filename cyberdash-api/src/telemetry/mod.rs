//! CyberDash Telemetry - Observability Infrastructure
//!
//! Structured logging setup and per-request instrumentation for the API layer.

pub mod middleware;
pub mod tracer;

pub use middleware::{normalize_path, observability_middleware};
pub use tracer::{init_tracer, shutdown_tracer, TelemetryConfig};
