//! Background jobs

pub mod drift;

pub use drift::{drift_task, emit_once, DriftEmitterConfig, DriftMetrics};
