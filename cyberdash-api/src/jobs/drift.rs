//! Mock Alert Drift Background Task
//!
//! On every tick this task picks a random agent and a random ±1 delta,
//! applies it to the roster (live counter and risk), and publishes the event
//! on the [`AlertHub`]. It runs until the shutdown signal flips to `true` or
//! its handle is dropped.

use crate::events::AlertHub;
use crate::store::AgentStore;
use cyberdash_core::AlertEvent;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::time::{interval, MissedTickBehavior};

// ============================================================================
// CONFIGURATION
// ============================================================================

#[derive(Debug, Clone)]
pub struct DriftEmitterConfig {
    /// Time between events (default: 2500 ms)
    pub tick: Duration,
    /// Fixed RNG seed; `None` draws one from the thread RNG
    pub seed: Option<u64>,
}

impl Default for DriftEmitterConfig {
    fn default() -> Self {
        Self {
            tick: Duration::from_millis(2500),
            seed: None,
        }
    }
}

// ============================================================================
// METRICS
// ============================================================================

#[derive(Debug, Default)]
pub struct DriftMetrics {
    /// Events applied and published
    pub events_emitted: AtomicU64,
    /// Ticks skipped because the roster was empty
    pub idle_ticks: AtomicU64,
}

impl DriftMetrics {
    pub fn emitted(&self) -> u64 {
        self.events_emitted.load(Ordering::Relaxed)
    }

    pub fn idle(&self) -> u64 {
        self.idle_ticks.load(Ordering::Relaxed)
    }
}

// ============================================================================
// BACKGROUND TASK
// ============================================================================

/// Run the drift emitter until shutdown.
///
/// # Example
///
/// ```ignore
/// let (shutdown_tx, shutdown_rx) = watch::channel(false);
/// let handle = tokio::spawn(drift_task(store, hub, DriftEmitterConfig::default(), shutdown_rx));
/// // ...
/// let _ = shutdown_tx.send(true);
/// let metrics = handle.await?;
/// ```
pub async fn drift_task(
    store: Arc<AgentStore>,
    hub: AlertHub,
    config: DriftEmitterConfig,
    mut shutdown_rx: watch::Receiver<bool>,
) -> Arc<DriftMetrics> {
    let metrics = Arc::new(DriftMetrics::default());
    let mut rng = match config.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_rng(&mut rand::rng()),
    };

    let mut ticker = interval(config.tick);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
    // First tick completes immediately; events start one period in.
    ticker.tick().await;

    tracing::info!(
        tick_ms = config.tick.as_millis() as u64,
        "Alert drift task started"
    );

    loop {
        tokio::select! {
            changed = shutdown_rx.changed() => {
                if changed.is_err() || *shutdown_rx.borrow() {
                    tracing::info!("Alert drift task shutting down");
                    break;
                }
            }

            _ = ticker.tick() => {
                emit_once(&store, &hub, &mut rng, &metrics).await;
            }
        }
    }

    tracing::info!(
        events_emitted = metrics.emitted(),
        idle_ticks = metrics.idle(),
        "Alert drift task completed"
    );

    metrics
}

/// One tick: draw, apply, publish.
pub async fn emit_once<R: Rng>(
    store: &AgentStore,
    hub: &AlertHub,
    rng: &mut R,
    metrics: &DriftMetrics,
) -> Option<AlertEvent> {
    let agent_draw: f64 = rng.random();
    let delta_draw: f64 = rng.random();

    let Some(event) = store.apply_drawn(agent_draw, delta_draw).await else {
        metrics.idle_ticks.fetch_add(1, Ordering::Relaxed);
        return None;
    };

    hub.broadcast(event);
    metrics.events_emitted.fetch_add(1, Ordering::Relaxed);
    Some(event)
}
