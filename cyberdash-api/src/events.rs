//! Live Alert Broadcasting
//!
//! Fan-out of [`AlertEvent`]s to any number of subscribers over a tokio
//! broadcast channel. Slow subscribers lag and lose events; departed ones
//! simply drop their receiver.

use cyberdash_core::AlertEvent;
use tokio::sync::broadcast;
use tracing::debug;

/// Alert hub shared across the application.
#[derive(Clone)]
pub struct AlertHub {
    tx: broadcast::Sender<AlertEvent>,
}

impl AlertHub {
    /// Create a hub buffering up to `capacity` events per subscriber.
    pub fn new(capacity: usize) -> Self {
        let (tx, _rx) = broadcast::channel(capacity.max(1));
        Self { tx }
    }

    /// Publish an event to every current subscriber.
    ///
    /// Returns the number of subscribers reached.
    pub fn broadcast(&self, event: AlertEvent) -> usize {
        match self.tx.send(event) {
            Ok(receivers) => {
                debug!(
                    agent_id = event.agent_id,
                    delta = event.delta,
                    receivers,
                    "Broadcast alert event"
                );
                receivers
            }
            Err(_) => {
                debug!(agent_id = event.agent_id, "No receivers for alert event");
                0
            }
        }
    }

    /// Subscribe to all future events.
    pub fn subscribe(&self) -> broadcast::Receiver<AlertEvent> {
        self.tx.subscribe()
    }

    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl std::fmt::Debug for AlertHub {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AlertHub")
            .field("subscribers", &self.subscriber_count())
            .finish()
    }
}
