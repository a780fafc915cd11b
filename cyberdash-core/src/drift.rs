//! Live alert counters and risk drift

use crate::{Agent, AgentId, CoreError, CoreResult, RISK_CEILING};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Per-agent live alert counters, keyed by agent id.
pub type LiveCounters = BTreeMap<AgentId, u32>;

/// One tick of mock alert activity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct AlertEvent {
    pub agent_id: AgentId,
    /// Always -1 or +1
    pub delta: i8,
}

impl AlertEvent {
    pub fn new(agent_id: AgentId, delta: i8) -> CoreResult<Self> {
        if delta != 1 && delta != -1 {
            return Err(CoreError::invalid_argument(
                "delta",
                format!("delta must be -1 or +1, got {}", delta),
            ));
        }
        Ok(Self { agent_id, delta })
    }

    /// Build an event from two uniform draws in `[0, 1)`.
    ///
    /// The agent id lands in `[1, roster_len]`; the delta is `-1` when the
    /// second draw is below one half. An empty roster yields no event.
    pub fn from_draws(roster_len: usize, agent_draw: f64, delta_draw: f64) -> Option<Self> {
        if roster_len == 0 {
            return None;
        }
        let len = u32::try_from(roster_len).unwrap_or(u32::MAX);
        let offset = ((agent_draw * f64::from(len)).floor() as u32).min(len - 1);
        let delta = if delta_draw < 0.5 { -1 } else { 1 };
        Some(Self {
            agent_id: offset + 1,
            delta,
        })
    }
}

/// Tunables for how an event moves an agent's risk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DriftConfig {
    /// Risk points moved per unit of delta
    pub risk_scale: u8,
}

impl Default for DriftConfig {
    fn default() -> Self {
        Self { risk_scale: 5 }
    }
}

/// Apply a delta to a counter, never going below zero.
pub fn apply_counter(counters: &mut LiveCounters, event: &AlertEvent) -> u32 {
    let entry = counters.entry(event.agent_id).or_insert(0);
    *entry = if event.delta < 0 {
        entry.saturating_sub(event.delta.unsigned_abs().into())
    } else {
        entry.saturating_add(event.delta.unsigned_abs().into())
    };
    *entry
}

/// Shift a risk score by `delta * scale`, clamped to `[0, 100]`.
pub fn drift_risk(risk: u8, delta: i8, scale: u8) -> u8 {
    let shifted = i32::from(risk) + i32::from(delta) * i32::from(scale);
    shifted.clamp(0, i32::from(RISK_CEILING)) as u8
}

/// Apply an event to the roster and counters.
///
/// Returns the agent's new risk, or `None` when no agent has that id. Events
/// for unknown ids leave the counters untouched.
pub fn apply_event(
    agents: &mut [Agent],
    counters: &mut LiveCounters,
    event: &AlertEvent,
    config: &DriftConfig,
) -> Option<u8> {
    let agent = agents.iter_mut().find(|a| a.id == event.agent_id)?;
    agent.risk = drift_risk(agent.risk, event.delta, config.risk_scale);
    apply_counter(counters, event);
    Some(agent.risk)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{generate, AlertRange};

    #[test]
    fn test_event_rejects_bad_delta() {
        assert!(AlertEvent::new(1, 1).is_ok());
        assert!(AlertEvent::new(1, -1).is_ok());
        assert_eq!(AlertEvent::new(1, 0).unwrap_err().field(), "delta");
        assert!(AlertEvent::new(1, 2).is_err());
    }

    #[test]
    fn test_event_wire_shape() {
        let event = AlertEvent::new(12, -1).unwrap();
        let json = serde_json::to_string(&event).unwrap();
        assert_eq!(json, r#"{"agentId":12,"delta":-1}"#);
    }

    #[test]
    fn test_from_draws() {
        assert_eq!(AlertEvent::from_draws(0, 0.3, 0.3), None);
        let low = AlertEvent::from_draws(24, 0.0, 0.1).unwrap();
        assert_eq!(low, AlertEvent { agent_id: 1, delta: -1 });
        let high = AlertEvent::from_draws(24, 0.999_999, 0.9).unwrap();
        assert_eq!(high, AlertEvent { agent_id: 24, delta: 1 });
    }

    #[test]
    fn test_counter_never_negative() {
        let mut counters = LiveCounters::new();
        let down = AlertEvent::new(3, -1).unwrap();
        let up = AlertEvent::new(3, 1).unwrap();
        assert_eq!(apply_counter(&mut counters, &down), 0);
        assert_eq!(apply_counter(&mut counters, &up), 1);
        assert_eq!(apply_counter(&mut counters, &up), 2);
        assert_eq!(apply_counter(&mut counters, &down), 1);
        assert_eq!(counters.get(&3), Some(&1));
    }

    #[test]
    fn test_drift_risk_clamps() {
        assert_eq!(drift_risk(2, -1, 5), 0);
        assert_eq!(drift_risk(98, 1, 5), 100);
        assert_eq!(drift_risk(50, 1, 5), 55);
        assert_eq!(drift_risk(50, -1, 5), 45);
        assert_eq!(drift_risk(100, 1, 255), 100);
    }

    #[test]
    fn test_apply_event_updates_agent() {
        let mut agents = generate(4, 1337, AlertRange::default()).unwrap();
        let before = agents[1].risk;
        let mut counters = LiveCounters::new();
        let event = AlertEvent::new(2, 1).unwrap();
        let risk = apply_event(&mut agents, &mut counters, &event, &DriftConfig::default());
        assert_eq!(risk, Some(drift_risk(before, 1, 5)));
        assert_eq!(agents[1].risk, drift_risk(before, 1, 5));
        assert_eq!(counters.get(&2), Some(&1));
    }

    #[test]
    fn test_apply_event_unknown_agent() {
        let mut agents = generate(2, 1, AlertRange::default()).unwrap();
        let mut counters = LiveCounters::new();
        let event = AlertEvent::new(99, 1).unwrap();
        assert_eq!(
            apply_event(&mut agents, &mut counters, &event, &DriftConfig::default()),
            None
        );
        assert!(counters.is_empty());
    }
}
