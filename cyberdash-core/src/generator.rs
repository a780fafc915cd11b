//! Seeded roster generator
//!
//! Pure function of its [`GeneratorConfig`]: no wall clock, no platform
//! entropy, no I/O. The draw order below is fixed; changing it changes every
//! roster ever generated from a given seed.

use crate::{
    Agent, AgentAlert, AgentId, AlertRange, CoreResult, GeneratorConfig, Group, Mulberry32, Role,
    Severity, Team, ALERT_MESSAGES, LOCATIONS, SKILLS,
};
use chrono::Duration;
use std::collections::HashSet;

const HOUR_MS: u64 = 60 * 60 * 1000;
const LAST_ACTIVE_WINDOW_MS: u64 = 72 * HOUR_MS;
const ALERT_WINDOW_MS: u64 = 24 * HOUR_MS;
const ALERT_ID_SPACE: u64 = 1_000_000_000;

/// Generate `count` agents from `seed` with the default anchor and bounds.
pub fn generate(count: usize, seed: i64, alert_range: AlertRange) -> CoreResult<Vec<Agent>> {
    generate_with(&GeneratorConfig::new(count, seed, alert_range))
}

/// Generate a roster from a full configuration.
pub fn generate_with(config: &GeneratorConfig) -> CoreResult<Vec<Agent>> {
    config.validate()?;

    let mut rng = Mulberry32::new(config.seed);
    let mut agents = Vec::with_capacity(config.count);
    for offset in 0..config.count {
        // validate() guarantees the id range fits
        let id = config.first_id + offset as u32;
        agents.push(generate_agent(&mut rng, config, id));
    }
    Ok(agents)
}

fn generate_agent(rng: &mut Mulberry32, config: &GeneratorConfig, id: AgentId) -> Agent {
    let team = *rng.pick(&Team::ALL);
    let role = *rng.pick(&Role::ALL);
    let group = *rng.pick(&Group::ALL);
    let risk = rng.range_inclusive(u64::from(config.risk_min), u64::from(config.risk_max)) as u8;
    let last_active = config.anchor - millis(rng.below(LAST_ACTIVE_WINDOW_MS));
    let skills = sample_skills(rng, config.skills_min, config.skills_max);
    let location = rng.pick(&LOCATIONS).to_string();

    let alert_count = rng.range_inclusive(
        u64::from(config.alert_range.min),
        u64::from(config.alert_range.max),
    );
    let mut alerts24h = Vec::with_capacity(alert_count as usize);
    let mut seen = HashSet::with_capacity(alert_count as usize);
    for index in 0..alert_count {
        let mut alert = generate_alert(rng, config, id);
        if !seen.insert(alert.id.clone()) {
            alert.id = format!("{}-{}", alert.id, index);
            seen.insert(alert.id.clone());
        }
        alerts24h.push(alert);
    }

    Agent {
        id,
        name: Agent::display_name(id),
        handle: Agent::handle_for(id),
        team,
        role,
        group,
        skills,
        location,
        risk,
        last_active,
        alerts24h,
    }
}

fn generate_alert(rng: &mut Mulberry32, config: &GeneratorConfig, agent_id: AgentId) -> AgentAlert {
    let severity = draw_severity(rng);
    let ts = config.anchor - millis(rng.below(ALERT_WINDOW_MS));
    let id = format!("{}-{}", agent_id, rng.below(ALERT_ID_SPACE));
    let message = rng.pick(&ALERT_MESSAGES).to_string();
    AgentAlert {
        id,
        ts,
        severity,
        message,
    }
}

/// Each comparison consumes its own draw.
fn draw_severity(rng: &mut Mulberry32) -> Severity {
    if rng.next_f64() < 0.05 {
        Severity::Critical
    } else if rng.next_f64() < 0.25 {
        Severity::High
    } else if rng.next_f64() < 0.65 {
        Severity::Medium
    } else {
        Severity::Low
    }
}

/// Sample without replacement from a shrinking copy of the vocabulary.
fn sample_skills(rng: &mut Mulberry32, min: usize, max: usize) -> Vec<String> {
    let wanted = rng.range_inclusive(min as u64, max as u64) as usize;
    let take = wanted.min(SKILLS.len());

    let mut pool: Vec<&str> = SKILLS.to_vec();
    let mut picked = Vec::with_capacity(take);
    for _ in 0..take {
        let idx = (rng.below(pool.len() as u64) as usize).min(pool.len() - 1);
        picked.push(pool.remove(idx).to_string());
    }
    picked
}

fn millis(ms: u64) -> Duration {
    Duration::milliseconds(ms as i64)
}
