//! In-memory agent roster.
//!
//! The roster is an explicit object owned by the server and shared via
//! `Arc`. It is (re)populated only through [`AgentStore::reseed`],
//! [`AgentStore::add`], [`AgentStore::scale`] and [`AgentStore::reset`].

use cyberdash_core::{
    apply_event, filter_refs, generate_with, paginate, Agent, AgentId, AgentQuery, AlertEvent,
    CoreError, CoreResult, DriftConfig, GeneratorConfig, LiveCounters, Timestamp,
};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tracing::{debug, info};

/// Most agents a single add/scale/reseed may create.
pub const MAX_BATCH: usize = 10_000;

/// Default page size when a page is requested without one.
pub const DEFAULT_PAGE_SIZE: usize = 24;

/// Paging parameters for a roster query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: usize,
    pub page_size: usize,
}

/// Result of a roster query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct AgentListing {
    pub items: Vec<Agent>,
    /// Size of the whole roster
    pub total: usize,
    /// Number of agents matching the query
    pub filtered: usize,
    pub page: usize,
    pub total_pages: usize,
}

#[derive(Debug)]
struct Roster {
    agents: Vec<Agent>,
    counters: LiveCounters,
    seed: i64,
}

/// The mock agent backend.
#[derive(Debug)]
pub struct AgentStore {
    roster: RwLock<Roster>,
    defaults: GeneratorConfig,
    drift: DriftConfig,
}

impl AgentStore {
    /// Create a store populated from `defaults`.
    pub fn seeded(defaults: GeneratorConfig, drift: DriftConfig) -> CoreResult<Self> {
        let agents = generate_with(&defaults)?;
        info!(count = agents.len(), seed = defaults.seed, "Seeded agent roster");
        Ok(Self {
            roster: RwLock::new(Roster {
                agents,
                counters: LiveCounters::new(),
                seed: defaults.seed,
            }),
            defaults,
            drift,
        })
    }

    /// Create an empty store that will generate with `defaults`.
    pub fn empty(defaults: GeneratorConfig, drift: DriftConfig) -> Self {
        Self {
            roster: RwLock::new(Roster {
                agents: Vec::new(),
                counters: LiveCounters::new(),
                seed: defaults.seed,
            }),
            defaults,
            drift,
        }
    }

    pub fn anchor(&self) -> Timestamp {
        self.defaults.anchor
    }

    pub async fn len(&self) -> usize {
        self.roster.read().await.agents.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// Copy of the whole roster.
    pub async fn snapshot(&self) -> Vec<Agent> {
        self.roster.read().await.agents.clone()
    }

    pub async fn get(&self, id: AgentId) -> Option<Agent> {
        self.roster
            .read()
            .await
            .agents
            .iter()
            .find(|a| a.id == id)
            .cloned()
    }

    /// Filter, then optionally paginate.
    ///
    /// Without paging all matches come back as a single page.
    pub async fn query(
        &self,
        query: &AgentQuery,
        paging: Option<PageRequest>,
    ) -> CoreResult<AgentListing> {
        let roster = self.roster.read().await;
        let matches = filter_refs(&roster.agents, query);
        let filtered = matches.len();

        let (items, page, total_pages) = match paging {
            Some(req) => {
                let page = paginate(&matches, req.page_size, req.page)?;
                (
                    page.items.iter().copied().cloned().collect(),
                    page.page,
                    page.total_pages,
                )
            }
            None => (matches.into_iter().cloned().collect(), 1, 1),
        };

        Ok(AgentListing {
            items,
            total: roster.agents.len(),
            filtered,
            page,
            total_pages,
        })
    }

    /// Append `n` freshly generated agents with ids continuing densely.
    ///
    /// Returns `(added, total)`.
    pub async fn add(&self, n: usize) -> CoreResult<(usize, usize)> {
        check_batch("add", n)?;
        let mut roster = self.roster.write().await;
        let added = self.append(&mut roster, n)?;
        info!(added, total = roster.agents.len(), "Added agents");
        Ok((added, roster.agents.len()))
    }

    /// Truncate or extend the roster to exactly `n` agents. Returns the total.
    pub async fn scale(&self, n: usize) -> CoreResult<usize> {
        check_batch("scale", n)?;
        let mut roster = self.roster.write().await;
        let current = roster.agents.len();
        if n < current {
            roster.agents.truncate(n);
            let keep = n as AgentId;
            roster.counters.retain(|id, _| *id <= keep);
        } else if n > current {
            self.append(&mut roster, n - current)?;
        }
        info!(from = current, to = n, "Scaled roster");
        Ok(roster.agents.len())
    }

    /// Empty the roster and live counters.
    pub async fn reset(&self) {
        let mut roster = self.roster.write().await;
        roster.agents.clear();
        roster.counters.clear();
        info!("Roster reset");
    }

    /// Replace the roster with a fresh generation. Returns the total.
    pub async fn reseed(&self, count: Option<usize>, seed: Option<i64>) -> CoreResult<usize> {
        let count = count.unwrap_or(self.defaults.count);
        check_batch("count", count)?;
        let config = GeneratorConfig {
            count,
            seed: seed.unwrap_or(self.defaults.seed),
            first_id: 1,
            ..self.defaults.clone()
        };
        let agents = generate_with(&config)?;

        let mut roster = self.roster.write().await;
        roster.agents = agents;
        roster.counters.clear();
        roster.seed = config.seed;
        info!(count, seed = config.seed, "Reseeded roster");
        Ok(roster.agents.len())
    }

    /// Apply one live alert event. Returns the agent's new risk if it exists.
    pub async fn apply(&self, event: &AlertEvent) -> Option<u8> {
        let mut roster = self.roster.write().await;
        let Roster {
            agents, counters, ..
        } = &mut *roster;
        let risk = apply_event(agents, counters, event, &self.drift);
        debug!(agent_id = event.agent_id, delta = event.delta, ?risk, "Applied alert event");
        risk
    }

    /// Draw an event against the current roster and apply it, all under one
    /// write lock. Returns `None` when the roster is empty.
    pub async fn apply_drawn(&self, agent_draw: f64, delta_draw: f64) -> Option<AlertEvent> {
        let mut roster = self.roster.write().await;
        let Roster {
            agents, counters, ..
        } = &mut *roster;
        let event = AlertEvent::from_draws(agents.len(), agent_draw, delta_draw)?;
        let risk = apply_event(agents, counters, &event, &self.drift);
        debug!(agent_id = event.agent_id, delta = event.delta, ?risk, "Applied drawn alert event");
        Some(event)
    }

    /// Live alert counters, keyed by agent id.
    pub async fn counters(&self) -> LiveCounters {
        self.roster.read().await.counters.clone()
    }

    fn append(&self, roster: &mut Roster, n: usize) -> CoreResult<usize> {
        if n == 0 {
            return Ok(0);
        }
        let first_id = u32::try_from(roster.agents.len() + 1)
            .map_err(|_| CoreError::invalid_argument("count", "id range overflows u32"))?;
        let config = GeneratorConfig {
            count: n,
            seed: roster.seed.wrapping_add(i64::from(first_id)),
            first_id,
            ..self.defaults.clone()
        };
        let fresh = generate_with(&config)?;
        let added = fresh.len();
        roster.agents.extend(fresh);
        Ok(added)
    }
}

fn check_batch(field: &str, n: usize) -> CoreResult<()> {
    if n > MAX_BATCH {
        return Err(CoreError::invalid_argument(
            field,
            format!("at most {} agents per request", MAX_BATCH),
        ));
    }
    Ok(())
}
