//! Agent REST API Routes
//!
//! Query, inspect and reshape the in-memory roster.

use axum::{
    extract::{Path, Query, State},
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use cyberdash_core::{Agent, AgentId, AgentQuery, LiveCounters};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::{
    error::{ApiError, ApiResult},
    state::AppState,
    store::{AgentListing, AgentStore, PageRequest, DEFAULT_PAGE_SIZE, MAX_BATCH},
};

/// Message returned when a mutation body carries neither `add` nor `scale`.
pub const MUTATION_HINT: &str = "Specify { add: n } or { scale: n }";

// ============================================================================
// REQUEST / RESPONSE TYPES
// ============================================================================

/// Query string of `GET /api/agents`.
#[derive(Debug, Clone, Default, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::IntoParams))]
pub struct ListAgentsParams {
    /// Free-text search
    #[serde(alias = "text")]
    pub q: Option<String>,
    pub team: Option<String>,
    pub role: Option<String>,
    pub group: Option<String>,
    /// `local` or `international`
    pub scope: Option<String>,
    /// 1-based page; omit to get every match
    pub page: Option<usize>,
    pub page_size: Option<usize>,
}

impl ListAgentsParams {
    pub fn query(&self) -> AgentQuery {
        AgentQuery {
            text: self.q.clone(),
            team: self.team.clone(),
            role: self.role.clone(),
            group: self.group.clone(),
            scope: self.scope.clone(),
        }
    }

    pub fn paging(&self) -> Option<PageRequest> {
        self.page.map(|page| PageRequest {
            page,
            page_size: self.page_size.unwrap_or(DEFAULT_PAGE_SIZE),
        })
    }
}

/// Result of a roster mutation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct RosterChange {
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub added: Option<usize>,
    pub total: usize,
}

impl RosterChange {
    fn total(total: usize) -> Self {
        Self {
            ok: true,
            added: None,
            total,
        }
    }
}

/// Body of `POST /api/agents`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct MutateAgentsRequest {
    /// Append this many agents
    pub add: Option<f64>,
    /// Truncate or extend the roster to exactly this many agents
    pub scale: Option<f64>,
}

/// A validated roster mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RosterMutation {
    Add(usize),
    Scale(usize),
}

impl RosterMutation {
    /// `add` wins over `scale`; both must be positive numbers, fractional
    /// parts are dropped.
    pub fn from_request(req: &MutateAgentsRequest) -> Option<Self> {
        if let Some(n) = positive_count(req.add) {
            return Some(Self::Add(n));
        }
        positive_count(req.scale).map(Self::Scale)
    }
}

fn positive_count(value: Option<f64>) -> Option<usize> {
    let n = value?;
    if !n.is_finite() || n <= 0.0 {
        return None;
    }
    // Saturate past the batch cap so the store rejects it.
    Some(n.floor().min((MAX_BATCH + 1) as f64) as usize)
}

/// Body of `POST /api/agents/reseed`.
#[derive(Debug, Clone, Default, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct ReseedRequest {
    pub count: Option<usize>,
    pub seed: Option<i64>,
}

// ============================================================================
// ROUTE HANDLERS
// ============================================================================

/// GET /api/agents - Filter and optionally paginate the roster
#[cfg_attr(feature = "openapi", utoipa::path(
    get,
    path = "/api/agents",
    tag = "Agents",
    params(ListAgentsParams),
    responses(
        (status = 200, description = "Matching agents", body = AgentListing),
        (status = 400, description = "Invalid page request", body = ApiError),
    ),
))]
pub async fn list_agents(
    State(store): State<Arc<AgentStore>>,
    Query(params): Query<ListAgentsParams>,
) -> ApiResult<Json<AgentListing>> {
    let listing = store.query(&params.query(), params.paging()).await?;
    Ok(Json(listing))
}

/// GET /api/agents/:id - Fetch one agent
#[cfg_attr(feature = "openapi", utoipa::path(
    get,
    path = "/api/agents/{id}",
    tag = "Agents",
    params(("id" = u32, Path, description = "Agent id")),
    responses(
        (status = 200, description = "Agent details", body = Agent),
        (status = 404, description = "Agent not found", body = ApiError),
    ),
))]
pub async fn get_agent(
    State(store): State<Arc<AgentStore>>,
    Path(id): Path<AgentId>,
) -> ApiResult<Json<Agent>> {
    store
        .get(id)
        .await
        .map(Json)
        .ok_or_else(|| ApiError::agent_not_found(id))
}

/// POST /api/agents - Append agents or scale the roster
#[cfg_attr(feature = "openapi", utoipa::path(
    post,
    path = "/api/agents",
    tag = "Agents",
    request_body = MutateAgentsRequest,
    responses(
        (status = 200, description = "Roster changed", body = RosterChange),
        (status = 400, description = "Neither add nor scale given", body = ApiError),
    ),
))]
pub async fn mutate_agents(
    State(store): State<Arc<AgentStore>>,
    body: Option<Json<MutateAgentsRequest>>,
) -> ApiResult<Json<RosterChange>> {
    let mutation = body
        .and_then(|Json(req)| RosterMutation::from_request(&req))
        .ok_or_else(|| ApiError::invalid_input(MUTATION_HINT))?;

    let change = match mutation {
        RosterMutation::Add(n) => {
            let (added, total) = store.add(n).await?;
            RosterChange {
                ok: true,
                added: Some(added),
                total,
            }
        }
        RosterMutation::Scale(n) => RosterChange::total(store.scale(n).await?),
    };
    Ok(Json(change))
}

/// DELETE /api/agents - Empty the roster
#[cfg_attr(feature = "openapi", utoipa::path(
    delete,
    path = "/api/agents",
    tag = "Agents",
    responses(
        (status = 200, description = "Roster emptied", body = RosterChange),
    ),
))]
pub async fn reset_agents(State(store): State<Arc<AgentStore>>) -> impl IntoResponse {
    store.reset().await;
    Json(RosterChange::total(0))
}

/// POST /api/agents/reseed - Regenerate the roster
#[cfg_attr(feature = "openapi", utoipa::path(
    post,
    path = "/api/agents/reseed",
    tag = "Agents",
    request_body = ReseedRequest,
    responses(
        (status = 200, description = "Roster regenerated", body = RosterChange),
        (status = 400, description = "Invalid count", body = ApiError),
    ),
))]
pub async fn reseed_agents(
    State(store): State<Arc<AgentStore>>,
    body: Option<Json<ReseedRequest>>,
) -> ApiResult<Json<RosterChange>> {
    let req = body.map(|Json(req)| req).unwrap_or_default();
    let total = store.reseed(req.count, req.seed).await?;
    Ok(Json(RosterChange::total(total)))
}

/// GET /api/agents/live - Live alert counters by agent id
#[cfg_attr(feature = "openapi", utoipa::path(
    get,
    path = "/api/agents/live",
    tag = "Agents",
    responses(
        (status = 200, description = "Counters keyed by agent id", body = std::collections::BTreeMap<String, u32>),
    ),
))]
pub async fn live_counters(State(store): State<Arc<AgentStore>>) -> Json<LiveCounters> {
    Json(store.counters().await)
}

// ============================================================================
// ROUTER
// ============================================================================

/// Create the agent routes router.
pub fn create_router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_agents).post(mutate_agents).delete(reset_agents))
        .route("/live", get(live_counters))
        .route("/reseed", post(reseed_agents))
        .route("/:id", get(get_agent))
}
