//! OpenAPI document for the CyberDash API
//!
//! Generated with utoipa from the route annotations and the data model.

use utoipa::OpenApi;

use crate::error::{ApiError, ErrorCode};
use crate::routes::agents::{MutateAgentsRequest, ReseedRequest, RosterChange};
use crate::routes::health::{HealthDetails, HealthResponse, HealthStatus};
use crate::routes::{agents, alerts, chat, health};
use crate::store::AgentListing;

use cyberdash_core::{
    Agent, AgentAlert, AlertEvent, ChatReply, ChatRequest, ChatTurn, Group, Role, Severity, Team,
    WireRole,
};

/// OpenAPI document for the CyberDash API.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "CyberDash API",
        version = "0.1.0",
        description = "Mock agent roster, live alert stream and chat relay for the CyberDash dashboard",
        license(name = "MIT", url = "https://opensource.org/licenses/MIT")
    ),
    servers(
        (url = "http://localhost:3000", description = "Local Development")
    ),
    tags(
        (name = "Agents", description = "Seeded agent roster: query, paginate, add, scale, reset"),
        (name = "Chat", description = "Conversation relay to the configured chat model"),
        (name = "Alerts", description = "Server-Sent Events stream of live alert drift"),
        (name = "Health", description = "Liveness and readiness probes")
    ),
    paths(
        agents::list_agents,
        agents::get_agent,
        agents::mutate_agents,
        agents::reset_agents,
        agents::reseed_agents,
        agents::live_counters,
        chat::complete_chat,
        alerts::stream_alerts,
        health::ping,
        health::liveness,
        health::readiness,
    ),
    components(schemas(
        Agent,
        AgentAlert,
        Team,
        Role,
        Group,
        Severity,
        AlertEvent,
        AgentListing,
        MutateAgentsRequest,
        ReseedRequest,
        RosterChange,
        ChatTurn,
        WireRole,
        ChatRequest,
        ChatReply,
        HealthResponse,
        HealthStatus,
        HealthDetails,
        ApiError,
        ErrorCode,
    ))
)]
pub struct ApiDoc;

impl ApiDoc {
    /// Render the OpenAPI document as pretty JSON.
    pub fn to_json() -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(&Self::openapi())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_openapi_generation() {
        let openapi = ApiDoc::openapi();
        assert_eq!(openapi.info.title, "CyberDash API");
        assert_eq!(openapi.info.version, "0.1.0");
    }

    #[test]
    fn test_openapi_lists_routes() {
        let openapi = ApiDoc::openapi();
        for path in [
            "/api/agents",
            "/api/agents/{id}",
            "/api/agents/reseed",
            "/api/agents/live",
            "/api/chat",
            "/api/alerts",
            "/health/ready",
        ] {
            assert!(openapi.paths.paths.contains_key(path), "missing {}", path);
        }
    }

    #[test]
    fn test_openapi_has_schemas() {
        let json = ApiDoc::to_json().unwrap();
        assert!(json.contains("\"Agent\""));
        assert!(json.contains("\"AlertEvent\""));
        assert!(json.contains("\"ApiError\""));
    }

    #[test]
    fn test_timestamps_documented_as_date_time() {
        let doc: serde_json::Value = serde_json::from_str(&ApiDoc::to_json().unwrap()).unwrap();
        let schemas = &doc["components"]["schemas"];
        for (schema, field) in [("Agent", "lastActive"), ("AgentAlert", "ts")] {
            let property = &schemas[schema]["properties"][field];
            assert_eq!(property["type"], "string", "{}.{}", schema, field);
            assert_eq!(property["format"], "date-time", "{}.{}", schema, field);
        }
    }
}
