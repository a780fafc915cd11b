//! Roster filtering and free-text search

use crate::Agent;
use serde::{Deserialize, Serialize};

/// Value meaning "no constraint" for a field selector.
pub const ALL_SENTINEL: &str = "All";

/// Query over a roster. Every active predicate is ANDed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct AgentQuery {
    /// Case-insensitive substring over name, team, role, group and skills
    #[serde(default, alias = "q")]
    pub text: Option<String>,
    #[serde(default)]
    pub team: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub group: Option<String>,
    /// `local` or `international`
    #[serde(default)]
    pub scope: Option<String>,
}

impl AgentQuery {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            ..Self::default()
        }
    }

    pub fn with_team(mut self, team: impl Into<String>) -> Self {
        self.team = Some(team.into());
        self
    }

    pub fn with_role(mut self, role: impl Into<String>) -> Self {
        self.role = Some(role.into());
        self
    }

    pub fn with_group(mut self, group: impl Into<String>) -> Self {
        self.group = Some(group.into());
        self
    }

    pub fn with_scope(mut self, scope: impl Into<String>) -> Self {
        self.scope = Some(scope.into());
        self
    }

    /// True when no predicate would reject anything.
    pub fn is_empty(&self) -> bool {
        active_text(&self.text).is_none()
            && active_field(&self.team).is_none()
            && active_field(&self.role).is_none()
            && active_field(&self.group).is_none()
            && active_field(&self.scope).is_none()
    }

    /// Whether a single agent satisfies every active predicate.
    pub fn matches(&self, agent: &Agent) -> bool {
        let needle = active_text(&self.text).map(str::to_lowercase);
        self.matches_prepared(agent, needle.as_deref())
    }

    fn matches_prepared(&self, agent: &Agent, needle: Option<&str>) -> bool {
        if let Some(needle) = needle {
            if !agent.search_text().contains(needle) {
                return false;
            }
        }
        field_matches(&self.team, agent.team.as_str())
            && field_matches(&self.role, agent.role.as_str())
            && field_matches(&self.group, agent.group.as_str())
            && field_matches(&self.scope, agent.scope().as_str())
    }
}

/// Stable filter: matching agents in their original relative order.
pub fn filter(agents: &[Agent], query: &AgentQuery) -> Vec<Agent> {
    filter_refs(agents, query).into_iter().cloned().collect()
}

/// Borrowing variant of [`filter`].
pub fn filter_refs<'a>(agents: &'a [Agent], query: &AgentQuery) -> Vec<&'a Agent> {
    let needle = active_text(&query.text).map(str::to_lowercase);
    agents
        .iter()
        .filter(|agent| query.matches_prepared(agent, needle.as_deref()))
        .collect()
}

fn active_text(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|s| !s.is_empty())
}

fn active_field(value: &Option<String>) -> Option<&str> {
    value
        .as_deref()
        .filter(|s| !s.is_empty() && !s.eq_ignore_ascii_case(ALL_SENTINEL))
}

fn field_matches(selector: &Option<String>, actual: &str) -> bool {
    match active_field(selector) {
        Some(expected) => expected == actual,
        None => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{generate, AlertRange, Group, Team};

    fn roster() -> Vec<Agent> {
        generate(60, 1337, AlertRange::default()).unwrap()
    }

    #[test]
    fn test_empty_query_is_identity() {
        let agents = roster();
        assert!(AgentQuery::default().is_empty());
        assert_eq!(filter(&agents, &AgentQuery::default()), agents);
    }

    #[test]
    fn test_sentinels_impose_no_constraint() {
        let agents = roster();
        let query = AgentQuery::text("")
            .with_team("All")
            .with_role("all")
            .with_group("")
            .with_scope("ALL");
        assert!(query.is_empty());
        assert_eq!(filter(&agents, &query).len(), agents.len());
    }

    #[test]
    fn test_team_filter_preserves_order() {
        let agents = roster();
        let result = filter(&agents, &AgentQuery::default().with_team("Red Team"));
        assert!(result.iter().all(|a| a.team == Team::RedTeam));
        let expected: Vec<_> = agents
            .iter()
            .filter(|a| a.team == Team::RedTeam)
            .map(|a| a.id)
            .collect();
        let got: Vec<_> = result.iter().map(|a| a.id).collect();
        assert_eq!(got, expected);
    }

    #[test]
    fn test_text_is_case_insensitive() {
        let agents = roster();
        let upper = filter(&agents, &AgentQuery::text("AGENT-00"));
        let lower = filter(&agents, &AgentQuery::text("agent-00"));
        assert_eq!(upper, lower);
        assert_eq!(upper.len(), 9);
    }

    #[test]
    fn test_text_matches_skills() {
        let agents = roster();
        let result = filter(&agents, &AgentQuery::text("yara"));
        assert!(!result.is_empty());
        assert!(result.iter().all(|a| a.skills.iter().any(|s| s == "YARA")));
    }

    #[test]
    fn test_predicates_are_anded() {
        let agents = roster();
        let query = AgentQuery::default()
            .with_team("Blue Team")
            .with_group("G2");
        let result = filter(&agents, &query);
        assert!(result
            .iter()
            .all(|a| a.team == Team::BlueTeam && a.group == Group::G2));
    }

    #[test]
    fn test_scope_filter() {
        let agents = roster();
        let local = filter(&agents, &AgentQuery::default().with_scope("local"));
        let intl = filter(&agents, &AgentQuery::default().with_scope("international"));
        assert_eq!(local.len() + intl.len(), agents.len());
        assert!(local
            .iter()
            .all(|a| a.location == "NYC" || a.location == "SFO"));
    }

    #[test]
    fn test_unknown_field_value_matches_nothing() {
        let agents = roster();
        let result = filter(&agents, &AgentQuery::default().with_team("Green Team"));
        assert!(result.is_empty());
    }

    #[test]
    fn test_filter_refs_matches_filter() {
        let agents = roster();
        let query = AgentQuery::text("g3");
        let owned = filter(&agents, &query);
        let borrowed = filter_refs(&agents, &query);
        assert_eq!(owned.len(), borrowed.len());
        assert!(owned.iter().zip(borrowed).all(|(a, b)| a == b));
    }

    #[test]
    fn test_query_deserializes_q_alias() {
        let query: AgentQuery = serde_json::from_str(r#"{"q":"hunter"}"#).unwrap();
        assert_eq!(query.text.as_deref(), Some("hunter"));
    }
}
