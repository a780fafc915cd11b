//! CyberDash Test Utilities
//!
//! Centralized test infrastructure for the CyberDash workspace:
//! - Proptest generators for roster and chat types
//! - Mock chat provider re-export
//! - Test fixtures for common scenarios
//! - Custom assertions for roster invariants

// Re-export the mock chat provider from its source crate
pub use cyberdash_llm::MockChatProvider;

// Re-export core types for convenience
pub use cyberdash_core::{
    generate, generate_with, Agent, AgentAlert, AgentId, AgentQuery, AlertEvent, AlertRange,
    ChatLog, ChatMessage, ChatRole, ChatTurn, CoreError, CoreResult, Group, GeneratorConfig,
    Role, Severity, Team, Timestamp, SKILLS,
};

use chrono::{TimeZone, Utc};

// ============================================================================
// PROPTEST GENERATORS
// ============================================================================

pub mod generators {
    //! Proptest strategies for generating CyberDash types.

    use super::*;
    use proptest::prelude::*;

    /// Generate any generator seed, including negatives.
    pub fn arb_seed() -> impl Strategy<Value = i64> {
        any::<i64>()
    }

    /// Generate a valid alert range with `max <= 8`.
    pub fn arb_alert_range() -> impl Strategy<Value = AlertRange> {
        (0u32..=8)
            .prop_flat_map(|min| (Just(min), min..=8))
            .prop_map(|(min, max)| AlertRange { min, max })
    }

    /// Generate a timestamp within 2024-2026.
    pub fn arb_timestamp() -> impl Strategy<Value = Timestamp> {
        (1_704_067_200i64..1_767_225_600i64)
            .prop_map(|secs| Utc.timestamp_opt(secs, 0).single().unwrap_or_default())
    }

    /// Generate a single generated agent.
    pub fn arb_agent() -> impl Strategy<Value = Agent> {
        (arb_seed(), arb_alert_range()).prop_map(|(seed, range)| {
            generate(1, seed, range)
                .ok()
                .and_then(|mut agents| agents.pop())
                .unwrap_or_else(|| fixtures::sample_agent(1))
        })
    }

    /// Generate a query mixing real field values, the `All` sentinel, and
    /// free text drawn from the skill vocabulary.
    pub fn arb_agent_query() -> impl Strategy<Value = AgentQuery> {
        let field = |values: Vec<&'static str>| {
            prop_oneof![
                Just(None),
                Just(Some("All".to_string())),
                proptest::sample::select(values).prop_map(|v| Some(v.to_string())),
            ]
        };
        let text = prop_oneof![
            Just(None),
            proptest::sample::select(SKILLS.to_vec()).prop_map(|s| Some(s.to_lowercase())),
            "[a-z0-9 ]{0,4}".prop_map(Some),
        ];
        (
            text,
            field(Team::ALL.iter().map(|t| t.as_str()).collect()),
            field(Role::ALL.iter().map(|r| r.as_str()).collect()),
            field(Group::ALL.iter().map(|g| g.as_str()).collect()),
            field(vec!["local", "international"]),
        )
            .prop_map(|(text, team, role, group, scope)| AgentQuery {
                text,
                team,
                role,
                group,
                scope,
            })
    }

    /// Generate a live alert event for a roster of `len` agents.
    pub fn arb_alert_event(len: u32) -> impl Strategy<Value = AlertEvent> {
        (1..=len.max(1), prop_oneof![Just(-1i8), Just(1i8)])
            .prop_map(|(agent_id, delta)| AlertEvent { agent_id, delta })
    }

    /// Generate a ChatRole variant.
    pub fn arb_chat_role() -> impl Strategy<Value = ChatRole> {
        prop_oneof![
            Just(ChatRole::User),
            Just(ChatRole::Assistant),
            Just(ChatRole::System),
        ]
    }

    /// Generate a chat message with printable text.
    pub fn arb_chat_message() -> impl Strategy<Value = ChatMessage> {
        (arb_chat_role(), "[ -~]{0,40}", arb_timestamp())
            .prop_map(|(role, text, ts)| ChatMessage::new(role, text, ts))
    }

    /// Generate a chat log of up to `max` messages.
    pub fn arb_chat_log(max: usize) -> impl Strategy<Value = ChatLog> {
        prop::collection::vec(arb_chat_message(), 0..=max).prop_map(ChatLog::from_messages)
    }
}

// ============================================================================
// TEST FIXTURES
// ============================================================================

pub mod fixtures {
    //! Pre-built values for common test scenarios.

    use super::*;

    /// The fixed instant tests use as "now".
    pub fn fixed_now() -> Timestamp {
        GeneratorConfig::default_anchor()
    }

    /// The dashboard's default roster: 24 agents, seed 1337.
    pub fn default_roster() -> Vec<Agent> {
        roster(24, 1337)
    }

    /// A roster generated with the default alert range.
    pub fn roster(count: usize, seed: i64) -> Vec<Agent> {
        generate(count, seed, AlertRange::default()).unwrap_or_default()
    }

    /// A hand-built agent with predictable fields.
    pub fn sample_agent(id: AgentId) -> Agent {
        Agent {
            id,
            name: Agent::display_name(id),
            handle: Agent::handle_for(id),
            team: Team::RedTeam,
            role: Role::Analyst,
            group: Group::G1,
            skills: vec!["SIEM".to_string(), "Rust".to_string(), "YARA".to_string()],
            location: "NYC".to_string(),
            risk: 50,
            last_active: fixed_now(),
            alerts24h: vec![AgentAlert {
                id: format!("{}-1", id),
                ts: fixed_now(),
                severity: Severity::High,
                message: "EDR quarantine event".to_string(),
            }],
        }
    }

    /// A log holding a system notice followed by a user message.
    pub fn system_then_user(user_text: &str) -> ChatLog {
        ChatLog::from_messages(vec![
            ChatMessage::new(ChatRole::System, "Welcome to CyberDash", fixed_now()),
            ChatMessage::new(ChatRole::User, user_text, fixed_now()),
        ])
    }

    /// A short user/assistant exchange.
    pub fn conversation() -> ChatLog {
        ChatLog::from_messages(vec![
            ChatMessage::new(ChatRole::User, "Who is on Red Team?", fixed_now()),
            ChatMessage::new(ChatRole::Assistant, "Six agents.", fixed_now()),
        ])
    }
}

// ============================================================================
// CUSTOM ASSERTIONS
// ============================================================================

pub mod assertions {
    //! Assertion helpers for roster invariants.

    use super::*;

    /// Assert that a CoreResult is an InvalidArgument error for `field`.
    #[track_caller]
    pub fn assert_invalid_argument<T: std::fmt::Debug>(result: &CoreResult<T>, field: &str) {
        match result {
            Err(CoreError::InvalidArgument { field: f, .. }) => {
                assert_eq!(f, field, "Wrong field in InvalidArgument error");
            }
            other => panic!("Expected InvalidArgument({}), got: {:?}", field, other),
        }
    }

    /// Assert ids run `first, first + 1, ...` with no gaps.
    #[track_caller]
    pub fn assert_dense_ids(agents: &[Agent], first: AgentId) {
        for (offset, agent) in agents.iter().enumerate() {
            assert_eq!(
                agent.id,
                first + offset as AgentId,
                "Id gap at position {}",
                offset
            );
        }
    }

    /// Assert an agent satisfies the generator's output contract.
    #[track_caller]
    pub fn assert_agent_valid(agent: &Agent, config: &GeneratorConfig) {
        assert!(
            (config.risk_min..=config.risk_max).contains(&agent.risk),
            "Risk {} outside [{}, {}]",
            agent.risk,
            config.risk_min,
            config.risk_max
        );
        let max_skills = config.skills_max.min(SKILLS.len());
        assert!(
            (config.skills_min.min(max_skills)..=max_skills).contains(&agent.skills.len()),
            "Skill count {} out of range",
            agent.skills.len()
        );
        let mut unique = agent.skills.clone();
        unique.sort();
        unique.dedup();
        assert_eq!(unique.len(), agent.skills.len(), "Duplicate skills");

        let alerts = agent.alerts24h.len() as u32;
        assert!(
            (config.alert_range.min..=config.alert_range.max).contains(&alerts),
            "Alert count {} outside range",
            alerts
        );
        assert!(agent.last_active <= config.anchor, "last_active after anchor");
    }

    /// Assert every risk score is within `0..=100`.
    #[track_caller]
    pub fn assert_risk_bounded(agents: &[Agent]) {
        for agent in agents {
            assert!(agent.risk <= 100, "Agent {} risk {}", agent.id, agent.risk);
        }
    }
}
