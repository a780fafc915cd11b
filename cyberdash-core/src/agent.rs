//! Agent and alert records

use crate::{AgentScope, Group, RiskBand, Role, Severity, Team, Timestamp};
use serde::{Deserialize, Serialize};

/// Agent identifier. Dense and 1-based within a roster.
pub type AgentId = u32;

/// Skill vocabulary, in generator sampling order.
pub const SKILLS: [&str; 15] = [
    "SIEM",
    "EDR",
    "Forensics",
    "Threat Hunting",
    "DFIR",
    "MITRE ATT&CK",
    "Sigma",
    "YARA",
    "KQL",
    "Zeek",
    "Suricata",
    "ML Anomaly",
    "Go",
    "Rust",
    "Python",
];

/// City codes an agent can be stationed at.
pub const LOCATIONS: [&str; 10] = [
    "NYC", "SFO", "LON", "BER", "AMS", "OSL", "DXB", "TOK", "SYD", "SCL",
];

/// Alert message templates.
pub const ALERT_MESSAGES: [&str; 6] = [
    "Suspicious login from new ASN",
    "EDR quarantine event",
    "Privilege escalation attempt",
    "Beaconing pattern detected",
    "Exfil volume spike",
    "New rule triggered: SIG-4212",
];

/// Highest possible risk score after drift.
pub const RISK_CEILING: u8 = 100;

/// A single alert raised against an agent in the last 24 hours.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct AgentAlert {
    /// Unique within the parent agent
    pub id: String,
    #[cfg_attr(feature = "openapi", schema(value_type = String, format = "date-time"))]
    pub ts: Timestamp,
    pub severity: Severity,
    pub message: String,
}

/// A simulated security agent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct Agent {
    pub id: AgentId,
    pub name: String,
    pub handle: String,
    pub team: Team,
    pub role: Role,
    pub group: Group,
    pub skills: Vec<String>,
    pub location: String,
    /// 0-100
    pub risk: u8,
    #[cfg_attr(feature = "openapi", schema(value_type = String, format = "date-time"))]
    pub last_active: Timestamp,
    pub alerts24h: Vec<AgentAlert>,
}

impl Agent {
    /// Display name for an id, zero-padded to three digits.
    pub fn display_name(id: AgentId) -> String {
        format!("Agent-{:03}", id)
    }

    /// Short handle for an id.
    pub fn handle_for(id: AgentId) -> String {
        format!("a{}", id)
    }

    pub fn scope(&self) -> AgentScope {
        AgentScope::from_location(&self.location)
    }

    pub fn risk_band(&self) -> RiskBand {
        RiskBand::from_risk(self.risk)
    }

    /// Highest severity among this agent's alerts, if any.
    pub fn max_severity(&self) -> Option<Severity> {
        self.alerts24h.iter().map(|a| a.severity).max()
    }

    /// Lowercased haystack used by free-text search.
    pub fn search_text(&self) -> String {
        format!(
            "{} {} {} {} {}",
            self.name,
            self.team,
            self.role,
            self.group,
            self.skills.join(" ")
        )
        .to_lowercase()
    }
}
