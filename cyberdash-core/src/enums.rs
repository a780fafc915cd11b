//! Closed vocabularies for agent records

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// ============================================================================
// TEAM
// ============================================================================

/// Team an agent belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub enum Team {
    #[serde(rename = "Blue Team")]
    BlueTeam,
    #[serde(rename = "Red Team")]
    RedTeam,
    #[serde(rename = "Purple Team")]
    PurpleTeam,
    #[serde(rename = "Threat Intel")]
    ThreatIntel,
}

impl Team {
    /// All teams, in generator pick order.
    pub const ALL: [Team; 4] = [
        Team::BlueTeam,
        Team::RedTeam,
        Team::PurpleTeam,
        Team::ThreatIntel,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Team::BlueTeam => "Blue Team",
            Team::RedTeam => "Red Team",
            Team::PurpleTeam => "Purple Team",
            Team::ThreatIntel => "Threat Intel",
        }
    }
}

// ============================================================================
// ROLE
// ============================================================================

/// Role of an agent within its team.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub enum Role {
    Analyst,
    Hunter,
    Responder,
    Engineer,
    Data,
    Manager,
}

impl Role {
    /// All roles, in generator pick order.
    pub const ALL: [Role; 6] = [
        Role::Analyst,
        Role::Hunter,
        Role::Responder,
        Role::Engineer,
        Role::Data,
        Role::Manager,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Analyst => "Analyst",
            Role::Hunter => "Hunter",
            Role::Responder => "Responder",
            Role::Engineer => "Engineer",
            Role::Data => "Data",
            Role::Manager => "Manager",
        }
    }
}

// ============================================================================
// GROUP
// ============================================================================

/// Operational group (G1-G5).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub enum Group {
    G1,
    G2,
    G3,
    G4,
    G5,
}

impl Group {
    /// All groups, in generator pick order.
    pub const ALL: [Group; 5] = [Group::G1, Group::G2, Group::G3, Group::G4, Group::G5];

    pub fn as_str(&self) -> &'static str {
        match self {
            Group::G1 => "G1",
            Group::G2 => "G2",
            Group::G3 => "G3",
            Group::G4 => "G4",
            Group::G5 => "G5",
        }
    }
}

// ============================================================================
// SEVERITY
// ============================================================================

/// Severity of an alert. Ordered: low < medium < high < critical.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
    Critical,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Low => "low",
            Severity::Medium => "medium",
            Severity::High => "high",
            Severity::Critical => "critical",
        }
    }
}

// ============================================================================
// SCOPE
// ============================================================================

/// Operating scope of an agent, derived from its location code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "lowercase")]
pub enum AgentScope {
    Local,
    International,
}

impl AgentScope {
    /// Location codes treated as the home region.
    pub const HOME_LOCATIONS: [&'static str; 2] = ["NYC", "SFO"];

    /// Classify a location code.
    pub fn from_location(location: &str) -> Self {
        if Self::HOME_LOCATIONS.contains(&location) {
            AgentScope::Local
        } else {
            AgentScope::International
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            AgentScope::Local => "local",
            AgentScope::International => "international",
        }
    }
}

// ============================================================================
// RISK BAND
// ============================================================================

/// Display band for a risk score: `> 75` high, `> 50` medium, else low.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "lowercase")]
pub enum RiskBand {
    Low,
    Medium,
    High,
}

impl RiskBand {
    pub const HIGH_THRESHOLD: u8 = 75;
    pub const MEDIUM_THRESHOLD: u8 = 50;

    pub fn from_risk(risk: u8) -> Self {
        if risk > Self::HIGH_THRESHOLD {
            RiskBand::High
        } else if risk > Self::MEDIUM_THRESHOLD {
            RiskBand::Medium
        } else {
            RiskBand::Low
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RiskBand::Low => "low",
            RiskBand::Medium => "medium",
            RiskBand::High => "high",
        }
    }
}

// ============================================================================
// DISPLAY / FROMSTR
// ============================================================================

macro_rules! impl_str_enum {
    ($ty:ident, $name:literal) => {
        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $ty {
            type Err = String;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::ALL_VALUES
                    .iter()
                    .copied()
                    .find(|v| v.as_str().eq_ignore_ascii_case(s.trim()))
                    .ok_or_else(|| format!("Unknown {}: {}", $name, s))
            }
        }
    };
}

impl Team {
    const ALL_VALUES: &'static [Team] = &Team::ALL;
}
impl Role {
    const ALL_VALUES: &'static [Role] = &Role::ALL;
}
impl Group {
    const ALL_VALUES: &'static [Group] = &Group::ALL;
}
impl Severity {
    const ALL_VALUES: &'static [Severity] = &[
        Severity::Low,
        Severity::Medium,
        Severity::High,
        Severity::Critical,
    ];
}
impl AgentScope {
    const ALL_VALUES: &'static [AgentScope] = &[AgentScope::Local, AgentScope::International];
}
impl RiskBand {
    const ALL_VALUES: &'static [RiskBand] = &[RiskBand::Low, RiskBand::Medium, RiskBand::High];
}

impl_str_enum!(Team, "team");
impl_str_enum!(Role, "role");
impl_str_enum!(Group, "group");
impl_str_enum!(Severity, "severity");
impl_str_enum!(AgentScope, "scope");
impl_str_enum!(RiskBand, "risk band");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_severity_ordering() {
        assert!(Severity::Low < Severity::Medium);
        assert!(Severity::Medium < Severity::High);
        assert!(Severity::High < Severity::Critical);
    }

    #[test]
    fn test_team_serializes_display_name() -> Result<(), serde_json::Error> {
        let json = serde_json::to_string(&Team::RedTeam)?;
        assert_eq!(json, "\"Red Team\"");
        let back: Team = serde_json::from_str("\"Threat Intel\"")?;
        assert_eq!(back, Team::ThreatIntel);
        Ok(())
    }

    #[test]
    fn test_from_str_case_insensitive() {
        assert_eq!("purple team".parse::<Team>(), Ok(Team::PurpleTeam));
        assert_eq!("g3".parse::<Group>(), Ok(Group::G3));
        assert_eq!("HUNTER".parse::<Role>(), Ok(Role::Hunter));
        assert!("Green Team".parse::<Team>().is_err());
    }

    #[test]
    fn test_scope_from_location() {
        assert_eq!(AgentScope::from_location("NYC"), AgentScope::Local);
        assert_eq!(AgentScope::from_location("SFO"), AgentScope::Local);
        assert_eq!(AgentScope::from_location("TOK"), AgentScope::International);
    }

    #[test]
    fn test_risk_band_thresholds() {
        assert_eq!(RiskBand::from_risk(0), RiskBand::Low);
        assert_eq!(RiskBand::from_risk(50), RiskBand::Low);
        assert_eq!(RiskBand::from_risk(51), RiskBand::Medium);
        assert_eq!(RiskBand::from_risk(75), RiskBand::Medium);
        assert_eq!(RiskBand::from_risk(76), RiskBand::High);
        assert_eq!(RiskBand::from_risk(100), RiskBand::High);
    }

    #[test]
    fn test_risk_band_labels_match_serde() {
        for band in [RiskBand::Low, RiskBand::Medium, RiskBand::High] {
            let json = serde_json::to_string(&band).unwrap();
            assert_eq!(json, format!("\"{}\"", band.as_str()));
            assert_eq!(band.as_str().parse::<RiskBand>().unwrap(), band);
        }
    }
}
