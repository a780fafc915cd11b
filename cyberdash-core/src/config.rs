//! Generator configuration

use crate::{CoreError, CoreResult, Timestamp, RISK_CEILING};
use chrono::{TimeZone, Utc};
use serde::{Deserialize, Serialize};

/// Inclusive bounds on the number of alerts generated per agent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct AlertRange {
    pub min: u32,
    pub max: u32,
}

impl AlertRange {
    /// Largest number of alerts a single agent may carry.
    pub const MAX_ALERTS: u32 = 1_000;

    pub fn new(min: u32, max: u32) -> CoreResult<Self> {
        let range = Self { min, max };
        range.validate()?;
        Ok(range)
    }

    pub fn validate(&self) -> CoreResult<()> {
        if self.min > self.max {
            return Err(CoreError::invalid_argument(
                "alert_range",
                format!("min ({}) must not exceed max ({})", self.min, self.max),
            ));
        }
        if self.max > Self::MAX_ALERTS {
            return Err(CoreError::invalid_argument(
                "alert_range",
                format!("max ({}) must be at most {}", self.max, Self::MAX_ALERTS),
            ));
        }
        Ok(())
    }
}

impl Default for AlertRange {
    fn default() -> Self {
        Self { min: 0, max: 5 }
    }
}

/// Everything the seeded generator needs to produce a roster.
///
/// Two configs that compare equal always produce identical rosters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct GeneratorConfig {
    pub count: usize,
    pub seed: i64,
    pub alert_range: AlertRange,
    /// Inclusive lower bound of generated risk
    pub risk_min: u8,
    /// Inclusive upper bound of generated risk
    pub risk_max: u8,
    pub skills_min: usize,
    pub skills_max: usize,
    /// Instant timestamps are offset backwards from
    #[cfg_attr(feature = "openapi", schema(value_type = String, format = "date-time"))]
    pub anchor: Timestamp,
    /// Id assigned to the first generated agent
    pub first_id: u32,
}

impl GeneratorConfig {
    pub const DEFAULT_COUNT: usize = 200;
    pub const DEFAULT_SEED: i64 = 1337;
    pub const DEFAULT_RISK_MIN: u8 = 5;
    pub const DEFAULT_RISK_MAX: u8 = 95;
    pub const DEFAULT_SKILLS_MIN: usize = 3;
    pub const DEFAULT_SKILLS_MAX: usize = 6;
    /// Upper limit on either skill bound. Bounds above the vocabulary size
    /// are accepted and sampled down to it.
    pub const MAX_SKILLS_BOUND: usize = 64;

    /// Fixed default anchor, 2025-01-01T00:00:00Z.
    pub fn default_anchor() -> Timestamp {
        Utc.timestamp_opt(1_735_689_600, 0)
            .single()
            .unwrap_or_default()
    }

    pub fn new(count: usize, seed: i64, alert_range: AlertRange) -> Self {
        Self {
            count,
            seed,
            alert_range,
            ..Self::default()
        }
    }

    pub fn with_anchor(mut self, anchor: Timestamp) -> Self {
        self.anchor = anchor;
        self
    }

    pub fn with_first_id(mut self, first_id: u32) -> Self {
        self.first_id = first_id;
        self
    }

    /// Check every bound before any draws happen.
    pub fn validate(&self) -> CoreResult<()> {
        if self.count == 0 {
            return Err(CoreError::invalid_argument(
                "count",
                "count must be greater than 0",
            ));
        }

        self.alert_range.validate()?;

        if self.risk_max > RISK_CEILING {
            return Err(CoreError::invalid_argument(
                "risk_max",
                format!("risk_max must be at most {}", RISK_CEILING),
            ));
        }
        if self.risk_min > self.risk_max {
            return Err(CoreError::invalid_argument(
                "risk_min",
                format!(
                    "risk_min ({}) must not exceed risk_max ({})",
                    self.risk_min, self.risk_max
                ),
            ));
        }

        if self.skills_max > Self::MAX_SKILLS_BOUND {
            return Err(CoreError::invalid_argument(
                "skills_max",
                format!("skills_max must be at most {}", Self::MAX_SKILLS_BOUND),
            ));
        }
        if self.skills_min > self.skills_max {
            return Err(CoreError::invalid_argument(
                "skills_min",
                format!(
                    "skills_min ({}) must not exceed skills_max ({})",
                    self.skills_min, self.skills_max
                ),
            ));
        }

        if self.first_id == 0 {
            return Err(CoreError::invalid_argument(
                "first_id",
                "ids are 1-based",
            ));
        }

        if u32::try_from(self.count)
            .ok()
            .and_then(|c| self.first_id.checked_add(c - 1))
            .is_none()
        {
            return Err(CoreError::invalid_argument(
                "count",
                "id range overflows u32",
            ));
        }

        Ok(())
    }
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            count: Self::DEFAULT_COUNT,
            seed: Self::DEFAULT_SEED,
            alert_range: AlertRange::default(),
            risk_min: Self::DEFAULT_RISK_MIN,
            risk_max: Self::DEFAULT_RISK_MAX,
            skills_min: Self::DEFAULT_SKILLS_MIN,
            skills_max: Self::DEFAULT_SKILLS_MAX,
            anchor: Self::default_anchor(),
            first_id: 1,
        }
    }
}
