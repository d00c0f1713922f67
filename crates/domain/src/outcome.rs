//! Execution outcome — the audit record of one engine attempt on a schedule.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::automation::RuleAction;
use crate::id::{OutcomeId, RuleId, ScheduleId};
use crate::time::Timestamp;

/// Result of one attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutcomeResult {
    Success,
    Failure,
    Skipped,
}

impl OutcomeResult {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Failure => "failure",
            Self::Skipped => "skipped",
        }
    }
}

impl fmt::Display for OutcomeResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown outcome result.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown outcome result: {0}")]
pub struct UnknownResult(pub String);

impl FromStr for OutcomeResult {
    type Err = UnknownResult;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "success" => Ok(Self::Success),
            "failure" => Ok(Self::Failure),
            "skipped" => Ok(Self::Skipped),
            other => Err(UnknownResult(other.to_string())),
        }
    }
}

/// Appended once per engine attempt on a claimed schedule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionOutcome {
    pub id: OutcomeId,
    pub schedule_id: ScheduleId,
    pub recorded_at: Timestamp,
    pub result: OutcomeResult,
    /// Action the engine applied (or tried to).
    pub action: RuleAction,
    /// Rule that selected the action; `None` for the default action.
    pub rule_id: Option<RuleId>,
    pub detail: String,
}

impl ExecutionOutcome {
    /// Record a new outcome stamped at `recorded_at`.
    #[must_use]
    pub fn new(
        schedule_id: ScheduleId,
        result: OutcomeResult,
        action: RuleAction,
        rule_id: Option<RuleId>,
        detail: impl Into<String>,
        recorded_at: Timestamp,
    ) -> Self {
        Self {
            id: OutcomeId::new(),
            schedule_id,
            recorded_at,
            result,
            action,
            rule_id,
            detail: detail.into(),
        }
    }
}
