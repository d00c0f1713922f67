//! Action — what the engine does with a schedule once a rule selects it.

use std::fmt;

use serde::{Deserialize, Serialize};

/// The effect a matching [`AutomationRule`](super::AutomationRule) asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleAction {
    /// Submit the application through the submission collaborator.
    #[default]
    AutoSubmit,
    /// Notify the owning user; the schedule is not consumed.
    SendReminder,
    /// Give up on the schedule immediately, bypassing retries.
    Escalate,
}

impl RuleAction {
    /// Stable lowercase name used for storage and display.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::AutoSubmit => "auto_submit",
            Self::SendReminder => "send_reminder",
            Self::Escalate => "escalate",
        }
    }
}

impl fmt::Display for RuleAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown action name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown rule action: {0}")]
pub struct UnknownAction(pub String);

impl std::str::FromStr for RuleAction {
    type Err = UnknownAction;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "auto_submit" => Ok(Self::AutoSubmit),
            "send_reminder" => Ok(Self::SendReminder),
            "escalate" => Ok(Self::Escalate),
            other => Err(UnknownAction(other.to_string())),
        }
    }
}
