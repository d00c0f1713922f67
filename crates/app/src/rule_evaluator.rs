//! Rule evaluator — picks the action the engine takes for a schedule.

use autoapply_domain::automation::{AutomationRule, RuleAction};
use autoapply_domain::id::RuleId;
use autoapply_domain::schedule::ApplicationSchedule;
use autoapply_domain::time::Timestamp;

use crate::error::RuleEvaluationError;

/// Action selected for a schedule and the rule that selected it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Decision {
    pub action: RuleAction,
    /// `None` when no rule matched and the default action applies.
    pub rule_id: Option<RuleId>,
}

impl Decision {
    /// The action taken when no rule matches.
    #[must_use]
    pub fn default_action() -> Self {
        Self {
            action: RuleAction::AutoSubmit,
            rule_id: None,
        }
    }
}

/// Evaluate `rules` against `schedule` at `now`.
///
/// Rules are walked in the order given; the first enabled rule owned by the
/// schedule's user whose trigger matches wins. Without a match the decision
/// is [`Decision::default_action`].
///
/// # Errors
///
/// Returns [`RuleEvaluationError`] when a trigger's threshold overflows the
/// timestamp range.
pub fn evaluate(
    schedule: &ApplicationSchedule,
    rules: &[AutomationRule],
    now: Timestamp,
) -> Result<Decision, RuleEvaluationError> {
    for rule in rules
        .iter()
        .filter(|rule| rule.enabled && rule.user_id == schedule.user_id)
    {
        let matched = rule
            .trigger
            .matches(schedule, now)
            .map_err(|source| RuleEvaluationError {
                rule_id: rule.id,
                source,
            })?;
        if matched {
            return Ok(Decision {
                action: rule.action,
                rule_id: Some(rule.id),
            });
        }
    }
    Ok(Decision::default_action())
}
