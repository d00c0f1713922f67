//! Trigger — the condition under which a rule applies to a schedule.

use chrono::TimeDelta;
use serde::{Deserialize, Serialize};

use crate::schedule::ApplicationSchedule;
use crate::time::Timestamp;

/// Timestamp arithmetic for a trigger threshold went out of range.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("trigger threshold {trigger} overflows the timestamp range")]
pub struct TriggerOverflow {
    pub trigger: String,
}

/// Describes when a rule matches a schedule snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RuleTrigger {
    /// Matches once `now` is within `days` days of the job's deadline
    /// (or past it). Never matches schedules without a deadline.
    DaysBeforeDeadline { days: u32 },
    /// Matches when the schedule has been due for at least `minutes`.
    OverdueBy { minutes: u32 },
    /// Matches once the schedule has been retried `count` times.
    RetriesAtLeast { count: u32 },
    /// Matches every schedule.
    Always,
}

impl RuleTrigger {
    /// Check whether this trigger holds for `schedule` at `now`.
    ///
    /// # Errors
    ///
    /// Returns [`TriggerOverflow`] when the threshold cannot be represented
    /// as a timestamp.
    pub fn matches(
        &self,
        schedule: &ApplicationSchedule,
        now: Timestamp,
    ) -> Result<bool, TriggerOverflow> {
        match self {
            Self::DaysBeforeDeadline { days } => {
                let Some(deadline) = schedule.deadline else {
                    return Ok(false);
                };
                let window = TimeDelta::try_days(i64::from(*days)).ok_or_else(|| self.overflow())?;
                let opens_at = deadline
                    .checked_sub_signed(window)
                    .ok_or_else(|| self.overflow())?;
                Ok(now >= opens_at)
            }
            Self::OverdueBy { minutes } => {
                let grace =
                    TimeDelta::try_minutes(i64::from(*minutes)).ok_or_else(|| self.overflow())?;
                let overdue_at = schedule
                    .scheduled_at
                    .checked_add_signed(grace)
                    .ok_or_else(|| self.overflow())?;
                Ok(now >= overdue_at)
            }
            Self::RetriesAtLeast { count } => Ok(schedule.retry_count >= *count),
            Self::Always => Ok(true),
        }
    }

    /// Whether the trigger's threshold is meaningful.
    ///
    /// `retries_at_least` with a zero count is rejected; `always` says the
    /// same thing.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        !matches!(self, Self::RetriesAtLeast { count: 0 })
    }

    fn overflow(&self) -> TriggerOverflow {
        TriggerOverflow {
            trigger: self.to_string(),
        }
    }
}

impl std::fmt::Display for RuleTrigger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DaysBeforeDeadline { days } => write!(f, "days_before_deadline({days})"),
            Self::OverdueBy { minutes } => write!(f, "overdue_by({minutes}m)"),
            Self::RetriesAtLeast { count } => write!(f, "retries_at_least({count})"),
            Self::Always => f.write_str("always"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::now;

    fn schedule_at(scheduled_at: Timestamp) -> ApplicationSchedule {
        ApplicationSchedule::builder()
            .job_reference("job-7")
            .scheduled_at(scheduled_at)
            .build()
            .unwrap()
    }

    #[test]
    fn should_match_overdue_schedule_after_grace_period() {
        let at = now();
        let schedule = schedule_at(at - TimeDelta::minutes(30));
        assert!(RuleTrigger::OverdueBy { minutes: 30 }.matches(&schedule, at).unwrap());
        assert!(!RuleTrigger::OverdueBy { minutes: 31 }.matches(&schedule, at).unwrap());
    }

    #[test]
    fn should_match_when_within_days_of_deadline() {
        let at = now();
        let mut schedule = schedule_at(at - TimeDelta::hours(1));
        schedule.deadline = Some(at + TimeDelta::days(2));

        assert!(RuleTrigger::DaysBeforeDeadline { days: 3 }.matches(&schedule, at).unwrap());
        assert!(!RuleTrigger::DaysBeforeDeadline { days: 1 }.matches(&schedule, at).unwrap());
    }

    #[test]
    fn should_not_match_deadline_trigger_without_deadline() {
        let at = now();
        let schedule = schedule_at(at);
        assert!(!RuleTrigger::DaysBeforeDeadline { days: 365 }.matches(&schedule, at).unwrap());
    }

    #[test]
    fn should_match_retries_at_least() {
        let at = now();
        let mut schedule = schedule_at(at);
        schedule.retry_count = 2;
        assert!(RuleTrigger::RetriesAtLeast { count: 2 }.matches(&schedule, at).unwrap());
        assert!(!RuleTrigger::RetriesAtLeast { count: 3 }.matches(&schedule, at).unwrap());
    }

    #[test]
    fn should_report_overflow_near_timestamp_limits() {
        let schedule = schedule_at(chrono::DateTime::<chrono::Utc>::MAX_UTC);
        let result = RuleTrigger::OverdueBy { minutes: 1 }.matches(&schedule, now());
        assert!(result.is_err());
    }

    #[test]
    fn should_reject_zero_retry_threshold() {
        assert!(!RuleTrigger::RetriesAtLeast { count: 0 }.is_valid());
        assert!(RuleTrigger::OverdueBy { minutes: 0 }.is_valid());
    }

    #[test]
    fn should_deserialize_from_tagged_json() {
        let json = serde_json::json!({"type": "overdue_by", "minutes": 15});
        let trigger: RuleTrigger = serde_json::from_value(json).unwrap();
        assert_eq!(trigger, RuleTrigger::OverdueBy { minutes: 15 });

        let always: RuleTrigger = serde_json::from_value(serde_json::json!({"type": "always"})).unwrap();
        assert_eq!(always, RuleTrigger::Always);
    }

    #[test]
    fn should_display_trigger() {
        assert_eq!(
            RuleTrigger::DaysBeforeDeadline { days: 3 }.to_string(),
            "days_before_deadline(3)"
        );
    }
}
