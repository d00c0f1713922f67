//! Errors raised by the automation engine.
//!
//! None of these is fatal to the process: the engine logs them per schedule
//! and the scheduler logs sweep-level failures before the next tick.

use std::time::Duration;

use autoapply_domain::automation::TriggerOverflow;
use autoapply_domain::error::AutoApplyError;
use autoapply_domain::id::{RuleId, ScheduleId};

use crate::ports::SubmissionError;

/// Failure while processing due schedules.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// Another worker claimed (or cancelled) the schedule first.
    #[error("schedule {0} was claimed by another worker")]
    ClaimConflict(ScheduleId),

    #[error("submission failed")]
    SubmissionFailure(#[from] SubmissionError),

    #[error("submission did not complete within {0:?}")]
    SubmissionTimeout(Duration),

    /// The document store could not be read or written.
    #[error("store unavailable")]
    StoreUnavailable(#[source] AutoApplyError),

    #[error("rule evaluation failed")]
    RuleEvaluation(#[from] RuleEvaluationError),

    /// The schedule's state machine refused the change the engine wanted.
    #[error("schedule state rejected the change")]
    InvalidState(#[source] AutoApplyError),
}

/// A rule could not be evaluated against a schedule.
#[derive(Debug, thiserror::Error)]
#[error("rule {rule_id} could not be evaluated")]
pub struct RuleEvaluationError {
    pub rule_id: RuleId,
    #[source]
    pub source: TriggerOverflow,
}

/// Render an error and its `source()` chain as one line.
///
/// Used for the `last_error` / outcome detail strings persisted on a schedule.
pub(crate) fn describe(err: &dyn std::error::Error) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(inner) = source {
        message.push_str(": ");
        message.push_str(&inner.to_string());
        source = inner.source();
    }
    message
}
