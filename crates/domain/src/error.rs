//! Common error types used across the workspace.
//!
//! Each layer defines its own typed errors and converts into
//! [`AutoApplyError`] via `#[from]`.

use crate::schedule::ScheduleStatus;

/// Base error shared by the domain, application and adapter layers.
#[derive(Debug, thiserror::Error)]
pub enum AutoApplyError {
    #[error("validation error")]
    Validation(#[from] ValidationError),

    #[error("not found")]
    NotFound(#[from] NotFoundError),

    #[error("invalid status transition")]
    Transition(#[from] TransitionError),

    #[error("storage error")]
    Storage(#[source] Box<dyn std::error::Error + Send + Sync>),
}

/// A domain invariant was violated while building or updating a value.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("job reference must not be empty")]
    EmptyJobReference,

    #[error("rule name must not be empty")]
    EmptyName,

    #[error("rule threshold must be greater than zero")]
    InvalidThreshold,

    #[error("deadline must not be before the scheduled submit time")]
    DeadlineBeforeSchedule,

    #[error("malformed identifier: {0}")]
    InvalidId(String),
}

/// The requested record does not exist.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{entity} {id} not found")]
pub struct NotFoundError {
    pub entity: &'static str,
    pub id: String,
}

/// A schedule status change that the state machine forbids.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("cannot move schedule from {from} to {to}")]
pub struct TransitionError {
    pub from: ScheduleStatus,
    pub to: ScheduleStatus,
}
