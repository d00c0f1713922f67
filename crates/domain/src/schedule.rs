//! Application schedule — a due-date-stamped pending job application.
//!
//! A schedule is created by its owning user and then driven exclusively by
//! the automation engine once due. Status changes follow a small state
//! machine (see [`ScheduleStatus::can_transition_to`]).

use std::fmt;
use std::str::FromStr;

use chrono::TimeDelta;
use serde::{Deserialize, Serialize};

use crate::error::{AutoApplyError, TransitionError, ValidationError};
use crate::id::{ScheduleId, UserId};
use crate::time::Timestamp;

/// Lifecycle status of an [`ApplicationSchedule`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScheduleStatus {
    #[default]
    Pending,
    Processing,
    Submitted,
    Cancelled,
    Failed,
}

impl ScheduleStatus {
    /// Terminal statuses never change again.
    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Submitted | Self::Cancelled | Self::Failed)
    }

    /// Whether the state machine allows moving from `self` to `next`.
    ///
    /// `processing → pending` is the retry/release edge taken by the engine
    /// when an attempt does not finish the schedule.
    #[must_use]
    pub fn can_transition_to(self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::Pending, Self::Processing | Self::Cancelled)
                | (
                    Self::Processing,
                    Self::Submitted | Self::Failed | Self::Pending | Self::Cancelled
                )
        )
    }

    /// Stable lowercase name used for storage and display.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Processing => "processing",
            Self::Submitted => "submitted",
            Self::Cancelled => "cancelled",
            Self::Failed => "failed",
        }
    }
}

impl fmt::Display for ScheduleStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown status name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown schedule status: {0}")]
pub struct UnknownStatus(pub String);

impl FromStr for ScheduleStatus {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "processing" => Ok(Self::Processing),
            "submitted" => Ok(Self::Submitted),
            "cancelled" => Ok(Self::Cancelled),
            "failed" => Ok(Self::Failed),
            other => Err(UnknownStatus(other.to_string())),
        }
    }
}

/// What happened to a schedule after a failed submission attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureDisposition {
    /// Back to `pending` with a later scheduled-submit time.
    Retry,
    /// Retries exhausted; the schedule is now `failed`.
    Exhausted,
}

/// A pending job application waiting for its scheduled submit time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApplicationSchedule {
    pub id: ScheduleId,
    pub user_id: UserId,
    /// Reference to the job posting the application targets.
    pub job_reference: String,
    /// When the engine should submit the application.
    pub scheduled_at: Timestamp,
    /// Application deadline of the job posting, when known.
    pub deadline: Option<Timestamp>,
    pub status: ScheduleStatus,
    pub retry_count: u32,
    pub last_error: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl ApplicationSchedule {
    /// Create a builder for constructing an [`ApplicationSchedule`].
    #[must_use]
    pub fn builder() -> ApplicationScheduleBuilder {
        ApplicationScheduleBuilder::default()
    }

    /// Check domain invariants.
    ///
    /// # Errors
    ///
    /// Returns [`AutoApplyError::Validation`] when:
    /// - `job_reference` is blank ([`ValidationError::EmptyJobReference`])
    /// - `deadline` is before `scheduled_at` ([`ValidationError::DeadlineBeforeSchedule`])
    pub fn validate(&self) -> Result<(), AutoApplyError> {
        if self.job_reference.trim().is_empty() {
            return Err(ValidationError::EmptyJobReference.into());
        }
        if self.deadline.is_some_and(|deadline| deadline < self.scheduled_at) {
            return Err(ValidationError::DeadlineBeforeSchedule.into());
        }
        Ok(())
    }

    /// A schedule is due when it is still pending and its submit time has passed.
    #[must_use]
    pub fn is_due(&self, now: Timestamp) -> bool {
        self.status == ScheduleStatus::Pending && self.scheduled_at <= now
    }

    /// Whether the engine acted on this schedule less than `window` ago.
    ///
    /// A schedule that was never touched after creation does not count.
    #[must_use]
    pub fn touched_within(&self, now: Timestamp, window: TimeDelta) -> bool {
        self.updated_at > self.created_at && now.signed_duration_since(self.updated_at) < window
    }

    /// Move to `next`, enforcing the state machine.
    ///
    /// Does not touch `updated_at`; callers stamp it when the change is an
    /// action rather than a claim.
    ///
    /// # Errors
    ///
    /// Returns [`AutoApplyError::Transition`] if the move is not allowed.
    pub fn transition_to(&mut self, next: ScheduleStatus) -> Result<(), AutoApplyError> {
        if !self.status.can_transition_to(next) {
            return Err(TransitionError {
                from: self.status,
                to: next,
            }
            .into());
        }
        self.status = next;
        Ok(())
    }

    /// Record a successful submission.
    ///
    /// # Errors
    ///
    /// Returns [`AutoApplyError::Transition`] unless the schedule is `processing`.
    pub fn mark_submitted(&mut self, now: Timestamp) -> Result<(), AutoApplyError> {
        self.transition_to(ScheduleStatus::Submitted)?;
        self.last_error = None;
        self.updated_at = now;
        Ok(())
    }

    /// Record a failed submission attempt.
    ///
    /// While `retry_count < max_retries` the count is incremented and the
    /// schedule goes back to `pending`, due again at `now + backoff`.
    /// Otherwise it becomes `failed` and the count stays where it is.
    ///
    /// # Errors
    ///
    /// Returns [`AutoApplyError::Transition`] unless the schedule is `processing`.
    pub fn record_failure(
        &mut self,
        error: impl Into<String>,
        now: Timestamp,
        max_retries: u32,
        backoff: TimeDelta,
    ) -> Result<FailureDisposition, AutoApplyError> {
        let disposition = if self.retry_count < max_retries {
            self.transition_to(ScheduleStatus::Pending)?;
            self.retry_count += 1;
            self.scheduled_at = now
                .checked_add_signed(backoff)
                .unwrap_or(chrono::DateTime::<chrono::Utc>::MAX_UTC);
            FailureDisposition::Retry
        } else {
            self.transition_to(ScheduleStatus::Failed)?;
            FailureDisposition::Exhausted
        };
        self.last_error = Some(error.into());
        self.updated_at = now;
        Ok(disposition)
    }

    /// Fail immediately, bypassing retries.
    ///
    /// # Errors
    ///
    /// Returns [`AutoApplyError::Transition`] unless the schedule is `processing`.
    pub fn escalate(
        &mut self,
        reason: impl Into<String>,
        now: Timestamp,
    ) -> Result<(), AutoApplyError> {
        self.transition_to(ScheduleStatus::Failed)?;
        self.last_error = Some(reason.into());
        self.updated_at = now;
        Ok(())
    }

    /// Give a claimed schedule back to the pending pool without consuming it.
    ///
    /// `touched_at` is stamped into `updated_at` when the release follows an
    /// action (e.g. a reminder was sent); `None` leaves it unchanged.
    ///
    /// # Errors
    ///
    /// Returns [`AutoApplyError::Transition`] unless the schedule is `processing`.
    pub fn release(&mut self, touched_at: Option<Timestamp>) -> Result<(), AutoApplyError> {
        self.transition_to(ScheduleStatus::Pending)?;
        if let Some(ts) = touched_at {
            self.updated_at = ts;
        }
        Ok(())
    }
}

/// Step-by-step builder for [`ApplicationSchedule`].
#[derive(Debug, Default)]
pub struct ApplicationScheduleBuilder {
    id: Option<ScheduleId>,
    user_id: Option<UserId>,
    job_reference: Option<String>,
    scheduled_at: Option<Timestamp>,
    deadline: Option<Timestamp>,
    status: Option<ScheduleStatus>,
    retry_count: u32,
    last_error: Option<String>,
    created_at: Option<Timestamp>,
    updated_at: Option<Timestamp>,
}

impl ApplicationScheduleBuilder {
    #[must_use]
    pub fn id(mut self, id: ScheduleId) -> Self {
        self.id = Some(id);
        self
    }

    #[must_use]
    pub fn user_id(mut self, user_id: UserId) -> Self {
        self.user_id = Some(user_id);
        self
    }

    #[must_use]
    pub fn job_reference(mut self, job_reference: impl Into<String>) -> Self {
        self.job_reference = Some(job_reference.into());
        self
    }

    #[must_use]
    pub fn scheduled_at(mut self, ts: Timestamp) -> Self {
        self.scheduled_at = Some(ts);
        self
    }

    #[must_use]
    pub fn deadline(mut self, ts: Timestamp) -> Self {
        self.deadline = Some(ts);
        self
    }

    #[must_use]
    pub fn status(mut self, status: ScheduleStatus) -> Self {
        self.status = Some(status);
        self
    }

    #[must_use]
    pub fn retry_count(mut self, retry_count: u32) -> Self {
        self.retry_count = retry_count;
        self
    }

    #[must_use]
    pub fn last_error(mut self, error: impl Into<String>) -> Self {
        self.last_error = Some(error.into());
        self
    }

    #[must_use]
    pub fn created_at(mut self, ts: Timestamp) -> Self {
        self.created_at = Some(ts);
        self
    }

    #[must_use]
    pub fn updated_at(mut self, ts: Timestamp) -> Self {
        self.updated_at = Some(ts);
        self
    }

    /// Consume the builder, validate, and return an [`ApplicationSchedule`].
    ///
    /// Missing timestamps default to now; `updated_at` defaults to `created_at`.
    ///
    /// # Errors
    ///
    /// Returns [`AutoApplyError::Validation`] if invariants fail.
    pub fn build(self) -> Result<ApplicationSchedule, AutoApplyError> {
        let created_at = self.created_at.unwrap_or_else(crate::time::now);
        let schedule = ApplicationSchedule {
            id: self.id.unwrap_or_default(),
            user_id: self.user_id.unwrap_or_default(),
            job_reference: self.job_reference.unwrap_or_default(),
            scheduled_at: self.scheduled_at.unwrap_or(created_at),
            deadline: self.deadline,
            status: self.status.unwrap_or_default(),
            retry_count: self.retry_count,
            last_error: self.last_error,
            created_at,
            updated_at: self.updated_at.unwrap_or(created_at),
        };
        schedule.validate()?;
        Ok(schedule)
    }
}
