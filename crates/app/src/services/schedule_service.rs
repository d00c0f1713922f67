//! Schedule service — use-cases for a user's pending applications.

use autoapply_domain::error::{AutoApplyError, NotFoundError, TransitionError};
use autoapply_domain::id::{ScheduleId, UserId};
use autoapply_domain::outcome::ExecutionOutcome;
use autoapply_domain::schedule::{ApplicationSchedule, ScheduleStatus};

use crate::ports::{OutcomeStore, ScheduleRepository};

/// Application service for creating, inspecting and cancelling schedules.
pub struct ScheduleService<SR, OS> {
    schedules: SR,
    outcomes: OS,
}

impl<SR, OS> ScheduleService<SR, OS>
where
    SR: ScheduleRepository,
    OS: OutcomeStore,
{
    /// Create a new service backed by the given ports.
    pub fn new(schedules: SR, outcomes: OS) -> Self {
        Self {
            schedules,
            outcomes,
        }
    }

    /// Create a new schedule after validating domain invariants.
    ///
    /// # Errors
    ///
    /// Returns [`AutoApplyError::Validation`] if invariants fail, or a
    /// storage error propagated from the repository.
    #[tracing::instrument(skip(self, schedule), fields(schedule_id = %schedule.id, user_id = %schedule.user_id))]
    pub async fn create_schedule(
        &self,
        schedule: ApplicationSchedule,
    ) -> Result<ApplicationSchedule, AutoApplyError> {
        schedule.validate()?;
        self.schedules.create(schedule).await
    }

    /// Look up a schedule by id, returning an error if not found.
    ///
    /// # Errors
    ///
    /// Returns [`AutoApplyError::NotFound`] when no schedule with `id` exists,
    /// or a storage error from the repository.
    #[tracing::instrument(skip(self))]
    pub async fn get_schedule(&self, id: ScheduleId) -> Result<ApplicationSchedule, AutoApplyError> {
        self.schedules
            .get_by_id(id)
            .await?
            .ok_or_else(|| not_found(id))
    }

    /// List a user's schedules, soonest first.
    ///
    /// # Errors
    ///
    /// Returns a storage error propagated from the repository.
    pub async fn list_for_user(
        &self,
        user_id: UserId,
    ) -> Result<Vec<ApplicationSchedule>, AutoApplyError> {
        self.schedules.list_by_user(user_id).await
    }

    /// Cancel a schedule that has not reached a terminal status.
    ///
    /// The change is applied with a conditional update, first from `pending`
    /// and then from `processing`, so a concurrent engine write is never
    /// overwritten. A schedule cancelled while the engine holds it makes the
    /// engine discard its result.
    ///
    /// # Errors
    ///
    /// Returns [`AutoApplyError::NotFound`] for an unknown id,
    /// [`AutoApplyError::Transition`] when the schedule is already terminal,
    /// or a storage error from the repository.
    #[tracing::instrument(skip(self))]
    pub async fn cancel_schedule(
        &self,
        id: ScheduleId,
    ) -> Result<ApplicationSchedule, AutoApplyError> {
        let current = self.get_schedule(id).await?;
        let now = autoapply_domain::time::now();

        for expected in [ScheduleStatus::Pending, ScheduleStatus::Processing] {
            let mut cancelled = current.clone();
            cancelled.status = ScheduleStatus::Cancelled;
            cancelled.updated_at = now;
            if self.schedules.conditional_update(&cancelled, expected).await? {
                tracing::info!(from = %expected, "schedule cancelled");
                return self.get_schedule(id).await;
            }
        }

        let latest = self.get_schedule(id).await?;
        Err(TransitionError {
            from: latest.status,
            to: ScheduleStatus::Cancelled,
        }
        .into())
    }

    /// Outcomes recorded for a schedule, newest first.
    ///
    /// # Errors
    ///
    /// Returns [`AutoApplyError::NotFound`] for an unknown id, or a storage
    /// error propagated from the stores.
    pub async fn outcomes_for(
        &self,
        id: ScheduleId,
        limit: usize,
    ) -> Result<Vec<ExecutionOutcome>, AutoApplyError> {
        self.get_schedule(id).await?;
        self.outcomes.find_by_schedule(id, limit).await
    }
}

fn not_found(id: ScheduleId) -> AutoApplyError {
    NotFoundError {
        entity: "ApplicationSchedule",
        id: id.to_string(),
    }
    .into()
}
