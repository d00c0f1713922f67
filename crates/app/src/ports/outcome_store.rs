//! Outcome store port — append-only audit trail of engine attempts.

use std::future::Future;
use std::sync::Arc;

use autoapply_domain::error::AutoApplyError;
use autoapply_domain::id::ScheduleId;
use autoapply_domain::outcome::ExecutionOutcome;

/// Persists [`ExecutionOutcome`]s.
pub trait OutcomeStore {
    /// Append a new outcome.
    fn append(
        &self,
        outcome: ExecutionOutcome,
    ) -> impl Future<Output = Result<ExecutionOutcome, AutoApplyError>> + Send;

    /// Outcomes recorded for a schedule, newest first.
    fn find_by_schedule(
        &self,
        schedule_id: ScheduleId,
        limit: usize,
    ) -> impl Future<Output = Result<Vec<ExecutionOutcome>, AutoApplyError>> + Send;
}

impl<T: OutcomeStore + Send + Sync> OutcomeStore for Arc<T> {
    fn append(
        &self,
        outcome: ExecutionOutcome,
    ) -> impl Future<Output = Result<ExecutionOutcome, AutoApplyError>> + Send {
        (**self).append(outcome)
    }

    fn find_by_schedule(
        &self,
        schedule_id: ScheduleId,
        limit: usize,
    ) -> impl Future<Output = Result<Vec<ExecutionOutcome>, AutoApplyError>> + Send {
        (**self).find_by_schedule(schedule_id, limit)
    }
}
