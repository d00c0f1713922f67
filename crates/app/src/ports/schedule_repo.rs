//! Schedule repository port — the document-store contract for schedules.

use std::future::Future;
use std::sync::Arc;

use autoapply_domain::error::AutoApplyError;
use autoapply_domain::id::{ScheduleId, UserId};
use autoapply_domain::schedule::{ApplicationSchedule, ScheduleStatus};
use autoapply_domain::time::Timestamp;

/// Repository for persisting and querying [`ApplicationSchedule`]s.
///
/// After creation, schedules are only ever changed through
/// [`conditional_update`](Self::conditional_update), so two writers racing on
/// the same record cannot silently overwrite each other.
pub trait ScheduleRepository {
    /// Create a new schedule in storage.
    fn create(
        &self,
        schedule: ApplicationSchedule,
    ) -> impl Future<Output = Result<ApplicationSchedule, AutoApplyError>> + Send;

    /// Get a schedule by its unique identifier.
    fn get_by_id(
        &self,
        id: ScheduleId,
    ) -> impl Future<Output = Result<Option<ApplicationSchedule>, AutoApplyError>> + Send;

    /// List a user's schedules, soonest scheduled first.
    fn list_by_user(
        &self,
        user_id: UserId,
    ) -> impl Future<Output = Result<Vec<ApplicationSchedule>, AutoApplyError>> + Send;

    /// Find `pending` schedules whose scheduled-submit time is `<= before`,
    /// ordered by scheduled-submit time ascending.
    fn find_due(
        &self,
        before: Timestamp,
    ) -> impl Future<Output = Result<Vec<ApplicationSchedule>, AutoApplyError>> + Send;

    /// Atomically write the mutable fields of `schedule` (status, retry count,
    /// last error, scheduled-submit time, `updated_at`) **only if** the stored
    /// status still equals `expected`.
    ///
    /// Returns `false` when the stored status differs (or the record is
    /// gone); nothing is written in that case.
    fn conditional_update(
        &self,
        schedule: &ApplicationSchedule,
        expected: ScheduleStatus,
    ) -> impl Future<Output = Result<bool, AutoApplyError>> + Send;
}

impl<T: ScheduleRepository + Send + Sync> ScheduleRepository for Arc<T> {
    fn create(
        &self,
        schedule: ApplicationSchedule,
    ) -> impl Future<Output = Result<ApplicationSchedule, AutoApplyError>> + Send {
        (**self).create(schedule)
    }

    fn get_by_id(
        &self,
        id: ScheduleId,
    ) -> impl Future<Output = Result<Option<ApplicationSchedule>, AutoApplyError>> + Send {
        (**self).get_by_id(id)
    }

    fn list_by_user(
        &self,
        user_id: UserId,
    ) -> impl Future<Output = Result<Vec<ApplicationSchedule>, AutoApplyError>> + Send {
        (**self).list_by_user(user_id)
    }

    fn find_due(
        &self,
        before: Timestamp,
    ) -> impl Future<Output = Result<Vec<ApplicationSchedule>, AutoApplyError>> + Send {
        (**self).find_due(before)
    }

    fn conditional_update(
        &self,
        schedule: &ApplicationSchedule,
        expected: ScheduleStatus,
    ) -> impl Future<Output = Result<bool, AutoApplyError>> + Send {
        (**self).conditional_update(schedule, expected)
    }
}
