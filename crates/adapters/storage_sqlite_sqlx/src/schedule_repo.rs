//! `SQLite` implementation of [`ScheduleRepository`].

use std::str::FromStr;

use sqlx::sqlite::SqliteRow;
use sqlx::{FromRow, Row, SqlitePool};

use autoapply_app::ports::ScheduleRepository;
use autoapply_domain::error::AutoApplyError;
use autoapply_domain::id::{ScheduleId, UserId};
use autoapply_domain::schedule::{ApplicationSchedule, ScheduleStatus};
use autoapply_domain::time::Timestamp;

use crate::error::{StorageError, decode_error};
use crate::timestamp;

struct Wrapper(ApplicationSchedule);

impl Wrapper {
    fn maybe(value: Option<Self>) -> Option<ApplicationSchedule> {
        value.map(|w| w.0)
    }

    fn unwrap_all(values: Vec<Self>) -> Vec<ApplicationSchedule> {
        values.into_iter().map(|w| w.0).collect()
    }
}

impl<'r> FromRow<'r, SqliteRow> for Wrapper {
    fn from_row(row: &'r SqliteRow) -> Result<Self, sqlx::Error> {
        let id: String = row.try_get("id")?;
        let user_id: String = row.try_get("user_id")?;
        let job_reference: String = row.try_get("job_reference")?;
        let scheduled_at: String = row.try_get("scheduled_at")?;
        let deadline: Option<String> = row.try_get("deadline")?;
        let status: String = row.try_get("status")?;
        let retry_count: i64 = row.try_get("retry_count")?;
        let last_error: Option<String> = row.try_get("last_error")?;
        let created_at: String = row.try_get("created_at")?;
        let updated_at: String = row.try_get("updated_at")?;

        Ok(Self(ApplicationSchedule {
            id: ScheduleId::from_str(&id).map_err(decode_error)?,
            user_id: UserId::from_str(&user_id).map_err(decode_error)?,
            job_reference,
            scheduled_at: timestamp::decode(&scheduled_at)?,
            deadline: deadline.as_deref().map(timestamp::decode).transpose()?,
            status: ScheduleStatus::from_str(&status).map_err(decode_error)?,
            retry_count: u32::try_from(retry_count).map_err(decode_error)?,
            last_error,
            created_at: timestamp::decode(&created_at)?,
            updated_at: timestamp::decode(&updated_at)?,
        }))
    }
}

/// `SQLite`-backed schedule repository.
pub struct SqliteScheduleRepository {
    pool: SqlitePool,
}

impl SqliteScheduleRepository {
    /// Create a new repository backed by the given connection pool.
    #[must_use]
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

impl ScheduleRepository for SqliteScheduleRepository {
    async fn create(
        &self,
        schedule: ApplicationSchedule,
    ) -> Result<ApplicationSchedule, AutoApplyError> {
        sqlx::query(
                "INSERT INTO schedules (id, user_id, job_reference, scheduled_at, deadline, status, retry_count, last_error, created_at, updated_at) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
            )
            .bind(schedule.id.to_string())
            .bind(schedule.user_id.to_string())
            .bind(&schedule.job_reference)
            .bind(timestamp::encode(schedule.scheduled_at))
            .bind(schedule.deadline.map(timestamp::encode))
            .bind(schedule.status.as_str())
            .bind(i64::from(schedule.retry_count))
            .bind(&schedule.last_error)
            .bind(timestamp::encode(schedule.created_at))
            .bind(timestamp::encode(schedule.updated_at))
            .execute(&self.pool)
            .await
            .map_err(StorageError::from)?;

        Ok(schedule)
    }

    async fn get_by_id(&self, id: ScheduleId) -> Result<Option<ApplicationSchedule>, AutoApplyError> {
        let row: Option<Wrapper> = sqlx::query_as("SELECT * FROM schedules WHERE id = ?")
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await
            .map_err(StorageError::from)?;
        Ok(Wrapper::maybe(row))
    }

    async fn list_by_user(
        &self,
        user_id: UserId,
    ) -> Result<Vec<ApplicationSchedule>, AutoApplyError> {
        let rows: Vec<Wrapper> = sqlx::query_as(
            "SELECT * FROM schedules WHERE user_id = ? ORDER BY scheduled_at, created_at",
        )
        .bind(user_id.to_string())
        .fetch_all(&self.pool)
        .await
        .map_err(StorageError::from)?;
        Ok(Wrapper::unwrap_all(rows))
    }

    async fn find_due(&self, before: Timestamp) -> Result<Vec<ApplicationSchedule>, AutoApplyError> {
        let rows: Vec<Wrapper> = sqlx::query_as(
            "SELECT * FROM schedules WHERE status = ? AND scheduled_at <= ? ORDER BY scheduled_at",
        )
        .bind(ScheduleStatus::Pending.as_str())
        .bind(timestamp::encode(before))
        .fetch_all(&self.pool)
        .await
        .map_err(StorageError::from)?;
        Ok(Wrapper::unwrap_all(rows))
    }

    async fn conditional_update(
        &self,
        schedule: &ApplicationSchedule,
        expected: ScheduleStatus,
    ) -> Result<bool, AutoApplyError> {
        let result = sqlx::query(
                "UPDATE schedules SET status = ?, retry_count = ?, last_error = ?, scheduled_at = ?, updated_at = ? WHERE id = ? AND status = ?",
            )
            .bind(schedule.status.as_str())
            .bind(i64::from(schedule.retry_count))
            .bind(&schedule.last_error)
            .bind(timestamp::encode(schedule.scheduled_at))
            .bind(timestamp::encode(schedule.updated_at))
            .bind(schedule.id.to_string())
            .bind(expected.as_str())
            .execute(&self.pool)
            .await
            .map_err(StorageError::from)?;

        Ok(result.rows_affected() == 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::Config;
    use chrono::{DateTime, TimeDelta};

    async fn setup() -> SqliteScheduleRepository {
        let db = Config {
            database_url: "sqlite::memory:".to_string(),
        }
        .build()
        .await
        .unwrap();
        SqliteScheduleRepository::new(db.pool().clone())
    }

    fn at(rfc3339: &str) -> Timestamp {
        DateTime::parse_from_rfc3339(rfc3339).unwrap().to_utc()
    }

    fn schedule_at(user_id: UserId, scheduled_at: &str) -> ApplicationSchedule {
        ApplicationSchedule::builder()
            .user_id(user_id)
            .job_reference("job-1")
            .scheduled_at(at(scheduled_at))
            .created_at(at("2026-02-01T00:00:00Z"))
            .build()
            .unwrap()
    }

    #[tokio::test]
    async fn should_create_and_retrieve_schedule() {
        let repo = setup().await;
        let mut schedule = schedule_at(UserId::new(), "2026-03-01T09:00:00.123456Z");
        schedule.deadline = Some(at("2026-03-10T00:00:00Z"));

        repo.create(schedule.clone()).await.unwrap();
        let fetched = repo.get_by_id(schedule.id).await.unwrap().unwrap();

        assert_eq!(fetched, schedule);
    }

    #[tokio::test]
    async fn should_return_none_when_schedule_not_found() {
        let repo = setup().await;
        assert!(repo.get_by_id(ScheduleId::new()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn should_find_due_pending_schedules_in_order() {
        let repo = setup().await;
        let user = UserId::new();
        let later = schedule_at(user, "2026-03-01T10:00:00Z");
        let earlier = schedule_at(user, "2026-03-01T08:00:00Z");
        let future = schedule_at(user, "2026-03-02T08:00:00Z");
        let mut cancelled = schedule_at(user, "2026-03-01T07:00:00Z");
        cancelled.status = ScheduleStatus::Cancelled;
        for s in [&later, &earlier, &future, &cancelled] {
            repo.create(s.clone()).await.unwrap();
        }

        let due = repo.find_due(at("2026-03-01T10:00:00Z")).await.unwrap();

        let ids: Vec<_> = due.iter().map(|s| s.id).collect();
        assert_eq!(ids, vec![earlier.id, later.id]);
    }

    #[tokio::test]
    async fn should_compare_sub_second_due_times_chronologically() {
        let repo = setup().await;
        let schedule = schedule_at(UserId::new(), "2026-03-01T09:00:00.500Z");
        repo.create(schedule).await.unwrap();

        assert!(repo.find_due(at("2026-03-01T09:00:00Z")).await.unwrap().is_empty());
        assert_eq!(
            repo.find_due(at("2026-03-01T09:00:01Z")).await.unwrap().len(),
            1
        );
    }

    #[tokio::test]
    async fn should_list_schedules_of_user() {
        let repo = setup().await;
        let user = UserId::new();
        repo.create(schedule_at(user, "2026-03-02T00:00:00Z")).await.unwrap();
        repo.create(schedule_at(user, "2026-03-01T00:00:00Z")).await.unwrap();
        repo.create(schedule_at(UserId::new(), "2026-03-01T00:00:00Z"))
            .await
            .unwrap();

        let listed = repo.list_by_user(user).await.unwrap();

        assert_eq!(listed.len(), 2);
        assert!(listed[0].scheduled_at < listed[1].scheduled_at);
    }

    #[tokio::test]
    async fn should_update_only_when_status_matches() {
        let repo = setup().await;
        let schedule = schedule_at(UserId::new(), "2026-03-01T09:00:00Z");
        repo.create(schedule.clone()).await.unwrap();

        let mut claimed = schedule.clone();
        claimed.transition_to(ScheduleStatus::Processing).unwrap();
        assert!(repo
            .conditional_update(&claimed, ScheduleStatus::Pending)
            .await
            .unwrap());
        assert!(!repo
            .conditional_update(&claimed, ScheduleStatus::Pending)
            .await
            .unwrap());

        let now = at("2026-03-01T09:05:00Z");
        let mut retried = claimed.clone();
        retried
            .record_failure("boom", now, 3, TimeDelta::minutes(5))
            .unwrap();
        assert!(repo
            .conditional_update(&retried, ScheduleStatus::Processing)
            .await
            .unwrap());

        let stored = repo.get_by_id(schedule.id).await.unwrap().unwrap();
        assert_eq!(stored.status, ScheduleStatus::Pending);
        assert_eq!(stored.retry_count, 1);
        assert_eq!(stored.last_error.as_deref(), Some("boom"));
        assert_eq!(stored.scheduled_at, at("2026-03-01T09:10:00Z"));
        assert_eq!(stored.updated_at, now);
    }

    #[tokio::test]
    async fn should_not_update_missing_schedule() {
        let repo = setup().await;
        let schedule = schedule_at(UserId::new(), "2026-03-01T09:00:00Z");

        let written = repo
            .conditional_update(&schedule, ScheduleStatus::Pending)
            .await
            .unwrap();

        assert!(!written);
    }

    #[tokio::test]
    async fn should_let_exactly_one_concurrent_claim_win() {
        let repo = std::sync::Arc::new(setup().await);
        let schedule = schedule_at(UserId::new(), "2026-03-01T09:00:00Z");
        repo.create(schedule.clone()).await.unwrap();
        let mut claimed = schedule.clone();
        claimed.transition_to(ScheduleStatus::Processing).unwrap();

        let (a, b) = tokio::join!(
            repo.conditional_update(&claimed, ScheduleStatus::Pending),
            repo.conditional_update(&claimed, ScheduleStatus::Pending)
        );

        assert_eq!(
            [a.unwrap(), b.unwrap()].iter().filter(|won| **won).count(),
            1
        );
    }
}
