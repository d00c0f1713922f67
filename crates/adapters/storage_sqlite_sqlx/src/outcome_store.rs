//! `SQLite` implementation of [`OutcomeStore`].

use std::str::FromStr;

use sqlx::sqlite::SqliteRow;
use sqlx::{FromRow, Row, SqlitePool};

use autoapply_app::ports::OutcomeStore;
use autoapply_domain::automation::RuleAction;
use autoapply_domain::error::AutoApplyError;
use autoapply_domain::id::{OutcomeId, RuleId, ScheduleId};
use autoapply_domain::outcome::{ExecutionOutcome, OutcomeResult};

use crate::error::{StorageError, decode_error};
use crate::timestamp;

struct Wrapper(ExecutionOutcome);

impl<'r> FromRow<'r, SqliteRow> for Wrapper {
    fn from_row(row: &'r SqliteRow) -> Result<Self, sqlx::Error> {
        let id: String = row.try_get("id")?;
        let schedule_id: String = row.try_get("schedule_id")?;
        let recorded_at: String = row.try_get("recorded_at")?;
        let result: String = row.try_get("result")?;
        let action: String = row.try_get("action")?;
        let rule_id: Option<String> = row.try_get("rule_id")?;
        let detail: String = row.try_get("detail")?;

        Ok(Self(ExecutionOutcome {
            id: OutcomeId::from_str(&id).map_err(decode_error)?,
            schedule_id: ScheduleId::from_str(&schedule_id).map_err(decode_error)?,
            recorded_at: timestamp::decode(&recorded_at)?,
            result: OutcomeResult::from_str(&result).map_err(decode_error)?,
            action: RuleAction::from_str(&action).map_err(decode_error)?,
            rule_id: rule_id
                .as_deref()
                .map(RuleId::from_str)
                .transpose()
                .map_err(decode_error)?,
            detail,
        }))
    }
}

/// `SQLite`-backed, append-only outcome store.
pub struct SqliteOutcomeStore {
    pool: SqlitePool,
}

impl SqliteOutcomeStore {
    /// Create a new store backed by the given connection pool.
    #[must_use]
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

impl OutcomeStore for SqliteOutcomeStore {
    async fn append(&self, outcome: ExecutionOutcome) -> Result<ExecutionOutcome, AutoApplyError> {
        sqlx::query(
                "INSERT INTO execution_outcomes (id, schedule_id, recorded_at, result, action, rule_id, detail) VALUES (?, ?, ?, ?, ?, ?, ?)",
            )
            .bind(outcome.id.to_string())
            .bind(outcome.schedule_id.to_string())
            .bind(timestamp::encode(outcome.recorded_at))
            .bind(outcome.result.as_str())
            .bind(outcome.action.as_str())
            .bind(outcome.rule_id.map(|id| id.to_string()))
            .bind(&outcome.detail)
            .execute(&self.pool)
            .await
            .map_err(StorageError::from)?;

        Ok(outcome)
    }

    async fn find_by_schedule(
        &self,
        schedule_id: ScheduleId,
        limit: usize,
    ) -> Result<Vec<ExecutionOutcome>, AutoApplyError> {
        let limit = i64::try_from(limit).unwrap_or(i64::MAX);
        let rows: Vec<Wrapper> = sqlx::query_as(
            "SELECT * FROM execution_outcomes WHERE schedule_id = ? ORDER BY recorded_at DESC, rowid DESC LIMIT ?",
        )
        .bind(schedule_id.to_string())
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(StorageError::from)?;
        Ok(rows.into_iter().map(|w| w.0).collect())
    }
}
