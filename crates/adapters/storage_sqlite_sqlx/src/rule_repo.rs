//! `SQLite` implementation of [`AutomationRuleRepository`].

use std::str::FromStr;

use sqlx::sqlite::SqliteRow;
use sqlx::{FromRow, Row, SqlitePool};

use autoapply_app::ports::AutomationRuleRepository;
use autoapply_domain::automation::{AutomationRule, RuleAction, RuleTrigger};
use autoapply_domain::error::{AutoApplyError, NotFoundError};
use autoapply_domain::id::{RuleId, UserId};

use crate::error::{StorageError, decode_error};
use crate::timestamp;

struct Wrapper(AutomationRule);

impl Wrapper {
    fn maybe(value: Option<Self>) -> Option<AutomationRule> {
        value.map(|w| w.0)
    }

    fn unwrap_all(values: Vec<Self>) -> Vec<AutomationRule> {
        values.into_iter().map(|w| w.0).collect()
    }
}

impl<'r> FromRow<'r, SqliteRow> for Wrapper {
    fn from_row(row: &'r SqliteRow) -> Result<Self, sqlx::Error> {
        let id: String = row.try_get("id")?;
        let user_id: String = row.try_get("user_id")?;
        let name: String = row.try_get("name")?;
        let trigger_json: String = row.try_get("trigger_data")?;
        let action: String = row.try_get("action")?;
        let enabled: bool = row.try_get("enabled")?;
        let position: i64 = row.try_get("position")?;
        let created_at: String = row.try_get("created_at")?;

        let trigger: RuleTrigger = serde_json::from_str(&trigger_json).map_err(decode_error)?;

        Ok(Self(AutomationRule {
            id: RuleId::from_str(&id).map_err(decode_error)?,
            user_id: UserId::from_str(&user_id).map_err(decode_error)?,
            name,
            trigger,
            action: RuleAction::from_str(&action).map_err(decode_error)?,
            enabled,
            position: u32::try_from(position).map_err(decode_error)?,
            created_at: timestamp::decode(&created_at)?,
        }))
    }
}

fn not_found(id: RuleId) -> AutoApplyError {
    NotFoundError {
        entity: "AutomationRule",
        id: id.to_string(),
    }
    .into()
}

/// `SQLite`-backed automation rule repository.
pub struct SqliteAutomationRuleRepository {
    pool: SqlitePool,
}

impl SqliteAutomationRuleRepository {
    /// Create a new repository backed by the given connection pool.
    #[must_use]
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

impl AutomationRuleRepository for SqliteAutomationRuleRepository {
    async fn create(&self, rule: AutomationRule) -> Result<AutomationRule, AutoApplyError> {
        let trigger_json = serde_json::to_string(&rule.trigger).map_err(StorageError::from)?;

        sqlx::query(
                "INSERT INTO automation_rules (id, user_id, name, trigger_data, action, enabled, position, created_at) VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
            )
            .bind(rule.id.to_string())
            .bind(rule.user_id.to_string())
            .bind(&rule.name)
            .bind(&trigger_json)
            .bind(rule.action.as_str())
            .bind(rule.enabled)
            .bind(i64::from(rule.position))
            .bind(timestamp::encode(rule.created_at))
            .execute(&self.pool)
            .await
            .map_err(StorageError::from)?;

        Ok(rule)
    }

    async fn get_by_id(&self, id: RuleId) -> Result<Option<AutomationRule>, AutoApplyError> {
        let row: Option<Wrapper> = sqlx::query_as("SELECT * FROM automation_rules WHERE id = ?")
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await
            .map_err(StorageError::from)?;
        Ok(Wrapper::maybe(row))
    }

    async fn list_by_user(&self, user_id: UserId) -> Result<Vec<AutomationRule>, AutoApplyError> {
        let rows: Vec<Wrapper> = sqlx::query_as(
            "SELECT * FROM automation_rules WHERE user_id = ? ORDER BY position, created_at",
        )
        .bind(user_id.to_string())
        .fetch_all(&self.pool)
        .await
        .map_err(StorageError::from)?;
        Ok(Wrapper::unwrap_all(rows))
    }

    async fn get_enabled_for_user(
        &self,
        user_id: UserId,
    ) -> Result<Vec<AutomationRule>, AutoApplyError> {
        let rows: Vec<Wrapper> = sqlx::query_as(
            "SELECT * FROM automation_rules WHERE user_id = ? AND enabled = 1 ORDER BY position, created_at",
        )
        .bind(user_id.to_string())
        .fetch_all(&self.pool)
        .await
        .map_err(StorageError::from)?;
        Ok(Wrapper::unwrap_all(rows))
    }

    async fn update(&self, rule: AutomationRule) -> Result<AutomationRule, AutoApplyError> {
        let trigger_json = serde_json::to_string(&rule.trigger).map_err(StorageError::from)?;

        let result = sqlx::query(
                "UPDATE automation_rules SET name = ?, trigger_data = ?, action = ?, enabled = ?, position = ? WHERE id = ?",
            )
            .bind(&rule.name)
            .bind(&trigger_json)
            .bind(rule.action.as_str())
            .bind(rule.enabled)
            .bind(i64::from(rule.position))
            .bind(rule.id.to_string())
            .execute(&self.pool)
            .await
            .map_err(StorageError::from)?;

        if result.rows_affected() == 0 {
            return Err(not_found(rule.id));
        }
        Ok(rule)
    }

    async fn delete(&self, id: RuleId) -> Result<(), AutoApplyError> {
        let result = sqlx::query("DELETE FROM automation_rules WHERE id = ?")
            .bind(id.to_string())
            .execute(&self.pool)
            .await
            .map_err(StorageError::from)?;

        if result.rows_affected() == 0 {
            return Err(not_found(id));
        }
        Ok(())
    }
}
