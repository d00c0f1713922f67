//! Automation rule repository port — persistence for rules.

use std::future::Future;
use std::sync::Arc;

use autoapply_domain::automation::AutomationRule;
use autoapply_domain::error::AutoApplyError;
use autoapply_domain::id::{RuleId, UserId};

/// Repository for persisting and querying [`AutomationRule`]s.
pub trait AutomationRuleRepository {
    /// Create a new rule in storage.
    fn create(
        &self,
        rule: AutomationRule,
    ) -> impl Future<Output = Result<AutomationRule, AutoApplyError>> + Send;

    /// Get a rule by its unique identifier.
    fn get_by_id(
        &self,
        id: RuleId,
    ) -> impl Future<Output = Result<Option<AutomationRule>, AutoApplyError>> + Send;

    /// All rules of a user in declaration order.
    fn list_by_user(
        &self,
        user_id: UserId,
    ) -> impl Future<Output = Result<Vec<AutomationRule>, AutoApplyError>> + Send;

    /// Enabled rules of a user in declaration order (`position`, then `created_at`).
    fn get_enabled_for_user(
        &self,
        user_id: UserId,
    ) -> impl Future<Output = Result<Vec<AutomationRule>, AutoApplyError>> + Send;

    /// Update an existing rule.
    fn update(
        &self,
        rule: AutomationRule,
    ) -> impl Future<Output = Result<AutomationRule, AutoApplyError>> + Send;

    /// Delete a rule by its unique identifier.
    fn delete(&self, id: RuleId) -> impl Future<Output = Result<(), AutoApplyError>> + Send;
}

impl<T: AutomationRuleRepository + Send + Sync> AutomationRuleRepository for Arc<T> {
    fn create(
        &self,
        rule: AutomationRule,
    ) -> impl Future<Output = Result<AutomationRule, AutoApplyError>> + Send {
        (**self).create(rule)
    }

    fn get_by_id(
        &self,
        id: RuleId,
    ) -> impl Future<Output = Result<Option<AutomationRule>, AutoApplyError>> + Send {
        (**self).get_by_id(id)
    }

    fn list_by_user(
        &self,
        user_id: UserId,
    ) -> impl Future<Output = Result<Vec<AutomationRule>, AutoApplyError>> + Send {
        (**self).list_by_user(user_id)
    }

    fn get_enabled_for_user(
        &self,
        user_id: UserId,
    ) -> impl Future<Output = Result<Vec<AutomationRule>, AutoApplyError>> + Send {
        (**self).get_enabled_for_user(user_id)
    }

    fn update(
        &self,
        rule: AutomationRule,
    ) -> impl Future<Output = Result<AutomationRule, AutoApplyError>> + Send {
        (**self).update(rule)
    }

    fn delete(&self, id: RuleId) -> impl Future<Output = Result<(), AutoApplyError>> + Send {
        (**self).delete(id)
    }
}
