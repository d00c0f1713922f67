//! Automation rule service — use-cases for managing a user's rules.

use autoapply_domain::automation::AutomationRule;
use autoapply_domain::error::{AutoApplyError, NotFoundError};
use autoapply_domain::id::{RuleId, UserId};

use crate::ports::AutomationRuleRepository;

/// Application service for automation rule CRUD operations.
pub struct AutomationRuleService<R> {
    repo: R,
}

impl<R: AutomationRuleRepository> AutomationRuleService<R> {
    /// Create a new service backed by the given repository.
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Create a new rule after validating domain invariants.
    ///
    /// The rule is appended after the user's existing rules, whatever
    /// `position` it carried.
    ///
    /// # Errors
    ///
    /// Returns [`AutoApplyError::Validation`] if invariants fail, or a
    /// storage error propagated from the repository.
    #[tracing::instrument(skip(self, rule), fields(rule_name = %rule.name))]
    pub async fn create_rule(&self, mut rule: AutomationRule) -> Result<AutomationRule, AutoApplyError> {
        rule.validate()?;
        let existing = self.repo.list_by_user(rule.user_id).await?;
        rule.position = existing
            .iter()
            .map(|r| r.position.saturating_add(1))
            .max()
            .unwrap_or(0);
        self.repo.create(rule).await
    }

    /// Look up a rule by id, returning an error if not found.
    ///
    /// # Errors
    ///
    /// Returns [`AutoApplyError::NotFound`] when no rule with `id` exists,
    /// or a storage error from the repository.
    #[tracing::instrument(skip(self))]
    pub async fn get_rule(&self, id: RuleId) -> Result<AutomationRule, AutoApplyError> {
        self.repo.get_by_id(id).await?.ok_or_else(|| {
            NotFoundError {
                entity: "AutomationRule",
                id: id.to_string(),
            }
            .into()
        })
    }

    /// List a user's rules in evaluation order.
    ///
    /// # Errors
    ///
    /// Returns a storage error propagated from the repository.
    pub async fn list_for_user(&self, user_id: UserId) -> Result<Vec<AutomationRule>, AutoApplyError> {
        self.repo.list_by_user(user_id).await
    }

    /// Update an existing rule.
    ///
    /// # Errors
    ///
    /// Returns [`AutoApplyError::Validation`] if invariants fail,
    /// [`AutoApplyError::NotFound`] for an unknown rule, or a storage error
    /// from the repository.
    #[tracing::instrument(skip(self, rule), fields(rule_id = %rule.id))]
    pub async fn update_rule(&self, rule: AutomationRule) -> Result<AutomationRule, AutoApplyError> {
        rule.validate()?;
        self.repo.update(rule).await
    }

    /// Delete a rule by id.
    ///
    /// # Errors
    ///
    /// Returns [`AutoApplyError::NotFound`] for an unknown rule, or a storage
    /// error propagated from the repository.
    #[tracing::instrument(skip(self))]
    pub async fn delete_rule(&self, id: RuleId) -> Result<(), AutoApplyError> {
        self.repo.delete(id).await
    }
}
