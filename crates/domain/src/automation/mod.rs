//! Automation rules — trigger → action mappings owned by a user.
//!
//! A rule tells the engine what to do with one of its owner's due
//! schedules. Rules are evaluated in declaration order (`position`); the
//! first whose [`RuleTrigger`] holds decides the [`RuleAction`].

mod action;
mod trigger;

pub use action::{RuleAction, UnknownAction};
pub use trigger::{RuleTrigger, TriggerOverflow};

use serde::{Deserialize, Serialize};

use crate::error::{AutoApplyError, ValidationError};
use crate::id::{RuleId, UserId};
use crate::time::Timestamp;

/// A user-defined rule evaluated against due schedules.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AutomationRule {
    pub id: RuleId,
    pub user_id: UserId,
    pub name: String,
    pub trigger: RuleTrigger,
    pub action: RuleAction,
    pub enabled: bool,
    /// Declaration order among the owner's rules.
    pub position: u32,
    pub created_at: Timestamp,
}

impl AutomationRule {
    /// Create a builder for constructing an [`AutomationRule`].
    #[must_use]
    pub fn builder() -> AutomationRuleBuilder {
        AutomationRuleBuilder::default()
    }

    /// Check domain invariants.
    ///
    /// # Errors
    ///
    /// Returns [`AutoApplyError::Validation`] when:
    /// - `name` is empty ([`ValidationError::EmptyName`])
    /// - the trigger threshold is meaningless ([`ValidationError::InvalidThreshold`])
    pub fn validate(&self) -> Result<(), AutoApplyError> {
        if self.name.trim().is_empty() {
            return Err(ValidationError::EmptyName.into());
        }
        if !self.trigger.is_valid() {
            return Err(ValidationError::InvalidThreshold.into());
        }
        Ok(())
    }
}

/// Step-by-step builder for [`AutomationRule`].
#[derive(Debug, Default)]
pub struct AutomationRuleBuilder {
    id: Option<RuleId>,
    user_id: Option<UserId>,
    name: Option<String>,
    trigger: Option<RuleTrigger>,
    action: Option<RuleAction>,
    enabled: Option<bool>,
    position: u32,
    created_at: Option<Timestamp>,
}

impl AutomationRuleBuilder {
    #[must_use]
    pub fn id(mut self, id: RuleId) -> Self {
        self.id = Some(id);
        self
    }

    #[must_use]
    pub fn user_id(mut self, user_id: UserId) -> Self {
        self.user_id = Some(user_id);
        self
    }

    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    #[must_use]
    pub fn trigger(mut self, trigger: RuleTrigger) -> Self {
        self.trigger = Some(trigger);
        self
    }

    #[must_use]
    pub fn action(mut self, action: RuleAction) -> Self {
        self.action = Some(action);
        self
    }

    #[must_use]
    pub fn enabled(mut self, enabled: bool) -> Self {
        self.enabled = Some(enabled);
        self
    }

    #[must_use]
    pub fn position(mut self, position: u32) -> Self {
        self.position = position;
        self
    }

    #[must_use]
    pub fn created_at(mut self, ts: Timestamp) -> Self {
        self.created_at = Some(ts);
        self
    }

    /// Consume the builder, validate, and return an [`AutomationRule`].
    ///
    /// # Errors
    ///
    /// Returns [`AutoApplyError::Validation`] if required fields are missing or invalid.
    pub fn build(self) -> Result<AutomationRule, AutoApplyError> {
        let rule = AutomationRule {
            id: self.id.unwrap_or_default(),
            user_id: self.user_id.unwrap_or_default(),
            name: self.name.unwrap_or_default(),
            trigger: self.trigger.unwrap_or(RuleTrigger::Always),
            action: self.action.unwrap_or_default(),
            enabled: self.enabled.unwrap_or(true),
            position: self.position,
            created_at: self.created_at.unwrap_or_else(crate::time::now),
        };
        rule.validate()?;
        Ok(rule)
    }
}
