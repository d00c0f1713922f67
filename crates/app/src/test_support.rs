//! In-memory port implementations shared by the unit tests of this crate.

use std::collections::HashMap;
use std::future::Future;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use autoapply_domain::automation::AutomationRule;
use autoapply_domain::error::{AutoApplyError, NotFoundError};
use autoapply_domain::id::{RuleId, ScheduleId, UserId};
use autoapply_domain::outcome::ExecutionOutcome;
use autoapply_domain::schedule::{ApplicationSchedule, ScheduleStatus};
use autoapply_domain::time::Timestamp;
use tokio::sync::Barrier;

use crate::ports::{
    ApplicationSubmitter, AutomationRuleRepository, NotificationError, Notifier, OutcomeStore,
    ScheduleRepository, SubmissionError,
};

// ── Schedules ──────────────────────────────────────────────────────

#[derive(Default)]
pub struct InMemoryScheduleRepo {
    store: Mutex<HashMap<ScheduleId, ApplicationSchedule>>,
    /// When set, `find_due` waits here before answering.
    due_barrier: Option<Arc<Barrier>>,
    fail_find_due: bool,
    /// Conditional updates expecting this status fail while the count lasts.
    fail_updates: Option<(ScheduleStatus, AtomicUsize)>,
}

impl InMemoryScheduleRepo {
    pub fn with(schedules: Vec<ApplicationSchedule>) -> Self {
        Self {
            store: Mutex::new(schedules.into_iter().map(|s| (s.id, s)).collect()),
            ..Self::default()
        }
    }

    pub fn with_due_barrier(mut self, barrier: Arc<Barrier>) -> Self {
        self.due_barrier = Some(barrier);
        self
    }

    pub fn failing_find_due() -> Self {
        Self {
            fail_find_due: true,
            ..Self::default()
        }
    }

    pub fn failing_updates_from(mut self, expected: ScheduleStatus, times: usize) -> Self {
        self.fail_updates = Some((expected, AtomicUsize::new(times)));
        self
    }

    pub fn get(&self, id: ScheduleId) -> ApplicationSchedule {
        self.store.lock().unwrap()[&id].clone()
    }

    pub fn set_status(&self, id: ScheduleId, status: ScheduleStatus) {
        self.store.lock().unwrap().get_mut(&id).unwrap().status = status;
    }
}

impl ScheduleRepository for InMemoryScheduleRepo {
    fn create(
        &self,
        schedule: ApplicationSchedule,
    ) -> impl Future<Output = Result<ApplicationSchedule, AutoApplyError>> + Send {
        let mut store = self.store.lock().unwrap();
        store.insert(schedule.id, schedule.clone());
        async { Ok(schedule) }
    }

    fn get_by_id(
        &self,
        id: ScheduleId,
    ) -> impl Future<Output = Result<Option<ApplicationSchedule>, AutoApplyError>> + Send {
        let store = self.store.lock().unwrap();
        let r = store.get(&id).cloned();
        async { Ok(r) }
    }

    fn list_by_user(
        &self,
        user_id: UserId,
    ) -> impl Future<Output = Result<Vec<ApplicationSchedule>, AutoApplyError>> + Send {
        let store = self.store.lock().unwrap();
        let mut r: Vec<_> = store
            .values()
            .filter(|s| s.user_id == user_id)
            .cloned()
            .collect();
        r.sort_by_key(|s| s.scheduled_at);
        async { Ok(r) }
    }

    fn find_due(
        &self,
        before: Timestamp,
    ) -> impl Future<Output = Result<Vec<ApplicationSchedule>, AutoApplyError>> + Send {
        let store = self.store.lock().unwrap();
        let mut r: Vec<_> = store.values().filter(|s| s.is_due(before)).cloned().collect();
        r.sort_by_key(|s| s.scheduled_at);
        let barrier = self.due_barrier.clone();
        let fail = self.fail_find_due;
        async move {
            if fail {
                return Err(AutoApplyError::Storage("database is locked".into()));
            }
            if let Some(barrier) = barrier {
                barrier.wait().await;
            }
            Ok(r)
        }
    }

    fn conditional_update(
        &self,
        schedule: &ApplicationSchedule,
        expected: ScheduleStatus,
    ) -> impl Future<Output = Result<bool, AutoApplyError>> + Send {
        let fail = self.fail_updates.as_ref().is_some_and(|(status, remaining)| {
            *status == expected
                && remaining
                    .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
                    .is_ok()
        });
        let mut store = self.store.lock().unwrap();
        let written = match store.get_mut(&schedule.id) {
            _ if fail => false,
            Some(stored) if stored.status == expected => {
                stored.status = schedule.status;
                stored.retry_count = schedule.retry_count;
                stored.last_error.clone_from(&schedule.last_error);
                stored.scheduled_at = schedule.scheduled_at;
                stored.updated_at = schedule.updated_at;
                true
            }
            _ => false,
        };
        async move {
            if fail {
                return Err(AutoApplyError::Storage("database is locked".into()));
            }
            Ok(written)
        }
    }
}

// ── Rules ──────────────────────────────────────────────────────────

#[derive(Default)]
pub struct InMemoryRuleRepo {
    store: Mutex<HashMap<RuleId, AutomationRule>>,
}

impl InMemoryRuleRepo {
    pub fn with(rules: Vec<AutomationRule>) -> Self {
        Self {
            store: Mutex::new(rules.into_iter().map(|r| (r.id, r)).collect()),
        }
    }

    fn sorted(&self, keep: impl Fn(&AutomationRule) -> bool) -> Vec<AutomationRule> {
        let store = self.store.lock().unwrap();
        let mut r: Vec<_> = store.values().filter(|r| keep(r)).cloned().collect();
        r.sort_by_key(|r| (r.position, r.created_at));
        r
    }
}

impl AutomationRuleRepository for InMemoryRuleRepo {
    fn create(
        &self,
        rule: AutomationRule,
    ) -> impl Future<Output = Result<AutomationRule, AutoApplyError>> + Send {
        let mut store = self.store.lock().unwrap();
        store.insert(rule.id, rule.clone());
        async { Ok(rule) }
    }

    fn get_by_id(
        &self,
        id: RuleId,
    ) -> impl Future<Output = Result<Option<AutomationRule>, AutoApplyError>> + Send {
        let store = self.store.lock().unwrap();
        let r = store.get(&id).cloned();
        async { Ok(r) }
    }

    fn list_by_user(
        &self,
        user_id: UserId,
    ) -> impl Future<Output = Result<Vec<AutomationRule>, AutoApplyError>> + Send {
        let r = self.sorted(|r| r.user_id == user_id);
        async { Ok(r) }
    }

    fn get_enabled_for_user(
        &self,
        user_id: UserId,
    ) -> impl Future<Output = Result<Vec<AutomationRule>, AutoApplyError>> + Send {
        let r = self.sorted(|r| r.user_id == user_id && r.enabled);
        async { Ok(r) }
    }

    fn update(
        &self,
        rule: AutomationRule,
    ) -> impl Future<Output = Result<AutomationRule, AutoApplyError>> + Send {
        let mut store = self.store.lock().unwrap();
        let r = if store.contains_key(&rule.id) {
            store.insert(rule.id, rule.clone());
            Ok(rule)
        } else {
            Err(NotFoundError {
                entity: "AutomationRule",
                id: rule.id.to_string(),
            }
            .into())
        };
        async { r }
    }

    fn delete(&self, id: RuleId) -> impl Future<Output = Result<(), AutoApplyError>> + Send {
        let mut store = self.store.lock().unwrap();
        let r = match store.remove(&id) {
            Some(_) => Ok(()),
            None => Err(NotFoundError {
                entity: "AutomationRule",
                id: id.to_string(),
            }
            .into()),
        };
        async { r }
    }
}

// ── Outcomes ───────────────────────────────────────────────────────

#[derive(Default)]
pub struct InMemoryOutcomeStore {
    outcomes: Mutex<Vec<ExecutionOutcome>>,
}

impl InMemoryOutcomeStore {
    pub fn all(&self) -> Vec<ExecutionOutcome> {
        self.outcomes.lock().unwrap().clone()
    }
}

impl OutcomeStore for InMemoryOutcomeStore {
    fn append(
        &self,
        outcome: ExecutionOutcome,
    ) -> impl Future<Output = Result<ExecutionOutcome, AutoApplyError>> + Send {
        self.outcomes.lock().unwrap().push(outcome.clone());
        async { Ok(outcome) }
    }

    fn find_by_schedule(
        &self,
        schedule_id: ScheduleId,
        limit: usize,
    ) -> impl Future<Output = Result<Vec<ExecutionOutcome>, AutoApplyError>> + Send {
        let outcomes = self.outcomes.lock().unwrap();
        let r: Vec<_> = outcomes
            .iter()
            .rev()
            .filter(|o| o.schedule_id == schedule_id)
            .take(limit)
            .cloned()
            .collect();
        async { Ok(r) }
    }
}

// ── Collaborators ──────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Default)]
pub enum SubmitBehavior {
    #[default]
    Succeed,
    Reject,
    Hang,
}

/// Submitter that answers according to a fixed behavior and counts calls.
#[derive(Default)]
pub struct StubSubmitter {
    behavior: SubmitBehavior,
    calls: AtomicUsize,
    /// Called just before answering; lets a test act mid-attempt.
    on_submit: Option<Box<dyn Fn() + Send + Sync>>,
}

impl StubSubmitter {
    pub fn new(behavior: SubmitBehavior) -> Self {
        Self {
            behavior,
            ..Self::default()
        }
    }

    pub fn on_submit(mut self, hook: impl Fn() + Send + Sync + 'static) -> Self {
        self.on_submit = Some(Box::new(hook));
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl ApplicationSubmitter for StubSubmitter {
    fn submit(
        &self,
        _user_id: UserId,
        _job_reference: &str,
    ) -> impl Future<Output = Result<(), SubmissionError>> + Send {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(hook) = &self.on_submit {
            hook();
        }
        let behavior = self.behavior;
        async move {
            match behavior {
                SubmitBehavior::Succeed => Ok(()),
                SubmitBehavior::Reject => Err(SubmissionError::Rejected { status: 503 }),
                SubmitBehavior::Hang => std::future::pending().await,
            }
        }
    }
}

/// Notifier that records every message it was asked to deliver.
#[derive(Default)]
pub struct SpyNotifier {
    sent: Mutex<Vec<(UserId, String)>>,
    fail: bool,
}

impl SpyNotifier {
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn sent(&self) -> Vec<(UserId, String)> {
        self.sent.lock().unwrap().clone()
    }
}

impl Notifier for SpyNotifier {
    fn notify(
        &self,
        user_id: UserId,
        message: &str,
    ) -> impl Future<Output = Result<(), NotificationError>> + Send {
        self.sent.lock().unwrap().push((user_id, message.to_string()));
        let fail = self.fail;
        async move {
            if fail {
                Err(NotificationError("mailbox unavailable".into()))
            } else {
                Ok(())
            }
        }
    }
}
