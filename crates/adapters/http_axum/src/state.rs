//! Shared application state for axum handlers.

use std::sync::Arc;

use autoapply_app::ports::{AutomationRuleRepository, OutcomeStore, ScheduleRepository};
use autoapply_app::scheduler::SchedulerStatus;
use autoapply_app::services::{AutomationRuleService, ScheduleService};

/// Application state shared across all axum handlers.
///
/// Generic over the schedule repository, rule repository and outcome store
/// to avoid dynamic dispatch. `Clone` is implemented manually so the
/// underlying types themselves do not need to be `Clone` — only the `Arc`
/// wrappers are cloned.
pub struct AppState<SR, RR, OS> {
    /// Schedule use-cases.
    pub schedule_service: Arc<ScheduleService<SR, OS>>,
    /// Automation rule CRUD service.
    pub rule_service: Arc<AutomationRuleService<RR>>,
    /// Whether the background scheduler is running.
    pub scheduler: SchedulerStatus,
}

impl<SR, RR, OS> Clone for AppState<SR, RR, OS> {
    fn clone(&self) -> Self {
        Self {
            schedule_service: Arc::clone(&self.schedule_service),
            rule_service: Arc::clone(&self.rule_service),
            scheduler: self.scheduler.clone(),
        }
    }
}

impl<SR, RR, OS> AppState<SR, RR, OS>
where
    SR: ScheduleRepository + Send + Sync + 'static,
    RR: AutomationRuleRepository + Send + Sync + 'static,
    OS: OutcomeStore + Send + Sync + 'static,
{
    /// Create a new application state from service instances.
    pub fn new(
        schedule_service: ScheduleService<SR, OS>,
        rule_service: AutomationRuleService<RR>,
        scheduler: SchedulerStatus,
    ) -> Self {
        Self {
            schedule_service: Arc::new(schedule_service),
            rule_service: Arc::new(rule_service),
            scheduler,
        }
    }
}
