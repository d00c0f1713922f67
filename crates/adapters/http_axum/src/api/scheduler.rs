//! Scheduler status endpoint.

use axum::Json;
use axum::extract::State;
use serde::Serialize;

use autoapply_app::ports::{AutomationRuleRepository, OutcomeStore, ScheduleRepository};

use crate::state::AppState;

/// Response body of `GET /api/scheduler`.
#[derive(Debug, Serialize)]
pub struct SchedulerStatusResponse {
    pub running: bool,
}

/// `GET /api/scheduler` — whether the background sweep loop is running.
pub async fn status<SR, RR, OS>(
    State(state): State<AppState<SR, RR, OS>>,
) -> Json<SchedulerStatusResponse>
where
    SR: ScheduleRepository + Send + Sync + 'static,
    RR: AutomationRuleRepository + Send + Sync + 'static,
    OS: OutcomeStore + Send + Sync + 'static,
{
    Json(SchedulerStatusResponse {
        running: state.scheduler.is_running(),
    })
}
