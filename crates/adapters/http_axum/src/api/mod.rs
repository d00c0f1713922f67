//! JSON REST API handler modules.

#[allow(clippy::missing_errors_doc)]
pub mod rules;
#[allow(clippy::missing_errors_doc)]
pub mod schedules;
pub mod scheduler;

use std::str::FromStr;

use axum::Router;
use axum::routing::{get, post};

use autoapply_app::ports::{AutomationRuleRepository, OutcomeStore, ScheduleRepository};

use crate::error::ApiError;
use crate::state::AppState;

/// Build the `/api` sub-router.
pub fn routes<SR, RR, OS>() -> Router<AppState<SR, RR, OS>>
where
    SR: ScheduleRepository + Send + Sync + 'static,
    RR: AutomationRuleRepository + Send + Sync + 'static,
    OS: OutcomeStore + Send + Sync + 'static,
{
    Router::new()
        // Schedules
        .route(
            "/schedules",
            get(schedules::list::<SR, RR, OS>).post(schedules::create::<SR, RR, OS>),
        )
        .route("/schedules/{id}", get(schedules::get::<SR, RR, OS>))
        .route(
            "/schedules/{id}/cancel",
            post(schedules::cancel::<SR, RR, OS>),
        )
        .route(
            "/schedules/{id}/outcomes",
            get(schedules::outcomes::<SR, RR, OS>),
        )
        // Rules
        .route(
            "/rules",
            get(rules::list::<SR, RR, OS>).post(rules::create::<SR, RR, OS>),
        )
        .route(
            "/rules/{id}",
            get(rules::get::<SR, RR, OS>)
                .put(rules::update::<SR, RR, OS>)
                .delete(rules::delete::<SR, RR, OS>),
        )
        // Scheduler
        .route("/scheduler", get(scheduler::status::<SR, RR, OS>))
}

/// Parse a textual identifier, answering `400` when it is malformed.
fn parse_id<T: FromStr>(raw: &str) -> Result<T, ApiError> {
    T::from_str(raw).map_err(|_| ApiError::invalid_id(raw))
}
