//! Axum router assembly.

use axum::Router;
use axum::routing::get;
use tower_http::trace::TraceLayer;

use autoapply_app::ports::{AutomationRuleRepository, OutcomeStore, ScheduleRepository};

use crate::state::AppState;

/// Build the top-level axum [`Router`].
///
/// Nests API routes under `/api` next to a plain `/health` probe.
/// Includes a [`TraceLayer`] that logs each HTTP request/response at the
/// `DEBUG` level using the `tracing` ecosystem.
pub fn build<SR, RR, OS>(state: AppState<SR, RR, OS>) -> Router
where
    SR: ScheduleRepository + Send + Sync + 'static,
    RR: AutomationRuleRepository + Send + Sync + 'static,
    OS: OutcomeStore + Send + Sync + 'static,
{
    Router::new()
        .route("/health", get(health_check))
        .nest("/api", crate::api::routes())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health_check() -> &'static str {
    "OK"
}
