//! JSON REST handlers for application schedules.

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Deserialize;

use autoapply_app::ports::{AutomationRuleRepository, OutcomeStore, ScheduleRepository};
use autoapply_domain::id::{ScheduleId, UserId};
use autoapply_domain::outcome::ExecutionOutcome;
use autoapply_domain::schedule::ApplicationSchedule;
use autoapply_domain::time::Timestamp;

use super::parse_id;
use crate::error::ApiError;
use crate::state::AppState;

const DEFAULT_OUTCOME_LIMIT: usize = 50;
const MAX_OUTCOME_LIMIT: usize = 500;

/// Query string selecting the owner of the listed schedules.
#[derive(Deserialize)]
pub struct UserQuery {
    pub user_id: String,
}

/// Query string for the outcomes endpoint.
#[derive(Deserialize)]
pub struct OutcomeQuery {
    pub limit: Option<usize>,
}

/// Request body for creating a schedule.
#[derive(Deserialize)]
pub struct CreateScheduleRequest {
    pub user_id: UserId,
    pub job_reference: String,
    pub scheduled_at: Timestamp,
    pub deadline: Option<Timestamp>,
}

/// Possible responses from the list endpoint.
pub enum ListResponse {
    Ok(Json<Vec<ApplicationSchedule>>),
}

impl IntoResponse for ListResponse {
    fn into_response(self) -> Response {
        match self {
            Self::Ok(json) => json.into_response(),
        }
    }
}

/// Possible responses from the get and cancel endpoints.
pub enum GetResponse {
    Ok(Json<ApplicationSchedule>),
}

impl IntoResponse for GetResponse {
    fn into_response(self) -> Response {
        match self {
            Self::Ok(json) => json.into_response(),
        }
    }
}

/// Possible responses from the create endpoint.
pub enum CreateResponse {
    Created(Json<ApplicationSchedule>),
}

impl IntoResponse for CreateResponse {
    fn into_response(self) -> Response {
        match self {
            Self::Created(json) => (StatusCode::CREATED, json).into_response(),
        }
    }
}

/// Possible responses from the outcomes endpoint.
pub enum OutcomesResponse {
    Ok(Json<Vec<ExecutionOutcome>>),
}

impl IntoResponse for OutcomesResponse {
    fn into_response(self) -> Response {
        match self {
            Self::Ok(json) => json.into_response(),
        }
    }
}

/// `GET /api/schedules?user_id=…` — list a user's schedules.
pub async fn list<SR, RR, OS>(
    State(state): State<AppState<SR, RR, OS>>,
    Query(query): Query<UserQuery>,
) -> Result<ListResponse, ApiError>
where
    SR: ScheduleRepository + Send + Sync + 'static,
    RR: AutomationRuleRepository + Send + Sync + 'static,
    OS: OutcomeStore + Send + Sync + 'static,
{
    let user_id: UserId = parse_id(&query.user_id)?;
    let schedules = state.schedule_service.list_for_user(user_id).await?;
    Ok(ListResponse::Ok(Json(schedules)))
}

/// `GET /api/schedules/:id` — get schedule by ID.
pub async fn get<SR, RR, OS>(
    State(state): State<AppState<SR, RR, OS>>,
    Path(id): Path<String>,
) -> Result<GetResponse, ApiError>
where
    SR: ScheduleRepository + Send + Sync + 'static,
    RR: AutomationRuleRepository + Send + Sync + 'static,
    OS: OutcomeStore + Send + Sync + 'static,
{
    let schedule_id: ScheduleId = parse_id(&id)?;
    let schedule = state.schedule_service.get_schedule(schedule_id).await?;
    Ok(GetResponse::Ok(Json(schedule)))
}

/// `POST /api/schedules` — create a new pending schedule.
pub async fn create<SR, RR, OS>(
    State(state): State<AppState<SR, RR, OS>>,
    Json(req): Json<CreateScheduleRequest>,
) -> Result<CreateResponse, ApiError>
where
    SR: ScheduleRepository + Send + Sync + 'static,
    RR: AutomationRuleRepository + Send + Sync + 'static,
    OS: OutcomeStore + Send + Sync + 'static,
{
    let mut builder = ApplicationSchedule::builder()
        .user_id(req.user_id)
        .job_reference(req.job_reference)
        .scheduled_at(req.scheduled_at);

    if let Some(deadline) = req.deadline {
        builder = builder.deadline(deadline);
    }

    let schedule = builder.build()?;
    let created = state.schedule_service.create_schedule(schedule).await?;
    Ok(CreateResponse::Created(Json(created)))
}

/// `POST /api/schedules/:id/cancel` — cancel a schedule that is not terminal.
pub async fn cancel<SR, RR, OS>(
    State(state): State<AppState<SR, RR, OS>>,
    Path(id): Path<String>,
) -> Result<GetResponse, ApiError>
where
    SR: ScheduleRepository + Send + Sync + 'static,
    RR: AutomationRuleRepository + Send + Sync + 'static,
    OS: OutcomeStore + Send + Sync + 'static,
{
    let schedule_id: ScheduleId = parse_id(&id)?;
    let cancelled = state.schedule_service.cancel_schedule(schedule_id).await?;
    Ok(GetResponse::Ok(Json(cancelled)))
}

/// `GET /api/schedules/:id/outcomes?limit=…` — execution history, newest first.
pub async fn outcomes<SR, RR, OS>(
    State(state): State<AppState<SR, RR, OS>>,
    Path(id): Path<String>,
    Query(query): Query<OutcomeQuery>,
) -> Result<OutcomesResponse, ApiError>
where
    SR: ScheduleRepository + Send + Sync + 'static,
    RR: AutomationRuleRepository + Send + Sync + 'static,
    OS: OutcomeStore + Send + Sync + 'static,
{
    let schedule_id: ScheduleId = parse_id(&id)?;
    let limit = query
        .limit
        .unwrap_or(DEFAULT_OUTCOME_LIMIT)
        .min(MAX_OUTCOME_LIMIT);
    let outcomes = state
        .schedule_service
        .outcomes_for(schedule_id, limit)
        .await?;
    Ok(OutcomesResponse::Ok(Json(outcomes)))
}
