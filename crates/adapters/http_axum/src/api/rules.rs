//! JSON REST handlers for automation rules.

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Deserialize;

use autoapply_app::ports::{AutomationRuleRepository, OutcomeStore, ScheduleRepository};
use autoapply_domain::automation::{AutomationRule, RuleAction, RuleTrigger};
use autoapply_domain::id::{RuleId, UserId};

use super::parse_id;
use crate::api::schedules::UserQuery;
use crate::error::ApiError;
use crate::state::AppState;

/// Request body for creating a rule.
#[derive(Deserialize)]
pub struct CreateRuleRequest {
    pub user_id: UserId,
    pub name: String,
    pub trigger: RuleTrigger,
    pub action: RuleAction,
    pub enabled: Option<bool>,
}

/// Request body for updating a rule.
#[derive(Deserialize)]
pub struct UpdateRuleRequest {
    pub name: String,
    pub trigger: RuleTrigger,
    pub action: RuleAction,
    pub enabled: bool,
    /// Keeps the current position when absent.
    pub position: Option<u32>,
}

/// Possible responses from the list endpoint.
pub enum ListResponse {
    Ok(Json<Vec<AutomationRule>>),
}

impl IntoResponse for ListResponse {
    fn into_response(self) -> Response {
        match self {
            Self::Ok(json) => json.into_response(),
        }
    }
}

/// Possible responses from the get endpoint.
pub enum GetResponse {
    Ok(Json<AutomationRule>),
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
    Created(Json<AutomationRule>),
}

impl IntoResponse for CreateResponse {
    fn into_response(self) -> Response {
        match self {
            Self::Created(json) => (StatusCode::CREATED, json).into_response(),
        }
    }
}

/// Possible responses from the delete endpoint.
pub enum DeleteResponse {
    NoContent,
}

impl IntoResponse for DeleteResponse {
    fn into_response(self) -> Response {
        match self {
            Self::NoContent => StatusCode::NO_CONTENT.into_response(),
        }
    }
}

/// `GET /api/rules?user_id=…` — list a user's rules in evaluation order.
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
    let rules = state.rule_service.list_for_user(user_id).await?;
    Ok(ListResponse::Ok(Json(rules)))
}

/// `GET /api/rules/:id` — get rule by ID.
pub async fn get<SR, RR, OS>(
    State(state): State<AppState<SR, RR, OS>>,
    Path(id): Path<String>,
) -> Result<GetResponse, ApiError>
where
    SR: ScheduleRepository + Send + Sync + 'static,
    RR: AutomationRuleRepository + Send + Sync + 'static,
    OS: OutcomeStore + Send + Sync + 'static,
{
    let rule_id: RuleId = parse_id(&id)?;
    let rule = state.rule_service.get_rule(rule_id).await?;
    Ok(GetResponse::Ok(Json(rule)))
}

/// `POST /api/rules` — create a rule after the user's existing ones.
pub async fn create<SR, RR, OS>(
    State(state): State<AppState<SR, RR, OS>>,
    Json(req): Json<CreateRuleRequest>,
) -> Result<CreateResponse, ApiError>
where
    SR: ScheduleRepository + Send + Sync + 'static,
    RR: AutomationRuleRepository + Send + Sync + 'static,
    OS: OutcomeStore + Send + Sync + 'static,
{
    let mut builder = AutomationRule::builder()
        .user_id(req.user_id)
        .name(req.name)
        .trigger(req.trigger)
        .action(req.action);

    if let Some(enabled) = req.enabled {
        builder = builder.enabled(enabled);
    }

    let rule = builder.build()?;
    let created = state.rule_service.create_rule(rule).await?;
    Ok(CreateResponse::Created(Json(created)))
}

/// `PUT /api/rules/:id` — update an existing rule.
pub async fn update<SR, RR, OS>(
    State(state): State<AppState<SR, RR, OS>>,
    Path(id): Path<String>,
    Json(req): Json<UpdateRuleRequest>,
) -> Result<GetResponse, ApiError>
where
    SR: ScheduleRepository + Send + Sync + 'static,
    RR: AutomationRuleRepository + Send + Sync + 'static,
    OS: OutcomeStore + Send + Sync + 'static,
{
    let rule_id: RuleId = parse_id(&id)?;
    let current = state.rule_service.get_rule(rule_id).await?;

    let rule = AutomationRule::builder()
        .id(rule_id)
        .user_id(current.user_id)
        .name(req.name)
        .trigger(req.trigger)
        .action(req.action)
        .enabled(req.enabled)
        .position(req.position.unwrap_or(current.position))
        .created_at(current.created_at)
        .build()?;
    let updated = state.rule_service.update_rule(rule).await?;
    Ok(GetResponse::Ok(Json(updated)))
}

/// `DELETE /api/rules/:id` — delete a rule.
pub async fn delete<SR, RR, OS>(
    State(state): State<AppState<SR, RR, OS>>,
    Path(id): Path<String>,
) -> Result<DeleteResponse, ApiError>
where
    SR: ScheduleRepository + Send + Sync + 'static,
    RR: AutomationRuleRepository + Send + Sync + 'static,
    OS: OutcomeStore + Send + Sync + 'static,
{
    let rule_id: RuleId = parse_id(&id)?;
    state.rule_service.delete_rule(rule_id).await?;
    Ok(DeleteResponse::NoContent)
}
