use axum::{ extract::{ Path, Query, State }, http::StatusCode, Json };
use serde::{ Deserialize, Serialize };
use uuid::Uuid;

use crate::error::Result;
use crate::rules::{ AlertEvent, AlertRule, RuleParams };

use super::AppState;

#[derive(Deserialize)]
pub struct CreateRuleRequest {
    pub text: String,
    #[serde(default)]
    pub owner_id: Option<String>,
}

#[derive(Deserialize)]
pub struct ToggleRuleRequest {
    pub active: bool,
}

#[derive(Deserialize)]
pub struct ParseRuleRequest {
    pub text: String,
}

#[derive(Deserialize)]
pub struct EventsQuery {
    #[serde(default)]
    pub limit: Option<u64>,
}

#[derive(Serialize)]
pub struct ParseRuleResponse {
    pub rule_type: String,
    pub params: RuleParams,
}

pub async fn list_rules(State(state): State<AppState>) -> Result<Json<Vec<AlertRule>>> {
    let rules = state.alert_rule_service.list_rules().await?;
    Ok(Json(rules))
}

pub async fn create_rule(
    State(state): State<AppState>,
    Json(request): Json<CreateRuleRequest>
) -> Result<(StatusCode, Json<AlertRule>)> {
    let rule = state.alert_rule_service.create_rule_from_text(
        &request.text,
        request.owner_id
    ).await?;

    Ok((StatusCode::CREATED, Json(rule)))
}

pub async fn get_rule(
    State(state): State<AppState>,
    Path(rule_id): Path<Uuid>
) -> Result<Json<AlertRule>> {
    let rule = state.alert_rule_service.get_rule(rule_id).await?;
    Ok(Json(rule))
}

pub async fn toggle_rule(
    State(state): State<AppState>,
    Path(rule_id): Path<Uuid>,
    Json(request): Json<ToggleRuleRequest>
) -> Result<Json<AlertRule>> {
    let rule = state.alert_rule_service.set_active(rule_id, request.active).await?;
    Ok(Json(rule))
}

pub async fn delete_rule(
    State(state): State<AppState>,
    Path(rule_id): Path<Uuid>
) -> Result<StatusCode> {
    state.alert_rule_service.delete_rule(rule_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn parse_rule(
    State(state): State<AppState>,
    Json(request): Json<ParseRuleRequest>
) -> Result<Json<ParseRuleResponse>> {
    let params = state.alert_rule_service.preview(&request.text)?;

    Ok(
        Json(ParseRuleResponse {
            rule_type: params.rule_type().to_string(),
            params,
        })
    )
}

pub async fn list_events(
    State(state): State<AppState>,
    Query(query): Query<EventsQuery>
) -> Result<Json<Vec<AlertEvent>>> {
    let events = state.alert_rule_service.list_recent_events(query.limit).await?;
    Ok(Json(events))
}
