use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
    routing::{get, put},
    Router,
};
use axum_extra::extract::WithRejection;
use uuid::Uuid;

use crate::api::AppState;
use crate::auth::AuthUser;
use crate::errors::{AppError, AppResult};
use crate::models::{Automation, CreateAutomationRequest, UpdateAutomationRequest};

pub fn automations_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_automations).post(create_automation))
        .route("/:automation_id", put(update_automation).delete(delete_automation))
}

pub async fn list_automations(
    State(state): State<AppState>,
    auth: AuthUser,
) -> AppResult<Json<Vec<Automation>>> {
    let automations = state.automations.list_automations(auth.user_id).await?;
    Ok(Json(automations))
}

/// Accepts either a structured `schedule` or the older
/// `frequency_type`/`frequency_time`/`scheduled_date` fields.
pub async fn create_automation(
    State(state): State<AppState>,
    auth: AuthUser,
    WithRejection(Json(request), _): WithRejection<Json<CreateAutomationRequest>, AppError>,
) -> AppResult<(StatusCode, Json<Automation>)> {
    let automation = state
        .automations
        .create_automation(auth.user_id, request)
        .await?;
    Ok((StatusCode::CREATED, Json(automation)))
}

pub async fn update_automation(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(automation_id): Path<Uuid>,
    WithRejection(Json(request), _): WithRejection<Json<UpdateAutomationRequest>, AppError>,
) -> AppResult<Json<Automation>> {
    let automation = state
        .automations
        .update_automation(auth.user_id, automation_id, request)
        .await?;
    Ok(Json(automation))
}

pub async fn delete_automation(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(automation_id): Path<Uuid>,
) -> AppResult<StatusCode> {
    state
        .automations
        .delete_automation(auth.user_id, automation_id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
