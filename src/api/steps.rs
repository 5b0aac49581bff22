use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
    routing::{get, post},
    Router,
};
use axum_extra::extract::WithRejection;
use chrono::Utc;
use uuid::Uuid;

use crate::api::AppState;
use crate::auth::AuthUser;
use crate::errors::{AppError, AppResult};
use crate::models::{
    CreateStepRequest, DailyStep, StepFilter, ToggleStepRequest, ToggleStepResponse,
    UpdateStepRequest,
};

pub fn steps_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_steps).post(create_step))
        .route("/:step_id", get(get_step).put(update_step).delete(delete_step))
        .route("/:step_id/toggle", post(toggle_step))
}

/// Steps of the caller, optionally narrowed to one date and/or one goal
pub async fn list_steps(
    State(state): State<AppState>,
    auth: AuthUser,
    WithRejection(Query(filter), _): WithRejection<Query<StepFilter>, AppError>,
) -> AppResult<Json<Vec<DailyStep>>> {
    let steps = state.steps.list_steps(auth.user_id, filter).await?;
    Ok(Json(steps))
}

pub async fn create_step(
    State(state): State<AppState>,
    auth: AuthUser,
    WithRejection(Json(request), _): WithRejection<Json<CreateStepRequest>, AppError>,
) -> AppResult<(StatusCode, Json<DailyStep>)> {
    let step = state.steps.create_step(auth.user_id, request).await?;
    Ok((StatusCode::CREATED, Json(step)))
}

pub async fn get_step(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(step_id): Path<Uuid>,
) -> AppResult<Json<DailyStep>> {
    let step = state.steps.get_step(auth.user_id, step_id).await?;
    Ok(Json(step))
}

pub async fn update_step(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(step_id): Path<Uuid>,
    WithRejection(Json(request), _): WithRejection<Json<UpdateStepRequest>, AppError>,
) -> AppResult<Json<DailyStep>> {
    let step = state.steps.update_step(auth.user_id, step_id, request).await?;
    Ok(Json(step))
}

pub async fn delete_step(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(step_id): Path<Uuid>,
) -> AppResult<StatusCode> {
    state.steps.delete_step(auth.user_id, step_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn toggle_step(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(step_id): Path<Uuid>,
    WithRejection(Json(request), _): WithRejection<Json<ToggleStepRequest>, AppError>,
) -> AppResult<Json<ToggleStepResponse>> {
    let response = state
        .steps
        .toggle_step(auth.user_id, step_id, request.completed, Utc::now())
        .await?;
    Ok(Json(response))
}
