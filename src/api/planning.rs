use axum::{
    extract::{Path, State},
    response::Json,
    routing::{get, post},
    Router,
};
use axum_extra::extract::WithRejection;
use chrono::NaiveDate;

use crate::api::AppState;
use crate::auth::AuthUser;
use crate::errors::{AppError, AppResult};
use crate::models::{CompletePlannedStepRequest, DailyPlanning, UpsertPlanningRequest};

pub fn planning_routes() -> Router<AppState> {
    Router::new()
        .route("/:date", get(get_planning).put(upsert_planning))
        .route("/:date/complete", post(complete_planned_step))
}

/// The planning for one date, or `null` when none exists yet. Reading never
/// creates a record.
pub async fn get_planning(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(date): Path<NaiveDate>,
) -> AppResult<Json<Option<DailyPlanning>>> {
    let planning = state.planning.get_planning(auth.user_id, date).await?;
    Ok(Json(planning))
}

pub async fn upsert_planning(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(date): Path<NaiveDate>,
    WithRejection(Json(request), _): WithRejection<Json<UpsertPlanningRequest>, AppError>,
) -> AppResult<Json<DailyPlanning>> {
    let planning = state
        .planning
        .upsert_planning(auth.user_id, date, request.planned_steps)
        .await?;
    Ok(Json(planning))
}

pub async fn complete_planned_step(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(date): Path<NaiveDate>,
    WithRejection(Json(request), _): WithRejection<Json<CompletePlannedStepRequest>, AppError>,
) -> AppResult<Json<DailyPlanning>> {
    let planning = state
        .planning
        .mark_step_completed(auth.user_id, date, request.step_id)
        .await?;
    Ok(Json(planning))
}
