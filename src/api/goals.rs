use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
    routing::{get, post, put},
    Router,
};
use axum_extra::extract::WithRejection;
use chrono::Local;
use uuid::Uuid;

use crate::api::AppState;
use crate::auth::AuthUser;
use crate::errors::{AppError, AppResult};
use crate::models::{
    CreateGoalRequest, CreateMetricRequest, Goal, GoalMetric, SetProgressRequest,
    UpdateGoalRequest, UpdateMetricRequest,
};

pub fn goals_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_goals).post(create_goal))
        .route("/:goal_id", get(get_goal).put(update_goal).delete(delete_goal))
        .route("/:goal_id/progress", post(set_progress))
        .route("/:goal_id/recompute", post(recompute_progress))
        .route("/:goal_id/metrics", get(list_goal_metrics).post(create_goal_metric))
        .route(
            "/:goal_id/metrics/:metric_id",
            put(update_goal_metric).delete(delete_goal_metric),
        )
}

/// All goals of the caller, with categories brought up to date
pub async fn list_goals(
    State(state): State<AppState>,
    auth: AuthUser,
) -> AppResult<Json<Vec<Goal>>> {
    let today = Local::now().date_naive();
    let goals = state.goals.list_goals(auth.user_id, today).await?;
    Ok(Json(goals))
}

pub async fn create_goal(
    State(state): State<AppState>,
    auth: AuthUser,
    WithRejection(Json(request), _): WithRejection<Json<CreateGoalRequest>, AppError>,
) -> AppResult<(StatusCode, Json<Goal>)> {
    let today = Local::now().date_naive();
    let goal = state.goals.create_goal(auth.user_id, request, today).await?;
    Ok((StatusCode::CREATED, Json(goal)))
}

pub async fn get_goal(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(goal_id): Path<Uuid>,
) -> AppResult<Json<Goal>> {
    let goal = state.goals.get_goal(auth.user_id, goal_id).await?;
    Ok(Json(goal))
}

pub async fn update_goal(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(goal_id): Path<Uuid>,
    WithRejection(Json(request), _): WithRejection<Json<UpdateGoalRequest>, AppError>,
) -> AppResult<Json<Goal>> {
    let today = Local::now().date_naive();
    let goal = state
        .goals
        .update_goal(auth.user_id, goal_id, request, today)
        .await?;
    Ok(Json(goal))
}

pub async fn delete_goal(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(goal_id): Path<Uuid>,
) -> AppResult<StatusCode> {
    state.goals.delete_goal(auth.user_id, goal_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Manual progress entry: `percentage` for percentage goals, `current` for
/// count and amount goals.
pub async fn set_progress(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(goal_id): Path<Uuid>,
    WithRejection(Json(request), _): WithRejection<Json<SetProgressRequest>, AppError>,
) -> AppResult<Json<Goal>> {
    let goal = state
        .progress
        .apply_manual(auth.user_id, goal_id, request)
        .await?;
    Ok(Json(goal))
}

pub async fn recompute_progress(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(goal_id): Path<Uuid>,
) -> AppResult<Json<Goal>> {
    let goal = state.progress.recompute(auth.user_id, goal_id).await?;
    Ok(Json(goal))
}

pub async fn list_goal_metrics(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(goal_id): Path<Uuid>,
) -> AppResult<Json<Vec<GoalMetric>>> {
    let metrics = state.goals.list_goal_metrics(auth.user_id, goal_id).await?;
    Ok(Json(metrics))
}

pub async fn create_goal_metric(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(goal_id): Path<Uuid>,
    WithRejection(Json(request), _): WithRejection<Json<CreateMetricRequest>, AppError>,
) -> AppResult<(StatusCode, Json<GoalMetric>)> {
    let metric = state
        .goals
        .create_goal_metric(auth.user_id, goal_id, request)
        .await?;
    Ok((StatusCode::CREATED, Json(metric)))
}

pub async fn update_goal_metric(
    State(state): State<AppState>,
    auth: AuthUser,
    Path((goal_id, metric_id)): Path<(Uuid, Uuid)>,
    WithRejection(Json(request), _): WithRejection<Json<UpdateMetricRequest>, AppError>,
) -> AppResult<Json<GoalMetric>> {
    let metric = state
        .goals
        .update_goal_metric(auth.user_id, goal_id, metric_id, request)
        .await?;
    Ok(Json(metric))
}

pub async fn delete_goal_metric(
    State(state): State<AppState>,
    auth: AuthUser,
    Path((goal_id, metric_id)): Path<(Uuid, Uuid)>,
) -> AppResult<StatusCode> {
    state
        .goals
        .delete_goal_metric(auth.user_id, goal_id, metric_id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
