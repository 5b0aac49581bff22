// Step-scoped metrics kept for older clients; goal metrics live under /goals.

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
use crate::models::{CreateStepMetricRequest, Metric, UpdateMetricRequest};

pub fn metrics_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_metrics).post(create_metric))
        .route("/:metric_id", put(update_metric))
}

pub async fn list_metrics(
    State(state): State<AppState>,
    auth: AuthUser,
) -> AppResult<Json<Vec<Metric>>> {
    let metrics = state.steps.list_metrics(auth.user_id).await?;
    Ok(Json(metrics))
}

pub async fn create_metric(
    State(state): State<AppState>,
    auth: AuthUser,
    WithRejection(Json(request), _): WithRejection<Json<CreateStepMetricRequest>, AppError>,
) -> AppResult<(StatusCode, Json<Metric>)> {
    let metric = state.steps.create_metric(auth.user_id, request).await?;
    Ok((StatusCode::CREATED, Json(metric)))
}

pub async fn update_metric(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(metric_id): Path<Uuid>,
    WithRejection(Json(request), _): WithRejection<Json<UpdateMetricRequest>, AppError>,
) -> AppResult<Json<Metric>> {
    let metric = state
        .steps
        .update_metric(auth.user_id, metric_id, request)
        .await?;
    Ok(Json(metric))
}
