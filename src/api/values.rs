use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
    routing::{delete, get, post},
    Router,
};
use axum_extra::extract::WithRejection;
use uuid::Uuid;

use crate::api::AppState;
use crate::auth::AuthUser;
use crate::errors::{AppError, AppResult};
use crate::models::{
    Area, AwardExperienceRequest, AwardExperienceResponse, CreateAreaRequest, CreateValueRequest,
    Value,
};

pub fn values_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_values).post(create_value))
        .route("/:value_id/experience", post(award_experience))
}

pub fn areas_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_areas).post(create_area))
        .route("/:area_id", delete(delete_area))
}

pub async fn list_values(
    State(state): State<AppState>,
    auth: AuthUser,
) -> AppResult<Json<Vec<Value>>> {
    let values = state.values.list_values(auth.user_id).await?;
    Ok(Json(values))
}

pub async fn create_value(
    State(state): State<AppState>,
    auth: AuthUser,
    WithRejection(Json(request), _): WithRejection<Json<CreateValueRequest>, AppError>,
) -> AppResult<(StatusCode, Json<Value>)> {
    let value = state.values.create_value(auth.user_id, request).await?;
    Ok((StatusCode::CREATED, Json(value)))
}

pub async fn award_experience(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(value_id): Path<Uuid>,
    WithRejection(Json(request), _): WithRejection<Json<AwardExperienceRequest>, AppError>,
) -> AppResult<Json<AwardExperienceResponse>> {
    let response = state
        .values
        .award_experience(auth.user_id, value_id, request)
        .await?;
    Ok(Json(response))
}

pub async fn list_areas(
    State(state): State<AppState>,
    auth: AuthUser,
) -> AppResult<Json<Vec<Area>>> {
    let areas = state.values.list_areas(auth.user_id).await?;
    Ok(Json(areas))
}

pub async fn create_area(
    State(state): State<AppState>,
    auth: AuthUser,
    WithRejection(Json(request), _): WithRejection<Json<CreateAreaRequest>, AppError>,
) -> AppResult<(StatusCode, Json<Area>)> {
    let area = state.values.create_area(auth.user_id, request).await?;
    Ok((StatusCode::CREATED, Json(area)))
}

/// Goals in the area stay; they just lose the link.
pub async fn delete_area(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(area_id): Path<Uuid>,
) -> AppResult<StatusCode> {
    state.values.delete_area(auth.user_id, area_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
