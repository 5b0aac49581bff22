use axum::{extract::State, response::Json, routing::get, Router};
use axum_extra::extract::WithRejection;
use chrono::Local;

use crate::api::AppState;
use crate::auth::AuthUser;
use crate::errors::{AppError, AppResult};
use crate::models::{
    CategorySettings, NeededStepsSettings, UpdateCategorySettingsRequest,
    UpdateNeededStepsSettingsRequest, UpdateUserSettingsRequest, UserSettings,
};

pub fn settings_routes() -> Router<AppState> {
    Router::new()
        .route("/user", get(get_user_settings).put(update_user_settings))
        .route("/categories", get(get_category_settings).put(update_category_settings))
        .route(
            "/needed-steps",
            get(get_needed_steps_settings).put(update_needed_steps_settings),
        )
}

pub async fn get_user_settings(
    State(state): State<AppState>,
    auth: AuthUser,
) -> AppResult<Json<UserSettings>> {
    let settings = state.settings.user_settings(auth.user_id).await?;
    Ok(Json(settings))
}

pub async fn update_user_settings(
    State(state): State<AppState>,
    auth: AuthUser,
    WithRejection(Json(request), _): WithRejection<Json<UpdateUserSettingsRequest>, AppError>,
) -> AppResult<Json<UserSettings>> {
    let settings = state
        .settings
        .update_user_settings(auth.user_id, request)
        .await?;
    Ok(Json(settings))
}

pub async fn get_category_settings(
    State(state): State<AppState>,
    auth: AuthUser,
) -> AppResult<Json<CategorySettings>> {
    let settings = state.settings.category_settings(auth.user_id).await?;
    Ok(Json(settings))
}

/// Saving thresholds re-buckets every goal of the caller.
pub async fn update_category_settings(
    State(state): State<AppState>,
    auth: AuthUser,
    WithRejection(Json(request), _): WithRejection<Json<UpdateCategorySettingsRequest>, AppError>,
) -> AppResult<Json<CategorySettings>> {
    let today = Local::now().date_naive();
    let settings = state
        .settings
        .update_category_settings(auth.user_id, request, today)
        .await?;
    Ok(Json(settings))
}

pub async fn get_needed_steps_settings(
    State(state): State<AppState>,
    auth: AuthUser,
) -> AppResult<Json<NeededStepsSettings>> {
    let settings = state.settings.needed_steps_settings(auth.user_id).await?;
    Ok(Json(settings))
}

pub async fn update_needed_steps_settings(
    State(state): State<AppState>,
    auth: AuthUser,
    WithRejection(Json(request), _): WithRejection<Json<UpdateNeededStepsSettingsRequest>, AppError>,
) -> AppResult<Json<NeededStepsSettings>> {
    let settings = state
        .settings
        .update_needed_steps_settings(auth.user_id, request)
        .await?;
    Ok(Json(settings))
}
