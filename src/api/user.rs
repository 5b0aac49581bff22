use axum::{extract::State, response::Json, routing::{get, post}, Router};

use crate::api::AppState;
use crate::auth::AuthUser;
use crate::errors::AppResult;
use crate::models::UserResponse;

pub fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/me", get(get_me))
        .route("/me/onboarding", post(complete_onboarding))
}

/// The caller's profile; the row was created by the extractor if needed.
pub async fn get_me(
    State(state): State<AppState>,
    auth: AuthUser,
) -> AppResult<Json<UserResponse>> {
    let user = state.users.get_user(auth.user_id).await?;
    Ok(Json(user.into()))
}

pub async fn complete_onboarding(
    State(state): State<AppState>,
    auth: AuthUser,
) -> AppResult<Json<UserResponse>> {
    let user = state.users.complete_onboarding(auth.user_id).await?;
    Ok(Json(user.into()))
}
