use axum::{
    extract::{Path, State},
    response::Json,
    routing::{get, post},
    Router,
};
use chrono::{Local, Utc};
use uuid::Uuid;

use crate::api::AppState;
use crate::auth::AuthUser;
use crate::errors::AppResult;
use crate::models::{EventInteraction, PostponeInteractionRequest, SmartEvent};

pub fn smart_events_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_smart_events))
        .route("/interactions/:interaction_id/complete", post(complete_interaction))
        .route("/interactions/:interaction_id/postpone", post(postpone_interaction))
}

/// Today's pending events. Runs the generation pass first, which is a no-op
/// for automations that already fired today.
pub async fn list_smart_events(
    State(state): State<AppState>,
    auth: AuthUser,
) -> AppResult<Json<Vec<SmartEvent>>> {
    let today = Local::now().date_naive();
    let events = state
        .automations
        .list_smart_events(auth.user_id, today)
        .await?;
    Ok(Json(events))
}

pub async fn complete_interaction(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(interaction_id): Path<Uuid>,
) -> AppResult<Json<EventInteraction>> {
    let interaction = state
        .automations
        .complete_interaction(auth.user_id, interaction_id, Utc::now())
        .await?;
    Ok(Json(interaction))
}

/// An empty body postpones to the next local midnight.
pub async fn postpone_interaction(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(interaction_id): Path<Uuid>,
    body: Option<Json<PostponeInteractionRequest>>,
) -> AppResult<Json<EventInteraction>> {
    let request = body.map(|Json(request)| request).unwrap_or_default();
    let today = Local::now().date_naive();
    let interaction = state
        .automations
        .postpone_interaction(auth.user_id, interaction_id, request.postpone_to, today)
        .await?;
    Ok(Json(interaction))
}
