// Scheduler-facing endpoints, authenticated by the shared cron secret.

use axum::{extract::State, response::Json, routing::post, Router};
use chrono::Local;
use serde_json::{json, Value};
use tracing::info;

use crate::api::AppState;
use crate::auth::CronCaller;
use crate::errors::AppResult;

pub fn cron_routes() -> Router<AppState> {
    Router::new()
        .route("/daily-reset", post(run_daily_reset))
        .route("/smart-events", post(run_smart_event_generation))
}

/// Intended to be called once an hour; only users whose reset hour matches
/// (or, in catch-up mode, has passed) are processed.
pub async fn run_daily_reset(
    State(state): State<AppState>,
    _caller: CronCaller,
) -> AppResult<Json<Value>> {
    let report = state.daily_reset.run(Local::now().naive_local()).await?;
    info!(
        reset = report.reset_count(),
        failed = report.failed_count(),
        "Daily reset triggered over HTTP"
    );

    Ok(Json(json!({
        "success": true,
        "reset_count": report.reset_count(),
        "failed_count": report.failed_count(),
        "report": report,
    })))
}

pub async fn run_smart_event_generation(
    State(state): State<AppState>,
    _caller: CronCaller,
) -> AppResult<Json<Value>> {
    let today = Local::now().date_naive();
    let report = state.automations.generate_for_all_users(today).await?;

    Ok(Json(json!({
        "success": report.failures.is_empty(),
        "report": report,
    })))
}
