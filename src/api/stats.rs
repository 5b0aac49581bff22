use axum::{
    extract::{Query, State},
    response::Json,
    routing::get,
    Router,
};
use axum_extra::extract::WithRejection;
use chrono::Local;

use crate::api::AppState;
use crate::auth::AuthUser;
use crate::errors::{AppError, AppResult};
use crate::models::{DailyStats, StatsQuery, StatsSummary, UserStreak};

pub fn stats_routes() -> Router<AppState> {
    Router::new()
        .route("/daily", get(list_daily_stats))
        .route("/summary", get(get_summary))
        .route("/streak", get(get_streak).post(update_streak))
}

pub async fn list_daily_stats(
    State(state): State<AppState>,
    auth: AuthUser,
    WithRejection(Query(query), _): WithRejection<Query<StatsQuery>, AppError>,
) -> AppResult<Json<Vec<DailyStats>>> {
    let stats = state
        .stats
        .daily_stats(auth.user_id, query.from, query.to)
        .await?;
    Ok(Json(stats))
}

pub async fn get_summary(
    State(state): State<AppState>,
    auth: AuthUser,
    WithRejection(Query(query), _): WithRejection<Query<StatsQuery>, AppError>,
) -> AppResult<Json<StatsSummary>> {
    let summary = state.stats.summary(auth.user_id, query.from, query.to).await?;
    Ok(Json(summary))
}

pub async fn get_streak(
    State(state): State<AppState>,
    auth: AuthUser,
) -> AppResult<Json<UserStreak>> {
    let streak = state.stats.get_streak(auth.user_id).await?;
    Ok(Json(streak))
}

/// Records activity for today; repeated calls on the same day change nothing.
pub async fn update_streak(
    State(state): State<AppState>,
    auth: AuthUser,
) -> AppResult<Json<UserStreak>> {
    let today = Local::now().date_naive();
    let streak = state.stats.update_streak(auth.user_id, today).await?;
    Ok(Json(streak))
}
