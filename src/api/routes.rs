use axum::{routing::get, Router};
use tower_http::trace::TraceLayer;

use super::automations::automations_routes;
use super::cron::cron_routes;
use super::goals::goals_routes;
use super::health::health_check;
use super::metrics::metrics_routes;
use super::planning::planning_routes;
use super::settings::settings_routes;
use super::smart_events::smart_events_routes;
use super::stats::stats_routes;
use super::steps::steps_routes;
use super::user::user_routes;
use super::values::{areas_routes, values_routes};
use super::AppState;
use crate::auth::cors_layer;

pub fn create_routes(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .nest("/api/user", user_routes())
        .nest("/api/goals", goals_routes())
        .nest("/api/steps", steps_routes())
        .nest("/api/metrics", metrics_routes())
        .nest("/api/planning", planning_routes())
        .nest("/api/automations", automations_routes())
        .nest("/api/smart-events", smart_events_routes())
        .nest("/api/settings", settings_routes())
        .nest("/api/stats", stats_routes())
        .nest("/api/values", values_routes())
        .nest("/api/areas", areas_routes())
        .nest("/api/cron", cron_routes())
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer())
        .with_state(state)
}
