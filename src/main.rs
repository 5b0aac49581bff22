use std::sync::Arc;

use pokrok::api::{create_routes, AppState};
use pokrok::config::{run_migrations, AppConfig, DatabaseConfig};
use pokrok::services::BackgroundJobService;
use pokrok::store::{DynStore, PgStore};
use tokio::net::TcpListener;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let config = AppConfig::from_env()?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level)),
        )
        .init();

    let db_config = DatabaseConfig::from_env()?;
    let pool = db_config.create_pool().await?;
    run_migrations(&pool).await?;
    info!("Database migrations applied");

    if config.cron_secret.is_none() {
        warn!("CRON_SECRET is not set; /api/cron endpoints will reject every request");
    }

    let store: DynStore = Arc::new(PgStore::new(pool));
    let address = config.server_address();
    let scheduler_enabled = config.scheduler_enabled;
    let state = AppState::new(store, config);

    let scheduler = if scheduler_enabled {
        let jobs = BackgroundJobService::new(state.daily_reset.clone()).await?;
        jobs.start().await?;
        Some(jobs)
    } else {
        None
    };

    let app = create_routes(state);

    let listener = TcpListener::bind(&address).await?;
    info!("Pokrok server starting on http://{}", address);
    info!("Health check available at http://{}/health", address);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    if let Some(jobs) = scheduler {
        jobs.stop().await?;
    }

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for shutdown signal: {}", e);
    }
    info!("Shutting down");
}
