use anyhow::{anyhow, Result};
use chrono::Local;
use std::sync::Arc;
use tokio::sync::RwLock;
use tokio_cron_scheduler::{Job, JobScheduler};
use tracing::{error, info};

use crate::services::DailyResetService;

/// Top of every hour.
const HOURLY: &str = "0 0 * * * *";

/// In-process trigger for the daily reset. Off unless `SCHEDULER_ENABLED`;
/// the `/api/cron/daily-reset` endpoint is the primary path.
pub struct BackgroundJobService {
    scheduler: Arc<RwLock<JobScheduler>>,
    daily_reset: DailyResetService,
}

impl BackgroundJobService {
    pub async fn new(daily_reset: DailyResetService) -> Result<Self> {
        let scheduler = JobScheduler::new()
            .await
            .map_err(|e| anyhow!("Failed to create job scheduler: {}", e))?;

        Ok(Self {
            scheduler: Arc::new(RwLock::new(scheduler)),
            daily_reset,
        })
    }

    /// Start the background job scheduler
    pub async fn start(&self) -> Result<()> {
        self.add_daily_reset_job().await?;

        let scheduler = self.scheduler.read().await;
        scheduler
            .start()
            .await
            .map_err(|e| anyhow!("Failed to start job scheduler: {}", e))?;

        info!("Background job scheduler started");
        Ok(())
    }

    /// Stop the background job scheduler
    pub async fn stop(&self) -> Result<()> {
        let mut scheduler = self.scheduler.write().await;
        scheduler
            .shutdown()
            .await
            .map_err(|e| anyhow!("Failed to stop job scheduler: {}", e))?;

        info!("Background job scheduler stopped");
        Ok(())
    }

    async fn add_daily_reset_job(&self) -> Result<()> {
        let daily_reset = self.daily_reset.clone();

        let job = Job::new_async(HOURLY, move |_uuid, _lock| {
            let daily_reset = daily_reset.clone();
            Box::pin(async move {
                match daily_reset.run(Local::now().naive_local()).await {
                    Ok(report) => info!(
                        reset = report.reset_count(),
                        failed = report.failed_count(),
                        "Scheduled daily reset completed"
                    ),
                    Err(e) => error!("Scheduled daily reset failed: {}", e),
                }
            })
        })
        .map_err(|e| anyhow!("Failed to create daily reset job: {}", e))?;

        let scheduler = self.scheduler.read().await;
        scheduler
            .add(job)
            .await
            .map_err(|e| anyhow!("Failed to schedule daily reset job: {}", e))?;

        Ok(())
    }
}
