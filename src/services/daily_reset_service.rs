use chrono::{NaiveDate, NaiveDateTime, Timelike, Utc};
use serde::Serialize;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::config::ResetMode;
use crate::errors::{AppError, AppResult};
use crate::models::{DailyStats, UserSettings};
use crate::store::{DynStore, PlanningRepository, SettingsRepository, StatsRepository, StepRepository};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ResetOutcome {
    Reset { stats: DailyStats },
    Skipped { reason: String },
    Failed { error: String },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UserResetResult {
    pub user_id: Uuid,
    #[serde(flatten)]
    pub outcome: ResetOutcome,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResetReport {
    pub date: NaiveDate,
    pub hour: u32,
    pub mode: ResetMode,
    pub results: Vec<UserResetResult>,
}

impl ResetReport {
    pub fn reset_count(&self) -> usize {
        self.count(|o| matches!(o, ResetOutcome::Reset { .. }))
    }

    pub fn failed_count(&self) -> usize {
        self.count(|o| matches!(o, ResetOutcome::Failed { .. }))
    }

    fn count(&self, predicate: impl Fn(&ResetOutcome) -> bool) -> usize {
        self.results.iter().filter(|r| predicate(&r.outcome)).count()
    }
}

/// Closes out yesterday's planning into a stats row and opens an empty
/// planning record for today.
#[derive(Clone)]
pub struct DailyResetService {
    store: DynStore,
    mode: ResetMode,
}

impl DailyResetService {
    pub fn new(store: DynStore, mode: ResetMode) -> Self {
        Self { store, mode }
    }

    pub fn mode(&self) -> ResetMode {
        self.mode
    }

    /// One pass over all users at local time `now`. Users who are not due
    /// this hour do not appear in the report.
    #[instrument(skip(self), fields(mode = ?self.mode))]
    pub async fn run(&self, now: NaiveDateTime) -> AppResult<ResetReport> {
        let today = now.date();
        let hour = now.hour();
        let yesterday = today
            .pred_opt()
            .ok_or_else(|| AppError::invalid("date out of range"))?;

        let mut results = Vec::new();
        for settings in self.store.list_user_settings().await? {
            let user_id = settings.user_id;
            let outcome = match self.is_due(&settings, hour, yesterday).await {
                Ok(false) => continue,
                Ok(true) => self.reset_user(&settings, yesterday, today).await,
                Err(err) => Err(err),
            };

            let outcome = outcome.unwrap_or_else(|err| {
                warn!(user_id = %user_id, "Daily reset failed: {}", err);
                ResetOutcome::Failed {
                    error: match err {
                        AppError::Internal(inner) => format!("{:#}", inner),
                        other => other.to_string(),
                    },
                }
            });
            results.push(UserResetResult { user_id, outcome });
        }

        let report = ResetReport {
            date: today,
            hour,
            mode: self.mode,
            results,
        };
        info!(
            hour,
            due = report.results.len(),
            reset = report.reset_count(),
            failed = report.failed_count(),
            "Daily reset finished"
        );
        Ok(report)
    }

    async fn is_due(&self, settings: &UserSettings, hour: u32, yesterday: NaiveDate) -> AppResult<bool> {
        let reset_hour = u32::try_from(settings.daily_reset_hour).unwrap_or(0);
        match self.mode {
            ResetMode::ExactHour => Ok(hour == reset_hour),
            ResetMode::CatchUp => {
                if hour < reset_hour {
                    return Ok(false);
                }
                let archived = self
                    .store
                    .get_daily_stats(settings.user_id, yesterday)
                    .await?;
                Ok(archived.is_none())
            }
        }
    }

    /// Archives `yesterday` for one user and replaces today's planning with an
    /// empty record. Without a planning record for yesterday nothing is
    /// written. When yesterday was already archived, the stats row is
    /// refreshed and today's planning is left as the user has it, so a second
    /// pass in the same hour cannot wipe a plan saved in between.
    pub async fn reset_user(
        &self,
        settings: &UserSettings,
        yesterday: NaiveDate,
        today: NaiveDate,
    ) -> AppResult<ResetOutcome> {
        let user_id = settings.user_id;
        let Some(planning) = self.store.get_planning(user_id, yesterday).await? else {
            return Ok(ResetOutcome::Skipped {
                reason: format!("no planning for {}", yesterday),
            });
        };

        let planned = planning.planned_steps.len() as i32;
        let completed = planning.completed_steps.len() as i32;
        let total = self.store.count_steps_on(user_id, yesterday).await?;

        let stats = DailyStats {
            id: Uuid::new_v4(),
            user_id,
            date: yesterday,
            planned_steps_count: planned,
            completed_steps_count: completed,
            total_steps_count: i32::try_from(total).unwrap_or(i32::MAX),
            optimum_deviation: planned - settings.daily_steps_count,
            created_at: Utc::now(),
        };
        let already_archived = self
            .store
            .get_daily_stats(user_id, yesterday)
            .await?
            .is_some();
        let stats = self.store.upsert_daily_stats(&stats).await?;
        if !already_archived || self.store.get_planning(user_id, today).await?.is_none() {
            self.store.reset_planning(user_id, today).await?;
        }

        Ok(ResetOutcome::Reset { stats })
    }
}
