use chrono::NaiveDate;
use tracing::info;
use uuid::Uuid;
use validator::Validate;

use crate::errors::AppResult;
use crate::models::{
    CategorySettings, NeededStepsSettings, UpdateCategorySettingsRequest,
    UpdateNeededStepsSettingsRequest, UpdateUserSettingsRequest, UserSettings,
};
use crate::services::GoalService;
use crate::store::{DynStore, SettingsRepository};

/// Per-user settings. Reads fall back to defaults when no row exists.
#[derive(Clone)]
pub struct SettingsService {
    store: DynStore,
    goals: GoalService,
}

impl SettingsService {
    pub fn new(store: DynStore, goals: GoalService) -> Self {
        Self { store, goals }
    }

    pub async fn user_settings(&self, user_id: Uuid) -> AppResult<UserSettings> {
        Ok(self
            .store
            .get_user_settings(user_id)
            .await?
            .unwrap_or_else(|| UserSettings::defaults(user_id)))
    }

    pub async fn update_user_settings(
        &self,
        user_id: Uuid,
        request: UpdateUserSettingsRequest,
    ) -> AppResult<UserSettings> {
        request.validate()?;
        let mut settings = self.user_settings(user_id).await?;

        if let Some(count) = request.daily_steps_count {
            settings.daily_steps_count = count;
        }
        if let Some(workflow) = request.workflow {
            settings.workflow = workflow;
        }
        if let Some(hour) = request.daily_reset_hour {
            settings.daily_reset_hour = hour;
        }

        Ok(self.store.save_user_settings(&settings).await?)
    }

    pub async fn category_settings(&self, user_id: Uuid) -> AppResult<CategorySettings> {
        Ok(self
            .store
            .get_category_settings(user_id)
            .await?
            .unwrap_or_else(|| CategorySettings::defaults(user_id)))
    }

    /// Saves new thresholds and re-buckets every goal of the user against them.
    pub async fn update_category_settings(
        &self,
        user_id: Uuid,
        request: UpdateCategorySettingsRequest,
        today: NaiveDate,
    ) -> AppResult<CategorySettings> {
        request.validate()?;
        let settings = CategorySettings {
            short_term_days: request.short_term_days,
            long_term_days: request.long_term_days,
            ..CategorySettings::defaults(user_id)
        };
        let settings = self.store.save_category_settings(&settings).await?;

        let goals = self.goals.refresh_categories(user_id, &settings, today).await?;
        info!(user_id = %user_id, goals = goals.len(), "Re-categorized goals");
        Ok(settings)
    }

    pub async fn needed_steps_settings(&self, user_id: Uuid) -> AppResult<NeededStepsSettings> {
        Ok(self
            .store
            .get_needed_steps_settings(user_id)
            .await?
            .unwrap_or_else(|| NeededStepsSettings::defaults(user_id)))
    }

    pub async fn update_needed_steps_settings(
        &self,
        user_id: Uuid,
        request: UpdateNeededStepsSettingsRequest,
    ) -> AppResult<NeededStepsSettings> {
        request.validate()?;
        let mut days = request.days_of_week;
        days.sort_unstable();
        days.dedup();

        let settings = NeededStepsSettings {
            enabled: request.enabled,
            days_of_week: days,
            time_of_day: request.time_of_day,
            ..NeededStepsSettings::defaults(user_id)
        };
        Ok(self.store.save_needed_steps_settings(&settings).await?)
    }
}
