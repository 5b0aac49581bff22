use chrono::{NaiveDate, Utc};
use tracing::info;
use uuid::Uuid;
use validator::Validate;

use crate::errors::{AppError, AppResult};
use crate::models::{
    CategorySettings, CreateGoalRequest, CreateMetricRequest, Goal, GoalMetric, ProgressKind,
    ProgressSource, UpdateGoalRequest, UpdateMetricRequest,
};
use crate::services::category::classify;
use crate::services::ProgressService;
use crate::store::{DynStore, GoalRepository, MetricRepository, SettingsRepository, ValueRepository};

#[derive(Clone)]
pub struct GoalService {
    store: DynStore,
    progress: ProgressService,
}

impl GoalService {
    pub fn new(store: DynStore, progress: ProgressService) -> Self {
        Self { store, progress }
    }

    // Goal CRUD operations
    pub async fn create_goal(
        &self,
        user_id: Uuid,
        request: CreateGoalRequest,
        today: NaiveDate,
    ) -> AppResult<Goal> {
        request.validate()?;
        self.ensure_area(user_id, request.area_id).await?;

        let progress = ProgressSource::from_request(
            request.progress_type.unwrap_or(ProgressKind::Percentage),
            request.progress_target,
            request.progress_current,
            request.progress_unit,
        )
        .map_err(AppError::InvalidInput)?;

        let thresholds = self.thresholds(user_id).await?;
        let now = Utc::now();
        let mut goal = Goal {
            id: Uuid::new_v4(),
            user_id,
            title: request.title,
            description: request.description,
            target_date: request.target_date,
            priority: request.priority.unwrap_or_default(),
            progress,
            progress_percentage: 0.0,
            category: classify(request.target_date, &thresholds, today),
            goal_type: request.goal_type.unwrap_or_default(),
            icon: request.icon,
            area_id: request.area_id,
            created_at: now,
            updated_at: now,
        };
        // a fresh goal has no linked steps or metrics yet
        goal.progress_percentage = self.progress.derive(&goal).await?;

        let goal = self.store.insert_goal(&goal).await?;
        info!(goal_id = %goal.id, "Created goal");
        Ok(goal)
    }

    pub async fn get_goal(&self, user_id: Uuid, goal_id: Uuid) -> AppResult<Goal> {
        self.store
            .get_goal(user_id, goal_id)
            .await?
            .ok_or(AppError::NotFound("Goal"))
    }

    /// Lists goals, persisting any category that drifted as days passed.
    pub async fn list_goals(&self, user_id: Uuid, today: NaiveDate) -> AppResult<Vec<Goal>> {
        let thresholds = self.thresholds(user_id).await?;
        self.refresh_categories(user_id, &thresholds, today).await
    }

    pub async fn update_goal(
        &self,
        user_id: Uuid,
        goal_id: Uuid,
        request: UpdateGoalRequest,
        today: NaiveDate,
    ) -> AppResult<Goal> {
        request.validate()?;
        let mut goal = self.get_goal(user_id, goal_id).await?;

        if let Some(title) = request.title {
            goal.title = title;
        }
        if let Some(description) = request.description {
            goal.description = Some(description);
        }
        if let Some(target_date) = request.target_date {
            goal.target_date = target_date;
        }
        if let Some(priority) = request.priority {
            goal.priority = priority;
        }
        if let Some(goal_type) = request.goal_type {
            goal.goal_type = goal_type;
        }
        if let Some(icon) = request.icon {
            goal.icon = Some(icon);
        }
        if request.area_id.is_some() {
            self.ensure_area(user_id, request.area_id).await?;
            goal.area_id = request.area_id;
        }

        let touches_progress = request.progress_type.is_some()
            || request.progress_target.is_some()
            || request.progress_current.is_some()
            || request.progress_unit.is_some();
        if touches_progress {
            let kind = request.progress_type.unwrap_or(goal.progress.kind());
            // unchanged counted goals keep the fields the edit leaves out
            let (existing_kind, target, current, unit) = goal.progress.columns();
            let keep = existing_kind == kind;
            goal.progress = ProgressSource::from_request(
                kind,
                request.progress_target.or(if keep { target } else { None }),
                request.progress_current.or(if keep { current } else { None }),
                request.progress_unit.or(if keep { unit } else { None }),
            )
            .map_err(AppError::InvalidInput)?;
        }

        let thresholds = self.thresholds(user_id).await?;
        goal.category = classify(goal.target_date, &thresholds, today);
        goal.progress_percentage = self.progress.derive(&goal).await?;

        self.store
            .save_goal(&goal)
            .await?
            .ok_or(AppError::NotFound("Goal"))
    }

    pub async fn delete_goal(&self, user_id: Uuid, goal_id: Uuid) -> AppResult<()> {
        if !self.store.delete_goal(user_id, goal_id).await? {
            return Err(AppError::NotFound("Goal"));
        }
        info!(goal_id = %goal_id, "Deleted goal");
        Ok(())
    }

    /// Re-derives every goal's category, writing only the ones that changed.
    pub async fn refresh_categories(
        &self,
        user_id: Uuid,
        thresholds: &CategorySettings,
        today: NaiveDate,
    ) -> AppResult<Vec<Goal>> {
        let goals = self.store.list_goals(user_id).await?;
        let mut refreshed = Vec::with_capacity(goals.len());

        for mut goal in goals {
            let category = classify(goal.target_date, thresholds, today);
            if category != goal.category {
                goal.category = category;
                if let Some(saved) = self.store.save_goal(&goal).await? {
                    goal = saved;
                }
            }
            refreshed.push(goal);
        }

        Ok(refreshed)
    }

    // Goal metrics
    pub async fn list_goal_metrics(&self, user_id: Uuid, goal_id: Uuid) -> AppResult<Vec<GoalMetric>> {
        self.get_goal(user_id, goal_id).await?;
        Ok(self.store.list_goal_metrics(user_id, goal_id).await?)
    }

    pub async fn create_goal_metric(
        &self,
        user_id: Uuid,
        goal_id: Uuid,
        request: CreateMetricRequest,
    ) -> AppResult<GoalMetric> {
        request.validate()?;
        self.get_goal(user_id, goal_id).await?;

        let now = Utc::now();
        let metric = GoalMetric {
            id: Uuid::new_v4(),
            user_id,
            goal_id,
            name: request.name,
            unit: request.unit,
            metric_type: request.metric_type.unwrap_or_default(),
            target_value: finite(request.target_value, "target_value")?,
            current_value: finite(request.current_value.unwrap_or(0.0), "current_value")?,
            created_at: now,
            updated_at: now,
        };
        let metric = self.store.insert_goal_metric(&metric).await?;

        self.progress.recompute(user_id, goal_id).await?;
        Ok(metric)
    }

    pub async fn update_goal_metric(
        &self,
        user_id: Uuid,
        goal_id: Uuid,
        metric_id: Uuid,
        request: UpdateMetricRequest,
    ) -> AppResult<GoalMetric> {
        request.validate()?;
        let mut metric = self.goal_metric(user_id, goal_id, metric_id).await?;

        if let Some(name) = request.name {
            metric.name = name;
        }
        if let Some(unit) = request.unit {
            metric.unit = Some(unit);
        }
        if let Some(metric_type) = request.metric_type {
            metric.metric_type = metric_type;
        }
        if let Some(target_value) = request.target_value {
            metric.target_value = finite(target_value, "target_value")?;
        }
        if let Some(current_value) = request.current_value {
            metric.current_value = finite(current_value, "current_value")?;
        }

        let metric = self
            .store
            .save_goal_metric(&metric)
            .await?
            .ok_or(AppError::NotFound("Goal metric"))?;

        self.progress.recompute(user_id, goal_id).await?;
        Ok(metric)
    }

    pub async fn delete_goal_metric(
        &self,
        user_id: Uuid,
        goal_id: Uuid,
        metric_id: Uuid,
    ) -> AppResult<()> {
        self.goal_metric(user_id, goal_id, metric_id).await?;
        self.store.delete_goal_metric(user_id, metric_id).await?;
        self.progress.recompute(user_id, goal_id).await?;
        Ok(())
    }

    async fn goal_metric(&self, user_id: Uuid, goal_id: Uuid, metric_id: Uuid) -> AppResult<GoalMetric> {
        self.store
            .get_goal_metric(user_id, metric_id)
            .await?
            .filter(|metric| metric.goal_id == goal_id)
            .ok_or(AppError::NotFound("Goal metric"))
    }

    async fn thresholds(&self, user_id: Uuid) -> AppResult<CategorySettings> {
        Ok(self
            .store
            .get_category_settings(user_id)
            .await?
            .unwrap_or_else(|| CategorySettings::defaults(user_id)))
    }

    async fn ensure_area(&self, user_id: Uuid, area_id: Option<Uuid>) -> AppResult<()> {
        let Some(area_id) = area_id else {
            return Ok(());
        };
        let areas = self.store.list_areas(user_id).await?;
        if areas.iter().any(|area| area.id == area_id) {
            Ok(())
        } else {
            Err(AppError::NotFound("Area"))
        }
    }
}

fn finite(value: f64, field: &str) -> AppResult<f64> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(AppError::invalid(format!("{} must be a finite number", field)))
    }
}
