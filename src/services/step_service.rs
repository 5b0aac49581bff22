use chrono::{DateTime, Utc};
use tracing::{debug, info};
use uuid::Uuid;
use validator::Validate;

use crate::errors::{AppError, AppResult};
use crate::models::{
    CreateStepMetricRequest, CreateStepRequest, DailyStep, Goal, Metric, StepFilter,
    ToggleStepResponse, UpdateMetricRequest, UpdateStepRequest,
};
use crate::services::ProgressService;
use crate::store::{DynStore, GoalRepository, MetricRepository, StepRepository};

#[derive(Clone)]
pub struct StepService {
    store: DynStore,
    progress: ProgressService,
}

impl StepService {
    pub fn new(store: DynStore, progress: ProgressService) -> Self {
        Self { store, progress }
    }

    pub async fn create_step(&self, user_id: Uuid, request: CreateStepRequest) -> AppResult<DailyStep> {
        request.validate()?;
        self.ensure_links(user_id, request.goal_id, request.metric_id).await?;

        let now = Utc::now();
        let step = DailyStep {
            id: Uuid::new_v4(),
            user_id,
            goal_id: request.goal_id,
            metric_id: request.metric_id,
            title: request.title,
            description: request.description,
            date: request.date,
            completed: false,
            completed_at: None,
            step_type: request.step_type.unwrap_or_default(),
            custom_type_name: request.custom_type_name,
            update_value: request.update_value,
            update_unit: request.update_unit,
            created_at: now,
            updated_at: now,
        };
        let step = self.store.insert_step(&step).await?;

        self.recompute_linked(user_id, step.goal_id).await?;
        Ok(step)
    }

    pub async fn list_steps(&self, user_id: Uuid, filter: StepFilter) -> AppResult<Vec<DailyStep>> {
        Ok(self.store.list_steps(user_id, &filter).await?)
    }

    pub async fn get_step(&self, user_id: Uuid, step_id: Uuid) -> AppResult<DailyStep> {
        self.store
            .get_step(user_id, step_id)
            .await?
            .ok_or(AppError::NotFound("Step"))
    }

    pub async fn update_step(
        &self,
        user_id: Uuid,
        step_id: Uuid,
        request: UpdateStepRequest,
    ) -> AppResult<DailyStep> {
        request.validate()?;
        let mut step = self.get_step(user_id, step_id).await?;
        let previous_goal = step.goal_id;

        self.ensure_links(
            user_id,
            request.goal_id.flatten(),
            request.metric_id.flatten(),
        )
        .await?;

        if let Some(title) = request.title {
            step.title = title;
        }
        if let Some(description) = request.description {
            step.description = Some(description);
        }
        if let Some(date) = request.date {
            step.date = date;
        }
        if let Some(goal_id) = request.goal_id {
            step.goal_id = goal_id;
        }
        if let Some(metric_id) = request.metric_id {
            step.metric_id = metric_id;
        }
        if let Some(step_type) = request.step_type {
            step.step_type = step_type;
        }
        if let Some(name) = request.custom_type_name {
            step.custom_type_name = Some(name);
        }
        if let Some(value) = request.update_value {
            step.update_value = Some(value);
        }
        if let Some(unit) = request.update_unit {
            step.update_unit = Some(unit);
        }

        let step = self
            .store
            .save_step(&step)
            .await?
            .ok_or(AppError::NotFound("Step"))?;

        if previous_goal != step.goal_id {
            self.recompute_linked(user_id, previous_goal).await?;
        }
        self.recompute_linked(user_id, step.goal_id).await?;
        Ok(step)
    }

    pub async fn delete_step(&self, user_id: Uuid, step_id: Uuid) -> AppResult<()> {
        let step = self.get_step(user_id, step_id).await?;
        if !self.store.delete_step(user_id, step_id).await? {
            return Err(AppError::NotFound("Step"));
        }
        self.recompute_linked(user_id, step.goal_id).await?;
        Ok(())
    }

    /// Flips completion. A metric-linked step with an `update_value` moves the
    /// metric by that amount; a goal-linked step recomputes the goal. The
    /// goal is returned only when the step became completed.
    pub async fn toggle_step(
        &self,
        user_id: Uuid,
        step_id: Uuid,
        completed: bool,
        now: DateTime<Utc>,
    ) -> AppResult<ToggleStepResponse> {
        let mut step = self.get_step(user_id, step_id).await?;
        if step.completed == completed {
            debug!(step_id = %step_id, completed, "Toggle is a no-op");
            return Ok(ToggleStepResponse { step, goal: None });
        }

        step.completed = completed;
        step.completed_at = completed.then_some(now);
        let step = self
            .store
            .save_step(&step)
            .await?
            .ok_or(AppError::NotFound("Step"))?;

        if let (Some(metric_id), Some(amount)) = (step.metric_id, step.update_value) {
            let delta = if completed { amount } else { -amount };
            self.adjust_metric(user_id, metric_id, delta).await?;
        }

        let goal = self.recompute_linked(user_id, step.goal_id).await?;
        Ok(ToggleStepResponse {
            step,
            goal: if completed { goal } else { None },
        })
    }

    // Step-scoped metrics
    pub async fn create_metric(&self, user_id: Uuid, request: CreateStepMetricRequest) -> AppResult<Metric> {
        request.validate()?;
        self.get_step(user_id, request.step_id).await?;

        let now = Utc::now();
        let metric = Metric {
            id: Uuid::new_v4(),
            user_id,
            step_id: request.step_id,
            name: request.metric.name,
            unit: request.metric.unit,
            metric_type: request.metric.metric_type.unwrap_or_default(),
            target_value: request.metric.target_value,
            current_value: request.metric.current_value.unwrap_or(0.0),
            created_at: now,
            updated_at: now,
        };
        Ok(self.store.insert_metric(&metric).await?)
    }

    pub async fn list_metrics(&self, user_id: Uuid) -> AppResult<Vec<Metric>> {
        Ok(self.store.list_metrics(user_id).await?)
    }

    pub async fn update_metric(
        &self,
        user_id: Uuid,
        metric_id: Uuid,
        request: UpdateMetricRequest,
    ) -> AppResult<Metric> {
        request.validate()?;
        let mut metric = self.metric(user_id, metric_id).await?;

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
            metric.target_value = target_value;
        }
        if let Some(current_value) = request.current_value {
            metric.current_value = current_value;
        }

        self.store
            .save_metric(&metric)
            .await?
            .ok_or(AppError::NotFound("Metric"))
    }

    async fn adjust_metric(&self, user_id: Uuid, metric_id: Uuid, delta: f64) -> AppResult<()> {
        // the metric may have been removed with its step; nothing to move then
        let Some(mut metric) = self.store.get_metric(user_id, metric_id).await? else {
            return Ok(());
        };
        metric.current_value += delta;
        self.store.save_metric(&metric).await?;
        info!(metric_id = %metric_id, delta, "Adjusted metric from step toggle");
        Ok(())
    }

    async fn metric(&self, user_id: Uuid, metric_id: Uuid) -> AppResult<Metric> {
        self.store
            .get_metric(user_id, metric_id)
            .await?
            .ok_or(AppError::NotFound("Metric"))
    }

    async fn ensure_links(
        &self,
        user_id: Uuid,
        goal_id: Option<Uuid>,
        metric_id: Option<Uuid>,
    ) -> AppResult<()> {
        if let Some(goal_id) = goal_id {
            if self.store.get_goal(user_id, goal_id).await?.is_none() {
                return Err(AppError::NotFound("Goal"));
            }
        }
        if let Some(metric_id) = metric_id {
            self.metric(user_id, metric_id).await?;
        }
        Ok(())
    }

    async fn recompute_linked(&self, user_id: Uuid, goal_id: Option<Uuid>) -> AppResult<Option<Goal>> {
        match goal_id {
            Some(goal_id) => match self.progress.recompute(user_id, goal_id).await {
                Ok(goal) => Ok(Some(goal)),
                // goal deleted underneath the step
                Err(AppError::NotFound(_)) => Ok(None),
                Err(err) => Err(err),
            },
            None => Ok(None),
        }
    }
}
