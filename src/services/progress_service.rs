use uuid::Uuid;

use crate::errors::{AppError, AppResult};
use crate::models::{Goal, GoalMetric, ProgressSource, SetProgressRequest, StepCounts};
use crate::store::{DynStore, GoalRepository, MetricRepository, StepRepository};

/// Clamps to [0, 100]; NaN and infinities collapse to 0.
pub fn clamp_percentage(value: f64) -> f64 {
    if value.is_finite() {
        value.clamp(0.0, 100.0)
    } else {
        0.0
    }
}

/// `current / target` as a clamped percentage. A non-positive target is 0%.
pub fn ratio_percentage(current: f64, target: f64) -> f64 {
    if target > 0.0 {
        clamp_percentage(current / target * 100.0)
    } else {
        0.0
    }
}

pub fn steps_percentage(counts: StepCounts) -> f64 {
    if counts.total <= 0 {
        return 0.0;
    }
    clamp_percentage(counts.completed as f64 / counts.total as f64 * 100.0)
}

/// Mean of per-metric clamped ratios, so one overshooting metric cannot mask
/// the others.
pub fn metrics_percentage(metrics: &[GoalMetric]) -> f64 {
    if metrics.is_empty() {
        return 0.0;
    }
    let sum: f64 = metrics
        .iter()
        .map(|m| ratio_percentage(m.current_value, m.target_value))
        .sum();
    clamp_percentage(sum / metrics.len() as f64)
}

pub fn combined_percentage(metrics_pct: f64, steps_pct: f64) -> f64 {
    clamp_percentage(0.5 * clamp_percentage(metrics_pct) + 0.5 * clamp_percentage(steps_pct))
}

/// Derives and persists `Goal::progress_percentage`.
#[derive(Clone)]
pub struct ProgressService {
    store: DynStore,
}

impl ProgressService {
    pub fn new(store: DynStore) -> Self {
        Self { store }
    }

    pub async fn set_percentage(&self, user_id: Uuid, goal_id: Uuid, value: f64) -> AppResult<Goal> {
        let goal = self.load(user_id, goal_id).await?;
        if !matches!(goal.progress, ProgressSource::Percentage) {
            return Err(AppError::invalid(
                "percentage can only be set on percentage goals",
            ));
        }
        if !value.is_finite() {
            return Err(AppError::invalid("percentage must be a number"));
        }
        self.persist(goal, clamp_percentage(value)).await
    }

    /// Records a new `current` on a count or amount goal.
    pub async fn set_current(&self, user_id: Uuid, goal_id: Uuid, value: f64) -> AppResult<Goal> {
        let mut goal = self.load(user_id, goal_id).await?;
        if !value.is_finite() {
            return Err(AppError::invalid("current must be a number"));
        }
        let percentage = match &mut goal.progress {
            ProgressSource::Count { target, current, .. }
            | ProgressSource::Amount { target, current, .. } => {
                *current = value;
                ratio_percentage(*current, *target)
            }
            _ => {
                return Err(AppError::invalid(
                    "current can only be set on count or amount goals",
                ))
            }
        };
        self.persist(goal, percentage).await
    }

    /// Manual progress entry; which field applies depends on the goal.
    pub async fn apply_manual(
        &self,
        user_id: Uuid,
        goal_id: Uuid,
        request: SetProgressRequest,
    ) -> AppResult<Goal> {
        match (request.percentage, request.current) {
            (Some(percentage), None) => self.set_percentage(user_id, goal_id, percentage).await,
            (None, Some(current)) => self.set_current(user_id, goal_id, current).await,
            _ => Err(AppError::invalid(
                "provide exactly one of percentage or current",
            )),
        }
    }

    pub async fn set_from_steps(&self, user_id: Uuid, goal_id: Uuid) -> AppResult<Goal> {
        let goal = self.load(user_id, goal_id).await?;
        let percentage = self.steps_component(user_id, goal_id).await?;
        self.persist(goal, percentage).await
    }

    pub async fn set_from_goal_metrics(&self, user_id: Uuid, goal_id: Uuid) -> AppResult<Goal> {
        let goal = self.load(user_id, goal_id).await?;
        let percentage = self.metrics_component(user_id, goal_id).await?;
        self.persist(goal, percentage).await
    }

    pub async fn set_combined(&self, user_id: Uuid, goal_id: Uuid) -> AppResult<Goal> {
        let goal = self.load(user_id, goal_id).await?;
        let percentage = self.combined_component(user_id, goal_id).await?;
        self.persist(goal, percentage).await
    }

    /// Recomputation after a linked step or goal metric changed. Steps and
    /// metrics goals use their own source; every other goal blends both.
    pub async fn recompute(&self, user_id: Uuid, goal_id: Uuid) -> AppResult<Goal> {
        let goal = self.load(user_id, goal_id).await?;
        let percentage = match goal.progress {
            ProgressSource::Steps => self.steps_component(user_id, goal_id).await?,
            ProgressSource::Metrics => self.metrics_component(user_id, goal_id).await?,
            _ => self.combined_component(user_id, goal_id).await?,
        };
        self.persist(goal, percentage).await
    }

    /// The percentage an edited goal should carry, without writing it.
    pub async fn derive(&self, goal: &Goal) -> AppResult<f64> {
        let percentage = match &goal.progress {
            ProgressSource::Percentage => clamp_percentage(goal.progress_percentage),
            ProgressSource::Count { target, current, .. }
            | ProgressSource::Amount { target, current, .. } => ratio_percentage(*current, *target),
            ProgressSource::Steps => self.steps_component(goal.user_id, goal.id).await?,
            ProgressSource::Metrics => self.metrics_component(goal.user_id, goal.id).await?,
            ProgressSource::Combined => self.combined_component(goal.user_id, goal.id).await?,
        };
        Ok(percentage)
    }

    async fn steps_component(&self, user_id: Uuid, goal_id: Uuid) -> AppResult<f64> {
        let counts = self.store.goal_step_counts(user_id, goal_id).await?;
        Ok(steps_percentage(counts))
    }

    async fn metrics_component(&self, user_id: Uuid, goal_id: Uuid) -> AppResult<f64> {
        let metrics = self.store.list_goal_metrics(user_id, goal_id).await?;
        Ok(metrics_percentage(&metrics))
    }

    async fn combined_component(&self, user_id: Uuid, goal_id: Uuid) -> AppResult<f64> {
        let metrics = self.metrics_component(user_id, goal_id).await?;
        let steps = self.steps_component(user_id, goal_id).await?;
        Ok(combined_percentage(metrics, steps))
    }

    async fn load(&self, user_id: Uuid, goal_id: Uuid) -> AppResult<Goal> {
        self.store
            .get_goal(user_id, goal_id)
            .await?
            .ok_or(AppError::NotFound("Goal"))
    }

    async fn persist(&self, mut goal: Goal, percentage: f64) -> AppResult<Goal> {
        goal.progress_percentage = clamp_percentage(percentage);
        self.store
            .save_goal(&goal)
            .await?
            .ok_or(AppError::NotFound("Goal"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use crate::models::MetricType;

    fn metric(current: f64, target: f64) -> GoalMetric {
        let now = Utc::now();
        GoalMetric {
            id: Uuid::new_v4(),
            user_id: Uuid::nil(),
            goal_id: Uuid::nil(),
            name: "m".into(),
            unit: None,
            metric_type: MetricType::Number,
            target_value: target,
            current_value: current,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn zero_target_is_zero_percent() {
        assert_eq!(ratio_percentage(5.0, 0.0), 0.0);
        assert_eq!(ratio_percentage(5.0, -3.0), 0.0);
    }

    #[test]
    fn non_finite_values_collapse_to_zero() {
        assert_eq!(clamp_percentage(f64::NAN), 0.0);
        assert_eq!(clamp_percentage(f64::INFINITY), 0.0);
        assert_eq!(clamp_percentage(-12.0), 0.0);
        assert_eq!(clamp_percentage(180.0), 100.0);
    }

    #[test]
    fn overshooting_metric_does_not_mask_the_others() {
        let metrics = vec![metric(500.0, 100.0), metric(0.0, 100.0)];
        assert_eq!(metrics_percentage(&metrics), 50.0);
    }

    #[test]
    fn steps_with_no_steps_is_zero() {
        assert_eq!(steps_percentage(StepCounts::default()), 0.0);
        assert_eq!(
            steps_percentage(StepCounts { completed: 3, total: 3 }),
            100.0
        );
    }

    #[test]
    fn combined_without_metrics_caps_at_half() {
        let steps = steps_percentage(StepCounts { completed: 4, total: 4 });
        assert_eq!(combined_percentage(metrics_percentage(&[]), steps), 50.0);
    }
}
