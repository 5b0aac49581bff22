// Data access layer: repository traits plus Postgres and in-memory backends

pub mod memory;
pub mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgStore;

use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use uuid::Uuid;

use crate::models::{
    Area, Automation, CategorySettings, DailyPlanning, DailyStats, DailyStep, EventInteraction,
    Goal, GoalMetric, Metric, NeededStepsSettings, StepCounts, StepFilter, User, UserSettings,
    UserStreak, Value,
};

/// Every method that touches user data is scoped by `user_id`; a record owned
/// by someone else reads as absent.
#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn find_user_by_external_id(&self, external_id: &str) -> Result<Option<User>>;
    /// Inserts unless the external id is already taken, in which case `None`.
    async fn insert_user(&self, user: &User) -> Result<Option<User>>;
    async fn get_user(&self, user_id: Uuid) -> Result<Option<User>>;
    async fn complete_onboarding(&self, user_id: Uuid) -> Result<Option<User>>;
    async fn list_user_ids(&self) -> Result<Vec<Uuid>>;
}

#[async_trait]
pub trait GoalRepository: Send + Sync {
    async fn insert_goal(&self, goal: &Goal) -> Result<Goal>;
    async fn get_goal(&self, user_id: Uuid, goal_id: Uuid) -> Result<Option<Goal>>;
    async fn list_goals(&self, user_id: Uuid) -> Result<Vec<Goal>>;
    /// Writes every mutable column of `goal`.
    async fn save_goal(&self, goal: &Goal) -> Result<Option<Goal>>;
    async fn delete_goal(&self, user_id: Uuid, goal_id: Uuid) -> Result<bool>;
}

#[async_trait]
pub trait StepRepository: Send + Sync {
    async fn insert_step(&self, step: &DailyStep) -> Result<DailyStep>;
    async fn get_step(&self, user_id: Uuid, step_id: Uuid) -> Result<Option<DailyStep>>;
    async fn list_steps(&self, user_id: Uuid, filter: &StepFilter) -> Result<Vec<DailyStep>>;
    async fn save_step(&self, step: &DailyStep) -> Result<Option<DailyStep>>;
    async fn delete_step(&self, user_id: Uuid, step_id: Uuid) -> Result<bool>;
    async fn count_steps_on(&self, user_id: Uuid, date: NaiveDate) -> Result<i64>;
    async fn goal_step_counts(&self, user_id: Uuid, goal_id: Uuid) -> Result<StepCounts>;
    /// How many of `step_ids` (deduplicated) belong to the user.
    async fn count_owned_steps(&self, user_id: Uuid, step_ids: &[Uuid]) -> Result<i64>;
}

#[async_trait]
pub trait MetricRepository: Send + Sync {
    async fn insert_metric(&self, metric: &Metric) -> Result<Metric>;
    async fn get_metric(&self, user_id: Uuid, metric_id: Uuid) -> Result<Option<Metric>>;
    async fn list_metrics(&self, user_id: Uuid) -> Result<Vec<Metric>>;
    async fn save_metric(&self, metric: &Metric) -> Result<Option<Metric>>;

    async fn insert_goal_metric(&self, metric: &GoalMetric) -> Result<GoalMetric>;
    async fn get_goal_metric(&self, user_id: Uuid, metric_id: Uuid) -> Result<Option<GoalMetric>>;
    async fn list_goal_metrics(&self, user_id: Uuid, goal_id: Uuid) -> Result<Vec<GoalMetric>>;
    async fn save_goal_metric(&self, metric: &GoalMetric) -> Result<Option<GoalMetric>>;
    async fn delete_goal_metric(&self, user_id: Uuid, metric_id: Uuid) -> Result<bool>;
}

#[async_trait]
pub trait PlanningRepository: Send + Sync {
    async fn get_planning(&self, user_id: Uuid, date: NaiveDate) -> Result<Option<DailyPlanning>>;
    /// Replaces `planned_steps`, creating the row if needed; leaves
    /// `completed_steps` alone.
    async fn upsert_planned_steps(
        &self,
        user_id: Uuid,
        date: NaiveDate,
        planned_steps: &[Uuid],
    ) -> Result<DailyPlanning>;
    /// Set-semantics append to `completed_steps`; `None` if no row exists.
    async fn add_completed_step(
        &self,
        user_id: Uuid,
        date: NaiveDate,
        step_id: Uuid,
    ) -> Result<Option<DailyPlanning>>;
    /// Creates or overwrites the row with empty planned and completed lists.
    async fn reset_planning(&self, user_id: Uuid, date: NaiveDate) -> Result<DailyPlanning>;
}

#[async_trait]
pub trait StatsRepository: Send + Sync {
    /// Keyed on (user, date); a second write for the same day overwrites.
    async fn upsert_daily_stats(&self, stats: &DailyStats) -> Result<DailyStats>;
    async fn get_daily_stats(&self, user_id: Uuid, date: NaiveDate) -> Result<Option<DailyStats>>;
    async fn list_daily_stats(
        &self,
        user_id: Uuid,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<DailyStats>>;
}

#[async_trait]
pub trait SettingsRepository: Send + Sync {
    async fn get_user_settings(&self, user_id: Uuid) -> Result<Option<UserSettings>>;
    async fn save_user_settings(&self, settings: &UserSettings) -> Result<UserSettings>;
    async fn get_category_settings(&self, user_id: Uuid) -> Result<Option<CategorySettings>>;
    async fn save_category_settings(&self, settings: &CategorySettings) -> Result<CategorySettings>;
    async fn get_needed_steps_settings(&self, user_id: Uuid)
        -> Result<Option<NeededStepsSettings>>;
    async fn save_needed_steps_settings(
        &self,
        settings: &NeededStepsSettings,
    ) -> Result<NeededStepsSettings>;
    /// Every user with their effective settings (defaults where no row exists).
    async fn list_user_settings(&self) -> Result<Vec<UserSettings>>;
}

#[async_trait]
pub trait AutomationRepository: Send + Sync {
    async fn insert_automation(&self, automation: &Automation) -> Result<Automation>;
    async fn get_automation(&self, user_id: Uuid, automation_id: Uuid)
        -> Result<Option<Automation>>;
    async fn list_automations(&self, user_id: Uuid) -> Result<Vec<Automation>>;
    async fn save_automation(&self, automation: &Automation) -> Result<Option<Automation>>;
    async fn delete_automation(&self, user_id: Uuid, automation_id: Uuid) -> Result<bool>;

    /// Inserts unless (user, automation, date) already has a row, in which
    /// case `None`.
    async fn insert_interaction(&self, interaction: &EventInteraction)
        -> Result<Option<EventInteraction>>;
    async fn get_interaction(
        &self,
        user_id: Uuid,
        interaction_id: Uuid,
    ) -> Result<Option<EventInteraction>>;
    async fn find_interaction(
        &self,
        user_id: Uuid,
        automation_id: Uuid,
        date: NaiveDate,
    ) -> Result<Option<EventInteraction>>;
    async fn list_interactions_on(&self, user_id: Uuid, date: NaiveDate)
        -> Result<Vec<EventInteraction>>;
    async fn complete_interaction(
        &self,
        user_id: Uuid,
        interaction_id: Uuid,
        completed_at: DateTime<Utc>,
    ) -> Result<Option<EventInteraction>>;
    async fn postpone_interaction(
        &self,
        user_id: Uuid,
        interaction_id: Uuid,
        postponed_to: DateTime<Utc>,
    ) -> Result<Option<EventInteraction>>;
    /// Postponed interactions whose `postponed_to` is before `before` and
    /// that are still the latest interaction of their automation.
    async fn list_due_postponed(
        &self,
        user_id: Uuid,
        before: DateTime<Utc>,
    ) -> Result<Vec<EventInteraction>>;
}

#[async_trait]
pub trait StreakRepository: Send + Sync {
    async fn get_streak(&self, user_id: Uuid) -> Result<Option<UserStreak>>;
    async fn save_streak(&self, streak: &UserStreak) -> Result<UserStreak>;
}

#[async_trait]
pub trait ValueRepository: Send + Sync {
    async fn insert_value(&self, value: &Value) -> Result<Value>;
    async fn get_value(&self, user_id: Uuid, value_id: Uuid) -> Result<Option<Value>>;
    async fn list_values(&self, user_id: Uuid) -> Result<Vec<Value>>;
    async fn save_value(&self, value: &Value) -> Result<Option<Value>>;

    async fn insert_area(&self, area: &Area) -> Result<Area>;
    async fn list_areas(&self, user_id: Uuid) -> Result<Vec<Area>>;
    async fn delete_area(&self, user_id: Uuid, area_id: Uuid) -> Result<bool>;
}

/// The full data-access surface handed to services.
pub trait Store:
    UserRepository
    + GoalRepository
    + StepRepository
    + MetricRepository
    + PlanningRepository
    + StatsRepository
    + SettingsRepository
    + AutomationRepository
    + StreakRepository
    + ValueRepository
{
}

impl<T> Store for T where
    T: UserRepository
        + GoalRepository
        + StepRepository
        + MetricRepository
        + PlanningRepository
        + StatsRepository
        + SettingsRepository
        + AutomationRepository
        + StreakRepository
        + ValueRepository
{
}

pub type DynStore = Arc<dyn Store>;
