use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{
    AutomationRepository, GoalRepository, MetricRepository, PlanningRepository,
    SettingsRepository, StatsRepository, StepRepository, StreakRepository, UserRepository,
    ValueRepository,
};
use crate::models::{
    Area, Automation, CategorySettings, DailyPlanning, DailyStats, DailyStep, EventInteraction,
    Goal, GoalMetric, InteractionStatus, Metric, NeededStepsSettings, StepCounts, StepFilter,
    User, UserSettings, UserStreak, Value,
};

#[derive(Default)]
struct MemoryState {
    users: HashMap<Uuid, User>,
    goals: HashMap<Uuid, Goal>,
    steps: HashMap<Uuid, DailyStep>,
    metrics: HashMap<Uuid, Metric>,
    goal_metrics: HashMap<Uuid, GoalMetric>,
    planning: HashMap<(Uuid, NaiveDate), DailyPlanning>,
    stats: HashMap<(Uuid, NaiveDate), DailyStats>,
    user_settings: HashMap<Uuid, UserSettings>,
    category_settings: HashMap<Uuid, CategorySettings>,
    needed_steps_settings: HashMap<Uuid, NeededStepsSettings>,
    automations: HashMap<Uuid, Automation>,
    interactions: HashMap<Uuid, EventInteraction>,
    streaks: HashMap<Uuid, UserStreak>,
    values: HashMap<Uuid, Value>,
    areas: HashMap<Uuid, Area>,
}

/// In-process store with the same keys and cascade rules as the Postgres
/// schema. Used by tests and local experiments.
#[derive(Clone, Default)]
pub struct MemoryStore {
    state: Arc<RwLock<MemoryState>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn owned<T, F>(map: &HashMap<Uuid, T>, id: Uuid, user_id: Uuid, owner: F) -> Option<T>
where
    T: Clone,
    F: Fn(&T) -> Uuid,
{
    map.get(&id).filter(|item| owner(item) == user_id).cloned()
}

fn sorted_by_created<T, F>(mut items: Vec<T>, created: F) -> Vec<T>
where
    F: Fn(&T) -> DateTime<Utc>,
{
    items.sort_by_key(|item| created(item));
    items
}

#[async_trait]
impl UserRepository for MemoryStore {
    async fn find_user_by_external_id(&self, external_id: &str) -> Result<Option<User>> {
        let state = self.state.read().await;
        Ok(state
            .users
            .values()
            .find(|user| user.external_id == external_id)
            .cloned())
    }

    async fn insert_user(&self, user: &User) -> Result<Option<User>> {
        let mut state = self.state.write().await;
        if state.users.values().any(|u| u.external_id == user.external_id) {
            return Ok(None);
        }
        state.users.insert(user.id, user.clone());
        Ok(Some(user.clone()))
    }

    async fn get_user(&self, user_id: Uuid) -> Result<Option<User>> {
        Ok(self.state.read().await.users.get(&user_id).cloned())
    }

    async fn complete_onboarding(&self, user_id: Uuid) -> Result<Option<User>> {
        let mut state = self.state.write().await;
        Ok(state.users.get_mut(&user_id).map(|user| {
            user.has_completed_onboarding = true;
            user.updated_at = Utc::now();
            user.clone()
        }))
    }

    async fn list_user_ids(&self) -> Result<Vec<Uuid>> {
        let state = self.state.read().await;
        let users = sorted_by_created(state.users.values().cloned().collect(), |u| u.created_at);
        Ok(users.into_iter().map(|u| u.id).collect())
    }
}

#[async_trait]
impl GoalRepository for MemoryStore {
    async fn insert_goal(&self, goal: &Goal) -> Result<Goal> {
        let mut state = self.state.write().await;
        state.goals.insert(goal.id, goal.clone());
        Ok(goal.clone())
    }

    async fn get_goal(&self, user_id: Uuid, goal_id: Uuid) -> Result<Option<Goal>> {
        let state = self.state.read().await;
        Ok(owned(&state.goals, goal_id, user_id, |g| g.user_id))
    }

    async fn list_goals(&self, user_id: Uuid) -> Result<Vec<Goal>> {
        let state = self.state.read().await;
        let mut goals: Vec<Goal> = state
            .goals
            .values()
            .filter(|g| g.user_id == user_id)
            .cloned()
            .collect();
        // target date ascending, undated goals last
        goals.sort_by_key(|g| (g.target_date.is_none(), g.target_date, g.created_at));
        Ok(goals)
    }

    async fn save_goal(&self, goal: &Goal) -> Result<Option<Goal>> {
        let mut state = self.state.write().await;
        match state.goals.get_mut(&goal.id) {
            Some(existing) if existing.user_id == goal.user_id => {
                *existing = Goal {
                    created_at: existing.created_at,
                    updated_at: Utc::now(),
                    ..goal.clone()
                };
                Ok(Some(existing.clone()))
            }
            _ => Ok(None),
        }
    }

    async fn delete_goal(&self, user_id: Uuid, goal_id: Uuid) -> Result<bool> {
        let mut state = self.state.write().await;
        if owned(&state.goals, goal_id, user_id, |g| g.user_id).is_none() {
            return Ok(false);
        }
        state.goals.remove(&goal_id);
        state.goal_metrics.retain(|_, m| m.goal_id != goal_id);
        for step in state.steps.values_mut() {
            if step.goal_id == Some(goal_id) {
                step.goal_id = None;
            }
        }
        Ok(true)
    }
}

#[async_trait]
impl StepRepository for MemoryStore {
    async fn insert_step(&self, step: &DailyStep) -> Result<DailyStep> {
        let mut state = self.state.write().await;
        state.steps.insert(step.id, step.clone());
        Ok(step.clone())
    }

    async fn get_step(&self, user_id: Uuid, step_id: Uuid) -> Result<Option<DailyStep>> {
        let state = self.state.read().await;
        Ok(owned(&state.steps, step_id, user_id, |s| s.user_id))
    }

    async fn list_steps(&self, user_id: Uuid, filter: &StepFilter) -> Result<Vec<DailyStep>> {
        let state = self.state.read().await;
        let mut steps: Vec<DailyStep> = state
            .steps
            .values()
            .filter(|s| s.user_id == user_id)
            .filter(|s| filter.date.map_or(true, |date| s.date == date))
            .filter(|s| filter.goal_id.map_or(true, |goal_id| s.goal_id == Some(goal_id)))
            .cloned()
            .collect();
        steps.sort_by_key(|s| (s.date, s.created_at));
        Ok(steps)
    }

    async fn save_step(&self, step: &DailyStep) -> Result<Option<DailyStep>> {
        let mut state = self.state.write().await;
        match state.steps.get_mut(&step.id) {
            Some(existing) if existing.user_id == step.user_id => {
                *existing = DailyStep {
                    created_at: existing.created_at,
                    updated_at: Utc::now(),
                    ..step.clone()
                };
                Ok(Some(existing.clone()))
            }
            _ => Ok(None),
        }
    }

    async fn delete_step(&self, user_id: Uuid, step_id: Uuid) -> Result<bool> {
        let mut state = self.state.write().await;
        if owned(&state.steps, step_id, user_id, |s| s.user_id).is_none() {
            return Ok(false);
        }
        state.steps.remove(&step_id);

        let dropped: HashSet<Uuid> = state
            .metrics
            .values()
            .filter(|m| m.step_id == step_id)
            .map(|m| m.id)
            .collect();
        state.metrics.retain(|id, _| !dropped.contains(id));
        for step in state.steps.values_mut() {
            if step.metric_id.is_some_and(|id| dropped.contains(&id)) {
                step.metric_id = None;
            }
        }
        Ok(true)
    }

    async fn count_steps_on(&self, user_id: Uuid, date: NaiveDate) -> Result<i64> {
        let state = self.state.read().await;
        let count = state
            .steps
            .values()
            .filter(|s| s.user_id == user_id && s.date == date)
            .count();
        Ok(count as i64)
    }

    async fn goal_step_counts(&self, user_id: Uuid, goal_id: Uuid) -> Result<StepCounts> {
        let state = self.state.read().await;
        let linked = state
            .steps
            .values()
            .filter(|s| s.user_id == user_id && s.goal_id == Some(goal_id));

        let mut counts = StepCounts::default();
        for step in linked {
            counts.total += 1;
            if step.completed {
                counts.completed += 1;
            }
        }
        Ok(counts)
    }

    async fn count_owned_steps(&self, user_id: Uuid, step_ids: &[Uuid]) -> Result<i64> {
        let state = self.state.read().await;
        let unique: HashSet<&Uuid> = step_ids.iter().collect();
        let count = unique
            .into_iter()
            .filter(|id| state.steps.get(id).is_some_and(|s| s.user_id == user_id))
            .count();
        Ok(count as i64)
    }
}

#[async_trait]
impl MetricRepository for MemoryStore {
    async fn insert_metric(&self, metric: &Metric) -> Result<Metric> {
        let mut state = self.state.write().await;
        state.metrics.insert(metric.id, metric.clone());
        Ok(metric.clone())
    }

    async fn get_metric(&self, user_id: Uuid, metric_id: Uuid) -> Result<Option<Metric>> {
        let state = self.state.read().await;
        Ok(owned(&state.metrics, metric_id, user_id, |m| m.user_id))
    }

    async fn list_metrics(&self, user_id: Uuid) -> Result<Vec<Metric>> {
        let state = self.state.read().await;
        let metrics = state
            .metrics
            .values()
            .filter(|m| m.user_id == user_id)
            .cloned()
            .collect();
        Ok(sorted_by_created(metrics, |m| m.created_at))
    }

    async fn save_metric(&self, metric: &Metric) -> Result<Option<Metric>> {
        let mut state = self.state.write().await;
        match state.metrics.get_mut(&metric.id) {
            Some(existing) if existing.user_id == metric.user_id => {
                *existing = Metric {
                    step_id: existing.step_id,
                    created_at: existing.created_at,
                    updated_at: Utc::now(),
                    ..metric.clone()
                };
                Ok(Some(existing.clone()))
            }
            _ => Ok(None),
        }
    }

    async fn insert_goal_metric(&self, metric: &GoalMetric) -> Result<GoalMetric> {
        let mut state = self.state.write().await;
        state.goal_metrics.insert(metric.id, metric.clone());
        Ok(metric.clone())
    }

    async fn get_goal_metric(&self, user_id: Uuid, metric_id: Uuid) -> Result<Option<GoalMetric>> {
        let state = self.state.read().await;
        Ok(owned(&state.goal_metrics, metric_id, user_id, |m| m.user_id))
    }

    async fn list_goal_metrics(&self, user_id: Uuid, goal_id: Uuid) -> Result<Vec<GoalMetric>> {
        let state = self.state.read().await;
        let metrics = state
            .goal_metrics
            .values()
            .filter(|m| m.user_id == user_id && m.goal_id == goal_id)
            .cloned()
            .collect();
        Ok(sorted_by_created(metrics, |m| m.created_at))
    }

    async fn save_goal_metric(&self, metric: &GoalMetric) -> Result<Option<GoalMetric>> {
        let mut state = self.state.write().await;
        match state.goal_metrics.get_mut(&metric.id) {
            Some(existing) if existing.user_id == metric.user_id => {
                *existing = GoalMetric {
                    goal_id: existing.goal_id,
                    created_at: existing.created_at,
                    updated_at: Utc::now(),
                    ..metric.clone()
                };
                Ok(Some(existing.clone()))
            }
            _ => Ok(None),
        }
    }

    async fn delete_goal_metric(&self, user_id: Uuid, metric_id: Uuid) -> Result<bool> {
        let mut state = self.state.write().await;
        if owned(&state.goal_metrics, metric_id, user_id, |m| m.user_id).is_none() {
            return Ok(false);
        }
        state.goal_metrics.remove(&metric_id);
        Ok(true)
    }
}

#[async_trait]
impl PlanningRepository for MemoryStore {
    async fn get_planning(&self, user_id: Uuid, date: NaiveDate) -> Result<Option<DailyPlanning>> {
        Ok(self.state.read().await.planning.get(&(user_id, date)).cloned())
    }

    async fn upsert_planned_steps(
        &self,
        user_id: Uuid,
        date: NaiveDate,
        planned_steps: &[Uuid],
    ) -> Result<DailyPlanning> {
        let mut state = self.state.write().await;
        let planning = state
            .planning
            .entry((user_id, date))
            .or_insert_with(|| DailyPlanning::empty(user_id, date));
        planning.planned_steps = planned_steps.to_vec();
        planning.updated_at = Utc::now();
        Ok(planning.clone())
    }

    async fn add_completed_step(
        &self,
        user_id: Uuid,
        date: NaiveDate,
        step_id: Uuid,
    ) -> Result<Option<DailyPlanning>> {
        let mut state = self.state.write().await;
        Ok(state.planning.get_mut(&(user_id, date)).map(|planning| {
            if !planning.completed_steps.contains(&step_id) {
                planning.completed_steps.push(step_id);
            }
            planning.updated_at = Utc::now();
            planning.clone()
        }))
    }

    async fn reset_planning(&self, user_id: Uuid, date: NaiveDate) -> Result<DailyPlanning> {
        let mut state = self.state.write().await;
        let planning = state
            .planning
            .entry((user_id, date))
            .or_insert_with(|| DailyPlanning::empty(user_id, date));
        planning.planned_steps.clear();
        planning.completed_steps.clear();
        planning.updated_at = Utc::now();
        Ok(planning.clone())
    }
}

#[async_trait]
impl StatsRepository for MemoryStore {
    async fn upsert_daily_stats(&self, stats: &DailyStats) -> Result<DailyStats> {
        let mut state = self.state.write().await;
        let key = (stats.user_id, stats.date);
        let saved = match state.stats.get(&key) {
            Some(existing) => DailyStats {
                id: existing.id,
                created_at: existing.created_at,
                ..stats.clone()
            },
            None => stats.clone(),
        };
        state.stats.insert(key, saved.clone());
        Ok(saved)
    }

    async fn get_daily_stats(&self, user_id: Uuid, date: NaiveDate) -> Result<Option<DailyStats>> {
        Ok(self.state.read().await.stats.get(&(user_id, date)).cloned())
    }

    async fn list_daily_stats(
        &self,
        user_id: Uuid,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<DailyStats>> {
        let state = self.state.read().await;
        let mut stats: Vec<DailyStats> = state
            .stats
            .values()
            .filter(|s| s.user_id == user_id && s.date >= from && s.date <= to)
            .cloned()
            .collect();
        stats.sort_by_key(|s| s.date);
        Ok(stats)
    }
}

#[async_trait]
impl SettingsRepository for MemoryStore {
    async fn get_user_settings(&self, user_id: Uuid) -> Result<Option<UserSettings>> {
        Ok(self.state.read().await.user_settings.get(&user_id).cloned())
    }

    async fn save_user_settings(&self, settings: &UserSettings) -> Result<UserSettings> {
        let saved = UserSettings {
            updated_at: Utc::now(),
            ..settings.clone()
        };
        let mut state = self.state.write().await;
        state.user_settings.insert(settings.user_id, saved.clone());
        Ok(saved)
    }

    async fn get_category_settings(&self, user_id: Uuid) -> Result<Option<CategorySettings>> {
        Ok(self.state.read().await.category_settings.get(&user_id).cloned())
    }

    async fn save_category_settings(&self, settings: &CategorySettings) -> Result<CategorySettings> {
        let saved = CategorySettings {
            updated_at: Utc::now(),
            ..settings.clone()
        };
        let mut state = self.state.write().await;
        state.category_settings.insert(settings.user_id, saved.clone());
        Ok(saved)
    }

    async fn get_needed_steps_settings(
        &self,
        user_id: Uuid,
    ) -> Result<Option<NeededStepsSettings>> {
        Ok(self.state.read().await.needed_steps_settings.get(&user_id).cloned())
    }

    async fn save_needed_steps_settings(
        &self,
        settings: &NeededStepsSettings,
    ) -> Result<NeededStepsSettings> {
        let saved = NeededStepsSettings {
            updated_at: Utc::now(),
            ..settings.clone()
        };
        let mut state = self.state.write().await;
        state.needed_steps_settings.insert(settings.user_id, saved.clone());
        Ok(saved)
    }

    async fn list_user_settings(&self) -> Result<Vec<UserSettings>> {
        let state = self.state.read().await;
        let users = sorted_by_created(state.users.values().cloned().collect(), |u| u.created_at);
        Ok(users
            .into_iter()
            .map(|user| {
                state
                    .user_settings
                    .get(&user.id)
                    .cloned()
                    .unwrap_or_else(|| UserSettings::defaults(user.id))
            })
            .collect())
    }
}

#[async_trait]
impl AutomationRepository for MemoryStore {
    async fn insert_automation(&self, automation: &Automation) -> Result<Automation> {
        let mut state = self.state.write().await;
        state.automations.insert(automation.id, automation.clone());
        Ok(automation.clone())
    }

    async fn get_automation(
        &self,
        user_id: Uuid,
        automation_id: Uuid,
    ) -> Result<Option<Automation>> {
        let state = self.state.read().await;
        Ok(owned(&state.automations, automation_id, user_id, |a| a.user_id))
    }

    async fn list_automations(&self, user_id: Uuid) -> Result<Vec<Automation>> {
        let state = self.state.read().await;
        let automations = state
            .automations
            .values()
            .filter(|a| a.user_id == user_id)
            .cloned()
            .collect();
        Ok(sorted_by_created(automations, |a| a.created_at))
    }

    async fn save_automation(&self, automation: &Automation) -> Result<Option<Automation>> {
        let mut state = self.state.write().await;
        match state.automations.get_mut(&automation.id) {
            Some(existing) if existing.user_id == automation.user_id => {
                *existing = Automation {
                    automation_type: existing.automation_type,
                    target_id: existing.target_id,
                    created_at: existing.created_at,
                    updated_at: Utc::now(),
                    ..automation.clone()
                };
                Ok(Some(existing.clone()))
            }
            _ => Ok(None),
        }
    }

    async fn delete_automation(&self, user_id: Uuid, automation_id: Uuid) -> Result<bool> {
        let mut state = self.state.write().await;
        if owned(&state.automations, automation_id, user_id, |a| a.user_id).is_none() {
            return Ok(false);
        }
        state.automations.remove(&automation_id);
        state.interactions.retain(|_, i| i.automation_id != automation_id);
        Ok(true)
    }

    async fn insert_interaction(
        &self,
        interaction: &EventInteraction,
    ) -> Result<Option<EventInteraction>> {
        let mut state = self.state.write().await;
        let taken = state.interactions.values().any(|i| {
            i.user_id == interaction.user_id
                && i.automation_id == interaction.automation_id
                && i.date == interaction.date
        });
        if taken {
            return Ok(None);
        }
        state.interactions.insert(interaction.id, interaction.clone());
        Ok(Some(interaction.clone()))
    }

    async fn get_interaction(
        &self,
        user_id: Uuid,
        interaction_id: Uuid,
    ) -> Result<Option<EventInteraction>> {
        let state = self.state.read().await;
        Ok(owned(&state.interactions, interaction_id, user_id, |i| i.user_id))
    }

    async fn find_interaction(
        &self,
        user_id: Uuid,
        automation_id: Uuid,
        date: NaiveDate,
    ) -> Result<Option<EventInteraction>> {
        let state = self.state.read().await;
        Ok(state
            .interactions
            .values()
            .find(|i| i.user_id == user_id && i.automation_id == automation_id && i.date == date)
            .cloned())
    }

    async fn list_interactions_on(
        &self,
        user_id: Uuid,
        date: NaiveDate,
    ) -> Result<Vec<EventInteraction>> {
        let state = self.state.read().await;
        let interactions = state
            .interactions
            .values()
            .filter(|i| i.user_id == user_id && i.date == date)
            .cloned()
            .collect();
        Ok(sorted_by_created(interactions, |i| i.created_at))
    }

    async fn complete_interaction(
        &self,
        user_id: Uuid,
        interaction_id: Uuid,
        completed_at: DateTime<Utc>,
    ) -> Result<Option<EventInteraction>> {
        let mut state = self.state.write().await;
        Ok(state
            .interactions
            .get_mut(&interaction_id)
            .filter(|i| i.user_id == user_id)
            .map(|interaction| {
                interaction.status = InteractionStatus::Completed;
                interaction.completed_at = Some(completed_at);
                interaction.postponed_to = None;
                interaction.updated_at = completed_at;
                interaction.clone()
            }))
    }

    async fn postpone_interaction(
        &self,
        user_id: Uuid,
        interaction_id: Uuid,
        postponed_to: DateTime<Utc>,
    ) -> Result<Option<EventInteraction>> {
        let mut state = self.state.write().await;
        Ok(state
            .interactions
            .get_mut(&interaction_id)
            .filter(|i| i.user_id == user_id)
            .map(|interaction| {
                interaction.status = InteractionStatus::Postponed;
                interaction.postponed_to = Some(postponed_to);
                interaction.completed_at = None;
                interaction.updated_at = Utc::now();
                interaction.clone()
            }))
    }

    async fn list_due_postponed(
        &self,
        user_id: Uuid,
        before: DateTime<Utc>,
    ) -> Result<Vec<EventInteraction>> {
        let state = self.state.read().await;
        let due = state
            .interactions
            .values()
            .filter(|i| {
                i.user_id == user_id
                    && i.status == InteractionStatus::Postponed
                    && i.postponed_to.is_some_and(|at| at < before)
                    && !state.interactions.values().any(|later| {
                        later.user_id == user_id
                            && later.automation_id == i.automation_id
                            && later.date > i.date
                    })
            })
            .cloned()
            .collect();
        Ok(sorted_by_created(due, |i| i.created_at))
    }
}

#[async_trait]
impl StreakRepository for MemoryStore {
    async fn get_streak(&self, user_id: Uuid) -> Result<Option<UserStreak>> {
        Ok(self.state.read().await.streaks.get(&user_id).cloned())
    }

    async fn save_streak(&self, streak: &UserStreak) -> Result<UserStreak> {
        let mut state = self.state.write().await;
        state.streaks.insert(streak.user_id, streak.clone());
        Ok(streak.clone())
    }
}

#[async_trait]
impl ValueRepository for MemoryStore {
    async fn insert_value(&self, value: &Value) -> Result<Value> {
        let mut state = self.state.write().await;
        state.values.insert(value.id, value.clone());
        Ok(value.clone())
    }

    async fn get_value(&self, user_id: Uuid, value_id: Uuid) -> Result<Option<Value>> {
        let state = self.state.read().await;
        Ok(owned(&state.values, value_id, user_id, |v| v.user_id))
    }

    async fn list_values(&self, user_id: Uuid) -> Result<Vec<Value>> {
        let state = self.state.read().await;
        let values = state
            .values
            .values()
            .filter(|v| v.user_id == user_id)
            .cloned()
            .collect();
        Ok(sorted_by_created(values, |v| v.created_at))
    }

    async fn save_value(&self, value: &Value) -> Result<Option<Value>> {
        let mut state = self.state.write().await;
        match state.values.get_mut(&value.id) {
            Some(existing) if existing.user_id == value.user_id => {
                *existing = Value {
                    created_at: existing.created_at,
                    updated_at: Utc::now(),
                    ..value.clone()
                };
                Ok(Some(existing.clone()))
            }
            _ => Ok(None),
        }
    }

    async fn insert_area(&self, area: &Area) -> Result<Area> {
        let mut state = self.state.write().await;
        state.areas.insert(area.id, area.clone());
        Ok(area.clone())
    }

    async fn list_areas(&self, user_id: Uuid) -> Result<Vec<Area>> {
        let state = self.state.read().await;
        let mut areas: Vec<Area> = state
            .areas
            .values()
            .filter(|a| a.user_id == user_id)
            .cloned()
            .collect();
        areas.sort_by_key(|a| (a.sort_order, a.created_at));
        Ok(areas)
    }

    async fn delete_area(&self, user_id: Uuid, area_id: Uuid) -> Result<bool> {
        let mut state = self.state.write().await;
        if owned(&state.areas, area_id, user_id, |a| a.user_id).is_none() {
            return Ok(false);
        }
        state.areas.remove(&area_id);
        for goal in state.goals.values_mut() {
            if goal.area_id == Some(area_id) {
                goal.area_id = None;
            }
        }
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{StepType, Workflow};

    fn step(user_id: Uuid, date: NaiveDate) -> DailyStep {
        let now = Utc::now();
        DailyStep {
            id: Uuid::new_v4(),
            user_id,
            goal_id: None,
            metric_id: None,
            title: "Walk".into(),
            description: None,
            date,
            completed: false,
            completed_at: None,
            step_type: StepType::Task,
            custom_type_name: None,
            update_value: None,
            update_unit: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[tokio::test]
    async fn duplicate_external_id_is_not_inserted() {
        let store = MemoryStore::new();
        let first = User::new("ext-1", None, None);
        assert!(store.insert_user(&first).await.unwrap().is_some());
        assert!(store
            .insert_user(&User::new("ext-1", None, None))
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn records_of_other_users_read_as_absent() {
        let store = MemoryStore::new();
        let owner = Uuid::new_v4();
        let date = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let s = store.insert_step(&step(owner, date)).await.unwrap();

        assert!(store.get_step(Uuid::new_v4(), s.id).await.unwrap().is_none());
        assert!(!store.delete_step(Uuid::new_v4(), s.id).await.unwrap());
        assert!(store.get_step(owner, s.id).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn owned_step_count_ignores_duplicates() {
        let store = MemoryStore::new();
        let owner = Uuid::new_v4();
        let date = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let s = store.insert_step(&step(owner, date)).await.unwrap();

        let count = store.count_owned_steps(owner, &[s.id, s.id]).await.unwrap();
        assert_eq!(count, 1);
    }

    #[tokio::test]
    async fn list_user_settings_fills_defaults() {
        let store = MemoryStore::new();
        let user = store
            .insert_user(&User::new("ext-2", None, None))
            .await
            .unwrap()
            .unwrap();

        let settings = store.list_user_settings().await.unwrap();
        assert_eq!(settings.len(), 1);
        assert_eq!(settings[0].user_id, user.id);
        assert_eq!(settings[0].daily_reset_hour, 0);
        assert_eq!(settings[0].workflow, Workflow::DailyPlanning);
    }
}
