use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use super::{
    AutomationRepository, GoalRepository, MetricRepository, PlanningRepository,
    SettingsRepository, StatsRepository, StepRepository, StreakRepository, UserRepository,
    ValueRepository,
};
use crate::models::{
    Area, Automation, AutomationRow, CategorySettings, DailyPlanning, DailyStats, DailyStep,
    EventInteraction, Goal, GoalMetric, GoalRow, Metric, NeededStepsSettings, StepCounts,
    StepFilter, User, UserSettings, UserStreak, Value,
};

const USER_COLUMNS: &str =
    "id, external_id, email, name, has_completed_onboarding, created_at, updated_at";

const GOAL_COLUMNS: &str = "id, user_id, title, description, target_date, priority, \
     progress_type, progress_target, progress_current, progress_unit, progress_percentage, \
     category, goal_type, icon, area_id, created_at, updated_at";

const STEP_COLUMNS: &str = "id, user_id, goal_id, metric_id, title, description, date, \
     completed, completed_at, step_type, custom_type_name, update_value, update_unit, \
     created_at, updated_at";

const METRIC_COLUMNS: &str = "id, user_id, step_id, name, unit, metric_type, target_value, \
     current_value, created_at, updated_at";

const GOAL_METRIC_COLUMNS: &str = "id, user_id, goal_id, name, unit, metric_type, target_value, \
     current_value, created_at, updated_at";

const PLANNING_COLUMNS: &str =
    "id, user_id, date, planned_steps, completed_steps, created_at, updated_at";

const STATS_COLUMNS: &str = "id, user_id, date, planned_steps_count, completed_steps_count, \
     total_steps_count, optimum_deviation, created_at";

const AUTOMATION_COLUMNS: &str = "id, user_id, name, description, automation_type, target_id, \
     schedule_kind, schedule_day, scheduled_date, is_active, created_at, updated_at";

const INTERACTION_COLUMNS: &str = "id, user_id, automation_id, date, status, completed_at, \
     postponed_to, created_at, updated_at";

const VALUE_COLUMNS: &str =
    "id, user_id, name, description, color, icon, level, experience, created_at, updated_at";

/// Postgres-backed store. Cheap to clone; shares the pool.
#[derive(Clone)]
pub struct PgStore {
    db: PgPool,
}

impl PgStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    pub fn pool(&self) -> &PgPool {
        &self.db
    }
}

#[async_trait]
impl UserRepository for PgStore {
    async fn find_user_by_external_id(&self, external_id: &str) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE external_id = $1"
        ))
        .bind(external_id)
        .fetch_optional(&self.db)
        .await?;

        Ok(user)
    }

    async fn insert_user(&self, user: &User) -> Result<Option<User>> {
        let inserted = sqlx::query_as::<_, User>(&format!(
            r#"
            INSERT INTO users (id, external_id, email, name, has_completed_onboarding, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $6)
            ON CONFLICT (external_id) DO NOTHING
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(user.id)
        .bind(&user.external_id)
        .bind(&user.email)
        .bind(&user.name)
        .bind(user.has_completed_onboarding)
        .bind(user.created_at)
        .fetch_optional(&self.db)
        .await?;

        Ok(inserted)
    }

    async fn get_user(&self, user_id: Uuid) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = $1"
        ))
        .bind(user_id)
        .fetch_optional(&self.db)
        .await?;

        Ok(user)
    }

    async fn complete_onboarding(&self, user_id: Uuid) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            r#"
            UPDATE users SET has_completed_onboarding = TRUE, updated_at = $2
            WHERE id = $1
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(user_id)
        .bind(Utc::now())
        .fetch_optional(&self.db)
        .await?;

        Ok(user)
    }

    async fn list_user_ids(&self) -> Result<Vec<Uuid>> {
        let ids = sqlx::query_scalar::<_, Uuid>("SELECT id FROM users ORDER BY created_at")
            .fetch_all(&self.db)
            .await?;

        Ok(ids)
    }
}

#[async_trait]
impl GoalRepository for PgStore {
    async fn insert_goal(&self, goal: &Goal) -> Result<Goal> {
        let (progress_type, target, current, unit) = goal.progress.columns();
        let row = sqlx::query_as::<_, GoalRow>(&format!(
            r#"
            INSERT INTO goals (
                id, user_id, title, description, target_date, priority,
                progress_type, progress_target, progress_current, progress_unit, progress_percentage,
                category, goal_type, icon, area_id, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $16)
            RETURNING {GOAL_COLUMNS}
            "#
        ))
        .bind(goal.id)
        .bind(goal.user_id)
        .bind(&goal.title)
        .bind(&goal.description)
        .bind(goal.target_date)
        .bind(goal.priority)
        .bind(progress_type)
        .bind(target)
        .bind(current)
        .bind(unit)
        .bind(goal.progress_percentage)
        .bind(goal.category)
        .bind(goal.goal_type)
        .bind(&goal.icon)
        .bind(goal.area_id)
        .bind(goal.created_at)
        .fetch_one(&self.db)
        .await?;

        Ok(row.into())
    }

    async fn get_goal(&self, user_id: Uuid, goal_id: Uuid) -> Result<Option<Goal>> {
        let row = sqlx::query_as::<_, GoalRow>(&format!(
            "SELECT {GOAL_COLUMNS} FROM goals WHERE id = $1 AND user_id = $2"
        ))
        .bind(goal_id)
        .bind(user_id)
        .fetch_optional(&self.db)
        .await?;

        Ok(row.map(Goal::from))
    }

    async fn list_goals(&self, user_id: Uuid) -> Result<Vec<Goal>> {
        let rows = sqlx::query_as::<_, GoalRow>(&format!(
            "SELECT {GOAL_COLUMNS} FROM goals WHERE user_id = $1 \
             ORDER BY target_date ASC NULLS LAST, created_at ASC"
        ))
        .bind(user_id)
        .fetch_all(&self.db)
        .await?;

        Ok(rows.into_iter().map(Goal::from).collect())
    }

    async fn save_goal(&self, goal: &Goal) -> Result<Option<Goal>> {
        let (progress_type, target, current, unit) = goal.progress.columns();
        let row = sqlx::query_as::<_, GoalRow>(&format!(
            r#"
            UPDATE goals
            SET
                title = $3,
                description = $4,
                target_date = $5,
                priority = $6,
                progress_type = $7,
                progress_target = $8,
                progress_current = $9,
                progress_unit = $10,
                progress_percentage = $11,
                category = $12,
                goal_type = $13,
                icon = $14,
                area_id = $15,
                updated_at = $16
            WHERE id = $1 AND user_id = $2
            RETURNING {GOAL_COLUMNS}
            "#
        ))
        .bind(goal.id)
        .bind(goal.user_id)
        .bind(&goal.title)
        .bind(&goal.description)
        .bind(goal.target_date)
        .bind(goal.priority)
        .bind(progress_type)
        .bind(target)
        .bind(current)
        .bind(unit)
        .bind(goal.progress_percentage)
        .bind(goal.category)
        .bind(goal.goal_type)
        .bind(&goal.icon)
        .bind(goal.area_id)
        .bind(Utc::now())
        .fetch_optional(&self.db)
        .await?;

        Ok(row.map(Goal::from))
    }

    async fn delete_goal(&self, user_id: Uuid, goal_id: Uuid) -> Result<bool> {
        let result = sqlx::query("DELETE FROM goals WHERE id = $1 AND user_id = $2")
            .bind(goal_id)
            .bind(user_id)
            .execute(&self.db)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

#[async_trait]
impl StepRepository for PgStore {
    async fn insert_step(&self, step: &DailyStep) -> Result<DailyStep> {
        let inserted = sqlx::query_as::<_, DailyStep>(&format!(
            r#"
            INSERT INTO daily_steps (
                id, user_id, goal_id, metric_id, title, description, date, completed,
                completed_at, step_type, custom_type_name, update_value, update_unit,
                created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $14)
            RETURNING {STEP_COLUMNS}
            "#
        ))
        .bind(step.id)
        .bind(step.user_id)
        .bind(step.goal_id)
        .bind(step.metric_id)
        .bind(&step.title)
        .bind(&step.description)
        .bind(step.date)
        .bind(step.completed)
        .bind(step.completed_at)
        .bind(step.step_type)
        .bind(&step.custom_type_name)
        .bind(step.update_value)
        .bind(&step.update_unit)
        .bind(step.created_at)
        .fetch_one(&self.db)
        .await?;

        Ok(inserted)
    }

    async fn get_step(&self, user_id: Uuid, step_id: Uuid) -> Result<Option<DailyStep>> {
        let step = sqlx::query_as::<_, DailyStep>(&format!(
            "SELECT {STEP_COLUMNS} FROM daily_steps WHERE id = $1 AND user_id = $2"
        ))
        .bind(step_id)
        .bind(user_id)
        .fetch_optional(&self.db)
        .await?;

        Ok(step)
    }

    async fn list_steps(&self, user_id: Uuid, filter: &StepFilter) -> Result<Vec<DailyStep>> {
        let steps = sqlx::query_as::<_, DailyStep>(&format!(
            r#"
            SELECT {STEP_COLUMNS} FROM daily_steps
            WHERE user_id = $1
              AND ($2::DATE IS NULL OR date = $2)
              AND ($3::UUID IS NULL OR goal_id = $3)
            ORDER BY date ASC, created_at ASC
            "#
        ))
        .bind(user_id)
        .bind(filter.date)
        .bind(filter.goal_id)
        .fetch_all(&self.db)
        .await?;

        Ok(steps)
    }

    async fn save_step(&self, step: &DailyStep) -> Result<Option<DailyStep>> {
        let saved = sqlx::query_as::<_, DailyStep>(&format!(
            r#"
            UPDATE daily_steps
            SET
                goal_id = $3,
                metric_id = $4,
                title = $5,
                description = $6,
                date = $7,
                completed = $8,
                completed_at = $9,
                step_type = $10,
                custom_type_name = $11,
                update_value = $12,
                update_unit = $13,
                updated_at = $14
            WHERE id = $1 AND user_id = $2
            RETURNING {STEP_COLUMNS}
            "#
        ))
        .bind(step.id)
        .bind(step.user_id)
        .bind(step.goal_id)
        .bind(step.metric_id)
        .bind(&step.title)
        .bind(&step.description)
        .bind(step.date)
        .bind(step.completed)
        .bind(step.completed_at)
        .bind(step.step_type)
        .bind(&step.custom_type_name)
        .bind(step.update_value)
        .bind(&step.update_unit)
        .bind(Utc::now())
        .fetch_optional(&self.db)
        .await?;

        Ok(saved)
    }

    async fn delete_step(&self, user_id: Uuid, step_id: Uuid) -> Result<bool> {
        let result = sqlx::query("DELETE FROM daily_steps WHERE id = $1 AND user_id = $2")
            .bind(step_id)
            .bind(user_id)
            .execute(&self.db)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn count_steps_on(&self, user_id: Uuid, date: NaiveDate) -> Result<i64> {
        let count = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM daily_steps WHERE user_id = $1 AND date = $2",
        )
        .bind(user_id)
        .bind(date)
        .fetch_one(&self.db)
        .await?;

        Ok(count)
    }

    async fn goal_step_counts(&self, user_id: Uuid, goal_id: Uuid) -> Result<StepCounts> {
        let (completed, total) = sqlx::query_as::<_, (i64, i64)>(
            r#"
            SELECT COUNT(*) FILTER (WHERE completed), COUNT(*)
            FROM daily_steps
            WHERE user_id = $1 AND goal_id = $2
            "#,
        )
        .bind(user_id)
        .bind(goal_id)
        .fetch_one(&self.db)
        .await?;

        Ok(StepCounts { completed, total })
    }

    async fn count_owned_steps(&self, user_id: Uuid, step_ids: &[Uuid]) -> Result<i64> {
        let count = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM daily_steps WHERE user_id = $1 AND id = ANY($2)",
        )
        .bind(user_id)
        .bind(step_ids)
        .fetch_one(&self.db)
        .await?;

        Ok(count)
    }
}

#[async_trait]
impl MetricRepository for PgStore {
    async fn insert_metric(&self, metric: &Metric) -> Result<Metric> {
        let inserted = sqlx::query_as::<_, Metric>(&format!(
            r#"
            INSERT INTO metrics (id, user_id, step_id, name, unit, metric_type, target_value, current_value, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $9)
            RETURNING {METRIC_COLUMNS}
            "#
        ))
        .bind(metric.id)
        .bind(metric.user_id)
        .bind(metric.step_id)
        .bind(&metric.name)
        .bind(&metric.unit)
        .bind(metric.metric_type)
        .bind(metric.target_value)
        .bind(metric.current_value)
        .bind(metric.created_at)
        .fetch_one(&self.db)
        .await?;

        Ok(inserted)
    }

    async fn get_metric(&self, user_id: Uuid, metric_id: Uuid) -> Result<Option<Metric>> {
        let metric = sqlx::query_as::<_, Metric>(&format!(
            "SELECT {METRIC_COLUMNS} FROM metrics WHERE id = $1 AND user_id = $2"
        ))
        .bind(metric_id)
        .bind(user_id)
        .fetch_optional(&self.db)
        .await?;

        Ok(metric)
    }

    async fn list_metrics(&self, user_id: Uuid) -> Result<Vec<Metric>> {
        let metrics = sqlx::query_as::<_, Metric>(&format!(
            "SELECT {METRIC_COLUMNS} FROM metrics WHERE user_id = $1 ORDER BY created_at"
        ))
        .bind(user_id)
        .fetch_all(&self.db)
        .await?;

        Ok(metrics)
    }

    async fn save_metric(&self, metric: &Metric) -> Result<Option<Metric>> {
        let saved = sqlx::query_as::<_, Metric>(&format!(
            r#"
            UPDATE metrics
            SET name = $3, unit = $4, metric_type = $5, target_value = $6, current_value = $7, updated_at = $8
            WHERE id = $1 AND user_id = $2
            RETURNING {METRIC_COLUMNS}
            "#
        ))
        .bind(metric.id)
        .bind(metric.user_id)
        .bind(&metric.name)
        .bind(&metric.unit)
        .bind(metric.metric_type)
        .bind(metric.target_value)
        .bind(metric.current_value)
        .bind(Utc::now())
        .fetch_optional(&self.db)
        .await?;

        Ok(saved)
    }

    async fn insert_goal_metric(&self, metric: &GoalMetric) -> Result<GoalMetric> {
        let inserted = sqlx::query_as::<_, GoalMetric>(&format!(
            r#"
            INSERT INTO goal_metrics (id, user_id, goal_id, name, unit, metric_type, target_value, current_value, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $9)
            RETURNING {GOAL_METRIC_COLUMNS}
            "#
        ))
        .bind(metric.id)
        .bind(metric.user_id)
        .bind(metric.goal_id)
        .bind(&metric.name)
        .bind(&metric.unit)
        .bind(metric.metric_type)
        .bind(metric.target_value)
        .bind(metric.current_value)
        .bind(metric.created_at)
        .fetch_one(&self.db)
        .await?;

        Ok(inserted)
    }

    async fn get_goal_metric(&self, user_id: Uuid, metric_id: Uuid) -> Result<Option<GoalMetric>> {
        let metric = sqlx::query_as::<_, GoalMetric>(&format!(
            "SELECT {GOAL_METRIC_COLUMNS} FROM goal_metrics WHERE id = $1 AND user_id = $2"
        ))
        .bind(metric_id)
        .bind(user_id)
        .fetch_optional(&self.db)
        .await?;

        Ok(metric)
    }

    async fn list_goal_metrics(&self, user_id: Uuid, goal_id: Uuid) -> Result<Vec<GoalMetric>> {
        let metrics = sqlx::query_as::<_, GoalMetric>(&format!(
            "SELECT {GOAL_METRIC_COLUMNS} FROM goal_metrics \
             WHERE user_id = $1 AND goal_id = $2 ORDER BY created_at"
        ))
        .bind(user_id)
        .bind(goal_id)
        .fetch_all(&self.db)
        .await?;

        Ok(metrics)
    }

    async fn save_goal_metric(&self, metric: &GoalMetric) -> Result<Option<GoalMetric>> {
        let saved = sqlx::query_as::<_, GoalMetric>(&format!(
            r#"
            UPDATE goal_metrics
            SET name = $3, unit = $4, metric_type = $5, target_value = $6, current_value = $7, updated_at = $8
            WHERE id = $1 AND user_id = $2
            RETURNING {GOAL_METRIC_COLUMNS}
            "#
        ))
        .bind(metric.id)
        .bind(metric.user_id)
        .bind(&metric.name)
        .bind(&metric.unit)
        .bind(metric.metric_type)
        .bind(metric.target_value)
        .bind(metric.current_value)
        .bind(Utc::now())
        .fetch_optional(&self.db)
        .await?;

        Ok(saved)
    }

    async fn delete_goal_metric(&self, user_id: Uuid, metric_id: Uuid) -> Result<bool> {
        let result = sqlx::query("DELETE FROM goal_metrics WHERE id = $1 AND user_id = $2")
            .bind(metric_id)
            .bind(user_id)
            .execute(&self.db)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

#[async_trait]
impl PlanningRepository for PgStore {
    async fn get_planning(&self, user_id: Uuid, date: NaiveDate) -> Result<Option<DailyPlanning>> {
        let planning = sqlx::query_as::<_, DailyPlanning>(&format!(
            "SELECT {PLANNING_COLUMNS} FROM daily_planning WHERE user_id = $1 AND date = $2"
        ))
        .bind(user_id)
        .bind(date)
        .fetch_optional(&self.db)
        .await?;

        Ok(planning)
    }

    async fn upsert_planned_steps(
        &self,
        user_id: Uuid,
        date: NaiveDate,
        planned_steps: &[Uuid],
    ) -> Result<DailyPlanning> {
        let planning = sqlx::query_as::<_, DailyPlanning>(&format!(
            r#"
            INSERT INTO daily_planning (id, user_id, date, planned_steps, completed_steps, created_at, updated_at)
            VALUES ($1, $2, $3, $4, '{{}}', $5, $5)
            ON CONFLICT (user_id, date)
            DO UPDATE SET planned_steps = EXCLUDED.planned_steps, updated_at = EXCLUDED.updated_at
            RETURNING {PLANNING_COLUMNS}
            "#
        ))
        .bind(Uuid::new_v4())
        .bind(user_id)
        .bind(date)
        .bind(planned_steps)
        .bind(Utc::now())
        .fetch_one(&self.db)
        .await?;

        Ok(planning)
    }

    async fn add_completed_step(
        &self,
        user_id: Uuid,
        date: NaiveDate,
        step_id: Uuid,
    ) -> Result<Option<DailyPlanning>> {
        let planning = sqlx::query_as::<_, DailyPlanning>(&format!(
            r#"
            UPDATE daily_planning
            SET
                completed_steps = CASE
                    WHEN $3 = ANY(completed_steps) THEN completed_steps
                    ELSE array_append(completed_steps, $3)
                END,
                updated_at = $4
            WHERE user_id = $1 AND date = $2
            RETURNING {PLANNING_COLUMNS}
            "#
        ))
        .bind(user_id)
        .bind(date)
        .bind(step_id)
        .bind(Utc::now())
        .fetch_optional(&self.db)
        .await?;

        Ok(planning)
    }

    async fn reset_planning(&self, user_id: Uuid, date: NaiveDate) -> Result<DailyPlanning> {
        let planning = sqlx::query_as::<_, DailyPlanning>(&format!(
            r#"
            INSERT INTO daily_planning (id, user_id, date, planned_steps, completed_steps, created_at, updated_at)
            VALUES ($1, $2, $3, '{{}}', '{{}}', $4, $4)
            ON CONFLICT (user_id, date)
            DO UPDATE SET planned_steps = '{{}}', completed_steps = '{{}}', updated_at = EXCLUDED.updated_at
            RETURNING {PLANNING_COLUMNS}
            "#
        ))
        .bind(Uuid::new_v4())
        .bind(user_id)
        .bind(date)
        .bind(Utc::now())
        .fetch_one(&self.db)
        .await?;

        Ok(planning)
    }
}

#[async_trait]
impl StatsRepository for PgStore {
    async fn upsert_daily_stats(&self, stats: &DailyStats) -> Result<DailyStats> {
        let saved = sqlx::query_as::<_, DailyStats>(&format!(
            r#"
            INSERT INTO daily_stats (
                id, user_id, date, planned_steps_count, completed_steps_count,
                total_steps_count, optimum_deviation, created_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            ON CONFLICT (user_id, date)
            DO UPDATE SET
                planned_steps_count = EXCLUDED.planned_steps_count,
                completed_steps_count = EXCLUDED.completed_steps_count,
                total_steps_count = EXCLUDED.total_steps_count,
                optimum_deviation = EXCLUDED.optimum_deviation
            RETURNING {STATS_COLUMNS}
            "#
        ))
        .bind(stats.id)
        .bind(stats.user_id)
        .bind(stats.date)
        .bind(stats.planned_steps_count)
        .bind(stats.completed_steps_count)
        .bind(stats.total_steps_count)
        .bind(stats.optimum_deviation)
        .bind(stats.created_at)
        .fetch_one(&self.db)
        .await?;

        Ok(saved)
    }

    async fn get_daily_stats(&self, user_id: Uuid, date: NaiveDate) -> Result<Option<DailyStats>> {
        let stats = sqlx::query_as::<_, DailyStats>(&format!(
            "SELECT {STATS_COLUMNS} FROM daily_stats WHERE user_id = $1 AND date = $2"
        ))
        .bind(user_id)
        .bind(date)
        .fetch_optional(&self.db)
        .await?;

        Ok(stats)
    }

    async fn list_daily_stats(
        &self,
        user_id: Uuid,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<DailyStats>> {
        let stats = sqlx::query_as::<_, DailyStats>(&format!(
            "SELECT {STATS_COLUMNS} FROM daily_stats \
             WHERE user_id = $1 AND date BETWEEN $2 AND $3 ORDER BY date"
        ))
        .bind(user_id)
        .bind(from)
        .bind(to)
        .fetch_all(&self.db)
        .await?;

        Ok(stats)
    }
}

#[async_trait]
impl SettingsRepository for PgStore {
    async fn get_user_settings(&self, user_id: Uuid) -> Result<Option<UserSettings>> {
        let settings = sqlx::query_as::<_, UserSettings>(
            "SELECT user_id, daily_steps_count, workflow, daily_reset_hour, updated_at \
             FROM user_settings WHERE user_id = $1",
        )
        .bind(user_id)
        .fetch_optional(&self.db)
        .await?;

        Ok(settings)
    }

    async fn save_user_settings(&self, settings: &UserSettings) -> Result<UserSettings> {
        let saved = sqlx::query_as::<_, UserSettings>(
            r#"
            INSERT INTO user_settings (user_id, daily_steps_count, workflow, daily_reset_hour, updated_at)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (user_id) DO UPDATE SET
                daily_steps_count = EXCLUDED.daily_steps_count,
                workflow = EXCLUDED.workflow,
                daily_reset_hour = EXCLUDED.daily_reset_hour,
                updated_at = EXCLUDED.updated_at
            RETURNING user_id, daily_steps_count, workflow, daily_reset_hour, updated_at
            "#,
        )
        .bind(settings.user_id)
        .bind(settings.daily_steps_count)
        .bind(settings.workflow)
        .bind(settings.daily_reset_hour)
        .bind(Utc::now())
        .fetch_one(&self.db)
        .await?;

        Ok(saved)
    }

    async fn get_category_settings(&self, user_id: Uuid) -> Result<Option<CategorySettings>> {
        let settings = sqlx::query_as::<_, CategorySettings>(
            "SELECT user_id, short_term_days, long_term_days, updated_at \
             FROM category_settings WHERE user_id = $1",
        )
        .bind(user_id)
        .fetch_optional(&self.db)
        .await?;

        Ok(settings)
    }

    async fn save_category_settings(&self, settings: &CategorySettings) -> Result<CategorySettings> {
        let saved = sqlx::query_as::<_, CategorySettings>(
            r#"
            INSERT INTO category_settings (user_id, short_term_days, long_term_days, updated_at)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (user_id) DO UPDATE SET
                short_term_days = EXCLUDED.short_term_days,
                long_term_days = EXCLUDED.long_term_days,
                updated_at = EXCLUDED.updated_at
            RETURNING user_id, short_term_days, long_term_days, updated_at
            "#,
        )
        .bind(settings.user_id)
        .bind(settings.short_term_days)
        .bind(settings.long_term_days)
        .bind(Utc::now())
        .fetch_one(&self.db)
        .await?;

        Ok(saved)
    }

    async fn get_needed_steps_settings(
        &self,
        user_id: Uuid,
    ) -> Result<Option<NeededStepsSettings>> {
        let settings = sqlx::query_as::<_, NeededStepsSettings>(
            "SELECT user_id, enabled, days_of_week, time_of_day, updated_at \
             FROM needed_steps_settings WHERE user_id = $1",
        )
        .bind(user_id)
        .fetch_optional(&self.db)
        .await?;

        Ok(settings)
    }

    async fn save_needed_steps_settings(
        &self,
        settings: &NeededStepsSettings,
    ) -> Result<NeededStepsSettings> {
        let saved = sqlx::query_as::<_, NeededStepsSettings>(
            r#"
            INSERT INTO needed_steps_settings (user_id, enabled, days_of_week, time_of_day, updated_at)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (user_id) DO UPDATE SET
                enabled = EXCLUDED.enabled,
                days_of_week = EXCLUDED.days_of_week,
                time_of_day = EXCLUDED.time_of_day,
                updated_at = EXCLUDED.updated_at
            RETURNING user_id, enabled, days_of_week, time_of_day, updated_at
            "#,
        )
        .bind(settings.user_id)
        .bind(settings.enabled)
        .bind(&settings.days_of_week)
        .bind(settings.time_of_day)
        .bind(Utc::now())
        .fetch_one(&self.db)
        .await?;

        Ok(saved)
    }

    async fn list_user_settings(&self) -> Result<Vec<UserSettings>> {
        // users without a row get the same defaults the settings API reports
        let defaults = UserSettings::defaults(Uuid::nil());
        let settings = sqlx::query_as::<_, UserSettings>(
            r#"
            SELECT
                u.id AS user_id,
                COALESCE(s.daily_steps_count, $1) AS daily_steps_count,
                COALESCE(s.workflow, $2) AS workflow,
                COALESCE(s.daily_reset_hour, $3) AS daily_reset_hour,
                COALESCE(s.updated_at, u.created_at) AS updated_at
            FROM users u
            LEFT JOIN user_settings s ON s.user_id = u.id
            ORDER BY u.created_at
            "#,
        )
        .bind(defaults.daily_steps_count)
        .bind(defaults.workflow)
        .bind(defaults.daily_reset_hour)
        .fetch_all(&self.db)
        .await?;

        Ok(settings)
    }
}

#[async_trait]
impl AutomationRepository for PgStore {
    async fn insert_automation(&self, automation: &Automation) -> Result<Automation> {
        let (kind, day, date) = automation.schedule.columns();
        let row = sqlx::query_as::<_, AutomationRow>(&format!(
            r#"
            INSERT INTO automations (
                id, user_id, name, description, automation_type, target_id,
                schedule_kind, schedule_day, scheduled_date, is_active, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $11)
            RETURNING {AUTOMATION_COLUMNS}
            "#
        ))
        .bind(automation.id)
        .bind(automation.user_id)
        .bind(&automation.name)
        .bind(&automation.description)
        .bind(automation.automation_type)
        .bind(automation.target_id)
        .bind(kind)
        .bind(day)
        .bind(date)
        .bind(automation.is_active)
        .bind(automation.created_at)
        .fetch_one(&self.db)
        .await?;

        Automation::try_from(row)
    }

    async fn get_automation(
        &self,
        user_id: Uuid,
        automation_id: Uuid,
    ) -> Result<Option<Automation>> {
        let row = sqlx::query_as::<_, AutomationRow>(&format!(
            "SELECT {AUTOMATION_COLUMNS} FROM automations WHERE id = $1 AND user_id = $2"
        ))
        .bind(automation_id)
        .bind(user_id)
        .fetch_optional(&self.db)
        .await?;

        row.map(Automation::try_from).transpose()
    }

    async fn list_automations(&self, user_id: Uuid) -> Result<Vec<Automation>> {
        let rows = sqlx::query_as::<_, AutomationRow>(&format!(
            "SELECT {AUTOMATION_COLUMNS} FROM automations WHERE user_id = $1 ORDER BY created_at"
        ))
        .bind(user_id)
        .fetch_all(&self.db)
        .await?;

        rows.into_iter().map(Automation::try_from).collect()
    }

    async fn save_automation(&self, automation: &Automation) -> Result<Option<Automation>> {
        let (kind, day, date) = automation.schedule.columns();
        let row = sqlx::query_as::<_, AutomationRow>(&format!(
            r#"
            UPDATE automations
            SET name = $3, description = $4, schedule_kind = $5, schedule_day = $6,
                scheduled_date = $7, is_active = $8, updated_at = $9
            WHERE id = $1 AND user_id = $2
            RETURNING {AUTOMATION_COLUMNS}
            "#
        ))
        .bind(automation.id)
        .bind(automation.user_id)
        .bind(&automation.name)
        .bind(&automation.description)
        .bind(kind)
        .bind(day)
        .bind(date)
        .bind(automation.is_active)
        .bind(Utc::now())
        .fetch_optional(&self.db)
        .await?;

        row.map(Automation::try_from).transpose()
    }

    async fn delete_automation(&self, user_id: Uuid, automation_id: Uuid) -> Result<bool> {
        let result = sqlx::query("DELETE FROM automations WHERE id = $1 AND user_id = $2")
            .bind(automation_id)
            .bind(user_id)
            .execute(&self.db)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn insert_interaction(
        &self,
        interaction: &EventInteraction,
    ) -> Result<Option<EventInteraction>> {
        let inserted = sqlx::query_as::<_, EventInteraction>(&format!(
            r#"
            INSERT INTO event_interactions (
                id, user_id, automation_id, date, status, completed_at, postponed_to, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $8)
            ON CONFLICT (user_id, automation_id, date) DO NOTHING
            RETURNING {INTERACTION_COLUMNS}
            "#
        ))
        .bind(interaction.id)
        .bind(interaction.user_id)
        .bind(interaction.automation_id)
        .bind(interaction.date)
        .bind(interaction.status)
        .bind(interaction.completed_at)
        .bind(interaction.postponed_to)
        .bind(interaction.created_at)
        .fetch_optional(&self.db)
        .await?;

        Ok(inserted)
    }

    async fn get_interaction(
        &self,
        user_id: Uuid,
        interaction_id: Uuid,
    ) -> Result<Option<EventInteraction>> {
        let interaction = sqlx::query_as::<_, EventInteraction>(&format!(
            "SELECT {INTERACTION_COLUMNS} FROM event_interactions WHERE id = $1 AND user_id = $2"
        ))
        .bind(interaction_id)
        .bind(user_id)
        .fetch_optional(&self.db)
        .await?;

        Ok(interaction)
    }

    async fn find_interaction(
        &self,
        user_id: Uuid,
        automation_id: Uuid,
        date: NaiveDate,
    ) -> Result<Option<EventInteraction>> {
        let interaction = sqlx::query_as::<_, EventInteraction>(&format!(
            "SELECT {INTERACTION_COLUMNS} FROM event_interactions \
             WHERE user_id = $1 AND automation_id = $2 AND date = $3"
        ))
        .bind(user_id)
        .bind(automation_id)
        .bind(date)
        .fetch_optional(&self.db)
        .await?;

        Ok(interaction)
    }

    async fn list_interactions_on(
        &self,
        user_id: Uuid,
        date: NaiveDate,
    ) -> Result<Vec<EventInteraction>> {
        let interactions = sqlx::query_as::<_, EventInteraction>(&format!(
            "SELECT {INTERACTION_COLUMNS} FROM event_interactions \
             WHERE user_id = $1 AND date = $2 ORDER BY created_at"
        ))
        .bind(user_id)
        .bind(date)
        .fetch_all(&self.db)
        .await?;

        Ok(interactions)
    }

    async fn complete_interaction(
        &self,
        user_id: Uuid,
        interaction_id: Uuid,
        completed_at: DateTime<Utc>,
    ) -> Result<Option<EventInteraction>> {
        let interaction = sqlx::query_as::<_, EventInteraction>(&format!(
            r#"
            UPDATE event_interactions
            SET status = 'completed', completed_at = $3, postponed_to = NULL, updated_at = $3
            WHERE id = $1 AND user_id = $2
            RETURNING {INTERACTION_COLUMNS}
            "#
        ))
        .bind(interaction_id)
        .bind(user_id)
        .bind(completed_at)
        .fetch_optional(&self.db)
        .await?;

        Ok(interaction)
    }

    async fn postpone_interaction(
        &self,
        user_id: Uuid,
        interaction_id: Uuid,
        postponed_to: DateTime<Utc>,
    ) -> Result<Option<EventInteraction>> {
        let interaction = sqlx::query_as::<_, EventInteraction>(&format!(
            r#"
            UPDATE event_interactions
            SET status = 'postponed', postponed_to = $3, completed_at = NULL, updated_at = $4
            WHERE id = $1 AND user_id = $2
            RETURNING {INTERACTION_COLUMNS}
            "#
        ))
        .bind(interaction_id)
        .bind(user_id)
        .bind(postponed_to)
        .bind(Utc::now())
        .fetch_optional(&self.db)
        .await?;

        Ok(interaction)
    }

    async fn list_due_postponed(
        &self,
        user_id: Uuid,
        before: DateTime<Utc>,
    ) -> Result<Vec<EventInteraction>> {
        let interactions = sqlx::query_as::<_, EventInteraction>(&format!(
            r#"
            SELECT {INTERACTION_COLUMNS} FROM event_interactions i
            WHERE i.user_id = $1
              AND i.status = 'postponed'
              AND i.postponed_to < $2
              AND NOT EXISTS (
                  SELECT 1 FROM event_interactions later
                  WHERE later.user_id = i.user_id
                    AND later.automation_id = i.automation_id
                    AND later.date > i.date
              )
            ORDER BY i.created_at
            "#
        ))
        .bind(user_id)
        .bind(before)
        .fetch_all(&self.db)
        .await?;

        Ok(interactions)
    }
}

#[async_trait]
impl StreakRepository for PgStore {
    async fn get_streak(&self, user_id: Uuid) -> Result<Option<UserStreak>> {
        let streak = sqlx::query_as::<_, UserStreak>(
            "SELECT user_id, current_streak, longest_streak, last_activity_date, updated_at \
             FROM user_streaks WHERE user_id = $1",
        )
        .bind(user_id)
        .fetch_optional(&self.db)
        .await?;

        Ok(streak)
    }

    async fn save_streak(&self, streak: &UserStreak) -> Result<UserStreak> {
        let saved = sqlx::query_as::<_, UserStreak>(
            r#"
            INSERT INTO user_streaks (user_id, current_streak, longest_streak, last_activity_date, updated_at)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (user_id) DO UPDATE SET
                current_streak = EXCLUDED.current_streak,
                longest_streak = EXCLUDED.longest_streak,
                last_activity_date = EXCLUDED.last_activity_date,
                updated_at = EXCLUDED.updated_at
            RETURNING user_id, current_streak, longest_streak, last_activity_date, updated_at
            "#,
        )
        .bind(streak.user_id)
        .bind(streak.current_streak)
        .bind(streak.longest_streak)
        .bind(streak.last_activity_date)
        .bind(streak.updated_at)
        .fetch_one(&self.db)
        .await?;

        Ok(saved)
    }
}

#[async_trait]
impl ValueRepository for PgStore {
    async fn insert_value(&self, value: &Value) -> Result<Value> {
        let inserted = sqlx::query_as::<_, Value>(&format!(
            r#"
            INSERT INTO "values" (id, user_id, name, description, color, icon, level, experience, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $9)
            RETURNING {VALUE_COLUMNS}
            "#
        ))
        .bind(value.id)
        .bind(value.user_id)
        .bind(&value.name)
        .bind(&value.description)
        .bind(&value.color)
        .bind(&value.icon)
        .bind(value.level)
        .bind(value.experience)
        .bind(value.created_at)
        .fetch_one(&self.db)
        .await?;

        Ok(inserted)
    }

    async fn get_value(&self, user_id: Uuid, value_id: Uuid) -> Result<Option<Value>> {
        let value = sqlx::query_as::<_, Value>(&format!(
            r#"SELECT {VALUE_COLUMNS} FROM "values" WHERE id = $1 AND user_id = $2"#
        ))
        .bind(value_id)
        .bind(user_id)
        .fetch_optional(&self.db)
        .await?;

        Ok(value)
    }

    async fn list_values(&self, user_id: Uuid) -> Result<Vec<Value>> {
        let values = sqlx::query_as::<_, Value>(&format!(
            r#"SELECT {VALUE_COLUMNS} FROM "values" WHERE user_id = $1 ORDER BY created_at"#
        ))
        .bind(user_id)
        .fetch_all(&self.db)
        .await?;

        Ok(values)
    }

    async fn save_value(&self, value: &Value) -> Result<Option<Value>> {
        let saved = sqlx::query_as::<_, Value>(&format!(
            r#"
            UPDATE "values"
            SET name = $3, description = $4, color = $5, icon = $6, level = $7, experience = $8, updated_at = $9
            WHERE id = $1 AND user_id = $2
            RETURNING {VALUE_COLUMNS}
            "#
        ))
        .bind(value.id)
        .bind(value.user_id)
        .bind(&value.name)
        .bind(&value.description)
        .bind(&value.color)
        .bind(&value.icon)
        .bind(value.level)
        .bind(value.experience)
        .bind(Utc::now())
        .fetch_optional(&self.db)
        .await?;

        Ok(saved)
    }

    async fn insert_area(&self, area: &Area) -> Result<Area> {
        let inserted = sqlx::query_as::<_, Area>(
            r#"
            INSERT INTO areas (id, user_id, name, color, icon, sort_order, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING id, user_id, name, color, icon, sort_order, created_at
            "#,
        )
        .bind(area.id)
        .bind(area.user_id)
        .bind(&area.name)
        .bind(&area.color)
        .bind(&area.icon)
        .bind(area.sort_order)
        .bind(area.created_at)
        .fetch_one(&self.db)
        .await?;

        Ok(inserted)
    }

    async fn list_areas(&self, user_id: Uuid) -> Result<Vec<Area>> {
        let areas = sqlx::query_as::<_, Area>(
            "SELECT id, user_id, name, color, icon, sort_order, created_at \
             FROM areas WHERE user_id = $1 ORDER BY sort_order, created_at",
        )
        .bind(user_id)
        .fetch_all(&self.db)
        .await?;

        Ok(areas)
    }

    async fn delete_area(&self, user_id: Uuid, area_id: Uuid) -> Result<bool> {
        let result = sqlx::query("DELETE FROM areas WHERE id = $1 AND user_id = $2")
            .bind(area_id)
            .bind(user_id)
            .execute(&self.db)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
