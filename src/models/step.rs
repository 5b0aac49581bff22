use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Type};
use uuid::Uuid;
use validator::Validate;

/// An actionable item live on one calendar day, optionally feeding a goal
/// and/or a metric.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct DailyStep {
    pub id: Uuid,
    pub user_id: Uuid,
    pub goal_id: Option<Uuid>,
    pub metric_id: Option<Uuid>,
    pub title: String,
    pub description: Option<String>,
    pub date: NaiveDate,
    pub completed: bool,
    pub completed_at: Option<DateTime<Utc>>,
    pub step_type: StepType,
    pub custom_type_name: Option<String>,
    pub update_value: Option<f64>,
    pub update_unit: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, Type)]
#[sqlx(type_name = "step_type", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum StepType {
    #[default]
    Task,
    Update,
    Custom,
}

/// Completed/total counts of the steps linked to one goal.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StepCounts {
    pub completed: i64,
    pub total: i64,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct StepFilter {
    pub date: Option<NaiveDate>,
    pub goal_id: Option<Uuid>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateStepRequest {
    #[validate(length(min = 1, max = 255))]
    pub title: String,
    #[validate(length(max = 5000))]
    pub description: Option<String>,
    pub date: NaiveDate,
    pub goal_id: Option<Uuid>,
    pub metric_id: Option<Uuid>,
    pub step_type: Option<StepType>,
    #[validate(length(max = 100))]
    pub custom_type_name: Option<String>,
    pub update_value: Option<f64>,
    #[validate(length(max = 50))]
    pub update_unit: Option<String>,
}

/// Partial edit. Nested options let `null` unlink the goal or metric.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateStepRequest {
    #[validate(length(min = 1, max = 255))]
    pub title: Option<String>,
    #[validate(length(max = 5000))]
    pub description: Option<String>,
    pub date: Option<NaiveDate>,
    #[serde(default, deserialize_with = "crate::models::double_option")]
    pub goal_id: Option<Option<Uuid>>,
    #[serde(default, deserialize_with = "crate::models::double_option")]
    pub metric_id: Option<Option<Uuid>>,
    pub step_type: Option<StepType>,
    #[validate(length(max = 100))]
    pub custom_type_name: Option<String>,
    pub update_value: Option<f64>,
    #[validate(length(max = 50))]
    pub update_unit: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ToggleStepRequest {
    pub completed: bool,
}

#[derive(Debug, Serialize)]
pub struct ToggleStepResponse {
    pub step: DailyStep,
    /// Present when the toggle newly completed a goal-linked step.
    pub goal: Option<crate::models::Goal>,
}
