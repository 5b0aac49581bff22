use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Type};
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, Type)]
#[sqlx(type_name = "metric_type", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum MetricType {
    #[default]
    Number,
    Currency,
    Percentage,
    Distance,
    Time,
    Custom,
}

/// Legacy tracker scoped to a single daily step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Metric {
    pub id: Uuid,
    pub user_id: Uuid,
    pub step_id: Uuid,
    pub name: String,
    pub unit: Option<String>,
    pub metric_type: MetricType,
    pub target_value: f64,
    pub current_value: f64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Tracker attached to a goal; feeds the metrics half of combined progress.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct GoalMetric {
    pub id: Uuid,
    pub user_id: Uuid,
    pub goal_id: Uuid,
    pub name: String,
    pub unit: Option<String>,
    pub metric_type: MetricType,
    pub target_value: f64,
    pub current_value: f64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateMetricRequest {
    #[validate(length(min = 1, max = 255))]
    pub name: String,
    #[validate(length(max = 50))]
    pub unit: Option<String>,
    pub metric_type: Option<MetricType>,
    pub target_value: f64,
    pub current_value: Option<f64>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateStepMetricRequest {
    pub step_id: Uuid,
    #[serde(flatten)]
    #[validate(nested)]
    pub metric: CreateMetricRequest,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateMetricRequest {
    #[validate(length(min = 1, max = 255))]
    pub name: Option<String>,
    #[validate(length(max = 50))]
    pub unit: Option<String>,
    pub metric_type: Option<MetricType>,
    pub target_value: Option<f64>,
    pub current_value: Option<f64>,
}
