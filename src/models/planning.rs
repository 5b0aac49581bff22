use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// The steps a user committed to for one day. `completed_steps` is not
/// required to be a subset of `planned_steps`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct DailyPlanning {
    pub id: Uuid,
    pub user_id: Uuid,
    pub date: NaiveDate,
    pub planned_steps: Vec<Uuid>,
    pub completed_steps: Vec<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl DailyPlanning {
    pub fn empty(user_id: Uuid, date: NaiveDate) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            user_id,
            date,
            planned_steps: Vec::new(),
            completed_steps: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }
}

/// Archived outcome of one past day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct DailyStats {
    pub id: Uuid,
    pub user_id: Uuid,
    pub date: NaiveDate,
    pub planned_steps_count: i32,
    pub completed_steps_count: i32,
    pub total_steps_count: i32,
    pub optimum_deviation: i32,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UpsertPlanningRequest {
    pub planned_steps: Vec<Uuid>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CompletePlannedStepRequest {
    pub step_id: Uuid,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StatsQuery {
    pub from: NaiveDate,
    pub to: NaiveDate,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatsSummary {
    pub from: NaiveDate,
    pub to: NaiveDate,
    pub days_recorded: usize,
    pub planned_steps: i64,
    pub completed_steps: i64,
    pub total_steps: i64,
    pub completion_rate: f64,
    pub average_optimum_deviation: f64,
}
