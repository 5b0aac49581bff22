use std::collections::HashSet;

use chrono::NaiveDate;
use uuid::Uuid;

use crate::errors::{AppError, AppResult};
use crate::models::DailyPlanning;
use crate::store::{DynStore, PlanningRepository, StepRepository};

/// Owns the one planning record per (user, date). Completions outside the
/// plan are accepted.
#[derive(Clone)]
pub struct PlanningService {
    store: DynStore,
}

impl PlanningService {
    pub fn new(store: DynStore) -> Self {
        Self { store }
    }

    /// Never creates a record on read.
    pub async fn get_planning(&self, user_id: Uuid, date: NaiveDate) -> AppResult<Option<DailyPlanning>> {
        Ok(self.store.get_planning(user_id, date).await?)
    }

    /// Replaces the planned list (first occurrence of a repeated id wins),
    /// keeping `completed_steps`.
    pub async fn upsert_planning(
        &self,
        user_id: Uuid,
        date: NaiveDate,
        planned_steps: Vec<Uuid>,
    ) -> AppResult<DailyPlanning> {
        let mut seen = HashSet::new();
        let planned_steps: Vec<Uuid> = planned_steps
            .into_iter()
            .filter(|id| seen.insert(*id))
            .collect();

        let owned = self.store.count_owned_steps(user_id, &planned_steps).await?;
        if owned != planned_steps.len() as i64 {
            return Err(AppError::NotFound("Step"));
        }

        Ok(self
            .store
            .upsert_planned_steps(user_id, date, &planned_steps)
            .await?)
    }

    /// Adds the step to `completed_steps` once; repeating it is a no-op.
    pub async fn mark_step_completed(
        &self,
        user_id: Uuid,
        date: NaiveDate,
        step_id: Uuid,
    ) -> AppResult<DailyPlanning> {
        if self.store.get_step(user_id, step_id).await?.is_none() {
            return Err(AppError::NotFound("Step"));
        }

        self.store
            .add_completed_step(user_id, date, step_id)
            .await?
            .ok_or(AppError::NotFound("Daily planning"))
    }
}
