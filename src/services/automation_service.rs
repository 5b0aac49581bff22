use std::collections::HashSet;

use chrono::{DateTime, Local, NaiveDate, TimeZone, Utc};
use serde::Serialize;
use tracing::{info, instrument, warn};
use uuid::Uuid;
use validator::Validate;

use crate::errors::{AppError, AppResult};
use crate::models::{
    Automation, AutomationType, CreateAutomationRequest, DailyStep, EventInteraction, Goal,
    InteractionStatus, Metric, Schedule, SmartEvent, UpdateAutomationRequest,
};
use crate::store::{AutomationRepository, DynStore, GoalRepository, MetricRepository, StepRepository, UserRepository};

/// What an automation points at, resolved down to its goal.
struct EventContext {
    goal: Goal,
    step: DailyStep,
    metric: Option<Metric>,
}

#[derive(Debug, Default, Serialize)]
pub struct GenerationFailure {
    pub user_id: Uuid,
    pub error: String,
}

#[derive(Debug, Default, Serialize)]
pub struct GenerationReport {
    pub date: Option<NaiveDate>,
    pub users: usize,
    pub generated: usize,
    pub failures: Vec<GenerationFailure>,
}

#[derive(Clone)]
pub struct AutomationService {
    store: DynStore,
}

impl AutomationService {
    pub fn new(store: DynStore) -> Self {
        Self { store }
    }

    pub async fn create_automation(
        &self,
        user_id: Uuid,
        request: CreateAutomationRequest,
    ) -> AppResult<Automation> {
        request.validate()?;

        let schedule = match (request.schedule, request.frequency_type.as_deref()) {
            (Some(schedule), _) => schedule,
            (None, Some(frequency_type)) => Schedule::from_legacy(
                frequency_type,
                request.frequency_time.as_deref(),
                request.scheduled_date,
            )
            .map_err(AppError::InvalidInput)?,
            (None, None) => {
                return Err(AppError::invalid(
                    "either schedule or frequency_type is required",
                ))
            }
        };
        schedule.validate().map_err(AppError::InvalidInput)?;

        match request.automation_type {
            AutomationType::Metric => {
                if self.store.get_metric(user_id, request.target_id).await?.is_none() {
                    return Err(AppError::NotFound("Metric"));
                }
            }
            AutomationType::Step => {
                if self.store.get_step(user_id, request.target_id).await?.is_none() {
                    return Err(AppError::NotFound("Step"));
                }
            }
        }

        let now = Utc::now();
        let automation = Automation {
            id: Uuid::new_v4(),
            user_id,
            name: request.name,
            description: request.description,
            automation_type: request.automation_type,
            target_id: request.target_id,
            schedule,
            is_active: request.is_active.unwrap_or(true),
            created_at: now,
            updated_at: now,
        };
        Ok(self.store.insert_automation(&automation).await?)
    }

    pub async fn list_automations(&self, user_id: Uuid) -> AppResult<Vec<Automation>> {
        Ok(self.store.list_automations(user_id).await?)
    }

    pub async fn update_automation(
        &self,
        user_id: Uuid,
        automation_id: Uuid,
        request: UpdateAutomationRequest,
    ) -> AppResult<Automation> {
        request.validate()?;
        let mut automation = self
            .store
            .get_automation(user_id, automation_id)
            .await?
            .ok_or(AppError::NotFound("Automation"))?;

        if let Some(name) = request.name {
            automation.name = name;
        }
        if let Some(description) = request.description {
            automation.description = Some(description);
        }
        if let Some(schedule) = request.schedule {
            schedule.validate().map_err(AppError::InvalidInput)?;
            automation.schedule = schedule;
        }
        if let Some(is_active) = request.is_active {
            automation.is_active = is_active;
        }

        self.store
            .save_automation(&automation)
            .await?
            .ok_or(AppError::NotFound("Automation"))
    }

    pub async fn delete_automation(&self, user_id: Uuid, automation_id: Uuid) -> AppResult<()> {
        if !self.store.delete_automation(user_id, automation_id).await? {
            return Err(AppError::NotFound("Automation"));
        }
        Ok(())
    }

    /// Evaluation pass for one user and day. Creates a pending interaction for
    /// every active automation that fires today, or whose last postponement
    /// has come due, and has none yet. Returns views of only those new
    /// events. Safe to repeat.
    pub async fn generate(&self, user_id: Uuid, today: NaiveDate) -> AppResult<Vec<SmartEvent>> {
        let automations = self.store.list_automations(user_id).await?;
        let due_postponed: HashSet<Uuid> = self
            .store
            .list_due_postponed(user_id, next_local_midnight(today)?)
            .await?
            .into_iter()
            .map(|interaction| interaction.automation_id)
            .collect();
        let mut events = Vec::new();

        for automation in automations {
            let fires = automation.schedule.matches(today) || due_postponed.contains(&automation.id);
            if !automation.is_active || !fires {
                continue;
            }
            if self
                .store
                .find_interaction(user_id, automation.id, today)
                .await?
                .is_some()
            {
                continue;
            }

            let Some(context) = self.resolve(&automation).await? else {
                warn!(
                    automation_id = %automation.id,
                    target_id = %automation.target_id,
                    "Skipping automation whose target has no goal"
                );
                continue;
            };

            let pending = EventInteraction::pending(user_id, automation.id, today);
            // a concurrent pass may have won the unique key
            if let Some(interaction) = self.store.insert_interaction(&pending).await? {
                events.push(build_event(&interaction, &automation, &context));
            }
        }

        Ok(events)
    }

    /// Runs the evaluation pass and returns every pending event dated today.
    pub async fn list_smart_events(&self, user_id: Uuid, today: NaiveDate) -> AppResult<Vec<SmartEvent>> {
        self.generate(user_id, today).await?;

        let interactions = self.store.list_interactions_on(user_id, today).await?;
        let mut events = Vec::new();
        for interaction in interactions {
            if interaction.status != InteractionStatus::Pending {
                continue;
            }
            let Some(automation) = self
                .store
                .get_automation(user_id, interaction.automation_id)
                .await?
            else {
                continue;
            };
            if let Some(context) = self.resolve(&automation).await? {
                events.push(build_event(&interaction, &automation, &context));
            }
        }

        Ok(events)
    }

    pub async fn complete_interaction(
        &self,
        user_id: Uuid,
        interaction_id: Uuid,
        now: DateTime<Utc>,
    ) -> AppResult<EventInteraction> {
        self.store
            .complete_interaction(user_id, interaction_id, now)
            .await?
            .ok_or(AppError::NotFound("Interaction"))
    }

    /// Without an explicit target the event moves to local midnight tomorrow.
    /// It comes back as a new pending event on the local day `postpone_to`
    /// falls on, or the first pass after it.
    pub async fn postpone_interaction(
        &self,
        user_id: Uuid,
        interaction_id: Uuid,
        postpone_to: Option<DateTime<Utc>>,
        today: NaiveDate,
    ) -> AppResult<EventInteraction> {
        let postpone_to = match postpone_to {
            Some(at) => at,
            None => next_local_midnight(today)?,
        };
        self.store
            .postpone_interaction(user_id, interaction_id, postpone_to)
            .await?
            .ok_or(AppError::NotFound("Interaction"))
    }

    /// Evaluation pass across all users. One user's failure is recorded and
    /// the rest still run.
    #[instrument(skip(self))]
    pub async fn generate_for_all_users(&self, today: NaiveDate) -> AppResult<GenerationReport> {
        let user_ids = self.store.list_user_ids().await?;
        let mut report = GenerationReport {
            date: Some(today),
            users: user_ids.len(),
            ..GenerationReport::default()
        };

        for user_id in user_ids {
            match self.generate(user_id, today).await {
                Ok(events) => report.generated += events.len(),
                Err(err) => {
                    warn!(user_id = %user_id, "Smart event generation failed: {}", err);
                    report.failures.push(GenerationFailure {
                        user_id,
                        error: failure_message(&err),
                    });
                }
            }
        }

        info!(
            users = report.users,
            generated = report.generated,
            failed = report.failures.len(),
            "Smart event generation finished"
        );
        Ok(report)
    }

    async fn resolve(&self, automation: &Automation) -> AppResult<Option<EventContext>> {
        let user_id = automation.user_id;
        let (step_id, metric) = match automation.automation_type {
            AutomationType::Step => (automation.target_id, None),
            AutomationType::Metric => {
                let Some(metric) = self.store.get_metric(user_id, automation.target_id).await? else {
                    return Ok(None);
                };
                (metric.step_id, Some(metric))
            }
        };

        let Some(step) = self.store.get_step(user_id, step_id).await? else {
            return Ok(None);
        };
        let Some(goal_id) = step.goal_id else {
            return Ok(None);
        };
        let Some(goal) = self.store.get_goal(user_id, goal_id).await? else {
            return Ok(None);
        };

        Ok(Some(EventContext { goal, step, metric }))
    }
}

fn build_event(
    interaction: &EventInteraction,
    automation: &Automation,
    context: &EventContext,
) -> SmartEvent {
    let description = automation.description.clone().unwrap_or_else(|| match &context.metric {
        Some(metric) => format!("Update {} for {}", metric.name, context.goal.title),
        None => format!("{} for {}", context.step.title, context.goal.title),
    });
    let unit = context
        .step
        .update_unit
        .clone()
        .or_else(|| context.metric.as_ref().and_then(|m| m.unit.clone()));

    SmartEvent {
        interaction_id: interaction.id,
        automation_id: automation.id,
        automation_type: automation.automation_type,
        title: automation.name.clone(),
        description,
        goal_id: context.goal.id,
        goal_title: context.goal.title.clone(),
        step_id: context.step.id,
        metric_id: context.metric.as_ref().map(|m| m.id),
        default_value: context.step.update_value.unwrap_or(1.0),
        unit,
        date: interaction.date,
        status: interaction.status,
    }
}

fn next_local_midnight(today: NaiveDate) -> AppResult<DateTime<Utc>> {
    let midnight = today
        .succ_opt()
        .and_then(|tomorrow| tomorrow.and_hms_opt(0, 0, 0))
        .ok_or_else(|| AppError::invalid("date out of range"))?;

    Ok(match Local.from_local_datetime(&midnight).earliest() {
        Some(local) => local.with_timezone(&Utc),
        // midnight skipped by a DST jump
        None => midnight.and_utc(),
    })
}

fn failure_message(err: &AppError) -> String {
    match err {
        AppError::Internal(inner) => format!("{:#}", inner),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn postpone_default_is_after_today() {
        let today = NaiveDate::from_ymd_opt(2024, 3, 9).unwrap();
        let at = next_local_midnight(today).unwrap();
        let local = at.with_timezone(&Local);
        assert_eq!(local.date_naive(), NaiveDate::from_ymd_opt(2024, 3, 10).unwrap());
    }
}
