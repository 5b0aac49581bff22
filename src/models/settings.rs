use chrono::{DateTime, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Type};
use uuid::Uuid;
use validator::{Validate, ValidationError};

pub const DEFAULT_DAILY_STEPS_COUNT: i32 = 3;
pub const DEFAULT_DAILY_RESET_HOUR: i32 = 0;
pub const DEFAULT_SHORT_TERM_DAYS: i32 = 7;
pub const DEFAULT_LONG_TERM_DAYS: i32 = 30;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, Type)]
#[sqlx(type_name = "planning_workflow", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum Workflow {
    #[default]
    DailyPlanning,
    NoWorkflow,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct UserSettings {
    pub user_id: Uuid,
    pub daily_steps_count: i32,
    pub workflow: Workflow,
    pub daily_reset_hour: i32,
    pub updated_at: DateTime<Utc>,
}

impl UserSettings {
    pub fn defaults(user_id: Uuid) -> Self {
        Self {
            user_id,
            daily_steps_count: DEFAULT_DAILY_STEPS_COUNT,
            workflow: Workflow::default(),
            daily_reset_hour: DEFAULT_DAILY_RESET_HOUR,
            updated_at: Utc::now(),
        }
    }
}

/// Day thresholds for the goal horizon classifier; `short_term_days` is always
/// strictly below `long_term_days`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct CategorySettings {
    pub user_id: Uuid,
    pub short_term_days: i32,
    pub long_term_days: i32,
    pub updated_at: DateTime<Utc>,
}

impl CategorySettings {
    pub fn defaults(user_id: Uuid) -> Self {
        Self {
            user_id,
            short_term_days: DEFAULT_SHORT_TERM_DAYS,
            long_term_days: DEFAULT_LONG_TERM_DAYS,
            updated_at: Utc::now(),
        }
    }
}

/// When the client should prompt the user to add steps. Pure configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct NeededStepsSettings {
    pub user_id: Uuid,
    pub enabled: bool,
    /// 0 = Monday .. 6 = Sunday
    pub days_of_week: Vec<i32>,
    pub time_of_day: NaiveTime,
    pub updated_at: DateTime<Utc>,
}

impl NeededStepsSettings {
    pub fn defaults(user_id: Uuid) -> Self {
        Self {
            user_id,
            enabled: false,
            days_of_week: vec![0, 1, 2, 3, 4],
            time_of_day: NaiveTime::from_hms_opt(9, 0, 0).unwrap_or_default(),
            updated_at: Utc::now(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct UpdateUserSettingsRequest {
    #[validate(range(min = 1, max = 10))]
    pub daily_steps_count: Option<i32>,
    pub workflow: Option<Workflow>,
    #[validate(range(min = 0, max = 23))]
    pub daily_reset_hour: Option<i32>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[validate(schema(function = "validate_thresholds"))]
pub struct UpdateCategorySettingsRequest {
    #[validate(range(min = 0, max = 3650))]
    pub short_term_days: i32,
    #[validate(range(min = 1, max = 3650))]
    pub long_term_days: i32,
}

fn validate_thresholds(request: &UpdateCategorySettingsRequest) -> Result<(), ValidationError> {
    if request.short_term_days >= request.long_term_days {
        return Err(ValidationError::new("short_term_days_not_below_long_term_days"));
    }
    Ok(())
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct UpdateNeededStepsSettingsRequest {
    pub enabled: bool,
    #[validate(custom(function = "validate_weekdays"))]
    pub days_of_week: Vec<i32>,
    pub time_of_day: NaiveTime,
}

#[allow(clippy::ptr_arg)]
fn validate_weekdays(days: &Vec<i32>) -> Result<(), ValidationError> {
    if days.iter().any(|day| !(0..=6).contains(day)) {
        return Err(ValidationError::new("weekday_out_of_range"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn thresholds_must_be_strictly_ordered() {
        let equal = UpdateCategorySettingsRequest {
            short_term_days: 30,
            long_term_days: 30,
        };
        assert!(equal.validate().is_err());

        let ordered = UpdateCategorySettingsRequest {
            short_term_days: 7,
            long_term_days: 30,
        };
        assert!(ordered.validate().is_ok());
    }

    #[test]
    fn daily_steps_count_is_bounded() {
        let request = UpdateUserSettingsRequest {
            daily_steps_count: Some(11),
            workflow: None,
            daily_reset_hour: Some(4),
        };
        assert!(request.validate().is_err());

        let request = UpdateUserSettingsRequest {
            daily_steps_count: Some(10),
            workflow: None,
            daily_reset_hour: Some(24),
        };
        assert!(request.validate().is_err());
    }

    #[test]
    fn weekdays_are_checked() {
        let request = UpdateNeededStepsSettingsRequest {
            enabled: true,
            days_of_week: vec![0, 7],
            time_of_day: NaiveTime::from_hms_opt(8, 0, 0).unwrap(),
        };
        assert!(request.validate().is_err());
    }
}
