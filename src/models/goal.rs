use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Type};
use uuid::Uuid;
use validator::Validate;

/// A user's tracked objective. `category` and `progress_percentage` are derived
/// and rewritten by the services whenever their inputs change.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Goal {
    pub id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub target_date: Option<NaiveDate>,
    pub priority: GoalPriority,
    #[serde(flatten)]
    pub progress: ProgressSource,
    pub progress_percentage: f64,
    pub category: GoalCategory,
    pub goal_type: GoalType,
    pub icon: Option<String>,
    pub area_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Where a goal's completion percentage comes from. Only the counted variants
/// carry a target; the others derive their value from linked records.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "progress_type", rename_all = "snake_case")]
pub enum ProgressSource {
    /// Percentage entered by hand.
    Percentage,
    Count {
        #[serde(rename = "progress_target")]
        target: f64,
        #[serde(rename = "progress_current")]
        current: f64,
        #[serde(rename = "progress_unit")]
        unit: Option<String>,
    },
    Amount {
        #[serde(rename = "progress_target")]
        target: f64,
        #[serde(rename = "progress_current")]
        current: f64,
        #[serde(rename = "progress_unit")]
        unit: Option<String>,
    },
    Steps,
    Metrics,
    Combined,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Type)]
#[sqlx(type_name = "progress_type", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ProgressKind {
    Percentage,
    Count,
    Amount,
    Steps,
    Metrics,
    Combined,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Type)]
#[sqlx(type_name = "goal_category", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum GoalCategory {
    ShortTerm,
    MediumTerm,
    LongTerm,
    NoDeadline,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, Type)]
#[sqlx(type_name = "goal_priority", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum GoalPriority {
    #[default]
    Meaningful,
    NiceToHave,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, Type)]
#[sqlx(type_name = "goal_type", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum GoalType {
    #[default]
    Outcome,
    Process,
}

impl ProgressSource {
    pub fn kind(&self) -> ProgressKind {
        match self {
            ProgressSource::Percentage => ProgressKind::Percentage,
            ProgressSource::Count { .. } => ProgressKind::Count,
            ProgressSource::Amount { .. } => ProgressKind::Amount,
            ProgressSource::Steps => ProgressKind::Steps,
            ProgressSource::Metrics => ProgressKind::Metrics,
            ProgressSource::Combined => ProgressKind::Combined,
        }
    }

    /// Builds a progress source from client-supplied columns, rejecting fields
    /// that make no sense for the chosen kind.
    pub fn from_request(
        kind: ProgressKind,
        target: Option<f64>,
        current: Option<f64>,
        unit: Option<String>,
    ) -> Result<Self, String> {
        match kind {
            ProgressKind::Count | ProgressKind::Amount => {
                let target = target.ok_or("progress_target is required for count and amount goals")?;
                let current = current.unwrap_or(0.0);
                if !target.is_finite() || !current.is_finite() {
                    return Err("progress values must be finite numbers".to_string());
                }
                Ok(if kind == ProgressKind::Count {
                    ProgressSource::Count { target, current, unit }
                } else {
                    ProgressSource::Amount { target, current, unit }
                })
            }
            _ if target.is_some() || current.is_some() || unit.is_some() => Err(format!(
                "{:?} goals do not take progress_target, progress_current or progress_unit",
                kind
            )),
            ProgressKind::Percentage => Ok(ProgressSource::Percentage),
            ProgressKind::Steps => Ok(ProgressSource::Steps),
            ProgressKind::Metrics => Ok(ProgressSource::Metrics),
            ProgressKind::Combined => Ok(ProgressSource::Combined),
        }
    }

    /// Lenient counterpart of `from_request` for rows already in the database.
    fn from_columns(
        kind: ProgressKind,
        target: Option<f64>,
        current: Option<f64>,
        unit: Option<String>,
    ) -> Self {
        match kind {
            ProgressKind::Percentage => ProgressSource::Percentage,
            ProgressKind::Count => ProgressSource::Count {
                target: target.unwrap_or(0.0),
                current: current.unwrap_or(0.0),
                unit,
            },
            ProgressKind::Amount => ProgressSource::Amount {
                target: target.unwrap_or(0.0),
                current: current.unwrap_or(0.0),
                unit,
            },
            ProgressKind::Steps => ProgressSource::Steps,
            ProgressKind::Metrics => ProgressSource::Metrics,
            ProgressKind::Combined => ProgressSource::Combined,
        }
    }

    /// Flattens into (kind, target, current, unit) columns.
    pub fn columns(&self) -> (ProgressKind, Option<f64>, Option<f64>, Option<String>) {
        match self {
            ProgressSource::Count { target, current, unit }
            | ProgressSource::Amount { target, current, unit } => {
                (self.kind(), Some(*target), Some(*current), unit.clone())
            }
            other => (other.kind(), None, None, None),
        }
    }
}

/// Flat database shape of a goal.
#[derive(Debug, Clone, FromRow)]
pub struct GoalRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub target_date: Option<NaiveDate>,
    pub priority: GoalPriority,
    pub progress_type: ProgressKind,
    pub progress_target: Option<f64>,
    pub progress_current: Option<f64>,
    pub progress_unit: Option<String>,
    pub progress_percentage: f64,
    pub category: GoalCategory,
    pub goal_type: GoalType,
    pub icon: Option<String>,
    pub area_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<GoalRow> for Goal {
    fn from(row: GoalRow) -> Self {
        Goal {
            id: row.id,
            user_id: row.user_id,
            title: row.title,
            description: row.description,
            target_date: row.target_date,
            priority: row.priority,
            progress: ProgressSource::from_columns(
                row.progress_type,
                row.progress_target,
                row.progress_current,
                row.progress_unit,
            ),
            progress_percentage: row.progress_percentage,
            category: row.category,
            goal_type: row.goal_type,
            icon: row.icon,
            area_id: row.area_id,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateGoalRequest {
    #[validate(length(min = 1, max = 255))]
    pub title: String,
    #[validate(length(max = 5000))]
    pub description: Option<String>,
    pub target_date: Option<NaiveDate>,
    pub priority: Option<GoalPriority>,
    pub goal_type: Option<GoalType>,
    pub progress_type: Option<ProgressKind>,
    pub progress_target: Option<f64>,
    pub progress_current: Option<f64>,
    #[validate(length(max = 50))]
    pub progress_unit: Option<String>,
    #[validate(length(max = 50))]
    pub icon: Option<String>,
    pub area_id: Option<Uuid>,
}

/// Partial edit. `target_date` uses a nested option so that `null` clears the
/// deadline while an absent field leaves it untouched.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateGoalRequest {
    #[validate(length(min = 1, max = 255))]
    pub title: Option<String>,
    #[validate(length(max = 5000))]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "crate::models::double_option")]
    pub target_date: Option<Option<NaiveDate>>,
    pub priority: Option<GoalPriority>,
    pub goal_type: Option<GoalType>,
    #[validate(length(max = 50))]
    pub icon: Option<String>,
    pub area_id: Option<Uuid>,
    pub progress_type: Option<ProgressKind>,
    pub progress_target: Option<f64>,
    pub progress_current: Option<f64>,
    #[validate(length(max = 50))]
    pub progress_unit: Option<String>,
}

/// Manual progress entry. Which field is honoured depends on the goal's
/// progress source.
#[derive(Debug, Clone, Deserialize)]
pub struct SetProgressRequest {
    pub percentage: Option<f64>,
    pub current: Option<f64>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn steps_goal_rejects_target() {
        let result = ProgressSource::from_request(ProgressKind::Steps, Some(10.0), None, None);
        assert!(result.is_err());
    }

    #[test]
    fn count_goal_requires_target() {
        assert!(ProgressSource::from_request(ProgressKind::Count, None, Some(1.0), None).is_err());

        let source =
            ProgressSource::from_request(ProgressKind::Count, Some(10.0), None, Some("books".into()))
                .unwrap();
        assert_matches!(source, ProgressSource::Count { target, current, .. } if target == 10.0 && current == 0.0);
    }

    #[test]
    fn columns_round_trip_through_row() {
        let source = ProgressSource::Amount {
            target: 5000.0,
            current: 1250.0,
            unit: Some("CZK".into()),
        };
        let (kind, target, current, unit) = source.columns();
        assert_eq!(ProgressSource::from_columns(kind, target, current, unit), source);
        assert_eq!(ProgressSource::Metrics.columns(), (ProgressKind::Metrics, None, None, None));
    }

    #[test]
    fn goal_serializes_progress_inline() {
        let now = Utc::now();
        let goal = Goal {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            title: "Read more".into(),
            description: None,
            target_date: None,
            priority: GoalPriority::Meaningful,
            progress: ProgressSource::Count {
                target: 12.0,
                current: 3.0,
                unit: Some("books".into()),
            },
            progress_percentage: 25.0,
            category: GoalCategory::NoDeadline,
            goal_type: GoalType::Outcome,
            icon: None,
            area_id: None,
            created_at: now,
            updated_at: now,
        };

        let json = serde_json::to_value(&goal).unwrap();
        assert_eq!(json["progress_type"], "count");
        assert_eq!(json["progress_target"], 12.0);
        assert_eq!(json["category"], "no_deadline");
    }
}
