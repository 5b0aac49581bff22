use anyhow::anyhow;
use chrono::{DateTime, Datelike, NaiveDate, Utc, Weekday};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Type};
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Type)]
#[sqlx(type_name = "automation_type", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum AutomationType {
    Metric,
    Step,
}

/// When an automation fires. Decided once at creation time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Schedule {
    Daily,
    Weekly { weekday: Weekday },
    /// Days past the end of a short month fire on its last day.
    Monthly { day: u32 },
    OneTime { date: NaiveDate },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Type)]
#[sqlx(type_name = "schedule_kind", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ScheduleKind {
    Daily,
    Weekly,
    Monthly,
    OneTime,
}

const DAILY_MARKERS: [&str; 2] = ["daily", "denně"];

impl Schedule {
    pub fn matches(&self, today: NaiveDate) -> bool {
        match self {
            Schedule::Daily => true,
            Schedule::Weekly { weekday } => today.weekday() == *weekday,
            Schedule::Monthly { day } => today.day() == (*day).min(last_day_of_month(today)),
            Schedule::OneTime { date } => *date == today,
        }
    }

    /// Converts the free-text `frequency_type`/`frequency_time` pair older
    /// clients send. Only one-time and daily cadences are understood.
    pub fn from_legacy(
        frequency_type: &str,
        frequency_time: Option<&str>,
        scheduled_date: Option<NaiveDate>,
    ) -> Result<Self, String> {
        match frequency_type.trim().to_lowercase().as_str() {
            "one-time" | "one_time" | "onetime" => scheduled_date
                .map(|date| Schedule::OneTime { date })
                .ok_or_else(|| "scheduled_date is required for one-time automations".to_string()),
            "recurring" => {
                let cadence = frequency_time.unwrap_or_default().to_lowercase();
                if DAILY_MARKERS.iter().any(|marker| cadence.contains(marker)) {
                    Ok(Schedule::Daily)
                } else {
                    Err(format!(
                        "unsupported recurring cadence '{}'; send a structured schedule instead",
                        cadence
                    ))
                }
            }
            other => Err(format!("unknown frequency_type '{}'", other)),
        }
    }

    pub fn validate(&self) -> Result<(), String> {
        match self {
            Schedule::Monthly { day } if !(1..=31).contains(day) => {
                Err("monthly day must be between 1 and 31".to_string())
            }
            _ => Ok(()),
        }
    }

    pub fn columns(&self) -> (ScheduleKind, Option<i32>, Option<NaiveDate>) {
        match self {
            Schedule::Daily => (ScheduleKind::Daily, None, None),
            Schedule::Weekly { weekday } => (
                ScheduleKind::Weekly,
                Some(weekday.num_days_from_monday() as i32),
                None,
            ),
            Schedule::Monthly { day } => (ScheduleKind::Monthly, Some(*day as i32), None),
            Schedule::OneTime { date } => (ScheduleKind::OneTime, None, Some(*date)),
        }
    }

    fn from_columns(
        kind: ScheduleKind,
        day: Option<i32>,
        date: Option<NaiveDate>,
    ) -> anyhow::Result<Self> {
        match (kind, day, date) {
            (ScheduleKind::Daily, _, _) => Ok(Schedule::Daily),
            (ScheduleKind::Weekly, Some(day), _) => weekday_from_index(day)
                .map(|weekday| Schedule::Weekly { weekday })
                .ok_or_else(|| anyhow!("weekly schedule with invalid weekday {}", day)),
            (ScheduleKind::Monthly, Some(day), _) if day > 0 => {
                Ok(Schedule::Monthly { day: day as u32 })
            }
            (ScheduleKind::OneTime, _, Some(date)) => Ok(Schedule::OneTime { date }),
            (kind, day, date) => Err(anyhow!(
                "inconsistent schedule columns: {:?} day={:?} date={:?}",
                kind,
                day,
                date
            )),
        }
    }
}

fn weekday_from_index(index: i32) -> Option<Weekday> {
    match index {
        0 => Some(Weekday::Mon),
        1 => Some(Weekday::Tue),
        2 => Some(Weekday::Wed),
        3 => Some(Weekday::Thu),
        4 => Some(Weekday::Fri),
        5 => Some(Weekday::Sat),
        6 => Some(Weekday::Sun),
        _ => None,
    }
}

fn last_day_of_month(date: NaiveDate) -> u32 {
    let (year, month) = if date.month() == 12 {
        (date.year() + 1, 1)
    } else {
        (date.year(), date.month() + 1)
    };
    NaiveDate::from_ymd_opt(year, month, 1)
        .and_then(|first| first.pred_opt())
        .map(|last| last.day())
        .unwrap_or(31)
}

/// A user-defined rule surfacing a reminder tied to a metric or a step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Automation {
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub automation_type: AutomationType,
    pub target_id: Uuid,
    pub schedule: Schedule,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, FromRow)]
pub struct AutomationRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub automation_type: AutomationType,
    pub target_id: Uuid,
    pub schedule_kind: ScheduleKind,
    pub schedule_day: Option<i32>,
    pub scheduled_date: Option<NaiveDate>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<AutomationRow> for Automation {
    type Error = anyhow::Error;

    fn try_from(row: AutomationRow) -> anyhow::Result<Self> {
        let schedule = Schedule::from_columns(row.schedule_kind, row.schedule_day, row.scheduled_date)?;
        Ok(Automation {
            id: row.id,
            user_id: row.user_id,
            name: row.name,
            description: row.description,
            automation_type: row.automation_type,
            target_id: row.target_id,
            schedule,
            is_active: row.is_active,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Type)]
#[sqlx(type_name = "interaction_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum InteractionStatus {
    Pending,
    Completed,
    Postponed,
}

/// Durable outcome of one automation on one day; unique per
/// (user, automation, date).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct EventInteraction {
    pub id: Uuid,
    pub user_id: Uuid,
    pub automation_id: Uuid,
    pub date: NaiveDate,
    pub status: InteractionStatus,
    pub completed_at: Option<DateTime<Utc>>,
    pub postponed_to: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl EventInteraction {
    pub fn pending(user_id: Uuid, automation_id: Uuid, date: NaiveDate) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            user_id,
            automation_id,
            date,
            status: InteractionStatus::Pending,
            completed_at: None,
            postponed_to: None,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Transient view of a surfaced automation. Rebuilt from the interaction and
/// the current automation/step/metric/goal rows; never stored.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SmartEvent {
    pub interaction_id: Uuid,
    pub automation_id: Uuid,
    pub automation_type: AutomationType,
    pub title: String,
    pub description: String,
    pub goal_id: Uuid,
    pub goal_title: String,
    pub step_id: Uuid,
    pub metric_id: Option<Uuid>,
    pub default_value: f64,
    pub unit: Option<String>,
    pub date: NaiveDate,
    pub status: InteractionStatus,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateAutomationRequest {
    #[validate(length(min = 1, max = 255))]
    pub name: String,
    #[validate(length(max = 5000))]
    pub description: Option<String>,
    pub automation_type: AutomationType,
    pub target_id: Uuid,
    pub schedule: Option<Schedule>,
    pub frequency_type: Option<String>,
    pub frequency_time: Option<String>,
    pub scheduled_date: Option<NaiveDate>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateAutomationRequest {
    #[validate(length(min = 1, max = 255))]
    pub name: Option<String>,
    #[validate(length(max = 5000))]
    pub description: Option<String>,
    pub schedule: Option<Schedule>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PostponeInteractionRequest {
    pub postpone_to: Option<DateTime<Utc>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn legacy_daily_markers_are_case_insensitive() {
        assert_eq!(
            Schedule::from_legacy("recurring", Some("Every DAY (daily)"), None).unwrap(),
            Schedule::Daily
        );
        assert_eq!(
            Schedule::from_legacy("recurring", Some("DENNĚ v 8:00"), None).unwrap(),
            Schedule::Daily
        );
        assert!(Schedule::from_legacy("recurring", Some("weekly"), None).is_err());
    }

    #[test]
    fn legacy_one_time_needs_a_date() {
        assert!(Schedule::from_legacy("one-time", None, None).is_err());
        assert_eq!(
            Schedule::from_legacy("one-time", None, Some(date(2024, 3, 1))).unwrap(),
            Schedule::OneTime { date: date(2024, 3, 1) }
        );
    }

    #[test]
    fn weekly_and_one_time_matching() {
        // 2024-01-01 was a Monday
        let monday = date(2024, 1, 1);
        assert!(Schedule::Weekly { weekday: Weekday::Mon }.matches(monday));
        assert!(!Schedule::Weekly { weekday: Weekday::Tue }.matches(monday));
        assert!(Schedule::OneTime { date: monday }.matches(monday));
        assert!(!Schedule::OneTime { date: monday }.matches(date(2024, 1, 2)));
    }

    #[test]
    fn monthly_clamps_to_last_day() {
        let schedule = Schedule::Monthly { day: 31 };
        assert!(schedule.matches(date(2024, 2, 29)));
        assert!(!schedule.matches(date(2024, 2, 28)));
        assert!(schedule.matches(date(2024, 12, 31)));
        assert!(!schedule.matches(date(2024, 12, 30)));
    }

    #[test]
    fn columns_rebuild_the_schedule() {
        for schedule in [
            Schedule::Daily,
            Schedule::Weekly { weekday: Weekday::Sun },
            Schedule::Monthly { day: 15 },
            Schedule::OneTime { date: date(2025, 6, 1) },
        ] {
            let (kind, day, on) = schedule.columns();
            assert_eq!(Schedule::from_columns(kind, day, on).unwrap(), schedule);
        }
        assert!(Schedule::from_columns(ScheduleKind::Weekly, None, None).is_err());
    }
}
