use chrono::{NaiveDate, Utc};
use uuid::Uuid;

use crate::errors::{AppError, AppResult};
use crate::models::{DailyStats, StatsSummary, UserStreak};
use crate::store::{DynStore, StatsRepository, StreakRepository};

/// Days between the last recorded activity and today.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActivityGap {
    /// Already active today (or the stored date is ahead of us).
    None,
    OneDay,
    /// Longer gap, or no activity on record.
    MultiDay,
}

pub fn activity_gap(last_activity: Option<NaiveDate>, today: NaiveDate) -> ActivityGap {
    match last_activity.map(|last| (today - last).num_days()) {
        Some(days) if days <= 0 => ActivityGap::None,
        Some(1) => ActivityGap::OneDay,
        _ => ActivityGap::MultiDay,
    }
}

/// Advances the streak for activity on `today`. `longest_streak` never drops.
pub fn advance_streak(mut streak: UserStreak, today: NaiveDate) -> UserStreak {
    match activity_gap(streak.last_activity_date, today) {
        ActivityGap::None => return streak,
        ActivityGap::OneDay => streak.current_streak += 1,
        ActivityGap::MultiDay => streak.current_streak = 1,
    }
    streak.longest_streak = streak.longest_streak.max(streak.current_streak);
    streak.last_activity_date = Some(today);
    streak.updated_at = Utc::now();
    streak
}

pub fn summarize(from: NaiveDate, to: NaiveDate, days: &[DailyStats]) -> StatsSummary {
    let planned: i64 = days.iter().map(|d| i64::from(d.planned_steps_count)).sum();
    let completed: i64 = days.iter().map(|d| i64::from(d.completed_steps_count)).sum();
    let total: i64 = days.iter().map(|d| i64::from(d.total_steps_count)).sum();
    let deviation: i64 = days.iter().map(|d| i64::from(d.optimum_deviation)).sum();

    StatsSummary {
        from,
        to,
        days_recorded: days.len(),
        planned_steps: planned,
        completed_steps: completed,
        total_steps: total,
        completion_rate: if planned > 0 {
            completed as f64 / planned as f64 * 100.0
        } else {
            0.0
        },
        average_optimum_deviation: if days.is_empty() {
            0.0
        } else {
            deviation as f64 / days.len() as f64
        },
    }
}

/// Read side over daily stats plus the streak record.
#[derive(Clone)]
pub struct StatsService {
    store: DynStore,
}

impl StatsService {
    pub fn new(store: DynStore) -> Self {
        Self { store }
    }

    pub async fn get_streak(&self, user_id: Uuid) -> AppResult<UserStreak> {
        Ok(self
            .store
            .get_streak(user_id)
            .await?
            .unwrap_or_else(|| UserStreak::new(user_id)))
    }

    pub async fn update_streak(&self, user_id: Uuid, today: NaiveDate) -> AppResult<UserStreak> {
        let streak = self.get_streak(user_id).await?;
        if activity_gap(streak.last_activity_date, today) == ActivityGap::None {
            return Ok(streak);
        }
        let streak = advance_streak(streak, today);
        Ok(self.store.save_streak(&streak).await?)
    }

    pub async fn daily_stats(
        &self,
        user_id: Uuid,
        from: NaiveDate,
        to: NaiveDate,
    ) -> AppResult<Vec<DailyStats>> {
        check_range(from, to)?;
        Ok(self.store.list_daily_stats(user_id, from, to).await?)
    }

    pub async fn summary(&self, user_id: Uuid, from: NaiveDate, to: NaiveDate) -> AppResult<StatsSummary> {
        let days = self.daily_stats(user_id, from, to).await?;
        Ok(summarize(from, to, &days))
    }
}

fn check_range(from: NaiveDate, to: NaiveDate) -> AppResult<()> {
    if from > to {
        return Err(AppError::invalid("from must not be after to"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, d).unwrap()
    }

    #[test]
    fn gap_classification() {
        assert_eq!(activity_gap(None, day(10)), ActivityGap::MultiDay);
        assert_eq!(activity_gap(Some(day(10)), day(10)), ActivityGap::None);
        assert_eq!(activity_gap(Some(day(11)), day(10)), ActivityGap::None);
        assert_eq!(activity_gap(Some(day(9)), day(10)), ActivityGap::OneDay);
        assert_eq!(activity_gap(Some(day(5)), day(10)), ActivityGap::MultiDay);
    }

    #[test]
    fn first_activity_starts_at_one() {
        let streak = advance_streak(UserStreak::new(Uuid::nil()), day(3));
        assert_eq!(streak.current_streak, 1);
        assert_eq!(streak.longest_streak, 1);
        assert_eq!(streak.last_activity_date, Some(day(3)));
    }

    #[test]
    fn summary_of_empty_range_is_zero() {
        let summary = summarize(day(1), day(7), &[]);
        assert_eq!(summary.completion_rate, 0.0);
        assert_eq!(summary.average_optimum_deviation, 0.0);
        assert_eq!(summary.days_recorded, 0);
    }

    #[test]
    fn summary_rates() {
        let stats = |date: NaiveDate, planned, completed| DailyStats {
            id: Uuid::new_v4(),
            user_id: Uuid::nil(),
            date,
            planned_steps_count: planned,
            completed_steps_count: completed,
            total_steps_count: planned,
            optimum_deviation: planned - 3,
            created_at: Utc::now(),
        };
        let days = vec![stats(day(1), 4, 2), stats(day(1) + Duration::days(1), 4, 4)];
        let summary = summarize(day(1), day(2), &days);
        assert_eq!(summary.completion_rate, 75.0);
        assert_eq!(summary.average_optimum_deviation, 1.0);
        assert_eq!(summary.total_steps, 8);
    }
}
