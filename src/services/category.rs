use chrono::NaiveDate;

use crate::models::{CategorySettings, GoalCategory};

/// Buckets a goal by the whole days left until its target date. Overdue goals
/// land in the shortest horizon; both thresholds are inclusive.
pub fn classify(
    target_date: Option<NaiveDate>,
    thresholds: &CategorySettings,
    today: NaiveDate,
) -> GoalCategory {
    let Some(target_date) = target_date else {
        return GoalCategory::NoDeadline;
    };

    let days_left = (target_date - today).num_days();
    if days_left <= i64::from(thresholds.short_term_days) {
        GoalCategory::ShortTerm
    } else if days_left <= i64::from(thresholds.long_term_days) {
        GoalCategory::MediumTerm
    } else {
        GoalCategory::LongTerm
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use uuid::Uuid;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, 10).unwrap()
    }

    fn thresholds() -> CategorySettings {
        CategorySettings::defaults(Uuid::nil())
    }

    #[test]
    fn overdue_goal_is_short_term() {
        let target = today() - Duration::days(1);
        assert_eq!(classify(Some(target), &thresholds(), today()), GoalCategory::ShortTerm);
    }

    #[test]
    fn thresholds_are_inclusive() {
        let t = thresholds();
        assert_eq!(
            classify(Some(today() + Duration::days(7)), &t, today()),
            GoalCategory::ShortTerm
        );
        assert_eq!(
            classify(Some(today() + Duration::days(8)), &t, today()),
            GoalCategory::MediumTerm
        );
        assert_eq!(
            classify(Some(today() + Duration::days(30)), &t, today()),
            GoalCategory::MediumTerm
        );
        assert_eq!(
            classify(Some(today() + Duration::days(31)), &t, today()),
            GoalCategory::LongTerm
        );
    }

    #[test]
    fn no_target_date_means_no_deadline() {
        let wide = CategorySettings {
            short_term_days: 0,
            long_term_days: 1,
            ..thresholds()
        };
        assert_eq!(classify(None, &wide, today()), GoalCategory::NoDeadline);
        assert_eq!(classify(None, &thresholds(), today()), GoalCategory::NoDeadline);
    }
}
