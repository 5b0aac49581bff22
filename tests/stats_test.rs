mod common;

use assert_matches::assert_matches;
use chrono::NaiveDate;
use pokrok::errors::AppError;
use pokrok::services::stats_service::{activity_gap, advance_streak, ActivityGap};
use pretty_assertions::assert_eq;

use common::{date, step_request, TestContext};

#[tokio::test]
async fn test_streak_progression() {
    let ctx = TestContext::new().await;

    let streak = ctx.state.stats.get_streak(ctx.user_id).await.unwrap();
    assert_eq!(streak.current_streak, 0);
    assert_eq!(streak.last_activity_date, None);

    let streak = ctx.state.stats.update_streak(ctx.user_id, date(2024, 4, 1)).await.unwrap();
    assert_eq!(streak.current_streak, 1);

    // same day twice
    let streak = ctx.state.stats.update_streak(ctx.user_id, date(2024, 4, 1)).await.unwrap();
    assert_eq!(streak.current_streak, 1);

    let streak = ctx.state.stats.update_streak(ctx.user_id, date(2024, 4, 2)).await.unwrap();
    let streak_after_three = ctx.state.stats.update_streak(ctx.user_id, date(2024, 4, 3)).await.unwrap();
    assert_eq!(streak.current_streak, 2);
    assert_eq!(streak_after_three.current_streak, 3);
    assert_eq!(streak_after_three.longest_streak, 3);

    // a gap restarts the run but keeps the record
    let streak = ctx.state.stats.update_streak(ctx.user_id, date(2024, 4, 6)).await.unwrap();
    assert_eq!(streak.current_streak, 1);
    assert_eq!(streak.longest_streak, 3);
    assert_eq!(streak.last_activity_date, Some(date(2024, 4, 6)));

    let stored = ctx.state.stats.get_streak(ctx.user_id).await.unwrap();
    assert_eq!(stored, streak);
}

#[test]
fn test_activity_gap_boundaries() {
    let today = NaiveDate::from_ymd_opt(2024, 4, 10).unwrap();
    assert_eq!(activity_gap(None, today), ActivityGap::MultiDay);
    assert_eq!(activity_gap(Some(today), today), ActivityGap::None);
    assert_eq!(activity_gap(today.succ_opt(), today), ActivityGap::None);
    assert_eq!(activity_gap(today.pred_opt(), today), ActivityGap::OneDay);
    assert_eq!(
        activity_gap(NaiveDate::from_ymd_opt(2024, 4, 8), today),
        ActivityGap::MultiDay
    );
}

#[tokio::test]
async fn test_clock_going_backwards_leaves_streak_alone() {
    let ctx = TestContext::new().await;
    let streak = ctx.state.stats.update_streak(ctx.user_id, date(2024, 4, 5)).await.unwrap();
    let unchanged = advance_streak(streak.clone(), date(2024, 4, 4));
    assert_eq!(unchanged, streak);
}

#[tokio::test]
async fn test_summary_over_reset_days() {
    let ctx = TestContext::new().await;

    for (day, planned, completed) in [(1, 4, 2), (2, 2, 2)] {
        let mut ids = Vec::new();
        for i in 0..planned {
            let step = ctx
                .state
                .steps
                .create_step(ctx.user_id, step_request(&format!("S{}", i), date(2024, 4, day), None))
                .await
                .unwrap();
            ids.push(step.id);
        }
        ctx.state
            .planning
            .upsert_planning(ctx.user_id, date(2024, 4, day), ids.clone())
            .await
            .unwrap();
        for id in ids.iter().take(completed) {
            ctx.state
                .planning
                .mark_step_completed(ctx.user_id, date(2024, 4, day), *id)
                .await
                .unwrap();
        }
        let run_at = date(2024, 4, day + 1).and_hms_opt(0, 5, 0).unwrap();
        ctx.state.daily_reset.run(run_at).await.unwrap();
    }

    let summary = ctx
        .state
        .stats
        .summary(ctx.user_id, date(2024, 4, 1), date(2024, 4, 30))
        .await
        .unwrap();
    assert_eq!(summary.days_recorded, 2);
    assert_eq!(summary.planned_steps, 6);
    assert_eq!(summary.completed_steps, 4);
    assert!((summary.completion_rate - 66.666).abs() < 0.01);
    // deviations +1 and -1 against the default target of three
    assert_eq!(summary.average_optimum_deviation, 0.0);

    let empty = ctx
        .state
        .stats
        .summary(ctx.user_id, date(2023, 1, 1), date(2023, 1, 31))
        .await
        .unwrap();
    assert_eq!(empty.completion_rate, 0.0);

    let result = ctx
        .state
        .stats
        .daily_stats(ctx.user_id, date(2024, 4, 30), date(2024, 4, 1))
        .await;
    assert_matches!(result, Err(AppError::InvalidInput(_)));
}
