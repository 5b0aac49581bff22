mod common;

use assert_matches::assert_matches;
use chrono::NaiveDateTime;
use pokrok::config::ResetMode;
use pokrok::models::{DailyStats, UpdateUserSettingsRequest};
use pokrok::services::ResetOutcome;
use pokrok::store::{SettingsRepository, StatsRepository};
use pretty_assertions::assert_eq;
use uuid::Uuid;

use common::{date, step_request, TestContext};

fn at(year: i32, month: u32, day: u32, hour: u32) -> NaiveDateTime {
    date(year, month, day).and_hms_opt(hour, 15, 0).unwrap()
}

async fn set_reset_hour(ctx: &TestContext, user_id: Uuid, hour: i32) {
    ctx.state
        .settings
        .update_user_settings(
            user_id,
            UpdateUserSettingsRequest {
                daily_steps_count: None,
                workflow: None,
                daily_reset_hour: Some(hour),
            },
        )
        .await
        .unwrap();
}

/// Plans `planned` steps on `day`, completes `completed` of them and adds
/// `unplanned` extra steps on the same day.
async fn plan_day(ctx: &TestContext, day: chrono::NaiveDate, planned: usize, completed: usize, unplanned: usize) {
    let mut ids = Vec::new();
    for i in 0..planned + unplanned {
        let step = ctx
            .state
            .steps
            .create_step(ctx.user_id, step_request(&format!("Step {}", i), day, None))
            .await
            .unwrap();
        ids.push(step.id);
    }
    ctx.state
        .planning
        .upsert_planning(ctx.user_id, day, ids[..planned].to_vec())
        .await
        .unwrap();
    for id in &ids[..completed] {
        ctx.state
            .planning
            .mark_step_completed(ctx.user_id, day, *id)
            .await
            .unwrap();
    }
}

fn reset_stats(outcome: &ResetOutcome) -> &DailyStats {
    match outcome {
        ResetOutcome::Reset { stats } => stats,
        other => panic!("expected a reset, got {:?}", other),
    }
}

#[tokio::test]
async fn test_reset_archives_yesterday_and_opens_today() {
    let ctx = TestContext::new().await;
    plan_day(&ctx, date(2024, 1, 1), 5, 2, 1).await;

    let report = ctx.state.daily_reset.run(at(2024, 1, 2, 0)).await.unwrap();
    assert_eq!(report.date, date(2024, 1, 2));
    assert_eq!(report.reset_count(), 1);

    let result = report
        .results
        .iter()
        .find(|r| r.user_id == ctx.user_id)
        .unwrap();
    let stats = reset_stats(&result.outcome);
    assert_eq!(stats.date, date(2024, 1, 1));
    assert_eq!(stats.planned_steps_count, 5);
    assert_eq!(stats.completed_steps_count, 2);
    assert_eq!(stats.total_steps_count, 6);
    // five planned against the default target of three
    assert_eq!(stats.optimum_deviation, 2);

    let today = ctx
        .state
        .planning
        .get_planning(ctx.user_id, date(2024, 1, 2))
        .await
        .unwrap()
        .unwrap();
    assert!(today.planned_steps.is_empty());
    assert!(today.completed_steps.is_empty());

    // yesterday's planning itself is left in place
    let yesterday = ctx
        .state
        .planning
        .get_planning(ctx.user_id, date(2024, 1, 1))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(yesterday.planned_steps.len(), 5);
}

#[tokio::test]
async fn test_user_without_planning_is_skipped() {
    let ctx = TestContext::new().await;

    let report = ctx.state.daily_reset.run(at(2024, 1, 2, 0)).await.unwrap();
    assert_eq!(report.results.len(), 1);
    assert_matches!(report.results[0].outcome, ResetOutcome::Skipped { .. });
    assert!(ctx
        .memory
        .get_daily_stats(ctx.user_id, date(2024, 1, 1))
        .await
        .unwrap()
        .is_none());
    assert!(ctx
        .state
        .planning
        .get_planning(ctx.user_id, date(2024, 1, 2))
        .await
        .unwrap()
        .is_none());
}

#[tokio::test]
async fn test_exact_hour_only_runs_at_the_configured_hour() {
    let ctx = TestContext::new().await;
    set_reset_hour(&ctx, ctx.user_id, 6).await;
    plan_day(&ctx, date(2024, 1, 1), 3, 3, 0).await;

    let early = ctx.state.daily_reset.run(at(2024, 1, 2, 5)).await.unwrap();
    assert!(early.results.iter().all(|r| r.user_id != ctx.user_id));

    let late = ctx.state.daily_reset.run(at(2024, 1, 2, 7)).await.unwrap();
    assert!(late.results.iter().all(|r| r.user_id != ctx.user_id));

    let on_time = ctx.state.daily_reset.run(at(2024, 1, 2, 6)).await.unwrap();
    let result = on_time
        .results
        .iter()
        .find(|r| r.user_id == ctx.user_id)
        .unwrap();
    assert_eq!(reset_stats(&result.outcome).optimum_deviation, 0);
}

#[tokio::test]
async fn test_rerun_overwrites_the_same_stats_row() {
    let ctx = TestContext::new().await;
    plan_day(&ctx, date(2024, 1, 1), 4, 1, 0).await;

    ctx.state.daily_reset.run(at(2024, 1, 2, 0)).await.unwrap();
    ctx.state.daily_reset.run(at(2024, 1, 2, 0)).await.unwrap();

    let rows = ctx
        .state
        .stats
        .daily_stats(ctx.user_id, date(2024, 1, 1), date(2024, 1, 2))
        .await
        .unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].planned_steps_count, 4);
}

#[tokio::test]
async fn test_rerun_keeps_a_plan_saved_since_the_first_pass() {
    let ctx = TestContext::new().await;
    plan_day(&ctx, date(2024, 1, 1), 3, 1, 0).await;

    ctx.state.daily_reset.run(at(2024, 1, 2, 0)).await.unwrap();
    let step = ctx
        .state
        .steps
        .create_step(ctx.user_id, step_request("Morning run", date(2024, 1, 2), None))
        .await
        .unwrap();
    ctx.state
        .planning
        .upsert_planning(ctx.user_id, date(2024, 1, 2), vec![step.id])
        .await
        .unwrap();

    let report = ctx.state.daily_reset.run(at(2024, 1, 2, 0)).await.unwrap();
    assert_eq!(report.reset_count(), 1);
    assert_eq!(reset_stats(&report.results[0].outcome).planned_steps_count, 3);

    let today = ctx
        .state
        .planning
        .get_planning(ctx.user_id, date(2024, 1, 2))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(today.planned_steps, vec![step.id]);
}

#[tokio::test]
async fn test_reset_uses_the_settings_defaults() {
    let ctx = TestContext::new().await;
    let reported = ctx.state.settings.user_settings(ctx.user_id).await.unwrap();
    let listed = ctx.state.store.list_user_settings().await.unwrap();

    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].user_id, reported.user_id);
    assert_eq!(listed[0].daily_steps_count, reported.daily_steps_count);
    assert_eq!(listed[0].workflow, reported.workflow);
    assert_eq!(listed[0].daily_reset_hour, reported.daily_reset_hour);

    // an unconfigured user is due at the default hour with the default target
    plan_day(&ctx, date(2024, 1, 1), 5, 0, 0).await;
    let report = ctx
        .state
        .daily_reset
        .run(at(2024, 1, 2, reported.daily_reset_hour as u32))
        .await
        .unwrap();
    assert_eq!(
        reset_stats(&report.results[0].outcome).optimum_deviation,
        5 - reported.daily_steps_count
    );
}

#[tokio::test]
async fn test_catch_up_runs_once_after_a_missed_hour() {
    let ctx = TestContext::with_mode(ResetMode::CatchUp).await;
    set_reset_hour(&ctx, ctx.user_id, 6).await;
    plan_day(&ctx, date(2024, 1, 1), 2, 1, 0).await;

    let before = ctx.state.daily_reset.run(at(2024, 1, 2, 4)).await.unwrap();
    assert!(before.results.iter().all(|r| r.user_id != ctx.user_id));

    // the 06:00 trigger was missed; 09:00 still picks the user up
    let missed = ctx.state.daily_reset.run(at(2024, 1, 2, 9)).await.unwrap();
    let result = missed
        .results
        .iter()
        .find(|r| r.user_id == ctx.user_id)
        .unwrap();
    assert_eq!(reset_stats(&result.outcome).completed_steps_count, 1);

    let again = ctx.state.daily_reset.run(at(2024, 1, 2, 10)).await.unwrap();
    assert!(again.results.iter().all(|r| r.user_id != ctx.user_id));
}

#[tokio::test]
async fn test_one_users_skip_does_not_stop_others() {
    let ctx = TestContext::new().await;
    let other = ctx.other_user().await;
    plan_day(&ctx, date(2024, 1, 1), 1, 0, 0).await;

    let report = ctx.state.daily_reset.run(at(2024, 1, 2, 0)).await.unwrap();
    assert_eq!(report.results.len(), 2);
    assert_eq!(report.reset_count(), 1);
    assert_eq!(report.failed_count(), 0);

    let skipped = report.results.iter().find(|r| r.user_id == other).unwrap();
    assert_matches!(skipped.outcome, ResetOutcome::Skipped { .. });
}
