mod common;

use assert_matches::assert_matches;
use chrono::Utc;
use pokrok::errors::AppError;
use pokrok::models::{
    CreateMetricRequest, CreateStepMetricRequest, ProgressKind, SetProgressRequest,
    UpdateGoalRequest, UpdateMetricRequest,
};
use pokrok::services::progress_service::{clamp_percentage, combined_percentage, ratio_percentage};
use pretty_assertions::assert_eq;
use proptest::prelude::*;

use common::{date, goal_request, step_request, TestContext};

proptest! {
    #[test]
    fn clamped_percentage_stays_in_range(value in proptest::num::f64::ANY) {
        let clamped = clamp_percentage(value);
        prop_assert!((0.0..=100.0).contains(&clamped));
    }

    #[test]
    fn combined_lies_between_its_clamped_parts(m in -500.0f64..500.0, s in -500.0f64..500.0) {
        let combined = combined_percentage(m, s);
        let (a, b) = (clamp_percentage(m), clamp_percentage(s));
        prop_assert!(combined >= a.min(b) - 1e-9);
        prop_assert!(combined <= a.max(b) + 1e-9);
    }

    #[test]
    fn ratio_with_non_positive_target_is_zero(current in -1e6f64..1e6, target in -1e6f64..=0.0) {
        prop_assert_eq!(ratio_percentage(current, target), 0.0);
    }
}

fn metric_request(name: &str, target: f64, current: f64) -> CreateMetricRequest {
    CreateMetricRequest {
        name: name.to_string(),
        unit: None,
        metric_type: None,
        target_value: target,
        current_value: Some(current),
    }
}

#[tokio::test]
async fn test_percentage_goal_is_clamped() {
    let ctx = TestContext::new().await;
    let today = date(2024, 5, 1);
    let goal = ctx
        .state
        .goals
        .create_goal(ctx.user_id, goal_request("Read more", ProgressKind::Percentage), today)
        .await
        .unwrap();

    let goal = ctx
        .state
        .progress
        .set_percentage(ctx.user_id, goal.id, 150.0)
        .await
        .unwrap();
    assert_eq!(goal.progress_percentage, 100.0);

    let goal = ctx
        .state
        .progress
        .set_percentage(ctx.user_id, goal.id, -3.0)
        .await
        .unwrap();
    assert_eq!(goal.progress_percentage, 0.0);

    let result = ctx.state.progress.set_percentage(ctx.user_id, goal.id, f64::NAN).await;
    assert_matches!(result, Err(AppError::InvalidInput(_)));
}

#[tokio::test]
async fn test_count_goal_uses_ratio_to_target() {
    let ctx = TestContext::new().await;
    let mut request = goal_request("Books", ProgressKind::Count);
    request.progress_target = Some(12.0);

    let goal = ctx
        .state
        .goals
        .create_goal(ctx.user_id, request, date(2024, 5, 1))
        .await
        .unwrap();
    assert_eq!(goal.progress_percentage, 0.0);

    let goal = ctx
        .state
        .progress
        .apply_manual(
            ctx.user_id,
            goal.id,
            SetProgressRequest { percentage: None, current: Some(3.0) },
        )
        .await
        .unwrap();
    assert_eq!(goal.progress_percentage, 25.0);

    // percentage entry does not apply to counted goals
    let result = ctx
        .state
        .progress
        .apply_manual(
            ctx.user_id,
            goal.id,
            SetProgressRequest { percentage: Some(40.0), current: None },
        )
        .await;
    assert_matches!(result, Err(AppError::InvalidInput(_)));

    let result = ctx
        .state
        .progress
        .apply_manual(
            ctx.user_id,
            goal.id,
            SetProgressRequest { percentage: Some(40.0), current: Some(1.0) },
        )
        .await;
    assert_matches!(result, Err(AppError::InvalidInput(_)));
}

#[tokio::test]
async fn test_zero_target_amount_goal_is_zero_percent() {
    let ctx = TestContext::new().await;
    let mut request = goal_request("Savings", ProgressKind::Amount);
    request.progress_target = Some(0.0);
    request.progress_current = Some(50.0);

    let goal = ctx
        .state
        .goals
        .create_goal(ctx.user_id, request, date(2024, 5, 1))
        .await
        .unwrap();
    assert_eq!(goal.progress_percentage, 0.0);
}

#[tokio::test]
async fn test_steps_goal_follows_toggles() {
    let ctx = TestContext::new().await;
    let day = date(2024, 5, 1);
    let goal = ctx
        .state
        .goals
        .create_goal(ctx.user_id, goal_request("Run a 10k", ProgressKind::Steps), day)
        .await
        .unwrap();

    let mut steps = Vec::new();
    for i in 0..4 {
        let step = ctx
            .state
            .steps
            .create_step(ctx.user_id, step_request(&format!("Run {}", i), day, Some(goal.id)))
            .await
            .unwrap();
        steps.push(step);
    }

    let now = Utc::now();
    ctx.state.steps.toggle_step(ctx.user_id, steps[0].id, true, now).await.unwrap();
    let response = ctx
        .state
        .steps
        .toggle_step(ctx.user_id, steps[1].id, true, now)
        .await
        .unwrap();
    assert!(response.step.completed);
    assert_eq!(response.goal.as_ref().map(|g| g.progress_percentage), Some(50.0));

    // repeating a toggle changes nothing
    let repeat = ctx
        .state
        .steps
        .toggle_step(ctx.user_id, steps[1].id, true, now)
        .await
        .unwrap();
    assert!(repeat.goal.is_none());
    let goal_now = ctx.state.goals.get_goal(ctx.user_id, goal.id).await.unwrap();
    assert_eq!(goal_now.progress_percentage, 50.0);

    let undo = ctx
        .state
        .steps
        .toggle_step(ctx.user_id, steps[1].id, false, now)
        .await
        .unwrap();
    assert!(!undo.step.completed);
    assert!(undo.step.completed_at.is_none());
    assert!(undo.goal.is_none());
    let goal_now = ctx.state.goals.get_goal(ctx.user_id, goal.id).await.unwrap();
    assert_eq!(goal_now.progress_percentage, 25.0);

    // removing the only completed step leaves 0 of 3
    ctx.state.steps.delete_step(ctx.user_id, steps[0].id).await.unwrap();
    let goal_now = ctx.state.goals.get_goal(ctx.user_id, goal.id).await.unwrap();
    assert_eq!(goal_now.progress_percentage, 0.0);
}

#[tokio::test]
async fn test_metrics_goal_averages_clamped_ratios() {
    let ctx = TestContext::new().await;
    let goal = ctx
        .state
        .goals
        .create_goal(ctx.user_id, goal_request("Fitness", ProgressKind::Metrics), date(2024, 5, 1))
        .await
        .unwrap();

    ctx.state
        .goals
        .create_goal_metric(ctx.user_id, goal.id, metric_request("Push-ups", 100.0, 300.0))
        .await
        .unwrap();
    let slow = ctx
        .state
        .goals
        .create_goal_metric(ctx.user_id, goal.id, metric_request("Kilometres", 100.0, 0.0))
        .await
        .unwrap();

    // an overshooting metric is capped at 100 before averaging
    let goal_now = ctx.state.goals.get_goal(ctx.user_id, goal.id).await.unwrap();
    assert_eq!(goal_now.progress_percentage, 50.0);

    ctx.state
        .goals
        .update_goal_metric(
            ctx.user_id,
            goal.id,
            slow.id,
            UpdateMetricRequest {
                current_value: Some(50.0),
                ..UpdateMetricRequest::default()
            },
        )
        .await
        .unwrap();
    let goal_now = ctx.state.goals.get_goal(ctx.user_id, goal.id).await.unwrap();
    assert_eq!(goal_now.progress_percentage, 75.0);

    ctx.state
        .goals
        .delete_goal_metric(ctx.user_id, goal.id, slow.id)
        .await
        .unwrap();
    let goal_now = ctx.state.goals.get_goal(ctx.user_id, goal.id).await.unwrap();
    assert_eq!(goal_now.progress_percentage, 100.0);
}

#[tokio::test]
async fn test_combined_goal_blends_metrics_and_steps() {
    let ctx = TestContext::new().await;
    let day = date(2024, 5, 1);
    let goal = ctx
        .state
        .goals
        .create_goal(ctx.user_id, goal_request("Marathon", ProgressKind::Combined), day)
        .await
        .unwrap();

    ctx.state
        .goals
        .create_goal_metric(ctx.user_id, goal.id, metric_request("Long run", 40.0, 20.0))
        .await
        .unwrap();
    let first = ctx
        .state
        .steps
        .create_step(ctx.user_id, step_request("Tempo", day, Some(goal.id)))
        .await
        .unwrap();
    ctx.state
        .steps
        .create_step(ctx.user_id, step_request("Intervals", day, Some(goal.id)))
        .await
        .unwrap();

    let response = ctx
        .state
        .steps
        .toggle_step(ctx.user_id, first.id, true, Utc::now())
        .await
        .unwrap();

    // 0.5 * 50 (metrics) + 0.5 * 50 (steps)
    assert_eq!(response.goal.map(|g| g.progress_percentage), Some(50.0));

    let recomputed = ctx.state.progress.set_combined(ctx.user_id, goal.id).await.unwrap();
    assert_eq!(recomputed.progress_percentage, 50.0);
}

#[tokio::test]
async fn test_metric_linked_step_moves_metric_value() {
    let ctx = TestContext::new().await;
    let day = date(2024, 5, 1);
    let anchor = ctx
        .state
        .steps
        .create_step(ctx.user_id, step_request("Log weight", day, None))
        .await
        .unwrap();
    let metric = ctx
        .state
        .steps
        .create_metric(
            ctx.user_id,
            CreateStepMetricRequest {
                step_id: anchor.id,
                metric: metric_request("Pages read", 300.0, 10.0),
            },
        )
        .await
        .unwrap();

    let mut request = step_request("Read", day, None);
    request.metric_id = Some(metric.id);
    request.update_value = Some(25.0);
    let step = ctx.state.steps.create_step(ctx.user_id, request).await.unwrap();

    ctx.state
        .steps
        .toggle_step(ctx.user_id, step.id, true, Utc::now())
        .await
        .unwrap();
    let metrics = ctx.state.steps.list_metrics(ctx.user_id).await.unwrap();
    assert_eq!(metrics[0].current_value, 35.0);

    ctx.state
        .steps
        .toggle_step(ctx.user_id, step.id, false, Utc::now())
        .await
        .unwrap();
    let metrics = ctx.state.steps.list_metrics(ctx.user_id).await.unwrap();
    assert_eq!(metrics[0].current_value, 10.0);
}

#[tokio::test]
async fn test_switching_progress_type_rederives_percentage() {
    let ctx = TestContext::new().await;
    let mut request = goal_request("Cycling", ProgressKind::Count);
    request.progress_target = Some(10.0);
    request.progress_current = Some(5.0);
    let goal = ctx
        .state
        .goals
        .create_goal(ctx.user_id, request, date(2024, 5, 1))
        .await
        .unwrap();
    assert_eq!(goal.progress_percentage, 50.0);

    // a new target keeps the stored current value
    let goal = ctx
        .state
        .goals
        .update_goal(
            ctx.user_id,
            goal.id,
            UpdateGoalRequest {
                progress_target: Some(20.0),
                ..UpdateGoalRequest::default()
            },
            date(2024, 5, 1),
        )
        .await
        .unwrap();
    assert_eq!(goal.progress_percentage, 25.0);

    let goal = ctx
        .state
        .goals
        .update_goal(
            ctx.user_id,
            goal.id,
            UpdateGoalRequest {
                progress_type: Some(ProgressKind::Steps),
                ..UpdateGoalRequest::default()
            },
            date(2024, 5, 1),
        )
        .await
        .unwrap();
    assert_eq!(goal.progress.kind(), ProgressKind::Steps);
    assert_eq!(goal.progress_percentage, 0.0);
}

#[tokio::test]
async fn test_other_users_goal_is_not_found() {
    let ctx = TestContext::new().await;
    let goal = ctx
        .state
        .goals
        .create_goal(ctx.user_id, goal_request("Private", ProgressKind::Percentage), date(2024, 5, 1))
        .await
        .unwrap();
    let intruder = ctx.other_user().await;

    let result = ctx.state.progress.set_percentage(intruder, goal.id, 90.0).await;
    assert_matches!(result, Err(AppError::NotFound("Goal")));

    let result = ctx
        .state
        .steps
        .create_step(intruder, step_request("Sneaky", date(2024, 5, 1), Some(goal.id)))
        .await;
    assert_matches!(result, Err(AppError::NotFound("Goal")));

    let untouched = ctx.state.goals.get_goal(ctx.user_id, goal.id).await.unwrap();
    assert_eq!(untouched.progress_percentage, 0.0);
}
