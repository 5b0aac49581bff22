mod common;

use assert_matches::assert_matches;
use pokrok::errors::AppError;
use pretty_assertions::assert_eq;
use uuid::Uuid;

use common::{date, step_request, TestContext};

async fn make_steps(ctx: &TestContext, count: usize) -> Vec<Uuid> {
    let mut ids = Vec::new();
    for i in 0..count {
        let step = ctx
            .state
            .steps
            .create_step(ctx.user_id, step_request(&format!("Step {}", i), date(2024, 3, 4), None))
            .await
            .unwrap();
        ids.push(step.id);
    }
    ids
}

#[tokio::test]
async fn test_reading_missing_planning_creates_nothing() {
    let ctx = TestContext::new().await;
    let day = date(2024, 3, 4);

    assert!(ctx.state.planning.get_planning(ctx.user_id, day).await.unwrap().is_none());
    assert!(ctx.state.planning.get_planning(ctx.user_id, day).await.unwrap().is_none());
}

#[tokio::test]
async fn test_upsert_replaces_planned_and_keeps_completed() {
    let ctx = TestContext::new().await;
    let day = date(2024, 3, 4);
    let steps = make_steps(&ctx, 3).await;

    let planning = ctx
        .state
        .planning
        .upsert_planning(ctx.user_id, day, vec![steps[0], steps[1]])
        .await
        .unwrap();
    assert_eq!(planning.planned_steps, vec![steps[0], steps[1]]);
    assert!(planning.completed_steps.is_empty());

    ctx.state
        .planning
        .mark_step_completed(ctx.user_id, day, steps[0])
        .await
        .unwrap();

    let replanned = ctx
        .state
        .planning
        .upsert_planning(ctx.user_id, day, vec![steps[2], steps[1]])
        .await
        .unwrap();
    assert_eq!(replanned.id, planning.id);
    assert_eq!(replanned.planned_steps, vec![steps[2], steps[1]]);
    assert_eq!(replanned.completed_steps, vec![steps[0]]);
}

#[tokio::test]
async fn test_marking_completed_twice_is_a_noop() {
    let ctx = TestContext::new().await;
    let day = date(2024, 3, 4);
    let steps = make_steps(&ctx, 2).await;
    ctx.state
        .planning
        .upsert_planning(ctx.user_id, day, vec![steps[0]])
        .await
        .unwrap();

    ctx.state
        .planning
        .mark_step_completed(ctx.user_id, day, steps[0])
        .await
        .unwrap();
    let planning = ctx
        .state
        .planning
        .mark_step_completed(ctx.user_id, day, steps[0])
        .await
        .unwrap();
    assert_eq!(planning.completed_steps, vec![steps[0]]);

    // completion outside the plan is accepted
    let planning = ctx
        .state
        .planning
        .mark_step_completed(ctx.user_id, day, steps[1])
        .await
        .unwrap();
    assert_eq!(planning.planned_steps.len(), 1);
    assert_eq!(planning.completed_steps.len(), 2);
}

#[tokio::test]
async fn test_marking_without_planning_fails() {
    let ctx = TestContext::new().await;
    let steps = make_steps(&ctx, 1).await;

    let result = ctx
        .state
        .planning
        .mark_step_completed(ctx.user_id, date(2024, 3, 5), steps[0])
        .await;
    assert_matches!(result, Err(AppError::NotFound("Daily planning")));
}

#[tokio::test]
async fn test_planning_rejects_foreign_steps() {
    let ctx = TestContext::new().await;
    let day = date(2024, 3, 4);
    let mine = make_steps(&ctx, 1).await;
    let intruder = ctx.other_user().await;

    let result = ctx
        .state
        .planning
        .upsert_planning(intruder, day, vec![mine[0]])
        .await;
    assert_matches!(result, Err(AppError::NotFound("Step")));

    let result = ctx
        .state
        .planning
        .upsert_planning(ctx.user_id, day, vec![mine[0], Uuid::new_v4()])
        .await;
    assert_matches!(result, Err(AppError::NotFound("Step")));

    // repeated ids collapse to one entry
    let planning = ctx
        .state
        .planning
        .upsert_planning(ctx.user_id, day, vec![mine[0], mine[0]])
        .await
        .unwrap();
    assert_eq!(planning.planned_steps, vec![mine[0]]);
    assert!(ctx.state.planning.get_planning(intruder, day).await.unwrap().is_none());
}
