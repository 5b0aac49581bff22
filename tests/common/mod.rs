// Shared fixtures for integration tests. Everything runs against MemoryStore.
#![allow(dead_code)]

use std::sync::{Arc, Once};

use chrono::NaiveDate;
use pokrok::api::AppState;
use pokrok::config::{AppConfig, ResetMode};
use pokrok::models::{CreateGoalRequest, CreateStepRequest, ProgressKind};
use pokrok::store::{DynStore, MemoryStore};
use uuid::Uuid;

pub const TEST_JWT_SECRET: &str = "test_secret_key_for_testing_only";
pub const TEST_CRON_SECRET: &str = "test_cron_secret";

static INIT: Once = Once::new();

/// Route test logs through tracing once per binary; `RUST_LOG` controls output.
pub fn init_test_logging() {
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}

pub fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap()
}

pub fn test_config(mode: ResetMode) -> AppConfig {
    AppConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        environment: "test".to_string(),
        log_level: "debug".to_string(),
        jwt_secret: TEST_JWT_SECRET.to_string(),
        cron_secret: Some(TEST_CRON_SECRET.to_string()),
        daily_reset_mode: mode,
        scheduler_enabled: false,
    }
}

/// A fresh in-memory store with one user already resolved.
pub struct TestContext {
    pub memory: MemoryStore,
    pub state: AppState,
    pub user_id: Uuid,
}

impl TestContext {
    pub async fn new() -> Self {
        Self::with_mode(ResetMode::ExactHour).await
    }

    pub async fn with_mode(mode: ResetMode) -> Self {
        init_test_logging();
        let memory = MemoryStore::new();
        let store: DynStore = Arc::new(memory.clone());
        let state = AppState::new(store, test_config(mode));
        let user = state
            .users
            .resolve("user_test_primary", Some("primary@example.com".into()), None)
            .await
            .unwrap();

        Self {
            memory,
            state,
            user_id: user.id,
        }
    }

    pub async fn other_user(&self) -> Uuid {
        self.state
            .users
            .resolve("user_test_other", None, None)
            .await
            .unwrap()
            .id
    }
}

pub fn goal_request(title: &str, kind: ProgressKind) -> CreateGoalRequest {
    CreateGoalRequest {
        title: title.to_string(),
        description: None,
        target_date: None,
        priority: None,
        goal_type: None,
        progress_type: Some(kind),
        progress_target: None,
        progress_current: None,
        progress_unit: None,
        icon: None,
        area_id: None,
    }
}

pub fn step_request(title: &str, date: NaiveDate, goal_id: Option<Uuid>) -> CreateStepRequest {
    CreateStepRequest {
        title: title.to_string(),
        description: None,
        date,
        goal_id,
        metric_id: None,
        step_type: None,
        custom_type_name: None,
        update_value: None,
        update_unit: None,
    }
}
