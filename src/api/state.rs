use std::sync::Arc;

use crate::auth::JwtService;
use crate::config::AppConfig;
use crate::services::{
    AutomationService, DailyResetService, GoalService, PlanningService, ProgressService,
    SettingsService, StatsService, StepService, UserService, ValueService,
};
use crate::store::DynStore;

/// Everything a handler needs, built once at startup around one store handle.
#[derive(Clone)]
pub struct AppState {
    pub store: DynStore,
    pub jwt: JwtService,
    pub config: Arc<AppConfig>,
    pub users: UserService,
    pub progress: ProgressService,
    pub goals: GoalService,
    pub steps: StepService,
    pub planning: PlanningService,
    pub automations: AutomationService,
    pub daily_reset: DailyResetService,
    pub stats: StatsService,
    pub settings: SettingsService,
    pub values: ValueService,
}

impl AppState {
    pub fn new(store: DynStore, config: AppConfig) -> Self {
        let progress = ProgressService::new(store.clone());
        let goals = GoalService::new(store.clone(), progress.clone());

        Self {
            jwt: JwtService::new(&config.jwt_secret),
            users: UserService::new(store.clone()),
            steps: StepService::new(store.clone(), progress.clone()),
            planning: PlanningService::new(store.clone()),
            automations: AutomationService::new(store.clone()),
            daily_reset: DailyResetService::new(store.clone(), config.daily_reset_mode),
            stats: StatsService::new(store.clone()),
            settings: SettingsService::new(store.clone(), goals.clone()),
            values: ValueService::new(store.clone()),
            config: Arc::new(config),
            progress,
            goals,
            store,
        }
    }
}
