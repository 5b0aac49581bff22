// Business logic services

pub mod automation_service;
pub mod background_job_service;
pub mod category;
pub mod daily_reset_service;
pub mod goal_service;
pub mod planning_service;
pub mod progress_service;
pub mod settings_service;
pub mod stats_service;
pub mod step_service;
pub mod user_service;
pub mod value_service;

pub use automation_service::{AutomationService, GenerationReport};
pub use background_job_service::BackgroundJobService;
pub use daily_reset_service::{DailyResetService, ResetOutcome, ResetReport, UserResetResult};
pub use goal_service::GoalService;
pub use planning_service::PlanningService;
pub use progress_service::ProgressService;
pub use settings_service::SettingsService;
pub use stats_service::StatsService;
pub use step_service::StepService;
pub use user_service::UserService;
pub use value_service::ValueService;
