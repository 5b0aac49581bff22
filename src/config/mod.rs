// Environment-driven configuration

pub mod app;
pub mod database;

pub use app::{AppConfig, ResetMode};
pub use database::{run_migrations, DatabaseConfig};
