use anyhow::{anyhow, Result};
use serde::Serialize;
use std::env;
use std::str::FromStr;

/// How the daily reset decides a user is due.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ResetMode {
    /// Only when the current hour equals the user's reset hour. A missed hour
    /// waits for the next day.
    #[default]
    ExactHour,
    /// At or after the reset hour, as long as yesterday is not archived yet.
    CatchUp,
}

impl FromStr for ResetMode {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "exact_hour" | "exact-hour" => Ok(ResetMode::ExactHour),
            "catch_up" | "catch-up" => Ok(ResetMode::CatchUp),
            other => Err(anyhow!("unknown DAILY_RESET_MODE '{}'", other)),
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub environment: String,
    pub log_level: String,
    pub jwt_secret: String,
    /// Shared secret the scheduler presents; `None` disables the cron surface.
    pub cron_secret: Option<String>,
    pub daily_reset_mode: ResetMode,
    pub scheduler_enabled: bool,
}

impl AppConfig {
    pub fn from_env() -> Result<Self> {
        let host = env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
        let port = env::var("PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse()
            .unwrap_or(3000);
        let environment = env::var("ENVIRONMENT").unwrap_or_else(|_| "development".to_string());
        let log_level = env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string());
        let jwt_secret = env::var("JWT_SECRET")
            .unwrap_or_else(|_| "your-secret-key-change-in-production".to_string());
        let cron_secret = env::var("CRON_SECRET").ok().filter(|s| !s.trim().is_empty());
        let daily_reset_mode = match env::var("DAILY_RESET_MODE") {
            Ok(raw) => raw.parse()?,
            Err(_) => ResetMode::default(),
        };
        let scheduler_enabled = env::var("SCHEDULER_ENABLED")
            .map(|v| matches!(v.trim().to_lowercase().as_str(), "1" | "true" | "yes"))
            .unwrap_or(false);

        Ok(AppConfig {
            host,
            port,
            environment,
            log_level,
            jwt_secret,
            cron_secret,
            daily_reset_mode,
            scheduler_enabled,
        })
    }

    pub fn is_development(&self) -> bool {
        self.environment == "development"
    }

    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    pub fn server_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reset_mode_parsing() {
        assert_eq!("exact_hour".parse::<ResetMode>().unwrap(), ResetMode::ExactHour);
        assert_eq!("Catch-Up".parse::<ResetMode>().unwrap(), ResetMode::CatchUp);
        assert!("hourly".parse::<ResetMode>().is_err());
    }
}
