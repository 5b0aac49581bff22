use anyhow::{anyhow, bail, Context, Result};
use sqlx::{
    postgres::{PgConnectOptions, PgPoolOptions},
    PgPool,
};
use std::env;
use std::str::FromStr;
use std::time::Duration;
use tracing::info;

/// Reported as `application_name`, so job and request sessions are easy to
/// spot in `pg_stat_activity`.
const APPLICATION_NAME: &str = "pokrok";

#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub database_url: String,
    pub max_connections: u32,
    pub min_connections: u32,
    pub connect_timeout: Duration,
    pub idle_timeout: Duration,
}

impl DatabaseConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the config from any key lookup. `DATABASE_URL` is required; the
    /// pool settings fall back to defaults sized for request traffic plus the
    /// hourly reset pass, which holds one connection at a time.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let database_url = lookup("DATABASE_URL")
            .filter(|url| !url.trim().is_empty())
            .ok_or_else(|| anyhow!("DATABASE_URL must be set"))?;

        let config = DatabaseConfig {
            database_url,
            max_connections: parse_or(&lookup, "DB_MAX_CONNECTIONS", 20)?,
            min_connections: parse_or(&lookup, "DB_MIN_CONNECTIONS", 1)?,
            connect_timeout: Duration::from_secs(parse_or(&lookup, "DB_CONNECT_TIMEOUT", 30)?),
            idle_timeout: Duration::from_secs(parse_or(&lookup, "DB_IDLE_TIMEOUT", 600)?),
        };

        if config.max_connections == 0 {
            bail!("DB_MAX_CONNECTIONS must be at least 1");
        }
        if config.min_connections > config.max_connections {
            bail!(
                "DB_MIN_CONNECTIONS ({}) exceeds DB_MAX_CONNECTIONS ({})",
                config.min_connections,
                config.max_connections
            );
        }
        Ok(config)
    }

    pub async fn create_pool(&self) -> Result<PgPool> {
        let options = PgConnectOptions::from_str(&self.database_url)
            .context("invalid DATABASE_URL")?
            .application_name(APPLICATION_NAME);

        let pool = PgPoolOptions::new()
            .max_connections(self.max_connections)
            .min_connections(self.min_connections)
            .acquire_timeout(self.connect_timeout)
            .idle_timeout(Some(self.idle_timeout))
            .connect_with(options)
            .await
            .context("failed to connect to Postgres")?;

        info!(
            max_connections = self.max_connections,
            min_connections = self.min_connections,
            "Database pool ready"
        );
        Ok(pool)
    }
}

fn parse_or<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|err| anyhow!("invalid {} '{}': {}", key, raw, err)),
        None => Ok(default),
    }
}

pub async fn run_migrations(pool: &PgPool) -> Result<()> {
    sqlx::migrate!("./migrations").run(pool).await?;
    info!("Database migrations applied");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn test_defaults_apply_when_only_url_is_set() {
        let config =
            DatabaseConfig::from_lookup(lookup(&[("DATABASE_URL", "postgres://localhost/pokrok")]))
                .unwrap();
        assert_eq!(config.max_connections, 20);
        assert_eq!(config.min_connections, 1);
        assert_eq!(config.connect_timeout, Duration::from_secs(30));
        assert_eq!(config.idle_timeout, Duration::from_secs(600));
    }

    #[test]
    fn test_missing_url_is_rejected() {
        assert!(DatabaseConfig::from_lookup(lookup(&[])).is_err());
        assert!(DatabaseConfig::from_lookup(lookup(&[("DATABASE_URL", "  ")])).is_err());
    }

    #[test]
    fn test_pool_bounds_are_checked() {
        let url = ("DATABASE_URL", "postgres://localhost/pokrok");
        assert!(DatabaseConfig::from_lookup(lookup(&[url, ("DB_MAX_CONNECTIONS", "0")])).is_err());
        assert!(DatabaseConfig::from_lookup(lookup(&[
            url,
            ("DB_MAX_CONNECTIONS", "4"),
            ("DB_MIN_CONNECTIONS", "5"),
        ]))
        .is_err());
        assert!(
            DatabaseConfig::from_lookup(lookup(&[url, ("DB_IDLE_TIMEOUT", "soon")])).is_err()
        );
    }
}
