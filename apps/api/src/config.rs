use std::time::Duration;

use anyhow::{bail, Context, Result};

/// Deployment mode. Background jobs only run in production.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunMode {
    Development,
    Production,
}

impl RunMode {
    pub fn parse(value: &str) -> Result<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "development" | "dev" => Ok(RunMode::Development),
            "production" | "prod" => Ok(RunMode::Production),
            other => bail!("Unknown run mode '{other}' (expected 'development' or 'production')"),
        }
    }
}

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// `None` runs against the in-memory store.
    pub database_url: Option<String>,
    pub db_max_connections: u32,
    pub port: u16,
    pub run_mode: RunMode,
    pub rust_log: String,
    pub keepalive_url: Option<String>,
    pub keepalive_interval: Duration,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let run_mode = match optional_env("APP_ENV").or_else(|| optional_env("NODE_ENV")) {
            Some(value) => RunMode::parse(&value)?,
            None => RunMode::Development,
        };

        Ok(Config {
            database_url: optional_env("DATABASE_URL"),
            db_max_connections: parse_env("DB_MAX_CONNECTIONS", 10)?,
            port: parse_env("PORT", 8080)?,
            run_mode,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
            keepalive_url: optional_env("KEEPALIVE_URL"),
            keepalive_interval: Duration::from_secs(parse_env("KEEPALIVE_INTERVAL_SECS", 840)?),
        })
    }
}

fn optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn parse_env<T>(key: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match optional_env(key) {
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .with_context(|| format!("{key} must be a valid number, got '{raw}'")),
        None => Ok(default),
    }
}
