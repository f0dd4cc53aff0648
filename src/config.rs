use anyhow::{Context, Result};
use dotenvy::dotenv;
use std::env;
use std::str::FromStr;

#[derive(Clone, Debug)]
pub struct Config {
    pub database_url: String,
    pub server_addr: String,

    // Rate limiting
    pub rate_read_per_min: u32,
    pub rate_write_per_min: u32,

    /// Seconds a loaded attendance snapshot may be served before reloading.
    pub snapshot_ttl_secs: u64,

    pub log_dir: String,
    pub log_level: tracing::Level,

    pub api_prefix: String,
}

fn required(key: &str) -> Result<String> {
    env::var(key).with_context(|| format!("{key} must be set"))
}

fn optional<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match env::var(key) {
        Ok(raw) => raw
            .parse()
            .with_context(|| format!("{key} has an invalid value: {raw}")),
        Err(_) => Ok(default),
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenv().ok();

        Ok(Self {
            server_addr: required("SERVER_ADDR")?,
            database_url: required("DATABASE_URL")?,

            rate_read_per_min: optional("RATE_READ_PER_MIN", 600)?,
            rate_write_per_min: optional("RATE_WRITE_PER_MIN", 120)?,

            snapshot_ttl_secs: optional("SNAPSHOT_TTL_SECS", 300)?,

            log_dir: env::var("LOG_DIR").unwrap_or_else(|_| "logs".to_string()),
            log_level: optional("LOG_LEVEL", tracing::Level::DEBUG)?,

            api_prefix: env::var("API_PREFIX").unwrap_or_else(|_| "/api".to_string()),
        })
    }
}
