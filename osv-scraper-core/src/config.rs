//! Configuration loaded from environment variables

use std::path::PathBuf;
use std::time::Duration;

use crate::ecosystem::{self, Ecosystem};
use crate::Result;

const DEFAULT_API_BASE_URL: &str = "https://api.osv.dev";
const DEFAULT_DB_PATH: &str = "./osv.db";
const DEFAULT_RETENTION_DAYS: i64 = 7;
const DEFAULT_RATE_LIMIT: f64 = 10.0; // requests per second
const DEFAULT_MAX_CONCURRENCY: usize = 5;
const DEFAULT_BATCH_SIZE: usize = 100;
const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(30);

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub api_base_url: String,
    pub db_path: PathBuf,
    pub ecosystems: Vec<Ecosystem>,
    pub retention_days: i64,
    pub rate_limit: f64,
    pub max_concurrency: usize,
    pub batch_size: usize,
    pub http_timeout: Duration,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// A `.env` file in the current directory is loaded first when
    /// present. Unknown ecosystem names in `OSV_ECOSYSTEMS` are a
    /// fatal error; invalid numeric values fall back to defaults.
    pub fn load() -> Result<Self> {
        let _ = dotenvy::dotenv();
        Self::from_env()
    }

    fn from_env() -> Result<Self> {
        let ecosystems =
            ecosystem::parse_ecosystems(&std::env::var("OSV_ECOSYSTEMS").unwrap_or_default())?;

        Ok(Self {
            api_base_url: get_env("OSV_API_BASE_URL", DEFAULT_API_BASE_URL),
            db_path: PathBuf::from(get_env("OSV_DB_PATH", DEFAULT_DB_PATH)),
            ecosystems,
            retention_days: get_env_int("OSV_DATA_RETENTION_DAYS", DEFAULT_RETENTION_DAYS),
            rate_limit: get_env_float("OSV_RATE_LIMIT", DEFAULT_RATE_LIMIT),
            max_concurrency: get_env_int("OSV_MAX_CONCURRENCY", DEFAULT_MAX_CONCURRENCY as i64)
                as usize,
            batch_size: get_env_int("OSV_BATCH_SIZE", DEFAULT_BATCH_SIZE as i64) as usize,
            http_timeout: get_env_duration("OSV_HTTP_TIMEOUT", DEFAULT_HTTP_TIMEOUT),
        })
    }
}

fn get_env(key: &str, default: &str) -> String {
    match std::env::var(key) {
        Ok(value) if !value.is_empty() => value,
        _ => default.to_string(),
    }
}

fn get_env_int(key: &str, default: i64) -> i64 {
    std::env::var(key)
        .ok()
        .and_then(|s| s.parse::<i64>().ok())
        .filter(|v| *v > 0)
        .unwrap_or(default)
}

fn get_env_float(key: &str, default: f64) -> f64 {
    std::env::var(key)
        .ok()
        .and_then(|s| s.parse::<f64>().ok())
        .filter(|v| *v > 0.0)
        .unwrap_or(default)
}

fn get_env_duration(key: &str, default: Duration) -> Duration {
    std::env::var(key)
        .ok()
        .and_then(|s| s.parse::<u64>().ok())
        .filter(|v| *v > 0)
        .map(Duration::from_secs)
        .unwrap_or(default)
}
