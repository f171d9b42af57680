use std::env;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use anyhow::{Context, Result};

const DEFAULT_HOST: &str = "127.0.0.1";
const DEFAULT_PORT: u16 = 8501;
const DEFAULT_DATABASE_URL: &str = "sqlite://./translanova_data/translanova.db?mode=rwc";
const DEFAULT_UPLOAD_DIR: &str = "uploads";
const DEFAULT_OUTPUT_DIR: &str = "translated_files";
const DEFAULT_INTERPRETER: &str = "python";
const DEFAULT_SCRIPT: &str = "translate_file.py";
const DEFAULT_JWT_SECRET: &str = "dev-secret-key";

/// Runtime settings. Each key is looked up in the process environment,
/// then in `.env`, then falls back to a built-in default.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: IpAddr,
    pub port: u16,
    pub database_url: String,
    pub upload_dir: PathBuf,
    pub output_dir: PathBuf,
    pub interpreter: String,
    pub script: String,
    pub working_dir: PathBuf,
    pub job_timeout: Duration,
    pub max_concurrent_jobs: usize,
    pub upload_rate_per_minute: u32,
    pub max_upload_bytes: usize,
    pub log_dir: String,
    pub jwt_secret: String,
    pub jwt_ttl: chrono::Duration,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            host: IpAddr::from([127, 0, 0, 1]),
            port: DEFAULT_PORT,
            database_url: DEFAULT_DATABASE_URL.to_string(),
            upload_dir: PathBuf::from(DEFAULT_UPLOAD_DIR),
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            interpreter: DEFAULT_INTERPRETER.to_string(),
            script: DEFAULT_SCRIPT.to_string(),
            working_dir: PathBuf::from("."),
            job_timeout: Duration::from_secs(1800),
            max_concurrent_jobs: 2,
            upload_rate_per_minute: 30,
            max_upload_bytes: 512 * 1024 * 1024,
            log_dir: "./logs".to_string(),
            jwt_secret: DEFAULT_JWT_SECRET.to_string(),
            jwt_ttl: chrono::Duration::days(7),
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Result<Self> {
        let defaults = Self::default();

        Ok(Self {
            host: parse_var("TRANSLANOVA_HOST", DEFAULT_HOST.parse()?)?,
            port: parse_var("TRANSLANOVA_PORT", defaults.port)?,
            database_url: var_or("TRANSLANOVA_DATABASE_URL", DEFAULT_DATABASE_URL),
            upload_dir: PathBuf::from(var_or("TRANSLANOVA_UPLOAD_DIR", DEFAULT_UPLOAD_DIR)),
            output_dir: PathBuf::from(var_or("TRANSLANOVA_OUTPUT_DIR", DEFAULT_OUTPUT_DIR)),
            interpreter: var_or("TRANSLANOVA_INTERPRETER", DEFAULT_INTERPRETER),
            script: var_or("TRANSLANOVA_SCRIPT", DEFAULT_SCRIPT),
            working_dir: PathBuf::from(var_or("TRANSLANOVA_WORKDIR", ".")),
            job_timeout: Duration::from_secs(parse_var(
                "TRANSLANOVA_JOB_TIMEOUT_SECS",
                defaults.job_timeout.as_secs(),
            )?),
            max_concurrent_jobs: parse_var(
                "TRANSLANOVA_MAX_CONCURRENT_JOBS",
                defaults.max_concurrent_jobs,
            )?
            .max(1),
            upload_rate_per_minute: parse_var(
                "TRANSLANOVA_UPLOAD_RATE_PER_MINUTE",
                defaults.upload_rate_per_minute,
            )?,
            max_upload_bytes: upload_limit(parse_var("TRANSLANOVA_MAX_UPLOAD_MB", 512)?)?,
            log_dir: var_or("TRANSLANOVA_LOG_DIR", &defaults.log_dir),
            jwt_secret: var_or("JWT_SECRET", DEFAULT_JWT_SECRET),
            jwt_ttl: token_ttl(parse_var("JWT_TTL_DAYS", 7)?)?,
        })
    }

    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

fn var(key: &str) -> Option<String> {
    match env::var(key) {
        Ok(value) => Some(value),
        Err(_) => dotenv::var(key).ok(),
    }
}

fn var_or(key: &str, default: &str) -> String {
    var(key).unwrap_or_else(|| default.to_string())
}

fn parse_var<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match var(key) {
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .with_context(|| format!("invalid value for {}: {:?}", key, raw)),
        None => Ok(default),
    }
}

fn upload_limit(megabytes: usize) -> Result<usize> {
    megabytes
        .checked_mul(1024 * 1024)
        .with_context(|| format!("invalid value for TRANSLANOVA_MAX_UPLOAD_MB: {} MB does not fit in memory", megabytes))
}

fn token_ttl(days: i64) -> Result<chrono::Duration> {
    if days < 1 {
        anyhow::bail!("invalid value for JWT_TTL_DAYS: {} (must be at least 1)", days);
    }
    chrono::Duration::try_days(days)
        .with_context(|| format!("invalid value for JWT_TTL_DAYS: {} days is out of range", days))
}

/// Loads `.env` and makes sure the SQLite directory exists before the
/// pool tries to open the file.
pub fn init_env(config: &AppConfig) {
    dotenv::dotenv().ok();

    if let Some(db_path) = config.database_url.strip_prefix("sqlite://") {
        let db_path = db_path.split('?').next().unwrap_or(db_path);
        if let Some(dir) = std::path::Path::new(db_path).parent() {
            std::fs::create_dir_all(dir).unwrap_or_else(|e| {
                eprintln!("Failed to create database directory: {}", e);
            });
        }
    }
}
