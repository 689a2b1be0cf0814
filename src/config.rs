use std::{env, path::PathBuf, time::Duration};

use anyhow::Context;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub host: String,
    pub port: u16,
    pub jwt_secret: String,
    pub jwt_ttl_hours: i64,
    pub upload_dir: PathBuf,
    pub upload_url_prefix: String,
    pub max_upload_bytes: usize,
    pub max_upload_files: usize,
    pub db_connect_retries: u32,
    pub db_retry_delay: Duration,
    pub db_max_connections: u32,
    pub cors_origins: Vec<String>,
    pub allow_cleanup: bool,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = env::var("DATABASE_URL").context("DATABASE_URL is not set")?;
        let jwt_secret = env::var("JWT_SECRET").context("JWT_SECRET is not set")?;
        let host = env::var("APP_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = parse_or("APP_PORT", 3000);
        let cors_origins = env::var("CORS_ORIGINS")
            .map(|raw| {
                raw.split(',')
                    .map(|s| s.trim().to_string())
                    .filter(|s| !s.is_empty())
                    .collect()
            })
            .unwrap_or_default();

        Ok(Self {
            database_url,
            host,
            port,
            jwt_secret,
            jwt_ttl_hours: parse_or("JWT_TTL_HOURS", 24),
            upload_dir: env::var("UPLOAD_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("public/uploads")),
            upload_url_prefix: env::var("UPLOAD_URL_PREFIX")
                .unwrap_or_else(|_| "/uploads".to_string()),
            max_upload_bytes: parse_or("MAX_UPLOAD_BYTES", 5 * 1024 * 1024),
            max_upload_files: parse_or("MAX_UPLOAD_FILES", 5),
            db_connect_retries: parse_or("DB_CONNECT_RETRIES", 2),
            db_retry_delay: Duration::from_millis(parse_or("DB_RETRY_DELAY_MS", 2_000)),
            db_max_connections: parse_or("DB_MAX_CONNECTIONS", 10),
            cors_origins,
            allow_cleanup: env::var("ALLOW_CLEANUP")
                .map(|v| v.eq_ignore_ascii_case("true") || v == "1")
                .unwrap_or(false),
        })
    }

    /// Request bodies must fit a full multi-file upload plus form overhead.
    pub fn max_body_bytes(&self) -> usize {
        self.max_upload_bytes * self.max_upload_files + 64 * 1024
    }
}

fn parse_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|v| v.parse::<T>().ok())
        .unwrap_or(default)
}
