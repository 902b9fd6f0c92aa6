//! Environment-driven server configuration.
//!
//! Every setting has a default suitable for local development, so a bare
//! `recipe-server` invocation works without any environment at all. A `.env`
//! file in the working directory is loaded first when present.

use std::env;
use std::path::PathBuf;

use chrono::TimeDelta;

use thiserror::Error;

const DEFAULT_DATABASE_URL: &str = "recipe.sqlite3";
const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";
const DEFAULT_MEDIA_ROOT: &str = "media";
const DEFAULT_MEDIA_URL: &str = "/media/";
const DEFAULT_SESSION_TTL_DAYS: i64 = 30;
/// Upper bound keeps `now + ttl` far inside chrono's date range.
const MAX_SESSION_TTL_DAYS: i64 = 36_500;
const DEFAULT_DB_POOL_SIZE: u32 = 8;

/// Maximum accepted upload body (10MB).
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid value for {var}: {value:?}")]
    Invalid { var: &'static str, value: String },
}

#[derive(Debug, Clone)]
pub struct Config {
    /// SQLite database path
    pub database_url: String,
    pub bind_addr: String,
    /// Directory uploaded files are written under
    pub media_root: PathBuf,
    /// URL prefix uploaded files are served from, always ending in '/'
    pub media_url: String,
    /// Lifetime of issued tokens
    pub session_ttl: TimeDelta,
    pub max_upload_bytes: usize,
    pub db_pool_size: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_url: DEFAULT_DATABASE_URL.to_string(),
            bind_addr: DEFAULT_BIND_ADDR.to_string(),
            media_root: PathBuf::from(DEFAULT_MEDIA_ROOT),
            media_url: DEFAULT_MEDIA_URL.to_string(),
            session_ttl: TimeDelta::days(DEFAULT_SESSION_TTL_DAYS),
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            db_pool_size: DEFAULT_DB_POOL_SIZE,
        }
    }
}

impl Config {
    /// Load configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        if let Err(e) = dotenvy::dotenv() {
            if !e.not_found() {
                tracing::warn!("Failed to load .env file: {}", e);
            }
        }

        let defaults = Self::default();

        Ok(Self {
            database_url: env::var("DATABASE_URL").unwrap_or(defaults.database_url),
            bind_addr: env::var("BIND_ADDR").unwrap_or(defaults.bind_addr),
            media_root: env::var("MEDIA_ROOT")
                .map(PathBuf::from)
                .unwrap_or(defaults.media_root),
            media_url: env::var("MEDIA_URL")
                .map(|url| normalize_media_url(&url))
                .unwrap_or(defaults.media_url),
            session_ttl: match parse_var("SESSION_TTL_DAYS")? {
                Some(days) => session_ttl_from_days(days)?,
                None => defaults.session_ttl,
            },
            max_upload_bytes: parse_var("MAX_UPLOAD_BYTES")?.unwrap_or(defaults.max_upload_bytes),
            db_pool_size: parse_var("DB_POOL_SIZE")?.unwrap_or(defaults.db_pool_size),
        })
    }

    pub fn with_session_ttl_days(self, days: i64) -> Result<Self, ConfigError> {
        Ok(Self {
            session_ttl: session_ttl_from_days(days)?,
            ..self
        })
    }

    /// Path the media directory is mounted at, if `media_url` is a local path.
    ///
    /// Returns `None` when uploads are served from another origin.
    pub fn media_mount_path(&self) -> Option<&str> {
        if !self.media_url.starts_with('/') {
            return None;
        }
        let trimmed = self.media_url.trim_end_matches('/');
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed)
        }
    }
}

fn session_ttl_from_days(days: i64) -> Result<TimeDelta, ConfigError> {
    if !(1..=MAX_SESSION_TTL_DAYS).contains(&days) {
        return Err(ConfigError::Invalid {
            var: "SESSION_TTL_DAYS",
            value: days.to_string(),
        });
    }
    TimeDelta::try_days(days).ok_or(ConfigError::Invalid {
        var: "SESSION_TTL_DAYS",
        value: days.to_string(),
    })
}

fn normalize_media_url(url: &str) -> String {
    if url.ends_with('/') {
        url.to_string()
    } else {
        format!("{}/", url)
    }
}

fn parse_var<T: std::str::FromStr>(var: &'static str) -> Result<Option<T>, ConfigError> {
    match env::var(var) {
        Ok(value) => value
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::Invalid { var, value }),
        Err(_) => Ok(None),
    }
}
