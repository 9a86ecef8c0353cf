//! Runtime configuration loaded from environment variables.
//!
//! `AppConfig::from_env` reads a `.env` file if present and then the process
//! environment. The parsing itself goes through `from_lookup`, which takes any
//! key → value function, so defaults and validation are unit tested without
//! touching the real environment.

use log::info;
use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

/// Default lifetime of an attendance window.
pub const DEFAULT_SESSION_SECS: u64 = 180;

/// Longest accepted attendance window: one day.
pub const MAX_SESSION_SECS: u64 = 24 * 60 * 60;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} is required")]
    Missing(&'static str),

    #[error("invalid value for {key}: '{value}'")]
    Invalid { key: &'static str, value: String },
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub database_path: PathBuf,
    pub reports_dir: PathBuf,
    pub fonts_dir: PathBuf,
    /// Base URL encoded into student QR codes.
    pub public_url: String,
    pub admin_username: String,
    pub admin_password: String,
    pub session_duration: Duration,
    pub max_upload_bytes: usize,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let host = lookup("HOST").unwrap_or_else(|| "127.0.0.1".into());
        let port: u16 = parse_or(&lookup, "PORT", 8080)?;
        let public_url = lookup("PUBLIC_URL").unwrap_or_else(|| format!("http://{}:{}", host, port));
        let admin_password = lookup("ADMIN_PASSWORD")
            .filter(|p| !p.is_empty())
            .ok_or(ConfigError::Missing("ADMIN_PASSWORD"))?;

        let session_secs: u64 = parse_or(&lookup, "SESSION_DURATION_SECS", DEFAULT_SESSION_SECS)?;
        if session_secs == 0 || session_secs > MAX_SESSION_SECS {
            return Err(ConfigError::Invalid {
                key: "SESSION_DURATION_SECS",
                value: session_secs.to_string(),
            });
        }

        Ok(Self {
            host,
            port,
            database_path: lookup("DATABASE_PATH")
                .unwrap_or_else(|| "rollcall.sqlite".into())
                .into(),
            reports_dir: lookup("REPORTS_DIR").unwrap_or_else(|| "reports".into()).into(),
            fonts_dir: lookup("FONTS_DIR").unwrap_or_else(|| "./fonts".into()).into(),
            public_url,
            admin_username: lookup("ADMIN_USERNAME").unwrap_or_else(|| "admin".into()),
            admin_password,
            session_duration: Duration::from_secs(session_secs),
            max_upload_bytes: parse_or(&lookup, "MAX_UPLOAD_BYTES", 10 * 1024 * 1024)?,
        })
    }
}

fn parse_or<F, T>(lookup: &F, key: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(key) {
        Some(raw) => raw.trim().parse().map_err(|_| ConfigError::Invalid { key, value: raw }),
        None => {
            info!("{} not set, using default", key);
            Ok(default)
        }
    }
}
