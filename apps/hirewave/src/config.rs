use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};

use crate::features::FeatureFlags;

const DEFAULT_API_URL: &str = "http://localhost:8000/api";
const DEFAULT_SESSION_FILE: &str = ".hirewave/session.json";
const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Client configuration loaded from environment variables.
/// Every backend URL derives from `api_url`; nothing else hard-codes a host.
#[derive(Debug, Clone)]
pub struct Config {
    pub api_url: String,
    pub social_login: bool,
    pub session_file: PathBuf,
    pub request_timeout: Duration,
    pub features: FeatureFlags,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let timeout_secs = match std::env::var("HIREWAVE_TIMEOUT_SECS") {
            Ok(raw) => raw
                .parse::<u64>()
                .context("HIREWAVE_TIMEOUT_SECS must be a whole number of seconds")?,
            Err(_) => DEFAULT_TIMEOUT_SECS,
        };

        let mut features = FeatureFlags::default();
        if let Ok(overrides) = std::env::var("HIREWAVE_FEATURES") {
            features
                .apply_overrides(&overrides)
                .context("HIREWAVE_FEATURES must be a comma list of name=on|off")?;
        }

        Ok(Config {
            api_url: std::env::var("HIREWAVE_API_URL")
                .unwrap_or_else(|_| DEFAULT_API_URL.to_string())
                .trim_end_matches('/')
                .to_string(),
            social_login: parse_flag("HIREWAVE_SOCIAL_LOGIN")?,
            session_file: std::env::var("HIREWAVE_SESSION_FILE")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from(DEFAULT_SESSION_FILE)),
            request_timeout: Duration::from_secs(timeout_secs),
            features,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "warn".to_string()),
        })
    }
}

fn parse_flag(key: &str) -> Result<bool> {
    match std::env::var(key) {
        Ok(raw) => parse_bool(&raw)
            .with_context(|| format!("Environment variable '{key}' must be true or false")),
        Err(_) => Ok(false),
    }
}

pub(crate) fn parse_bool(raw: &str) -> Result<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "on" | "yes" => Ok(true),
        "0" | "false" | "off" | "no" | "" => Ok(false),
        other => anyhow::bail!("'{other}' is not a boolean"),
    }
}
