// ⚙️ Server configuration - read once from the environment at startup

use anyhow::{anyhow, Context, Result};
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_PORT: u16 = 3001;
pub const DEFAULT_DB_PATH: &str = "salary_ledger.db";
pub const DEFAULT_UPSTREAM_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Clone, PartialEq)]
pub struct ServerConfig {
    pub port: u16,
    /// Registry endpoint queries are forwarded to
    pub target_url: String,
    /// CORS origin; `*` allows any
    pub allowed_origin: String,
    pub db_path: PathBuf,
    pub upstream_timeout: Duration,
}

impl ServerConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup (tests pass a map instead of the process env)
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let port = match get("PORT") {
            Some(raw) => raw
                .trim()
                .parse::<u16>()
                .with_context(|| format!("Invalid PORT: {}", raw))?,
            None => DEFAULT_PORT,
        };

        let target_url = get("TARGET_URL").ok_or_else(|| anyhow!("TARGET_URL is not set"))?;

        let upstream_timeout_secs = match get("UPSTREAM_TIMEOUT_SECS") {
            Some(raw) => raw
                .trim()
                .parse::<u64>()
                .with_context(|| format!("Invalid UPSTREAM_TIMEOUT_SECS: {}", raw))?,
            None => DEFAULT_UPSTREAM_TIMEOUT_SECS,
        };

        Ok(ServerConfig {
            port,
            target_url,
            allowed_origin: get("ALLOWED_ORIGIN").unwrap_or_else(|| "*".to_string()),
            db_path: PathBuf::from(get("DB_PATH").unwrap_or_else(|| DEFAULT_DB_PATH.to_string())),
            upstream_timeout: Duration::from_secs(upstream_timeout_secs),
        })
    }

    pub fn bind_address(&self) -> String {
        format!("0.0.0.0:{}", self.port)
    }
}
