use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use blog_client::DEFAULT_TOKEN_FILE;

pub const DEFAULT_API_URL: &str = "http://127.0.0.1:8080";
const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 15;

#[derive(Debug, Clone)]
pub struct Settings {
    pub api_url: String,
    pub token_file: PathBuf,
    pub http_timeout: Duration,
    pub log_level: String,
}

impl Settings {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let api_url = non_empty(lookup("BLOG_API_URL"))
            .unwrap_or_else(|| DEFAULT_API_URL.to_string());
        let token_file = non_empty(lookup("BLOG_TOKEN_FILE"))
            .unwrap_or_else(|| DEFAULT_TOKEN_FILE.to_string())
            .into();
        let http_timeout_secs = parse_u64(
            "BLOG_HTTP_TIMEOUT_SECS",
            lookup("BLOG_HTTP_TIMEOUT_SECS"),
            DEFAULT_HTTP_TIMEOUT_SECS,
        )?;
        let log_level = non_empty(lookup("LOG_LEVEL"))
            .or_else(|| non_empty(lookup("RUST_LOG")))
            .unwrap_or_else(|| "warn".to_string());

        Ok(Self {
            api_url,
            token_file,
            http_timeout: Duration::from_secs(http_timeout_secs),
            log_level,
        })
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

fn parse_u64(key: &str, raw: Option<String>, default: u64) -> Result<u64> {
    let Some(raw) = non_empty(raw) else {
        return Ok(default);
    };

    let value = raw
        .parse::<u64>()
        .with_context(|| format!("Failed to parse {key}, expecting positive integer"))?;

    if value == 0 {
        return Err(anyhow!("{key} must be > 0"));
    }
    Ok(value)
}
