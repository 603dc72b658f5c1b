use crate::constants::api::BASE_PATH;
use crate::constants::network::{DEFAULT_BASE_URL, TIMEOUT_API_REQUEST_MS};
use crate::constants::protocols::ALLOWED_HTTP;
use crate::errors::ToolError;
use crate::services::logger::LogLevel;
use url::Url;

pub const ENV_API_URL: &str = "N8N_API_URL";
pub const ENV_API_KEY: &str = "N8N_API_KEY";
pub const ENV_TIMEOUT_MS: &str = "N8N_TIMEOUT_MS";
pub const ENV_LOG_LEVEL: &str = "LOG_LEVEL";

#[derive(Debug, Clone)]
pub struct Config {
    pub api_url: Url,
    pub api_key: Option<String>,
    pub timeout_ms: u64,
    pub log_level: LogLevel,
}

/// Values given on the command line; each one replaces its environment counterpart.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub api_url: Option<String>,
    pub api_key: Option<String>,
    pub timeout_ms: Option<String>,
    pub log_level: Option<String>,
}

impl Config {
    pub fn from_env() -> Result<Self, ToolError> {
        Self::resolve(|name| std::env::var(name).ok(), &ConfigOverrides::default())
    }

    pub fn from_env_with(overrides: &ConfigOverrides) -> Result<Self, ToolError> {
        Self::resolve(|name| std::env::var(name).ok(), overrides)
    }

    pub fn resolve<F>(lookup: F, overrides: &ConfigOverrides) -> Result<Self, ToolError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let pick = |value: &Option<String>, env: &str| {
            value
                .clone()
                .or_else(|| lookup(env))
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let api_url = normalize_base_url(
            pick(&overrides.api_url, ENV_API_URL)
                .as_deref()
                .unwrap_or(DEFAULT_BASE_URL),
        )?;
        let api_key = pick(&overrides.api_key, ENV_API_KEY);
        let timeout_ms = match pick(&overrides.timeout_ms, ENV_TIMEOUT_MS) {
            Some(raw) => parse_timeout(&raw)?,
            None => TIMEOUT_API_REQUEST_MS,
        };
        let log_level = match pick(&overrides.log_level, ENV_LOG_LEVEL) {
            Some(raw) => LogLevel::parse(&raw).ok_or_else(|| {
                ToolError::config(format!("Invalid {}: {}", ENV_LOG_LEVEL, raw))
                    .with_details("Expected one of: error, warn, info, debug")
            })?,
            None => LogLevel::default(),
        };

        Ok(Self {
            api_url,
            api_key,
            timeout_ms,
            log_level,
        })
    }
}

fn parse_timeout(raw: &str) -> Result<u64, ToolError> {
    match raw.parse::<u64>() {
        Ok(value) if value > 0 => Ok(value),
        _ => Err(
            ToolError::config(format!("Invalid {}: {}", ENV_TIMEOUT_MS, raw))
                .with_details("Expected a positive integer number of milliseconds"),
        ),
    }
}

/// Normalizes the configured API root: http(s) only, no query or fragment,
/// path ending in `/api/v1`.
pub fn normalize_base_url(raw: &str) -> Result<Url, ToolError> {
    let mut url = Url::parse(raw.trim()).map_err(|err| {
        ToolError::config(format!("Invalid {}: {}", ENV_API_URL, raw))
            .with_details(format!("URL parse error: {}", err))
    })?;
    if !ALLOWED_HTTP.contains(&format!("{}:", url.scheme()).as_str()) {
        return Err(ToolError::config(format!(
            "Invalid {}: scheme must be http or https",
            ENV_API_URL
        ))
        .with_details(format!("Received: {}", raw)));
    }
    if url.host_str().map(str::is_empty).unwrap_or(true) {
        return Err(ToolError::config(format!("Invalid {}: missing host", ENV_API_URL)));
    }
    url.set_query(None);
    url.set_fragment(None);

    let trimmed = url.path().trim_end_matches('/').to_string();
    let path = if trimmed.ends_with(BASE_PATH) {
        trimmed
    } else {
        format!("{}{}", trimmed, BASE_PATH)
    };
    url.set_path(&path);
    Ok(url)
}
