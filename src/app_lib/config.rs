//! Client configuration read from the environment. The CLI feeds the same
//! values through `clap` args, so `AppConfig` is the single shape both paths
//! produce. Configuration values are public; tokens never live here.

use super::errors::AppError;
use std::{env, path::PathBuf, time::Duration};
use url::Url;

pub const ENV_API_BASE_URL: &str = "KUDOS_API_BASE_URL";
pub const ENV_REQUEST_TIMEOUT_MS: &str = "KUDOS_REQUEST_TIMEOUT_MS";
pub const ENV_HINT_PATH: &str = "KUDOS_HINT_PATH";

pub const DEFAULT_API_BASE_URL: &str = "http://localhost:8000/api";
/// Default request timeout (milliseconds) applied when a call sets none.
pub const DEFAULT_TIMEOUT_MS: u64 = 10_000;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AppConfig {
    pub api_base_url: String,
    pub request_timeout: Option<Duration>,
    pub hint_path: Option<PathBuf>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            request_timeout: Some(Duration::from_millis(DEFAULT_TIMEOUT_MS)),
            hint_path: None,
        }
    }
}

impl AppConfig {
    /// Loads config from environment variables, falling back to defaults for
    /// anything missing or blank. This is the entry point for programs that
    /// embed the library; the `kudos` CLI reads the same variables through
    /// its `clap` args instead.
    ///
    /// # Errors
    /// Returns `AppError::Config` if the base URL or timeout is malformed.
    pub fn load() -> Result<Self, AppError> {
        let overrides = Overrides {
            api_base_url: read_env(ENV_API_BASE_URL),
            request_timeout_ms: read_env(ENV_REQUEST_TIMEOUT_MS),
            hint_path: read_env(ENV_HINT_PATH),
        };

        let mut config = Self::default();
        apply_overrides(&mut config, overrides)?;
        config.validate()?;
        Ok(config)
    }

    /// Returns a copy pointing at a different API base URL.
    #[must_use]
    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.api_base_url = base_url.trim().to_string();
        self
    }

    /// Checks that the base URL is absolute http(s).
    ///
    /// # Errors
    /// Returns `AppError::Config` describing the problem.
    pub fn validate(&self) -> Result<(), AppError> {
        let url = Url::parse(&self.api_base_url).map_err(|err| {
            AppError::Config(format!(
                "invalid API base URL {}: {err}",
                self.api_base_url
            ))
        })?;

        match url.scheme() {
            "http" | "https" => Ok(()),
            scheme => Err(AppError::Config(format!(
                "unsupported API base URL scheme: {scheme}"
            ))),
        }
    }
}

#[derive(Default)]
struct Overrides {
    api_base_url: Option<String>,
    request_timeout_ms: Option<String>,
    hint_path: Option<String>,
}

fn apply_overrides(config: &mut AppConfig, overrides: Overrides) -> Result<(), AppError> {
    if let Some(value) = overrides.api_base_url {
        config.api_base_url = value;
    }
    if let Some(value) = overrides.request_timeout_ms {
        config.request_timeout = parse_timeout_ms(&value)?;
    }
    if let Some(value) = overrides.hint_path {
        config.hint_path = Some(PathBuf::from(value));
    }
    Ok(())
}

/// Parses a timeout in milliseconds; `0` disables the default timeout.
///
/// # Errors
/// Returns `AppError::Config` when the value is not a number.
pub fn parse_timeout_ms(value: &str) -> Result<Option<Duration>, AppError> {
    let millis = value
        .trim()
        .parse::<u64>()
        .map_err(|_| AppError::Config(format!("invalid request timeout: {value}")))?;

    Ok((millis > 0).then(|| Duration::from_millis(millis)))
}

fn read_env(key: &str) -> Option<String> {
    env::var(key).ok().and_then(|value| normalize_value(&value))
}

fn normalize_value(value: &str) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}
