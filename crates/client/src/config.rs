//! Client configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `MINISHOP_API_URL` - Base URL of the storefront REST API
//!   (e.g. `https://shop.example.com/api/v1`)
//!
//! ## Optional
//! - `MINISHOP_HTTP_TIMEOUT_SECS` - Request timeout in seconds (default: 15)

use std::time::Duration;

use thiserror::Error;
use url::Url;

/// Fixed request timeout applied when none is configured. Chosen so a stuck
/// backend surfaces as a `Timeout` well before the container kills the view.
pub const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(15);

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Client SDK configuration.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL of the backend API, including the version prefix.
    pub api_url: Url,
    /// Per-request timeout. No retries are layered on top of this anywhere.
    pub http_timeout: Duration,
}

impl ClientConfig {
    /// Create a configuration with the default timeout.
    #[must_use]
    pub const fn new(api_url: Url) -> Self {
        Self {
            api_url,
            http_timeout: DEFAULT_HTTP_TIMEOUT,
        }
    }

    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let api_url = get_required_env("MINISHOP_API_URL")?;
        let api_url = Url::parse(&api_url)
            .map_err(|e| ConfigError::InvalidEnvVar("MINISHOP_API_URL".to_string(), e.to_string()))?;

        let http_timeout = parse_timeout_secs(
            "MINISHOP_HTTP_TIMEOUT_SECS",
            get_optional_env("MINISHOP_HTTP_TIMEOUT_SECS").as_deref(),
        )?;

        Ok(Self {
            api_url,
            http_timeout,
        })
    }
}

/// Get a required environment variable.
fn get_required_env(key: &str) -> Result<String, ConfigError> {
    std::env::var(key).map_err(|_| ConfigError::MissingEnvVar(key.to_string()))
}

/// Get an optional environment variable.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok()
}

/// Parse an optional seconds value, falling back to the default timeout.
fn parse_timeout_secs(key: &str, value: Option<&str>) -> Result<Duration, ConfigError> {
    match value {
        None => Ok(DEFAULT_HTTP_TIMEOUT),
        Some(raw) => raw
            .parse::<u64>()
            .map(Duration::from_secs)
            .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string())),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_timeout_defaults_when_unset() {
        let timeout = parse_timeout_secs("T", None).unwrap();
        assert_eq!(timeout, DEFAULT_HTTP_TIMEOUT);
    }

    #[test]
    fn test_timeout_parses_seconds() {
        let timeout = parse_timeout_secs("T", Some("30")).unwrap();
        assert_eq!(timeout, Duration::from_secs(30));
    }

    #[test]
    fn test_timeout_rejects_garbage() {
        let result = parse_timeout_secs("T", Some("soon"));
        assert!(matches!(result, Err(ConfigError::InvalidEnvVar(_, _))));
    }
}
