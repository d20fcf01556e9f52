//! Dashboard configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Optional
//! - `GROCIFY_API_BASE_URL` - Auth backend base URL (default: `http://localhost:5000`)
//! - `GROCIFY_STORE_URL` - Document store base URL. When unset, the
//!   in-process realtime store is used.
//! - `GROCIFY_PRODUCTS_COLLECTION` - Collection holding products (default: products)
//! - `GROCIFY_STATE_PATH` - File backing the durable token store. When
//!   unset there is no durable storage and token operations are no-ops.
//! - `GROCIFY_REQUEST_TIMEOUT_SECS` - Per-request timeout for HTTP calls
//! - `GROCIFY_LOG_FORMAT` - `text` or `json` (default: text)

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;
use url::Url;

const DEFAULT_API_BASE_URL: &str = "http://localhost:5000";
const DEFAULT_PRODUCTS_COLLECTION: &str = "products";

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Output format for log lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// Human-readable lines for local development.
    #[default]
    Text,
    /// One JSON object per event for structured log collection.
    Json,
}

impl std::str::FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "text" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            other => Err(format!("expected \"text\" or \"json\", got {other:?}")),
        }
    }
}

/// Dashboard configuration.
#[derive(Debug, Clone)]
pub struct DashboardConfig {
    /// Base URL of the auth backend (`/api/auth/*`).
    pub api_base_url: Url,
    /// Base URL of the HTTP document store, if one is used.
    pub store_url: Option<Url>,
    /// Name of the products collection.
    pub products_collection: String,
    /// File backing the token store.
    pub state_path: Option<PathBuf>,
    /// Per-request timeout for HTTP calls. `None` waits indefinitely.
    pub request_timeout: Option<Duration>,
    pub log_format: LogFormat,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            api_base_url: default_api_base_url(),
            store_url: None,
            products_collection: DEFAULT_PRODUCTS_COLLECTION.to_string(),
            state_path: None,
            request_timeout: None,
            log_format: LogFormat::Text,
        }
    }
}

impl DashboardConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is set but cannot be parsed.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let api_base_url = match get_optional_env("GROCIFY_API_BASE_URL") {
            Some(raw) => parse_url("GROCIFY_API_BASE_URL", &raw)?,
            None => default_api_base_url(),
        };
        let store_url = get_optional_env("GROCIFY_STORE_URL")
            .map(|raw| parse_url("GROCIFY_STORE_URL", &raw))
            .transpose()?;
        let products_collection =
            get_env_or_default("GROCIFY_PRODUCTS_COLLECTION", DEFAULT_PRODUCTS_COLLECTION);
        if products_collection.is_empty() || products_collection.contains('/') {
            return Err(ConfigError::InvalidEnvVar(
                "GROCIFY_PRODUCTS_COLLECTION".to_string(),
                "must be a non-empty name without '/'".to_string(),
            ));
        }
        let state_path = get_optional_env("GROCIFY_STATE_PATH").map(PathBuf::from);
        let request_timeout = get_optional_env("GROCIFY_REQUEST_TIMEOUT_SECS")
            .map(|raw| {
                raw.parse::<u64>().map(Duration::from_secs).map_err(|e| {
                    ConfigError::InvalidEnvVar(
                        "GROCIFY_REQUEST_TIMEOUT_SECS".to_string(),
                        e.to_string(),
                    )
                })
            })
            .transpose()?;
        let log_format = get_env_or_default("GROCIFY_LOG_FORMAT", "text")
            .parse::<LogFormat>()
            .map_err(|e| ConfigError::InvalidEnvVar("GROCIFY_LOG_FORMAT".to_string(), e))?;

        Ok(Self {
            api_base_url,
            store_url,
            products_collection,
            state_path,
            request_timeout,
            log_format,
        })
    }

    /// Resolve an auth endpoint path such as `/api/auth/check`.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the joined URL is invalid.
    pub fn api_url(&self, path: &str) -> Result<Url, ConfigError> {
        self.api_base_url
            .join(path)
            .map_err(|e| ConfigError::InvalidEnvVar("GROCIFY_API_BASE_URL".to_string(), e.to_string()))
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

#[allow(clippy::expect_used, reason = "constant")]
fn default_api_base_url() -> Url {
    Url::parse(DEFAULT_API_BASE_URL).expect("default API URL is valid")
}

fn parse_url(key: &str, raw: &str) -> Result<Url, ConfigError> {
    let url = Url::parse(raw).map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(ConfigError::InvalidEnvVar(
            key.to_string(),
            format!("unsupported scheme {:?}", url.scheme()),
        ));
    }
    Ok(url)
}

/// Get an optional environment variable, treating empty values as unset.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    get_optional_env(key).unwrap_or_else(|| default.to_string())
}
