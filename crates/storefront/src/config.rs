//! Storefront configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `WOOCOMMERCE_API_URL` - Base URL of the WooCommerce REST API
//!   (e.g., `https://shop.example.com/wp-json/wc/v3`)
//! - `WOOCOMMERCE_CONSUMER_KEY` - REST API consumer key
//! - `WOOCOMMERCE_CONSUMER_SECRET` - REST API consumer secret
//!
//! ## Optional
//! - `EXTRAMILE_DATA_DIR` - Directory for the local key-value store
//!   (default: `.extramile`)
//! - `EXTRAMILE_HTTP_TIMEOUT_SECS` - Request timeout in seconds (default: 10)
//! - `EXTRAMILE_RECONCILE_DELAY_SECS` - Delay before the one-shot background
//!   order reconciliation pass (default: 2)

use std::path::PathBuf;
use std::time::Duration;

use secrecy::SecretString;
use thiserror::Error;
use url::Url;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Storefront application configuration.
///
/// Implements `Debug` manually to redact the consumer secret.
#[derive(Clone)]
pub struct StorefrontConfig {
    /// Base URL of the commerce REST API (no trailing slash).
    pub api_url: String,
    /// REST API consumer key (acts as the Basic-auth username).
    pub consumer_key: String,
    /// REST API consumer secret (acts as the Basic-auth password).
    pub consumer_secret: SecretString,
    /// Directory for the local key-value store.
    pub data_dir: PathBuf,
    /// HTTP request timeout.
    pub http_timeout: Duration,
    /// Delay before the one-shot background reconciliation pass.
    pub reconcile_delay: Duration,
}

impl std::fmt::Debug for StorefrontConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StorefrontConfig")
            .field("api_url", &self.api_url)
            .field("consumer_key", &self.consumer_key)
            .field("consumer_secret", &"[REDACTED]")
            .field("data_dir", &self.data_dir)
            .field("http_timeout", &self.http_timeout)
            .field("reconcile_delay", &self.reconcile_delay)
            .finish()
    }
}

impl StorefrontConfig {
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

        let api_url = validate_api_url(&get_required_env("WOOCOMMERCE_API_URL")?)?;
        let consumer_key = get_required_env("WOOCOMMERCE_CONSUMER_KEY")?;
        let consumer_secret = SecretString::from(get_required_env("WOOCOMMERCE_CONSUMER_SECRET")?);
        let data_dir = PathBuf::from(get_env_or_default("EXTRAMILE_DATA_DIR", ".extramile"));
        let http_timeout = get_duration_secs("EXTRAMILE_HTTP_TIMEOUT_SECS", 10)?;
        let reconcile_delay = get_duration_secs("EXTRAMILE_RECONCILE_DELAY_SECS", 2)?;

        Ok(Self {
            api_url,
            consumer_key,
            consumer_secret,
            data_dir,
            http_timeout,
            reconcile_delay,
        })
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get a required environment variable.
fn get_required_env(key: &str) -> Result<String, ConfigError> {
    std::env::var(key).map_err(|_| ConfigError::MissingEnvVar(key.to_string()))
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Parse a duration-in-seconds variable with a default.
fn get_duration_secs(key: &str, default: u64) -> Result<Duration, ConfigError> {
    match std::env::var(key) {
        Ok(raw) => raw
            .parse::<u64>()
            .map(Duration::from_secs)
            .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string())),
        Err(_) => Ok(Duration::from_secs(default)),
    }
}

/// Validate the API base URL and normalize away a trailing slash.
fn validate_api_url(raw: &str) -> Result<String, ConfigError> {
    let url = Url::parse(raw).map_err(|e| {
        ConfigError::InvalidEnvVar("WOOCOMMERCE_API_URL".to_string(), e.to_string())
    })?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(ConfigError::InvalidEnvVar(
            "WOOCOMMERCE_API_URL".to_string(),
            format!("unsupported scheme '{}'", url.scheme()),
        ));
    }

    Ok(raw.trim_end_matches('/').to_string())
}
