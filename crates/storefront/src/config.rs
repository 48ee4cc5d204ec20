//! Storefront configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required when `LUCID_STORAGE=postgres`
//! - `LUCID_DATABASE_URL` - `PostgreSQL` connection string (falls back to `DATABASE_URL`)
//!
//! ## Optional
//! - `LUCID_HOST` - Bind address (default: 0.0.0.0)
//! - `LUCID_PORT` - Preferred listen port (default: 5003)
//! - `LUCID_PORT_ATTEMPTS` - Consecutive ports to try when the preferred one is taken (default: 10)
//! - `LUCID_STORAGE` - `memory` or `postgres` (default: memory)
//! - `LUCID_CORS_ORIGINS` - Comma-separated allowed origins (default: local dev servers)
//! - `LUCID_SECURE_COOKIES` - Set `Secure` on the session cookie (default: false)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name
//! - `SENTRY_SAMPLE_RATE` - Error event sample rate, 0.0-1.0 (default: 1.0)
//! - `SENTRY_TRACES_SAMPLE_RATE` - Transaction sample rate, 0.0-1.0 (default: 0.0)

use std::net::{IpAddr, Ipv4Addr};
use std::str::FromStr;

use secrecy::SecretString;
use thiserror::Error;

/// Origins of the local dev servers for the web client.
const DEFAULT_CORS_ORIGINS: &[&str] = &[
    "http://localhost:5173",
    "http://localhost:3000",
    "http://localhost:5174",
    "http://localhost:5175",
];

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Which storage implementation backs the stores.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StorageBackend {
    /// Process-local maps, lost on restart.
    #[default]
    Memory,
    /// `PostgreSQL` tables.
    Postgres,
}

impl FromStr for StorageBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "memory" | "mem" => Ok(Self::Memory),
            "postgres" | "postgresql" | "pg" => Ok(Self::Postgres),
            other => Err(format!("expected `memory` or `postgres`, got `{other}`")),
        }
    }
}

/// Storefront application configuration.
#[derive(Debug, Clone)]
pub struct StorefrontConfig {
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Preferred port
    pub port: u16,
    /// How many consecutive ports to try, starting at `port`
    pub port_attempts: u16,
    /// Storage implementation
    pub storage: StorageBackend,
    /// `PostgreSQL` database connection URL (contains password)
    pub database_url: Option<SecretString>,
    /// Origins allowed to make credentialed cross-origin requests
    pub cors_origins: Vec<String>,
    /// Mark the session cookie `Secure`
    pub secure_cookies: bool,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment (e.g. production, staging)
    pub sentry_environment: Option<String>,
    /// Sentry error sample rate
    pub sentry_sample_rate: f32,
    /// Sentry traces sample rate
    pub sentry_traces_sample_rate: f32,
}

impl Default for StorefrontConfig {
    fn default() -> Self {
        Self {
            host: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            port: 5003,
            port_attempts: 10,
            storage: StorageBackend::Memory,
            database_url: None,
            cors_origins: DEFAULT_CORS_ORIGINS.iter().map(|&o| o.to_owned()).collect(),
            secure_cookies: false,
            sentry_dsn: None,
            sentry_environment: None,
            sentry_sample_rate: 1.0,
            sentry_traces_sample_rate: 0.0,
        }
    }
}

impl StorefrontConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is malformed, or if postgres
    /// storage is selected without a database URL.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    ///
    /// # Errors
    ///
    /// Same as [`StorefrontConfig::from_env`].
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let defaults = Self::default();
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let host = parse_or(&get, "LUCID_HOST", defaults.host)?;
        let port = parse_or(&get, "LUCID_PORT", defaults.port)?;
        let port_attempts = parse_or(&get, "LUCID_PORT_ATTEMPTS", defaults.port_attempts)?;
        if port_attempts == 0 {
            return Err(ConfigError::InvalidEnvVar(
                "LUCID_PORT_ATTEMPTS".to_string(),
                "must be at least 1".to_string(),
            ));
        }

        let storage = parse_or(&get, "LUCID_STORAGE", defaults.storage)?;
        let database_url = get("LUCID_DATABASE_URL")
            .or_else(|| get("DATABASE_URL"))
            .map(SecretString::from);
        if storage == StorageBackend::Postgres && database_url.is_none() {
            return Err(ConfigError::MissingEnvVar("LUCID_DATABASE_URL".to_string()));
        }

        let cors_origins = get("LUCID_CORS_ORIGINS").map_or(defaults.cors_origins, |raw| {
            raw.split(',')
                .map(str::trim)
                .filter(|o| !o.is_empty())
                .map(String::from)
                .collect()
        });

        let secure_cookies = get("LUCID_SECURE_COOKIES")
            .map(|v| parse_bool("LUCID_SECURE_COOKIES", &v))
            .transpose()?
            .unwrap_or(defaults.secure_cookies);

        let sentry_sample_rate = parse_rate(&get, "SENTRY_SAMPLE_RATE", defaults.sentry_sample_rate)?;
        let sentry_traces_sample_rate = parse_rate(
            &get,
            "SENTRY_TRACES_SAMPLE_RATE",
            defaults.sentry_traces_sample_rate,
        )?;

        Ok(Self {
            host,
            port,
            port_attempts,
            storage,
            database_url,
            cors_origins,
            secure_cookies,
            sentry_dsn: get("SENTRY_DSN"),
            sentry_environment: get("SENTRY_ENVIRONMENT"),
            sentry_sample_rate,
            sentry_traces_sample_rate,
        })
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Parse a variable if set, else use the default.
fn parse_or<T>(
    get: &impl Fn(&str) -> Option<String>,
    key: &str,
    default: T,
) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    get(key).map_or(Ok(default), |raw| {
        raw.trim()
            .parse::<T>()
            .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
    })
}

fn parse_bool(key: &str, raw: &str) -> Result<bool, ConfigError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => Err(ConfigError::InvalidEnvVar(
            key.to_string(),
            format!("expected a boolean, got `{other}`"),
        )),
    }
}

/// Parse a sample rate and check it lies in 0.0-1.0.
fn parse_rate(
    get: &impl Fn(&str) -> Option<String>,
    key: &str,
    default: f32,
) -> Result<f32, ConfigError> {
    let rate = parse_or(get, key, default)?;
    if (0.0..=1.0).contains(&rate) {
        Ok(rate)
    } else {
        Err(ConfigError::InvalidEnvVar(
            key.to_string(),
            format!("must be between 0.0 and 1.0 (got {rate})"),
        ))
    }
}
