//! Admin configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required (when `SETTINGS_STORE=postgres`, the default)
//! - `ADMIN_DATABASE_URL` - `PostgreSQL` connection string (falls back to `DATABASE_URL`)
//!
//! ## Optional
//! - `SETTINGS_STORE` - `postgres` or `memory` (default: postgres)
//! - `SETTINGS_KEY` - Store key of the site settings record (default: `site_settings`)
//! - `SETTINGS_CACHE_TTL_SECS` - Settings cache lifetime in seconds (default: 300)
//! - `ADMIN_HOST` - Bind address (default: 127.0.0.1)
//! - `ADMIN_PORT` - Listen port (default: 3001)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name
//! - `SENTRY_SAMPLE_RATE` - Error sample rate (default: 1.0)
//! - `SENTRY_TRACES_SAMPLE_RATE` - Traces sample rate (default: 1.0)

use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

use secrecy::SecretString;
use thiserror::Error;

use crate::settings::DEFAULT_SETTINGS_KEY;

const DEFAULT_CACHE_TTL_SECS: u64 = 300;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Where the settings record is persisted.
#[derive(Debug, Clone)]
pub enum StoreConfig {
    /// `admin.settings` table in `PostgreSQL`.
    Postgres {
        /// Connection URL (contains password)
        database_url: SecretString,
    },
    /// Process memory; settings are lost on restart.
    Memory,
}

/// Admin application configuration.
#[derive(Debug, Clone)]
pub struct AdminConfig {
    /// Settings persistence backend
    pub store: StoreConfig,
    /// Store key of the site settings record
    pub settings_key: String,
    /// Lifetime of cached settings
    pub cache_ttl: Duration,
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment (e.g., "development", "staging", "production")
    pub sentry_environment: Option<String>,
    /// Sentry error sample rate (0.0 to 1.0)
    pub sentry_sample_rate: f32,
    /// Sentry traces sample rate for performance monitoring (0.0 to 1.0)
    pub sentry_traces_sample_rate: f32,
}

impl AdminConfig {
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

        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary variable source.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or invalid.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let env = Env(&lookup);

        let store = match env.or_default("SETTINGS_STORE", "postgres").as_str() {
            "postgres" => StoreConfig::Postgres {
                database_url: env.database_url("ADMIN_DATABASE_URL")?,
            },
            "memory" => StoreConfig::Memory,
            other => {
                return Err(ConfigError::InvalidEnvVar(
                    "SETTINGS_STORE".to_string(),
                    format!("expected 'postgres' or 'memory', got '{other}'"),
                ));
            }
        };

        let settings_key = env.or_default("SETTINGS_KEY", DEFAULT_SETTINGS_KEY);
        if settings_key.trim().is_empty() {
            return Err(ConfigError::InvalidEnvVar(
                "SETTINGS_KEY".to_string(),
                "must not be empty".to_string(),
            ));
        }

        let cache_ttl = env
            .or_default("SETTINGS_CACHE_TTL_SECS", &DEFAULT_CACHE_TTL_SECS.to_string())
            .parse::<u64>()
            .map(Duration::from_secs)
            .map_err(|e| {
                ConfigError::InvalidEnvVar("SETTINGS_CACHE_TTL_SECS".to_string(), e.to_string())
            })?;
        let host = env
            .or_default("ADMIN_HOST", "127.0.0.1")
            .parse::<IpAddr>()
            .map_err(|e| ConfigError::InvalidEnvVar("ADMIN_HOST".to_string(), e.to_string()))?;
        let port = env
            .or_default("ADMIN_PORT", "3001")
            .parse::<u16>()
            .map_err(|e| ConfigError::InvalidEnvVar("ADMIN_PORT".to_string(), e.to_string()))?;

        let sentry_dsn = env.optional("SENTRY_DSN");
        let sentry_environment = env.optional("SENTRY_ENVIRONMENT");
        let sentry_sample_rate = env
            .optional("SENTRY_SAMPLE_RATE")
            .and_then(|s| s.parse().ok())
            .unwrap_or(1.0);
        let sentry_traces_sample_rate = env
            .optional("SENTRY_TRACES_SAMPLE_RATE")
            .and_then(|s| s.parse().ok())
            .unwrap_or(1.0);

        Ok(Self {
            store,
            settings_key,
            cache_ttl,
            host,
            port,
            sentry_dsn,
            sentry_environment,
            sentry_sample_rate,
            sentry_traces_sample_rate,
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Variable source used while building the configuration.
struct Env<'a, F: Fn(&str) -> Option<String>>(&'a F);

impl<F: Fn(&str) -> Option<String>> Env<'_, F> {
    /// Get an optional variable.
    fn optional(&self, key: &str) -> Option<String> {
        (self.0)(key)
    }

    /// Get a variable with a default value.
    fn or_default(&self, key: &str, default: &str) -> String {
        self.optional(key).unwrap_or_else(|| default.to_string())
    }

    /// Get database URL with fallback to generic `DATABASE_URL` (used by Fly.io postgres attach).
    fn database_url(&self, primary_key: &str) -> Result<SecretString, ConfigError> {
        self.optional(primary_key)
            .or_else(|| self.optional("DATABASE_URL"))
            .map(SecretString::from)
            .ok_or_else(|| ConfigError::MissingEnvVar(primary_key.to_string()))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::HashMap;

    use secrecy::ExposeSecret;

    use super::*;

    fn config(vars: &[(&str, &str)]) -> Result<AdminConfig, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        AdminConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = config(&[("ADMIN_DATABASE_URL", "postgres://localhost/admin")]).unwrap();
        assert!(matches!(config.store, StoreConfig::Postgres { .. }));
        assert_eq!(config.settings_key, "site_settings");
        assert_eq!(config.cache_ttl, Duration::from_secs(300));
        assert_eq!(config.socket_addr().to_string(), "127.0.0.1:3001");
        assert!(config.sentry_dsn.is_none());
        assert!((config.sentry_sample_rate - 1.0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_missing_database_url() {
        let err = config(&[]).unwrap_err();
        assert!(matches!(err, ConfigError::MissingEnvVar(ref key) if key == "ADMIN_DATABASE_URL"));
    }

    #[test]
    fn test_database_url_fallback() {
        let config = config(&[("DATABASE_URL", "postgres://fly/admin")]).unwrap();
        let StoreConfig::Postgres { database_url } = config.store else {
            panic!("expected postgres store");
        };
        assert_eq!(database_url.expose_secret(), "postgres://fly/admin");
    }

    #[test]
    fn test_memory_store_needs_no_database() {
        let config = config(&[
            ("SETTINGS_STORE", "memory"),
            ("SETTINGS_KEY", "staging_settings"),
            ("SETTINGS_CACHE_TTL_SECS", "5"),
            ("ADMIN_PORT", "8080"),
        ])
        .unwrap();
        assert!(matches!(config.store, StoreConfig::Memory));
        assert_eq!(config.settings_key, "staging_settings");
        assert_eq!(config.cache_ttl, Duration::from_secs(5));
        assert_eq!(config.port, 8080);
    }

    #[test]
    fn test_invalid_values() {
        assert!(matches!(
            config(&[("SETTINGS_STORE", "redis")]),
            Err(ConfigError::InvalidEnvVar(..))
        ));
        assert!(matches!(
            config(&[("SETTINGS_STORE", "memory"), ("ADMIN_PORT", "http")]),
            Err(ConfigError::InvalidEnvVar(..))
        ));
        assert!(matches!(
            config(&[("SETTINGS_STORE", "memory"), ("SETTINGS_CACHE_TTL_SECS", "-1")]),
            Err(ConfigError::InvalidEnvVar(..))
        ));
        assert!(matches!(
            config(&[("SETTINGS_STORE", "memory"), ("SETTINGS_KEY", " ")]),
            Err(ConfigError::InvalidEnvVar(..))
        ));
    }

    #[test]
    fn test_debug_redacts_database_url() {
        let config = config(&[("ADMIN_DATABASE_URL", "postgres://user:hunter2@db/admin")]).unwrap();
        assert!(!format!("{config:?}").contains("hunter2"));
    }
}
