//! Server configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Optional
//! - `HALCYON_DATABASE_URL` (or generic `DATABASE_URL`) - `PostgreSQL`
//!   connection string. When absent, or when the database is unreachable
//!   within the connect timeout, the server runs in degraded mode on the
//!   in-process store.
//! - `HALCYON_HOST` - Bind address (default: 127.0.0.1)
//! - `HALCYON_PORT` - Listen port (default: 4000)
//! - `HALCYON_DB_CONNECT_TIMEOUT_SECS` - Startup connection attempt
//!   timeout (default: 5)
//! - `SENTRY_DSN` - Sentry error tracking DSN

use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

use secrecy::SecretString;
use thiserror::Error;

const DEFAULT_PORT: &str = "4000";
const DEFAULT_CONNECT_TIMEOUT_SECS: &str = "5";

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Halcyon server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Database configuration (optional - absence selects degraded mode)
    pub database: DatabaseConfig,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
}

/// Database connection settings.
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    /// `PostgreSQL` connection URL (contains password). `None` means the
    /// server was deliberately started without a database.
    pub url: Option<SecretString>,
    /// How long the single startup connection attempt may take before the
    /// server falls back to the in-process store.
    pub connect_timeout: Duration,
}

impl ServerConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a provided variable fails to parse. A
    /// missing database URL is not an error - it selects degraded mode.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let host = get_env_or_default("HALCYON_HOST", "127.0.0.1")
            .parse::<IpAddr>()
            .map_err(|e| ConfigError::InvalidEnvVar("HALCYON_HOST".to_string(), e.to_string()))?;
        let port = get_env_or_default("HALCYON_PORT", DEFAULT_PORT)
            .parse::<u16>()
            .map_err(|e| ConfigError::InvalidEnvVar("HALCYON_PORT".to_string(), e.to_string()))?;

        let database = DatabaseConfig::from_env()?;
        let sentry_dsn = get_optional_env("SENTRY_DSN");

        Ok(Self {
            host,
            port,
            database,
            sentry_dsn,
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

impl DatabaseConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let url = get_database_url();
        let connect_timeout = get_env_or_default(
            "HALCYON_DB_CONNECT_TIMEOUT_SECS",
            DEFAULT_CONNECT_TIMEOUT_SECS,
        )
        .parse::<u64>()
        .map(Duration::from_secs)
        .map_err(|e| {
            ConfigError::InvalidEnvVar("HALCYON_DB_CONNECT_TIMEOUT_SECS".to_string(), e.to_string())
        })?;

        Ok(Self {
            url,
            connect_timeout,
        })
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get database URL with fallback to generic `DATABASE_URL` (used by
/// managed-postgres attach). Absence is not an error here.
fn get_database_url() -> Option<SecretString> {
    if let Ok(value) = std::env::var("HALCYON_DATABASE_URL") {
        return Some(SecretString::from(value));
    }
    if let Ok(value) = std::env::var("DATABASE_URL") {
        return Some(SecretString::from(value));
    }
    None
}

/// Get an optional environment variable.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok()
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_socket_addr() {
        let config = ServerConfig {
            host: "127.0.0.1".parse().unwrap(),
            port: 4000,
            database: DatabaseConfig {
                url: None,
                connect_timeout: Duration::from_secs(5),
            },
            sentry_dsn: None,
        };

        let addr = config.socket_addr();
        assert_eq!(addr.ip().to_string(), "127.0.0.1");
        assert_eq!(addr.port(), 4000);
    }

    #[test]
    fn test_missing_database_url_is_not_an_error() {
        let config = DatabaseConfig {
            url: None,
            connect_timeout: Duration::from_secs(5),
        };
        assert!(config.url.is_none());
    }
}
