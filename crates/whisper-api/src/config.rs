//! Configuration types for the HTTP service.
//!
//! Grounded in the donor crate's `ServiceConfig`/`ServerConfig`/`LoggingConfig`
//! split (`config.rs`): the same `config` crate layering, the same
//! redacted-by-construction handling of a credential-shaped field, the same
//! `validate()` entry point called once at startup.

use crate::errors::ConfigError;
use serde::{Deserialize, Serialize};

/// Top-level service configuration, loaded via the `config` crate from a
/// TOML file layered under environment variable overrides (`WHISPER_*`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceConfig {
    pub server: ServerConfig,
    pub vault: VaultBackendConfig,
    pub secrets: SecretDefaults,
    pub logging: LoggingConfig,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            vault: VaultBackendConfig::InMemory,
            secrets: SecretDefaults::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl ServiceConfig {
    /// Load configuration from an optional TOML file layered under
    /// `WHISPER_`-prefixed environment variable overrides (`__` as the
    /// nesting separator, e.g. `WHISPER_SERVER__PORT=9000`).
    ///
    /// Starts from [`ServiceConfig::default`] serialized as the base layer so
    /// a config file or the environment need only override what differs.
    pub fn load(path: Option<&str>) -> Result<Self, ConfigError> {
        let defaults = config::Config::try_from(&Self::default())?;
        let mut builder = config::Config::builder().add_source(defaults);
        if let Some(path) = path {
            builder = builder.add_source(config::File::with_name(path).required(false));
        }
        let settings = builder
            .add_source(config::Environment::with_prefix("WHISPER").separator("__"))
            .build()?;
        let config: Self = settings.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the service configuration for internal consistency.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use whisper_api::config::ServiceConfig;
    ///
    /// let config = ServiceConfig::default();
    /// assert!(config.validate().is_ok());
    /// ```
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.secrets.default_lifetime_seconds == 0 {
            return Err(ConfigError::Invalid {
                message: "secrets.default_lifetime_seconds must be greater than zero".to_string(),
            });
        }
        if self.secrets.max_lifetime_seconds < self.secrets.default_lifetime_seconds {
            return Err(ConfigError::Invalid {
                message: "secrets.max_lifetime_seconds must be >= default_lifetime_seconds"
                    .to_string(),
            });
        }
        if let VaultBackendConfig::Azure { vault_url } = &self.vault {
            if vault_url.is_empty() {
                return Err(ConfigError::Missing {
                    key: "vault.vault_url".to_string(),
                });
            }
        }
        Ok(())
    }
}

/// Which [`whisper_core::VaultClient`] implementation to construct.
///
/// The `Azure` variant carries only the vault URL: credentials are never
/// embedded in configuration, the production adapter always authenticates
/// via `DefaultAzureCredential` (managed identity, Azure CLI, or environment
/// variables depending on where the process runs).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "backend")]
pub enum VaultBackendConfig {
    InMemory,
    Azure { vault_url: String },
}

/// Service-wide defaults applied when a create request omits the
/// corresponding optional field (§4.5).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecretDefaults {
    /// Applied when a create request omits `lifetime`. 7 days, per §4.5.
    pub default_lifetime_seconds: u64,

    /// Upper bound a requested `lifetime` may not exceed; rejected with the
    /// same `TimeToLive` gate as a too-short lifetime.
    pub max_lifetime_seconds: u64,

    /// Applied when a create request omits `accesses`. `1`, per §3.
    pub default_accesses: i64,
}

impl Default for SecretDefaults {
    fn default() -> Self {
        Self {
            default_lifetime_seconds: 7 * 24 * 3600,
            max_lifetime_seconds: 30 * 24 * 3600,
            default_accesses: 1,
        }
    }
}

/// HTTP server configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub request_timeout_seconds: u64,
    pub shutdown_timeout_seconds: u64,
    pub max_body_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            request_timeout_seconds: 30,
            shutdown_timeout_seconds: 35,
            max_body_bytes: 128 * 1024,
        }
    }
}

/// Logging configuration consumed by the binary at startup to build the
/// `tracing-subscriber` filter.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
    pub json_format: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json_format: false,
        }
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
