//! Configuration management for the flowperm server.
//!
//! Configuration is layered from three sources:
//! 1. Default values (hardcoded)
//! 2. Configuration file (YAML)
//! 3. Environment variables (override)
//!
//! Environment variables take precedence over config file values,
//! which take precedence over defaults.
//!
//! # Example
//!
//! ```ignore
//! use flowperm_server::config::ServerConfig;
//!
//! // Load from file with env overrides
//! let config = ServerConfig::load("flowperm.yaml")?;
//!
//! // Or load from environment only
//! let config = ServerConfig::from_env()?;
//! ```

use config::{Config, ConfigError, Environment, File, FileFormat};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Prefix of environment variable overrides.
pub const ENV_PREFIX: &str = "FLOWPERM";

/// Server configuration.
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
pub struct ServerConfig {
    /// Logging settings
    #[serde(default)]
    pub logging: LoggingSettings,

    /// Storage settings
    #[serde(default)]
    pub storage: StorageSettings,

    /// Batch list evaluation settings
    #[serde(default)]
    pub batch: BatchSettings,

    /// Caller-level bypass toggles
    #[serde(default)]
    pub bypass: BypassSettings,
}

/// Logging settings.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct LoggingSettings {
    /// Log level: "trace", "debug", "info", "warn", "error"
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Use JSON format (true for production, false for development)
    #[serde(default)]
    pub json: bool,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Storage backend settings.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct StorageSettings {
    /// Storage backend type. Only "memory" is available.
    #[serde(default = "default_storage_backend")]
    pub backend: String,
}

impl Default for StorageSettings {
    fn default() -> Self {
        Self {
            backend: default_storage_backend(),
        }
    }
}

fn default_storage_backend() -> String {
    "memory".to_string()
}

/// Batch list evaluation settings.
///
/// Environment variable: `FLOWPERM_BATCH__MAX_ITEMS`
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct BatchSettings {
    /// Maximum number of entities evaluated by one list request.
    #[serde(default = "default_max_items")]
    pub max_items: usize,
}

impl Default for BatchSettings {
    fn default() -> Self {
        Self {
            max_items: default_max_items(),
        }
    }
}

fn default_max_items() -> usize {
    1000
}

/// Caller-level bypass toggles.
///
/// # Example YAML Configuration
///
/// ```yaml
/// bypass:
///   admin_privileges: true
///   portal_access: false
/// ```
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct BypassSettings {
    /// System and tenant administrators skip entity checks.
    ///
    /// Environment variable: `FLOWPERM_BYPASS__ADMIN_PRIVILEGES`
    #[serde(default = "default_true")]
    pub admin_privileges: bool,

    /// Portal tokens on portal-accessible endpoints skip module checks.
    ///
    /// Environment variable: `FLOWPERM_BYPASS__PORTAL_ACCESS`
    #[serde(default = "default_true")]
    pub portal_access: bool,
}

impl Default for BypassSettings {
    fn default() -> Self {
        Self {
            admin_privileges: true,
            portal_access: true,
        }
    }
}

fn default_true() -> bool {
    true
}

/// Error type for configuration loading.
#[derive(Debug, thiserror::Error)]
pub enum ConfigLoadError {
    #[error("failed to load configuration: {0}")]
    Load(#[from] ConfigError),

    #[error("configuration file not found: {path}")]
    FileNotFound { path: String },

    #[error("invalid configuration: {message}")]
    Invalid { message: String },
}

impl ServerConfig {
    /// Load configuration from a YAML file with environment variable overrides.
    ///
    /// Environment variables are prefixed with `FLOWPERM_` and use `__` as
    /// separator, e.g. `FLOWPERM_BATCH__MAX_ITEMS=200` overrides
    /// `batch.max_items`.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigLoadError> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(ConfigLoadError::FileNotFound {
                path: path.display().to_string(),
            });
        }

        let config = Config::builder()
            .add_source(Config::try_from(&ServerConfig::default())?)
            .add_source(File::from(path).format(FileFormat::Yaml))
            .add_source(env_source())
            .build()?;

        let server_config: ServerConfig = config.try_deserialize()?;
        server_config.validate()?;

        Ok(server_config)
    }

    /// Load configuration from environment variables only.
    pub fn from_env() -> Result<Self, ConfigLoadError> {
        let config = Config::builder()
            .add_source(Config::try_from(&ServerConfig::default())?)
            .add_source(env_source())
            .build()?;

        let server_config: ServerConfig = config.try_deserialize()?;
        server_config.validate()?;

        Ok(server_config)
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigLoadError> {
        let valid_backends = ["memory"];
        if !valid_backends.contains(&self.storage.backend.as_str()) {
            return Err(ConfigLoadError::Invalid {
                message: format!(
                    "storage.backend must be one of: {:?}, got: {}",
                    valid_backends, self.storage.backend
                ),
            });
        }

        if self.batch.max_items == 0 {
            return Err(ConfigLoadError::Invalid {
                message: "batch.max_items must be greater than 0".to_string(),
            });
        }

        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.logging.level.to_lowercase().as_str()) {
            return Err(ConfigLoadError::Invalid {
                message: format!(
                    "logging.level must be one of: {:?}, got: {}",
                    valid_levels, self.logging.level
                ),
            });
        }

        Ok(())
    }
}

// FLOWPERM_BATCH__MAX_ITEMS -> batch.max_items
fn env_source() -> Environment {
    Environment::with_prefix(ENV_PREFIX)
        .prefix_separator("_")
        .separator("__")
        .try_parsing(true)
}
