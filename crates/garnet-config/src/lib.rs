//! Configuration management for Garnet
//!
//! Provides hierarchical configuration loading from multiple sources:
//! 1. Environment variables (GARNET_* prefix, `__` between section and key)
//! 2. garnet.local.toml (gitignored, local overrides)
//! 3. garnet.toml (git-tracked, project config)
//! 4. ~/.config/garnet/config.toml (user defaults)
//! 5. Built-in defaults (lowest precedence)

use anyhow::Result;
use garnet_crypto::kdf::MIN_COST;
use garnet_crypto::salt::SALT_LENGTH_RANGE;
use garnet_crypto::{DEFAULT_COST, DEFAULT_SALT_LENGTH, PasswordPolicy};
use serde::{Deserialize, Serialize};
use std::path::Path;

mod error;
mod loader;
mod paths;

pub use error::ConfigError;
pub use loader::ConfigLoader;
pub use paths::Paths;

/// Main Garnet configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GarnetConfig {
    pub password: PasswordConfig,
    pub logging: LoggingConfig,
}

/// Defaults for `TO_PASSWORD`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PasswordConfig {
    /// Cost used when `TO_PASSWORD` is called without one.
    pub default_cost: i64,
    /// Salt length in bytes for new credentials.
    pub salt_length: usize,
}

impl Default for PasswordConfig {
    fn default() -> Self {
        Self {
            default_cost: DEFAULT_COST,
            salt_length: DEFAULT_SALT_LENGTH,
        }
    }
}

impl PasswordConfig {
    /// Builds the hashing policy these settings describe.
    pub fn policy(&self) -> Result<PasswordPolicy, ConfigError> {
        PasswordPolicy::new(self.default_cost, self.salt_length)
            .map_err(|e| ConfigError::ValidationError(format!("password: {e}")))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// `tracing` filter directive, e.g. `info` or `garnet_crypto=debug`.
    pub filter: String,
    /// Emit JSON lines instead of human-readable output.
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "info".to_string(),
            json: false,
        }
    }
}

impl GarnetConfig {
    /// Load configuration from default locations
    pub fn load() -> Result<Self> {
        ConfigLoader::new().load()
    }

    /// Load configuration from specific project directory
    pub fn load_from_dir(project_dir: impl AsRef<Path>) -> Result<Self> {
        ConfigLoader::new().with_project_dir(project_dir).load()
    }

    /// Read a single TOML file, without merging any other source.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::ReadError {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Self = toml::from_str(&content).map_err(|source| ConfigError::ParseError {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Render as TOML, e.g. to seed a `garnet.toml`.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Create a development configuration
    ///
    /// Minimum cost so that hashing in tests and local runs is quick.
    pub fn development() -> Self {
        Self {
            password: PasswordConfig {
                default_cost: i64::from(MIN_COST),
                ..Default::default()
            },
            logging: LoggingConfig {
                filter: "debug".to_string(),
                json: false,
            },
        }
    }

    /// Create a production configuration
    pub fn production() -> Self {
        Self {
            password: PasswordConfig {
                salt_length: 32,
                ..Default::default()
            },
            logging: LoggingConfig {
                json: true,
                ..Default::default()
            },
        }
    }

    /// Checks the settings that cannot be fixed up silently.
    ///
    /// Costs above the supported maximum are clamped at hashing time, so only
    /// negative costs are rejected here.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let cost = self.password.default_cost;
        if cost < i64::from(MIN_COST) {
            return Err(ConfigError::ValidationError(format!(
                "password.default_cost {cost} must not be negative"
            )));
        }

        let salt = self.password.salt_length;
        if !SALT_LENGTH_RANGE.contains(&salt) {
            return Err(ConfigError::ValidationError(format!(
                "password.salt_length {salt} is outside [{}, {}]",
                SALT_LENGTH_RANGE.start(),
                SALT_LENGTH_RANGE.end()
            )));
        }

        if self.logging.filter.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "logging.filter must not be empty".to_string(),
            ));
        }

        Ok(())
    }
}
