//! Configuration loader with multi-source merging

use crate::{GarnetConfig, Paths};
use anyhow::{Context, Result};
use std::env;
use std::path::{Path, PathBuf};

/// Configuration loader with builder pattern
pub struct ConfigLoader {
    project_dir: PathBuf,
    env_prefix: String,
    user_config: bool,
}

impl ConfigLoader {
    /// Create a new config loader with default project directory (current dir)
    pub fn new() -> Self {
        Self {
            project_dir: env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
            env_prefix: "GARNET".to_string(),
            user_config: true,
        }
    }

    /// Set the project directory
    pub fn with_project_dir(mut self, dir: impl AsRef<Path>) -> Self {
        self.project_dir = dir.as_ref().to_path_buf();
        self
    }

    /// Set the environment variable prefix (default: "GARNET")
    pub fn with_env_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.env_prefix = prefix.into();
        self
    }

    /// Skip ~/.config/garnet/config.toml
    pub fn without_user_config(mut self) -> Self {
        self.user_config = false;
        self
    }

    /// Load configuration from all sources with proper precedence
    pub fn load(self) -> Result<GarnetConfig> {
        let mut builder = config::Config::builder();

        // 1. Start with built-in defaults
        let defaults = GarnetConfig::default();
        builder = builder.add_source(config::Config::try_from(&defaults)?);

        // 2. User config (~/.config/garnet/config.toml)
        if self.user_config
            && let Ok(user_config_file) = Paths::new().user_config_file()
        {
            builder = builder.add_source(
                config::File::from(user_config_file)
                    .required(false)
                    .format(config::FileFormat::Toml),
            );
        }

        // 3. Project config (garnet.toml)
        builder = builder.add_source(
            config::File::from(Paths::project_config_file(&self.project_dir))
                .required(false)
                .format(config::FileFormat::Toml),
        );

        // 4. Local config (garnet.local.toml, gitignored)
        builder = builder.add_source(
            config::File::from(Paths::local_config_file(&self.project_dir))
                .required(false)
                .format(config::FileFormat::Toml),
        );

        // 5. Environment variables (GARNET_PASSWORD__DEFAULT_COST=10)
        builder = builder.add_source(
            config::Environment::with_prefix(&self.env_prefix)
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let config = builder.build().context("Failed to build configuration")?;

        let garnet_config: GarnetConfig = config
            .try_deserialize()
            .context("Failed to deserialize configuration")?;

        garnet_config
            .validate()
            .context("Configuration failed validation")?;

        Ok(garnet_config)
    }

    /// Load configuration or return defaults if not found
    pub fn load_or_default(self) -> GarnetConfig {
        self.load().unwrap_or_default()
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    fn loader(dir: &Path) -> ConfigLoader {
        ConfigLoader::new()
            .with_project_dir(dir)
            .with_env_prefix("GARNET_LOADER_TEST")
            .without_user_config()
    }

    #[test]
    fn test_load_defaults() {
        let temp_dir = tempdir().expect("Failed to create temp dir");
        let config = loader(temp_dir.path()).load().expect("Failed to load config");

        assert_eq!(config, GarnetConfig::default());
        assert_eq!(config.password.default_cost, 12);
        assert!(config.password.policy().is_ok());
    }

    #[test]
    fn test_load_project_config() {
        let temp_dir = tempdir().expect("Failed to create temp dir");
        let project_dir = temp_dir.path();

        let config_content = r#"
[password]
default_cost = 8
salt_length = 24

[logging]
filter = "garnet_crypto=debug"
"#;
        fs::write(project_dir.join("garnet.toml"), config_content)
            .expect("Failed to write config");

        let config = loader(project_dir).load().expect("Failed to load config");

        assert_eq!(config.password.default_cost, 8);
        assert_eq!(config.password.salt_length, 24);
        assert_eq!(config.logging.filter, "garnet_crypto=debug");
        assert!(!config.logging.json);
    }

    #[test]
    fn test_local_overrides() {
        let temp_dir = tempdir().expect("Failed to create temp dir");
        let project_dir = temp_dir.path();

        fs::write(
            project_dir.join("garnet.toml"),
            "[password]\ndefault_cost = 8\nsalt_length = 24\n",
        )
        .expect("Failed to write project config");

        fs::write(
            project_dir.join("garnet.local.toml"),
            "[password]\ndefault_cost = 2\n",
        )
        .expect("Failed to write local config");

        let config = loader(project_dir).load().expect("Failed to load config");

        // Local config overrides the project value and keeps the rest
        assert_eq!(config.password.default_cost, 2);
        assert_eq!(config.password.salt_length, 24);
    }

    #[test]
    fn test_invalid_values_rejected() {
        let temp_dir = tempdir().expect("Failed to create temp dir");
        let project_dir = temp_dir.path();

        fs::write(project_dir.join("garnet.toml"), "[password]\nsalt_length = 4\n")
            .expect("Failed to write config");

        let err = loader(project_dir).load().expect_err("salt_length 4 is invalid");
        assert!(format!("{err:#}").contains("salt_length 4"));
        assert_eq!(loader(project_dir).load_or_default(), GarnetConfig::default());
    }

    // Environment overrides are not exercised here: setting process
    // environment variables is unsafe under edition 2024 and races with other
    // tests. With the default prefix they take the form
    //
    // GARNET_PASSWORD__DEFAULT_COST=10
    // GARNET_LOGGING__JSON=true
}
