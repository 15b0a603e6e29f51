//! Main entry point for the Garnet SDK.
//!
//! A [`Garnet`] handle owns the validated configuration and the function
//! context (hasher and salt source) that every SQL call of a session shares.

use std::path::Path;
use std::sync::Arc;

use garnet_config::{ConfigLoader, GarnetConfig};
use garnet_crypto::{OsSaltSource, PasswordHash, PasswordHasher, SaltSource};
use garnet_query::{DataType, Folded, FunctionContext, Operand, SqlFunction, Value, fold_constants};
use tracing::info;

use crate::error::{GarnetError, Result};

/// Handle to the credential functions under one configuration.
///
/// Cheap to clone; clones share the salt source and can be moved to other
/// threads.
#[derive(Debug, Clone)]
pub struct Garnet {
    config: GarnetConfig,
    functions: FunctionContext,
}

impl Garnet {
    /// Creates a handle drawing salts from the operating system.
    pub fn new(config: GarnetConfig) -> Result<Self> {
        Self::with_salt_source(config, Arc::new(OsSaltSource))
    }

    /// Creates a handle with an explicit salt source.
    pub fn with_salt_source(config: GarnetConfig, salt_source: Arc<dyn SaltSource>) -> Result<Self> {
        config.validate()?;
        let policy = config.password.policy()?;
        info!(
            default_cost = policy.default_cost(),
            salt_len = policy.salt_len(),
            "garnet initialized"
        );

        Ok(Self {
            functions: FunctionContext::new(PasswordHasher::new(policy, salt_source)),
            config,
        })
    }

    /// Loads configuration for `project_dir` from every source and opens a
    /// handle with it.
    pub fn open(project_dir: impl AsRef<Path>) -> Result<Self> {
        let config = ConfigLoader::new()
            .with_project_dir(project_dir)
            .load()
            .map_err(GarnetError::Load)?;
        Self::new(config)
    }

    /// Handle with [`GarnetConfig::development`] settings.
    pub fn development() -> Result<Self> {
        Self::new(GarnetConfig::development())
    }

    pub fn config(&self) -> &GarnetConfig {
        &self.config
    }

    pub fn functions(&self) -> &FunctionContext {
        &self.functions
    }

    /// Evaluates a SQL function by name.
    pub fn call(&self, name: &str, args: &[Value]) -> Result<Value> {
        Ok(self.functions.call(name, args)?)
    }

    /// Type-checks a call without evaluating it.
    pub fn result_type(&self, name: &str, arg_types: &[Option<DataType>]) -> Result<DataType> {
        Ok(SqlFunction::from_name(name)?.check_types(arg_types)?)
    }

    /// Folds a call whose operands may be literals.
    pub fn fold(&self, name: &str, operands: &[Operand]) -> Result<Folded> {
        let function = SqlFunction::from_name(name)?;
        Ok(fold_constants(function, operands, &self.functions)?)
    }

    /// Hashes a plaintext with the configured policy.
    pub fn hash_password(&self, plaintext: &str, cost: Option<i64>) -> Result<PasswordHash> {
        Ok(self.functions.hasher().hash(plaintext.as_bytes(), cost)?)
    }

    /// Checks `plaintext` against a stored blob.
    pub fn verify_password(&self, plaintext: &str, encoded: &[u8]) -> Result<bool> {
        let credential = PasswordHash::from_encoded(encoded)?;
        Ok(credential.verify(plaintext.as_bytes())?)
    }
}
