//! Error types for the Garnet facade.

use garnet_config::ConfigError;
use garnet_crypto::CryptoError;
use garnet_query::QueryError;
use thiserror::Error;

/// Errors surfaced by [`crate::Garnet`].
#[derive(Debug, Error)]
pub enum GarnetError {
    /// Settings failed validation.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Configuration sources could not be read or merged.
    #[error("failed to load configuration: {0:#}")]
    Load(anyhow::Error),

    /// Function evaluation or value conversion failed.
    #[error(transparent)]
    Query(#[from] QueryError),

    /// A credential operation failed outside of function evaluation.
    #[error(transparent)]
    Crypto(#[from] CryptoError),

    /// The tracing subscriber could not be installed.
    #[error("failed to initialize logging: {0}")]
    Logging(String),
}

/// Result type for Garnet operations.
pub type Result<T> = std::result::Result<T, GarnetError>;
