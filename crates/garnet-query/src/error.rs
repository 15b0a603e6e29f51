//! Error types for value conversion and function evaluation.

use garnet_crypto::CryptoError;
use thiserror::Error;

use crate::schema::DataType;

/// Errors that can occur while converting values or evaluating functions.
///
/// Messages describe the offending argument by type and position. Credential
/// blobs, keys and plaintexts are never rendered into an error.
#[derive(Debug, Error)]
pub enum QueryError {
    /// A value of the wrong kind was passed where another was required.
    #[error("type mismatch: expected {expected}, got {actual}")]
    TypeMismatch { expected: String, actual: String },

    /// No conversion is defined between the two types.
    #[error("cannot convert {from} to {to}")]
    UnsupportedConversion { from: DataType, to: DataType },

    /// The function name did not resolve.
    #[error("unknown function: {0}")]
    UnknownFunction(String),

    /// The function was called with the wrong number of arguments.
    #[error("{function} expects {expected} arguments, got {actual}")]
    ArgumentCount {
        function: &'static str,
        expected: String,
        actual: usize,
    },

    /// The value is well-typed but unusable in this position.
    #[error("invalid value: {0}")]
    InvalidValue(String),

    /// Credential decoding, derivation or cipher failure.
    #[error(transparent)]
    Crypto(#[from] CryptoError),
}

impl QueryError {
    /// Builds a `TypeMismatch` for argument `position` (1-based) of `function`.
    pub(crate) fn argument_type(
        function: &str,
        position: usize,
        expected: DataType,
        actual: Option<DataType>,
    ) -> Self {
        QueryError::TypeMismatch {
            expected: format!("{expected} for argument {position} of {function}"),
            actual: actual.map_or_else(|| "NULL".to_string(), |t| t.to_string()),
        }
    }
}

/// Result type for query operations.
pub type Result<T> = std::result::Result<T, QueryError>;
