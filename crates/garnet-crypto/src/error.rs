//! Error types for credential and cipher operations.
//!
//! Messages name the offending field or role only. Salt, derived hash, key
//! and plaintext bytes never appear in an error.

use thiserror::Error;

/// Errors produced by `garnet-crypto`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CryptoError {
    /// A stored credential blob failed structural validation.
    #[error("malformed credential: {reason}")]
    MalformedCredential { reason: String },

    /// A requested salt length is outside the supported range.
    #[error("salt length {0} is outside the supported range [8, 64]")]
    InvalidSaltLength(usize),

    /// The block cipher name did not resolve to a known cipher.
    #[error("unknown block cipher: {0}")]
    UnknownCipher(String),

    /// The supplied key is longer than the cipher accepts.
    #[error("{cipher} key is {actual} bytes, maximum is {max}")]
    KeyTooLong {
        cipher: &'static str,
        max: usize,
        actual: usize,
    },

    /// The underlying cryptographic primitive failed or is unavailable.
    ///
    /// Never retried: it signals an environment defect, not a transient fault.
    #[error("cryptographic provider error: {0}")]
    Provider(String),
}

impl CryptoError {
    pub(crate) fn malformed(reason: impl Into<String>) -> Self {
        CryptoError::MalformedCredential {
            reason: reason.into(),
        }
    }
}

/// Result type alias for crypto operations.
pub type Result<T> = std::result::Result<T, CryptoError>;
