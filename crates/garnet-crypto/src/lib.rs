//! # garnet-crypto: credential hashing for `Garnet`
//!
//! This crate provides the cryptographic half of Garnet's `PASSWORD` type
//! and its companion cipher functions:
//! - Constant-time comparison ([`constant_time::equals`])
//! - PBKDF2-HMAC-SHA-256 key derivation ([`kdf`])
//! - Secure salt generation ([`SaltSource`], [`OsSaltSource`])
//! - The versioned credential blob format ([`encoding`])
//! - Credential values ([`PasswordHash`], [`PasswordHasher`])
//! - Stateless block cipher transforms ([`block_cipher`])
//!
//! ## Usage
//!
//! ```
//! use garnet_crypto::{OsSaltSource, PasswordHash};
//!
//! let stored = PasswordHash::create(b"hunter2", Some(0), &OsSaltSource)?;
//! assert!(stored.verify(b"hunter2")?);
//! assert!(!stored.verify(b"hunter3")?);
//!
//! // The blob round-trips through storage without re-derivation.
//! let restored = PasswordHash::from_encoded(stored.encoded())?;
//! assert_eq!(restored.algorithm_name(), "PBKDF2-HMAC-SHA256");
//! assert_eq!(restored.to_string(), "*PASSWORD*");
//! # Ok::<(), garnet_crypto::CryptoError>(())
//! ```

pub mod block_cipher;
pub mod constant_time;
pub mod encoding;
mod error;
pub mod kdf;
mod password;
pub mod salt;

pub use block_cipher::BlockCipherKind;
pub use encoding::CredentialHeader;
pub use error::{CryptoError, Result};
pub use kdf::{AlgorithmId, DEFAULT_COST, HASH_LENGTH};
pub use password::{MASKED_PASSWORD, PasswordHash, PasswordHasher, PasswordPolicy};
pub use salt::{DEFAULT_SALT_LENGTH, OsSaltSource, SaltSource};
