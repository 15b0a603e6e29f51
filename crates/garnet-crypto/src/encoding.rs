//! Versioned binary encoding for credential hashes.
//!
//! ## Layout
//!
//! ```text
//! ┌─────────┬───────────┬──────┬──────────┬────────────┬──────────────┐
//! │ version │ algorithm │ cost │ salt len │ salt       │ derived hash │
//! │ 1 byte  │ 1 byte    │ 1 B  │ 1 byte   │ N bytes    │ 32 bytes     │
//! └─────────┴───────────┴──────┴──────────┴────────────┴──────────────┘
//! ```
//!
//! Byte oriented, no alignment padding. The total length is always
//! `4 + N + 32` with `N` in `[8, 64]`. The cost byte is stored raw and
//! interpreted through [`crate::kdf::iterations`].

use crate::error::{CryptoError, Result};
use crate::kdf::{AlgorithmId, HASH_LENGTH};
use crate::salt::{SALT_LENGTH_RANGE, check_salt_length};

/// The only supported format version.
pub const VERSION: u8 = 1;

/// Length of the fixed header in bytes.
pub const HEADER_LENGTH: usize = 4;

/// Decoded credential header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CredentialHeader {
    pub version: u8,
    pub algorithm: AlgorithmId,
    pub cost: u8,
    pub salt_len: usize,
}

impl CredentialHeader {
    /// Total encoded length implied by this header.
    pub fn encoded_len(&self) -> usize {
        HEADER_LENGTH + self.salt_len + HASH_LENGTH
    }

    fn salt_range(&self) -> std::ops::Range<usize> {
        HEADER_LENGTH..HEADER_LENGTH + self.salt_len
    }

    fn hash_range(&self) -> std::ops::Range<usize> {
        HEADER_LENGTH + self.salt_len..self.encoded_len()
    }
}

/// Packs header, salt and hash into a credential blob.
///
/// The algorithm id and cost are written as given. Salts outside `[8, 64]`
/// are rejected, so every blob this returns also passes [`decode`].
pub fn encode(algorithm: AlgorithmId, cost: u8, salt: &[u8], hash: &[u8]) -> Result<Vec<u8>> {
    check_salt_length(salt.len())?;

    let mut out = Vec::with_capacity(HEADER_LENGTH + salt.len() + hash.len());
    out.push(VERSION);
    out.push(algorithm.as_u8());
    out.push(cost);
    out.push(salt.len() as u8);
    out.extend_from_slice(salt);
    out.extend_from_slice(hash);
    Ok(out)
}

/// Validates a credential blob and returns its header.
pub fn decode(blob: &[u8]) -> Result<CredentialHeader> {
    if blob.len() < HEADER_LENGTH {
        return Err(CryptoError::malformed(format!(
            "credential is {} bytes, shorter than the {HEADER_LENGTH}-byte header",
            blob.len()
        )));
    }

    let version = blob[0];
    if version != VERSION {
        return Err(CryptoError::malformed(format!(
            "unsupported credential version {version}"
        )));
    }

    let header = CredentialHeader {
        version,
        algorithm: AlgorithmId::new(blob[1]),
        cost: blob[2],
        salt_len: usize::from(blob[3]),
    };

    if !SALT_LENGTH_RANGE.contains(&header.salt_len) {
        return Err(CryptoError::malformed(format!(
            "declared salt length {} is outside [{}, {}]",
            header.salt_len,
            SALT_LENGTH_RANGE.start(),
            SALT_LENGTH_RANGE.end()
        )));
    }

    if blob.len() != header.encoded_len() {
        return Err(CryptoError::malformed(format!(
            "credential is {} bytes, header declares {}",
            blob.len(),
            header.encoded_len()
        )));
    }

    Ok(header)
}

/// Returns the salt of a credential blob.
pub fn extract_salt(blob: &[u8]) -> Result<&[u8]> {
    let header = decode(blob)?;
    Ok(&blob[header.salt_range()])
}

/// Returns the derived hash of a credential blob.
pub fn extract_hash(blob: &[u8]) -> Result<&[u8]> {
    let header = decode(blob)?;
    Ok(&blob[header.hash_range()])
}

/// Splits a blob into `(header, salt, hash)` in one validation pass.
pub fn split(blob: &[u8]) -> Result<(CredentialHeader, &[u8], &[u8])> {
    let header = decode(blob)?;
    Ok((header, &blob[header.salt_range()], &blob[header.hash_range()]))
}
