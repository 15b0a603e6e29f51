//! Secure random salt generation.
//!
//! A [`SaltSource`] is owned explicitly by whoever creates credentials and
//! handed down to the hasher. Implementations must be safe to call from
//! many threads at once without a shared lock: derivation is CPU-bound and
//! already the throughput bottleneck.

use std::fmt::Debug;
use std::ops::RangeInclusive;

use rand::RngCore;
use rand::rngs::OsRng;

use crate::error::{CryptoError, Result};

/// Salt length used when none is configured.
pub const DEFAULT_SALT_LENGTH: usize = 16;

/// Supported salt lengths, inclusive.
pub const SALT_LENGTH_RANGE: RangeInclusive<usize> = 8..=64;

/// A thread-safe source of cryptographically secure salt bytes.
pub trait SaltSource: Send + Sync + Debug {
    /// Fills `salt` with fresh random bytes.
    fn fill_salt(&self, salt: &mut [u8]) -> Result<()>;
}

/// Salt source backed by the operating system CSPRNG.
///
/// Each call reads directly from the OS generator, so concurrent callers
/// never contend on shared state.
#[derive(Debug, Default, Clone, Copy)]
pub struct OsSaltSource;

impl SaltSource for OsSaltSource {
    fn fill_salt(&self, salt: &mut [u8]) -> Result<()> {
        OsRng
            .try_fill_bytes(salt)
            .map_err(|e| CryptoError::Provider(format!("OS random source failed: {e}")))
    }
}

/// Returns an error unless `len` is a supported salt length.
pub fn check_salt_length(len: usize) -> Result<()> {
    if SALT_LENGTH_RANGE.contains(&len) {
        Ok(())
    } else {
        Err(CryptoError::InvalidSaltLength(len))
    }
}

/// Generates a fresh salt of `len` bytes.
pub fn generate(source: &dyn SaltSource, len: usize) -> Result<Vec<u8>> {
    check_salt_length(len)?;
    let mut salt = vec![0u8; len];
    source.fill_salt(&mut salt)?;
    Ok(salt)
}
