//! Password-based key derivation.
//!
//! Credentials are derived with PBKDF2-HMAC-SHA-256 into a fixed 32-byte
//! output. The cost factor maps to an iteration count through a single
//! monotonic, capped function shared by derivation and verification:
//!
//! ```text
//! iterations = 2 ^ clamp(10 + cost, 10, 20)
//! ```
//!
//! | cost | iterations |
//! |------|------------|
//! | 0    | 1,024      |
//! | 4    | 16,384     |
//! | 10+  | 1,048,576  |

use std::fmt::{self, Display};

use hmac::Hmac;
use sha2::Sha256;
use tracing::debug;
use zeroize::Zeroizing;

use crate::error::{CryptoError, Result};

/// Length of every derived hash in bytes.
pub const HASH_LENGTH: usize = 32;

/// Cost factor used when the caller supplies none.
pub const DEFAULT_COST: i64 = 12;

/// Smallest cost factor that changes the iteration count.
pub const MIN_COST: u8 = 0;

/// Largest cost factor that changes the iteration count.
pub const MAX_COST: u8 = 10;

const MIN_LOG2_ITERATIONS: u32 = 10;
const MAX_LOG2_ITERATIONS: u32 = 20;

/// A derived hash. Zeroed when dropped.
pub type DerivedHash = Zeroizing<[u8; HASH_LENGTH]>;

/// Identifier of the derivation algorithm recorded in a credential header.
///
/// The id space is fixed and versioned. Ids that this build does not know
/// are still representable so blobs written by newer builds can be decoded
/// and introspected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct AlgorithmId(u8);

impl AlgorithmId {
    /// PBKDF2 with HMAC-SHA-256.
    pub const PBKDF2_HMAC_SHA256: AlgorithmId = AlgorithmId(1);

    pub const fn new(id: u8) -> Self {
        Self(id)
    }

    pub const fn as_u8(self) -> u8 {
        self.0
    }

    /// Returns true if this build can derive hashes for the algorithm.
    pub const fn is_supported(self) -> bool {
        self.0 == Self::PBKDF2_HMAC_SHA256.0
    }

    /// Canonical display name, or `UNKNOWN(<id>)` for unrecognized ids.
    pub fn name(self) -> String {
        self.to_string()
    }
}

impl Display for AlgorithmId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Self::PBKDF2_HMAC_SHA256 => write!(f, "PBKDF2-HMAC-SHA256"),
            AlgorithmId(id) => write!(f, "UNKNOWN({id})"),
        }
    }
}

impl From<u8> for AlgorithmId {
    fn from(id: u8) -> Self {
        Self(id)
    }
}

impl From<AlgorithmId> for u8 {
    fn from(id: AlgorithmId) -> Self {
        id.0
    }
}

/// Clamps a caller-supplied cost into the stored range.
///
/// Out-of-range costs are clamped rather than rejected so that credential
/// creation is total over every integer input.
pub fn clamp_cost(cost: i64) -> u8 {
    cost.clamp(i64::from(MIN_COST), i64::from(MAX_COST)) as u8
}

/// Maps a stored (raw) cost byte to its PBKDF2 iteration count.
pub fn iterations(cost: u8) -> u32 {
    let log2 = (MIN_LOG2_ITERATIONS + u32::from(cost)).clamp(MIN_LOG2_ITERATIONS, MAX_LOG2_ITERATIONS);
    1u32 << log2
}

/// Derives a 32-byte hash from a plaintext credential.
///
/// The returned buffer is zeroed on drop. A provider failure is returned as
/// [`CryptoError::Provider`] and must not be retried.
pub fn derive(plaintext: &[u8], salt: &[u8], cost: u8) -> Result<DerivedHash> {
    let rounds = iterations(cost);
    debug!(cost, rounds, salt_len = salt.len(), "deriving credential hash");

    let mut out = Zeroizing::new([0u8; HASH_LENGTH]);
    pbkdf2::pbkdf2::<Hmac<Sha256>>(plaintext, salt, rounds, &mut out[..])
        .map_err(|e| CryptoError::Provider(format!("PBKDF2-HMAC-SHA256 failed: {e}")))?;
    Ok(out)
}

/// Derives a hash with the algorithm named in a credential header.
pub fn derive_with(
    algorithm: AlgorithmId,
    plaintext: &[u8],
    salt: &[u8],
    cost: u8,
) -> Result<DerivedHash> {
    if !algorithm.is_supported() {
        return Err(CryptoError::Provider(format!(
            "no derivation available for algorithm {algorithm}"
        )));
    }
    derive(plaintext, salt, cost)
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case(i64::MIN, 0; "far below range")]
    #[test_case(-1, 0; "negative")]
    #[test_case(0, 0; "minimum")]
    #[test_case(4, 4; "in range")]
    #[test_case(10, 10; "maximum")]
    #[test_case(12, 10; "default clamps")]
    #[test_case(i64::MAX, 10; "far above range")]
    fn test_clamp_cost(input: i64, expected: u8) {
        assert_eq!(clamp_cost(input), expected);
    }

    #[test_case(0, 1 << 10)]
    #[test_case(1, 1 << 11)]
    #[test_case(10, 1 << 20)]
    #[test_case(11, 1 << 20)]
    #[test_case(255, 1 << 20)]
    fn test_iterations(cost: u8, expected: u32) {
        assert_eq!(iterations(cost), expected);
    }

    #[test]
    fn test_iterations_monotonic() {
        let mut previous = 0;
        for cost in 0..=u8::MAX {
            let current = iterations(cost);
            assert!(current >= previous);
            previous = current;
        }
    }

    #[test]
    fn test_derive_deterministic() {
        let salt = [0x11; 16];
        let a = derive(b"hunter2", &salt, 0).expect("derive failed");
        let b = derive(b"hunter2", &salt, 0).expect("derive failed");
        assert_eq!(*a, *b);
    }

    #[test]
    fn test_derive_depends_on_every_input() {
        let salt = [0x11; 16];
        let base = derive(b"hunter2", &salt, 0).expect("derive failed");

        let other_plain = derive(b"hunter3", &salt, 0).expect("derive failed");
        let other_salt = derive(b"hunter2", &[0x12; 16], 0).expect("derive failed");
        let other_cost = derive(b"hunter2", &salt, 1).expect("derive failed");

        assert_ne!(*base, *other_plain);
        assert_ne!(*base, *other_salt);
        assert_ne!(*base, *other_cost);
    }

    #[test]
    fn test_derive_matches_reference_pbkdf2() {
        let salt = b"NaCl-and-pepper!";
        let derived = derive(b"password", salt, 0).expect("derive failed");

        let mut expected = [0u8; HASH_LENGTH];
        pbkdf2::pbkdf2_hmac::<Sha256>(b"password", salt, 1024, &mut expected);
        assert_eq!(*derived, expected);
    }

    #[test]
    fn test_derive_with_unknown_algorithm() {
        let result = derive_with(AlgorithmId::new(9), b"pw", &[0u8; 16], 0);
        assert!(matches!(result, Err(CryptoError::Provider(_))));
    }

    #[test]
    fn test_algorithm_names() {
        assert_eq!(AlgorithmId::PBKDF2_HMAC_SHA256.name(), "PBKDF2-HMAC-SHA256");
        assert_eq!(AlgorithmId::new(0).name(), "UNKNOWN(0)");
        assert_eq!(AlgorithmId::new(42).name(), "UNKNOWN(42)");
        assert!(AlgorithmId::PBKDF2_HMAC_SHA256.is_supported());
        assert!(!AlgorithmId::new(2).is_supported());
    }
}
