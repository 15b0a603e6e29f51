//! Credential hash values.
//!
//! A [`PasswordHash`] wraps a validated credential blob (see
//! [`crate::encoding`]). It is built either by deriving from a plaintext
//! with a fresh salt, or by reconstructing a previously stored blob. Once
//! built it is immutable and can be shared read-only across threads.
//!
//! The plaintext is never stored. Equality and hashing consider only the
//! derived hash, so two values with different salts are equal exactly when
//! their derived hashes match. Every textual rendering is the fixed
//! [`MASKED_PASSWORD`] placeholder.

use std::fmt::{self, Debug, Display};
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use bytes::Bytes;
use tracing::{debug, warn};

use crate::constant_time;
use crate::encoding::{self, CredentialHeader, HEADER_LENGTH, VERSION};
use crate::error::Result;
use crate::kdf::{self, AlgorithmId, DEFAULT_COST};
use crate::salt::{self, DEFAULT_SALT_LENGTH, OsSaltSource, SaltSource};

/// Placeholder used wherever a credential is rendered as text.
pub const MASKED_PASSWORD: &str = "*PASSWORD*";

/// An immutable, salted, versioned credential hash.
#[derive(Clone)]
pub struct PasswordHash {
    encoded: Bytes,
    header: CredentialHeader,
}

impl PasswordHash {
    /// Derives a credential from `plaintext` with the default salt length.
    ///
    /// `cost` defaults to [`DEFAULT_COST`]; out-of-range costs are clamped.
    /// Two calls with the same inputs produce different blobs (fresh salt)
    /// that both verify against `plaintext`.
    pub fn create(plaintext: &[u8], cost: Option<i64>, source: &dyn SaltSource) -> Result<Self> {
        Self::create_with_salt_len(plaintext, cost, DEFAULT_SALT_LENGTH, source)
    }

    /// Derives a credential with an explicit salt length in `[8, 64]`.
    pub fn create_with_salt_len(
        plaintext: &[u8],
        cost: Option<i64>,
        salt_len: usize,
        source: &dyn SaltSource,
    ) -> Result<Self> {
        let cost = kdf::clamp_cost(cost.unwrap_or(DEFAULT_COST));
        let salt = salt::generate(source, salt_len)?;
        let hash = kdf::derive(plaintext, &salt, cost)?;

        let algorithm = AlgorithmId::PBKDF2_HMAC_SHA256;
        let encoded = encoding::encode(algorithm, cost, &salt, &hash[..])?;
        let header = CredentialHeader {
            version: VERSION,
            algorithm,
            cost,
            salt_len,
        };
        debug_assert_eq!(encoded.len(), header.encoded_len());

        Ok(Self {
            encoded: Bytes::from(encoded),
            header,
        })
    }

    /// Reconstructs a credential from a stored blob without re-deriving.
    pub fn from_encoded(blob: &[u8]) -> Result<Self> {
        Self::from_bytes(Bytes::copy_from_slice(blob))
    }

    /// Like [`PasswordHash::from_encoded`], taking ownership of the buffer.
    pub fn from_bytes(encoded: Bytes) -> Result<Self> {
        let header = encoding::decode(&encoded).inspect_err(|e| {
            warn!(len = encoded.len(), error = %e, "rejected credential blob");
        })?;
        Ok(Self { encoded, header })
    }

    /// Checks `candidate` against this credential.
    ///
    /// A mismatch is `Ok(false)`. Errors come only from the derivation
    /// provider, including blobs whose algorithm this build cannot derive.
    pub fn verify(&self, candidate: &[u8]) -> Result<bool> {
        let actual = kdf::derive_with(
            self.header.algorithm,
            candidate,
            self.salt(),
            self.header.cost,
        )?;
        let matches = constant_time::equals(self.derived_hash(), &actual[..]);
        debug!(algorithm = %self.header.algorithm, matches, "verified credential");
        Ok(matches)
    }

    /// The algorithm recorded in the header.
    pub fn algorithm(&self) -> AlgorithmId {
        self.header.algorithm
    }

    /// Canonical algorithm label, or `UNKNOWN(<id>)`.
    pub fn algorithm_name(&self) -> String {
        self.header.algorithm.name()
    }

    /// The raw cost byte.
    pub fn cost(&self) -> u8 {
        self.header.cost
    }

    /// PBKDF2 iterations implied by the cost byte.
    pub fn iterations(&self) -> u32 {
        kdf::iterations(self.header.cost)
    }

    pub fn salt(&self) -> &[u8] {
        &self.encoded[HEADER_LENGTH..HEADER_LENGTH + self.header.salt_len]
    }

    /// The full encoded blob (header, salt, derived hash).
    pub fn encoded(&self) -> &Bytes {
        &self.encoded
    }

    pub fn into_bytes(self) -> Bytes {
        self.encoded
    }

    fn derived_hash(&self) -> &[u8] {
        &self.encoded[HEADER_LENGTH + self.header.salt_len..]
    }
}

impl PartialEq for PasswordHash {
    fn eq(&self, other: &Self) -> bool {
        constant_time::equals(self.derived_hash(), other.derived_hash())
    }
}

impl Eq for PasswordHash {}

impl Hash for PasswordHash {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.derived_hash().hash(state);
    }
}

impl Debug for PasswordHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PasswordHash")
            .field("algorithm", &self.header.algorithm)
            .field("cost", &self.header.cost)
            .field("salt_len", &self.header.salt_len)
            .finish_non_exhaustive()
    }
}

impl Display for PasswordHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(MASKED_PASSWORD)
    }
}

// ============================================================================
// Hasher
// ============================================================================

/// Defaults applied when creating credentials.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PasswordPolicy {
    default_cost: i64,
    salt_len: usize,
}

impl PasswordPolicy {
    /// Creates a policy, rejecting unsupported salt lengths.
    pub fn new(default_cost: i64, salt_len: usize) -> Result<Self> {
        salt::check_salt_length(salt_len)?;
        Ok(Self {
            default_cost,
            salt_len,
        })
    }

    pub fn default_cost(&self) -> i64 {
        self.default_cost
    }

    pub fn salt_len(&self) -> usize {
        self.salt_len
    }
}

impl Default for PasswordPolicy {
    fn default() -> Self {
        Self {
            default_cost: DEFAULT_COST,
            salt_len: DEFAULT_SALT_LENGTH,
        }
    }
}

/// Creates credentials with a policy and an owned salt source.
///
/// Cheap to clone; clones share the salt source.
#[derive(Debug, Clone)]
pub struct PasswordHasher {
    policy: PasswordPolicy,
    salt_source: Arc<dyn SaltSource>,
}

impl PasswordHasher {
    pub fn new(policy: PasswordPolicy, salt_source: Arc<dyn SaltSource>) -> Self {
        Self {
            policy,
            salt_source,
        }
    }

    pub fn policy(&self) -> &PasswordPolicy {
        &self.policy
    }

    /// Derives a credential, using the policy cost when `cost` is `None`.
    pub fn hash(&self, plaintext: &[u8], cost: Option<i64>) -> Result<PasswordHash> {
        PasswordHash::create_with_salt_len(
            plaintext,
            Some(cost.unwrap_or(self.policy.default_cost)),
            self.policy.salt_len,
            self.salt_source.as_ref(),
        )
    }
}

impl Default for PasswordHasher {
    fn default() -> Self {
        Self::new(PasswordPolicy::default(), Arc::new(OsSaltSource))
    }
}
