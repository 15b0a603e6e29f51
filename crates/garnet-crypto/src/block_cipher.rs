//! Stateless block cipher transforms behind `ENCRYPT` / `DECRYPT`.
//!
//! Keys are right-padded with zero bytes to the cipher key length; keys
//! longer than that are rejected, never truncated. Data is right-padded with
//! zero bytes to a multiple of [`ALIGN`] and then transformed block by block
//! in place (ECB). Decryption applies the inverse transform and leaves the
//! padding in place: callers that need the exact original length must track
//! it themselves.
//!
//! Both directions are deterministic, so calls with literal arguments may be
//! folded at plan time.
//!
//! | Name   | Key bytes | Block bytes |
//! |--------|-----------|-------------|
//! | `AES`  | 16        | 16          |
//! | `XTEA` | 16        | 8           |

use std::fmt::{self, Display};

use aes::Aes128;
use aes::cipher::generic_array::GenericArray;
use aes::cipher::{BlockDecrypt, BlockEncrypt, KeyInit};
use tracing::warn;
use zeroize::{Zeroize, ZeroizeOnDrop, Zeroizing};

use crate::error::{CryptoError, Result};

/// Alignment every input is padded to. A multiple of every block size.
pub const ALIGN: usize = 16;

/// A block cipher resolvable by name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BlockCipherKind {
    /// AES-128.
    Aes,
    /// XTEA, 64 rounds (32 cycles).
    Xtea,
}

impl BlockCipherKind {
    /// Resolves a cipher name, ignoring ASCII case.
    pub fn from_name(name: &str) -> Result<Self> {
        let name = name.trim();
        if name.eq_ignore_ascii_case("AES") {
            Ok(Self::Aes)
        } else if name.eq_ignore_ascii_case("XTEA") {
            Ok(Self::Xtea)
        } else {
            Err(CryptoError::UnknownCipher(name.to_string()))
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            Self::Aes => "AES",
            Self::Xtea => "XTEA",
        }
    }

    /// Required key length in bytes.
    pub const fn key_len(self) -> usize {
        match self {
            Self::Aes | Self::Xtea => 16,
        }
    }

    pub const fn block_len(self) -> usize {
        match self {
            Self::Aes => 16,
            Self::Xtea => 8,
        }
    }
}

impl Display for BlockCipherKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Length of `len` bytes after padding to [`ALIGN`].
pub const fn padded_len(len: usize) -> usize {
    len.div_ceil(ALIGN) * ALIGN
}

/// Encrypts `data` with the named cipher.
pub fn encrypt(cipher_name: &str, key: &[u8], data: &[u8]) -> Result<Vec<u8>> {
    transform(cipher_name, key, data, Direction::Encrypt)
}

/// Decrypts `data` with the named cipher. Padding is not removed.
pub fn decrypt(cipher_name: &str, key: &[u8], data: &[u8]) -> Result<Vec<u8>> {
    transform(cipher_name, key, data, Direction::Decrypt)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Direction {
    Encrypt,
    Decrypt,
}

fn transform(cipher_name: &str, key: &[u8], data: &[u8], direction: Direction) -> Result<Vec<u8>> {
    let kind = BlockCipherKind::from_name(cipher_name)?;
    let key = pad_key(kind, key)?;
    let cipher = KeyedCipher::new(kind, &key);

    let mut out = data.to_vec();
    out.resize(padded_len(data.len()), 0);
    cipher.apply(&mut out, direction);
    Ok(out)
}

fn pad_key(kind: BlockCipherKind, key: &[u8]) -> Result<Zeroizing<Vec<u8>>> {
    let max = kind.key_len();
    if key.len() > max {
        warn!(cipher = kind.name(), len = key.len(), max, "rejected over-length cipher key");
        return Err(CryptoError::KeyTooLong {
            cipher: kind.name(),
            max,
            actual: key.len(),
        });
    }
    let mut padded = Zeroizing::new(vec![0u8; max]);
    padded[..key.len()].copy_from_slice(key);
    Ok(padded)
}

enum KeyedCipher {
    Aes(Box<Aes128>),
    Xtea(Xtea),
}

impl KeyedCipher {
    fn new(kind: BlockCipherKind, key: &[u8]) -> Self {
        match kind {
            BlockCipherKind::Aes => {
                KeyedCipher::Aes(Box::new(Aes128::new(GenericArray::from_slice(key))))
            }
            BlockCipherKind::Xtea => KeyedCipher::Xtea(Xtea::new(key)),
        }
    }

    fn apply(&self, data: &mut [u8], direction: Direction) {
        match self {
            KeyedCipher::Aes(aes) => {
                for block in data.chunks_exact_mut(BlockCipherKind::Aes.block_len()) {
                    let block = GenericArray::from_mut_slice(block);
                    match direction {
                        Direction::Encrypt => aes.encrypt_block(block),
                        Direction::Decrypt => aes.decrypt_block(block),
                    }
                }
            }
            KeyedCipher::Xtea(xtea) => {
                for block in data.chunks_exact_mut(BlockCipherKind::Xtea.block_len()) {
                    match direction {
                        Direction::Encrypt => xtea.encrypt_block(block),
                        Direction::Decrypt => xtea.decrypt_block(block),
                    }
                }
            }
        }
    }
}

// ============================================================================
// XTEA
// ============================================================================

const XTEA_DELTA: u32 = 0x9E37_79B9;
const XTEA_CYCLES: u32 = 32;

/// XTEA with a 128-bit key and big-endian word order.
#[derive(Zeroize, ZeroizeOnDrop)]
struct Xtea {
    key: [u32; 4],
}

impl Xtea {
    fn new(key: &[u8]) -> Self {
        let mut words = [0u32; 4];
        for (word, chunk) in words.iter_mut().zip(key.chunks_exact(4)) {
            *word = u32::from_be_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]);
        }
        Self { key: words }
    }

    fn read(block: &[u8]) -> (u32, u32) {
        (
            u32::from_be_bytes([block[0], block[1], block[2], block[3]]),
            u32::from_be_bytes([block[4], block[5], block[6], block[7]]),
        )
    }

    fn write(block: &mut [u8], v0: u32, v1: u32) {
        block[..4].copy_from_slice(&v0.to_be_bytes());
        block[4..8].copy_from_slice(&v1.to_be_bytes());
    }

    fn mix(v: u32) -> u32 {
        ((v << 4) ^ (v >> 5)).wrapping_add(v)
    }

    fn encrypt_block(&self, block: &mut [u8]) {
        let (mut v0, mut v1) = Self::read(block);
        let mut sum = 0u32;
        for _ in 0..XTEA_CYCLES {
            v0 = v0.wrapping_add(Self::mix(v1) ^ sum.wrapping_add(self.key[(sum & 3) as usize]));
            sum = sum.wrapping_add(XTEA_DELTA);
            v1 = v1.wrapping_add(
                Self::mix(v0) ^ sum.wrapping_add(self.key[((sum >> 11) & 3) as usize]),
            );
        }
        Self::write(block, v0, v1);
    }

    fn decrypt_block(&self, block: &mut [u8]) {
        let (mut v0, mut v1) = Self::read(block);
        let mut sum = XTEA_DELTA.wrapping_mul(XTEA_CYCLES);
        for _ in 0..XTEA_CYCLES {
            v1 = v1.wrapping_sub(
                Self::mix(v0) ^ sum.wrapping_add(self.key[((sum >> 11) & 3) as usize]),
            );
            sum = sum.wrapping_sub(XTEA_DELTA);
            v0 = v0.wrapping_sub(Self::mix(v1) ^ sum.wrapping_add(self.key[(sum & 3) as usize]));
        }
        Self::write(block, v0, v1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use test_case::test_case;

    #[test_case("AES", BlockCipherKind::Aes)]
    #[test_case("aes", BlockCipherKind::Aes)]
    #[test_case("XTEA", BlockCipherKind::Xtea)]
    #[test_case(" Xtea ", BlockCipherKind::Xtea)]
    fn test_from_name(name: &str, expected: BlockCipherKind) {
        assert_eq!(BlockCipherKind::from_name(name), Ok(expected));
    }

    #[test_case("FOG")]
    #[test_case("AES256")]
    #[test_case("")]
    fn test_unknown_cipher(name: &str) {
        assert!(matches!(
            encrypt(name, b"key", b"data"),
            Err(CryptoError::UnknownCipher(_))
        ));
    }

    #[test_case(0, 0)]
    #[test_case(1, 16)]
    #[test_case(16, 16)]
    #[test_case(17, 32)]
    #[test_case(31, 32)]
    fn test_padded_len(len: usize, expected: usize) {
        assert_eq!(padded_len(len), expected);
    }

    #[test]
    fn test_aes_fips197_vector() {
        let key: Vec<u8> = (0u8..16).collect();
        let plaintext = [
            0x00, 0x11, 0x22, 0x33, 0x44, 0x55, 0x66, 0x77, 0x88, 0x99, 0xaa, 0xbb, 0xcc, 0xdd,
            0xee, 0xff,
        ];
        let expected = [
            0x69, 0xc4, 0xe0, 0xd8, 0x6a, 0x7b, 0x04, 0x30, 0xd8, 0xcd, 0xb7, 0x80, 0x70, 0xb4,
            0xc5, 0x5a,
        ];

        let ciphertext = encrypt("AES", &key, &plaintext).expect("encrypt failed");
        assert_eq!(ciphertext, expected);
        assert_eq!(
            decrypt("AES", &key, &ciphertext).expect("decrypt failed"),
            plaintext
        );
    }

    #[test]
    fn test_short_key_is_zero_padded() {
        let short = encrypt("AES", b"abc", &[7u8; 16]).expect("encrypt failed");
        let mut padded_key = [0u8; 16];
        padded_key[..3].copy_from_slice(b"abc");
        let explicit = encrypt("AES", &padded_key, &[7u8; 16]).expect("encrypt failed");
        assert_eq!(short, explicit);
    }

    #[test_case("AES")]
    #[test_case("XTEA")]
    fn test_over_length_key_rejected(name: &str) {
        let err = encrypt(name, &[1u8; 17], b"data").expect_err("17-byte key accepted");
        assert!(matches!(
            err,
            CryptoError::KeyTooLong {
                max: 16,
                actual: 17,
                ..
            }
        ));
        assert!(decrypt(name, &[1u8; 32], b"data").is_err());
    }

    #[test_case("AES")]
    #[test_case("XTEA")]
    fn test_unaligned_input_is_padded(name: &str) {
        let data = b"hello world";
        let ciphertext = encrypt(name, b"secret", data).expect("encrypt failed");
        assert_eq!(ciphertext.len(), ALIGN);

        let plaintext = decrypt(name, b"secret", &ciphertext).expect("decrypt failed");
        assert_eq!(plaintext.len(), ALIGN);
        assert_eq!(&plaintext[..data.len()], data);
        assert!(plaintext[data.len()..].iter().all(|b| *b == 0));
    }

    #[test_case("AES")]
    #[test_case("XTEA")]
    fn test_empty_input(name: &str) {
        assert!(encrypt(name, b"k", b"").expect("encrypt failed").is_empty());
    }

    #[test]
    fn test_deterministic() {
        let a = encrypt("XTEA", b"k", b"same").expect("encrypt failed");
        let b = encrypt("XTEA", b"k", b"same").expect("encrypt failed");
        assert_eq!(a, b);
    }

    #[test]
    fn test_ciphers_differ() {
        let data = [0x33u8; 32];
        let aes = encrypt("AES", b"key", &data).expect("encrypt failed");
        let xtea = encrypt("XTEA", b"key", &data).expect("encrypt failed");
        assert_ne!(aes, xtea);
        assert_ne!(aes, data);
        assert_ne!(xtea, data);
    }

    #[test]
    fn test_wrong_key_does_not_recover() {
        let ciphertext = encrypt("AES", b"right", &[5u8; 16]).expect("encrypt failed");
        let plaintext = decrypt("AES", b"wrong", &ciphertext).expect("decrypt failed");
        assert_ne!(plaintext, [5u8; 16]);
    }

    proptest! {
        #[test]
        fn aligned_round_trip(
            key in prop::collection::vec(any::<u8>(), 0..=16),
            blocks in prop::collection::vec(any::<[u8; 16]>(), 0..8),
            xtea: bool,
        ) {
            let name = if xtea { "XTEA" } else { "AES" };
            let data: Vec<u8> = blocks.concat();
            let ciphertext = encrypt(name, &key, &data).expect("encrypt failed");
            prop_assert_eq!(ciphertext.len(), data.len());
            let plaintext = decrypt(name, &key, &ciphertext).expect("decrypt failed");
            prop_assert_eq!(plaintext, data);
        }

        #[test]
        fn unaligned_prefix_round_trip(
            key in prop::collection::vec(any::<u8>(), 0..=16),
            data in prop::collection::vec(any::<u8>(), 0..100),
        ) {
            let ciphertext = encrypt("AES", &key, &data).expect("encrypt failed");
            prop_assert_eq!(ciphertext.len(), padded_len(data.len()));
            let plaintext = decrypt("AES", &key, &ciphertext).expect("decrypt failed");
            prop_assert_eq!(&plaintext[..data.len()], &data[..]);
        }
    }
}
