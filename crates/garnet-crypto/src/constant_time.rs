//! Constant-time byte comparison.
//!
//! Derived hashes are compared only through [`equals`]. Its running time
//! depends on the input length, never on the position of the first
//! differing byte.

use subtle::ConstantTimeEq;

/// Compares two byte slices in constant time.
///
/// Unequal lengths return `false` immediately; length is not secret since
/// derived hashes have a fixed size. Equal-length inputs are folded byte by
/// byte into a single accumulator and every pair is visited.
pub fn equals(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    bool::from(a.ct_eq(b))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_equal_inputs() {
        assert!(equals(b"", b""));
        assert!(equals(&[0xAB; 32], &[0xAB; 32]));
    }

    #[test]
    fn test_length_mismatch() {
        assert!(!equals(&[0u8; 32], &[0u8; 31]));
        assert!(!equals(b"", b"x"));
    }

    #[test]
    fn test_difference_at_every_position() {
        let base = [0x5Au8; 32];
        for i in 0..base.len() {
            let mut other = base;
            other[i] ^= 0x01;
            assert!(!equals(&base, &other), "difference at byte {i} not detected");
        }
    }

    proptest! {
        #[test]
        fn agrees_with_slice_equality(a in prop::collection::vec(any::<u8>(), 0..64),
                                      b in prop::collection::vec(any::<u8>(), 0..64)) {
            prop_assert_eq!(equals(&a, &b), a == b);
        }

        #[test]
        fn reflexive(a in prop::collection::vec(any::<u8>(), 0..128)) {
            prop_assert!(equals(&a, &a));
        }
    }
}
