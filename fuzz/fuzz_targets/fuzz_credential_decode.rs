#![no_main]

use bytes::Bytes;
use garnet_crypto::encoding::{self, HEADER_LENGTH};
use garnet_crypto::{HASH_LENGTH, PasswordHash};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // Structural decode must never panic, and must agree with the value type.
    let header = encoding::decode(data);
    let credential = PasswordHash::from_bytes(Bytes::copy_from_slice(data));
    assert_eq!(header.is_ok(), credential.is_ok());

    let (Ok(header), Ok(credential)) = (header, credential) else {
        return;
    };

    assert_eq!(data.len(), HEADER_LENGTH + header.salt_len + HASH_LENGTH);
    assert!((8..=64).contains(&header.salt_len));
    assert_eq!(credential.salt(), encoding::extract_salt(data).expect("validated"));
    assert_eq!(credential.encoded().as_ref(), data);

    // Never reveal the blob through formatting.
    assert_eq!(credential.to_string(), "*PASSWORD*");

    // Cap derivation work; high costs only slow the fuzzer down.
    if credential.cost() <= 2 {
        let _ = credential.verify(b"fuzz");
    }
});
