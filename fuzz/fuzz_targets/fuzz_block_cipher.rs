#![no_main]

use arbitrary::Arbitrary;
use garnet_crypto::block_cipher::{self, ALIGN};
use libfuzzer_sys::fuzz_target;

#[derive(Debug, Arbitrary)]
struct Input {
    cipher: CipherName,
    key: Vec<u8>,
    data: Vec<u8>,
}

#[derive(Debug, Arbitrary)]
enum CipherName {
    Aes,
    Xtea,
    Raw(String),
}

impl CipherName {
    fn as_str(&self) -> &str {
        match self {
            CipherName::Aes => "AES",
            CipherName::Xtea => "xtea",
            CipherName::Raw(s) => s,
        }
    }
}

fuzz_target!(|input: Input| {
    let name = input.cipher.as_str();
    let Ok(encrypted) = block_cipher::encrypt(name, &input.key, &input.data) else {
        // Rejections are decided by name and key length only.
        assert!(
            block_cipher::BlockCipherKind::from_name(name).is_err() || input.key.len() > 16,
            "unexpected rejection"
        );
        return;
    };

    assert_eq!(encrypted.len(), block_cipher::padded_len(input.data.len()));
    assert_eq!(encrypted.len() % ALIGN, 0);

    let decrypted =
        block_cipher::decrypt(name, &input.key, &encrypted).expect("decrypt after encrypt");
    assert_eq!(&decrypted[..input.data.len()], input.data.as_slice());
    assert!(decrypted[input.data.len()..].iter().all(|&b| b == 0));
});
