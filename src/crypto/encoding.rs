//! OpenSSH authorized-key text of an Ed25519 public key.

use std::fmt;

/// Characters the base64 body of the key can contain.
pub const BASE64_ALPHABET: &str =
    "ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789+/";

/// Part of every encoded key that does not depend on the key material.
///
/// The wire blob starts with the length-prefixed algorithm name and the
/// length of the key, which pins the first 25 base64 characters.
pub const FIXED_PREFIX: &str = "ssh-ed25519 AAAAC3NzaC1lZDI1NTE5AAAAI";

/// Characters the first random base64 position can take.
///
/// That character also carries the two low bits of the key length byte
/// (0x20), which are always zero.
pub const LEADING_RANDOM_ALPHABET: &str = "ABCDEFGHIJKLMNOP";

/// Length of an encoded key without comment: `"ssh-ed25519 "` plus 68 base64 chars.
pub const ENCODED_LEN: usize = 80;

/// Number of base64 characters that vary with the key material.
pub const RANDOM_CHARS: usize = ENCODED_LEN - FIXED_PREFIX.len();

/// An encoded public key (`ssh-ed25519 <base64>`), without comment or newline.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct EncodedPublicKey(String);

impl EncodedPublicKey {
    pub(crate) fn new(text: String) -> Self {
        Self(text)
    }

    /// Returns the encoding as raw bytes, the form the matcher scans.
    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }

    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns the single-line authorized-key text, with the comment appended if any.
    pub fn to_authorized_key_line(&self, comment: &str) -> String {
        if comment.is_empty() {
            format!("{}\n", self.0)
        } else {
            format!("{} {}\n", self.0, comment)
        }
    }
}

impl fmt::Debug for EncodedPublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EncodedPublicKey({})", self.0)
    }
}

impl fmt::Display for EncodedPublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layout_constants() {
        assert_eq!(FIXED_PREFIX.len(), 37);
        assert_eq!(RANDOM_CHARS, 43);
        assert_eq!(BASE64_ALPHABET.len(), 64);
        assert!(BASE64_ALPHABET.starts_with(LEADING_RANDOM_ALPHABET));
    }

    #[test]
    fn test_first_random_char_is_in_leading_alphabet() {
        for seed in [[0u8; 32], [0xffu8; 32], [0x5au8; 32]] {
            let encoded = crate::crypto::Keypair::from_seed(seed).encode_public().unwrap();
            let first = encoded.as_bytes()[FIXED_PREFIX.len()];
            assert!(LEADING_RANDOM_ALPHABET.as_bytes().contains(&first));
        }
        for _ in 0..64 {
            let encoded = crate::crypto::Keypair::generate().unwrap().encode_public().unwrap();
            assert!(encoded.as_str().starts_with(FIXED_PREFIX));
            let first = encoded.as_bytes()[FIXED_PREFIX.len()];
            assert!(LEADING_RANDOM_ALPHABET.as_bytes().contains(&first));
        }
    }

    #[test]
    fn test_authorized_key_line() {
        let encoded = EncodedPublicKey::new("ssh-ed25519 AAAA".into());
        assert_eq!(encoded.to_authorized_key_line(""), "ssh-ed25519 AAAA\n");
        assert_eq!(
            encoded.to_authorized_key_line("me@host"),
            "ssh-ed25519 AAAA me@host\n"
        );
    }
}
