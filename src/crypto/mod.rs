//! Cryptographic operations for OpenSSH Ed25519 key generation.
//!
//! This module provides:
//! - Secure random key generation from the OS entropy source
//! - OpenSSH authorized-key encoding of the public half
//! - Key sources the workers draw candidates from

mod encoding;
mod keypair;
mod source;

pub use encoding::{
    EncodedPublicKey, BASE64_ALPHABET, ENCODED_LEN, FIXED_PREFIX, LEADING_RANDOM_ALPHABET,
    RANDOM_CHARS,
};
pub use keypair::{KeygenError, Keypair};
pub use source::{KeySource, OsKeySource};
