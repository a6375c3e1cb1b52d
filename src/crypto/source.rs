//! Where workers draw candidate keypairs from.

use super::{KeygenError, Keypair};

/// A source of candidate keypairs.
///
/// Shared by every worker, so implementations must be callable concurrently.
pub trait KeySource: Send + Sync {
    fn generate(&self) -> Result<Keypair, KeygenError>;
}

/// Fresh keypairs from the operating system's CSPRNG.
#[derive(Debug, Clone, Copy, Default)]
pub struct OsKeySource;

impl KeySource for OsKeySource {
    #[inline]
    fn generate(&self) -> Result<Keypair, KeygenError> {
        Keypair::generate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_os_source_yields_distinct_keys() {
        let source = OsKeySource;
        let a = source.generate().unwrap();
        let b = source.generate().unwrap();
        assert_ne!(a.public_key_bytes(), b.public_key_bytes());
    }
}
