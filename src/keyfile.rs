//! Writing the winning keypair as OpenSSH key files.
//!
//! The private key goes to `id_ed25519` (owner read/write only), the public
//! key to `id_ed25519.pub` (world readable). Writes are not transactional:
//! if the public key fails after the private key was written, the private
//! file is left in place and the error says so.

use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use ssh_key::LineEnding;
use tracing::debug;

use crate::crypto::KeygenError;
use crate::worker::VanityResult;

/// File name of the private key.
pub const PRIVATE_KEY_FILE: &str = "id_ed25519";

/// File name of the public key.
pub const PUBLIC_KEY_FILE: &str = "id_ed25519.pub";

const PRIVATE_KEY_MODE: u32 = 0o600;
const PUBLIC_KEY_MODE: u32 = 0o644;

#[derive(Debug, thiserror::Error)]
pub enum PersistError {
    #[error("marshaling private key: {0}")]
    Encode(#[from] KeygenError),

    #[error("writing private key {}: {source}", path.display())]
    PrivateKey {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error(
        "writing public key {}: {source} (private key {} was already written)",
        path.display(),
        private_key.display()
    )]
    PublicKey {
        path: PathBuf,
        private_key: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Paths and text of a persisted keypair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WrittenKeys {
    pub private_key: PathBuf,
    pub public_key: PathBuf,
    /// The authorized-key line written to the public file
    pub public_key_line: String,
}

/// Writes key files into a directory.
#[derive(Debug, Clone)]
pub struct KeyWriter {
    dir: PathBuf,
    comment: String,
}

impl KeyWriter {
    /// Creates a writer targeting `dir`, with an empty key comment.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            comment: String::new(),
        }
    }

    /// Sets the comment stored in both key files.
    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = comment.into();
        self
    }

    pub fn private_key_path(&self) -> PathBuf {
        self.dir.join(PRIVATE_KEY_FILE)
    }

    pub fn public_key_path(&self) -> PathBuf {
        self.dir.join(PUBLIC_KEY_FILE)
    }

    /// Writes the private key, then the public key.
    pub fn persist(&self, result: &VanityResult) -> Result<WrittenKeys, PersistError> {
        let private_key = self.private_key_path();
        let public_key = self.public_key_path();

        let pem = result
            .keypair
            .ssh_private_key(&self.comment)?
            .to_openssh(LineEnding::LF)
            .map_err(KeygenError::from)?;
        write_with_mode(&private_key, pem.as_bytes(), PRIVATE_KEY_MODE).map_err(|source| {
            PersistError::PrivateKey {
                path: private_key.clone(),
                source,
            }
        })?;
        debug!(path = %private_key.display(), "private key written");

        let public_key_line = result.public_key.to_authorized_key_line(&self.comment);
        write_with_mode(&public_key, public_key_line.as_bytes(), PUBLIC_KEY_MODE).map_err(
            |source| PersistError::PublicKey {
                path: public_key.clone(),
                private_key: private_key.clone(),
                source,
            },
        )?;
        debug!(path = %public_key.display(), "public key written");

        Ok(WrittenKeys {
            private_key,
            public_key,
            public_key_line,
        })
    }
}

/// Creates or truncates `path` with permission `mode`, then writes `contents`.
///
/// The mode is applied before any content lands, including when the file
/// already existed with a looser mode.
fn write_with_mode(path: &Path, contents: &[u8], mode: u32) -> io::Result<()> {
    let mut options = OpenOptions::new();
    options.write(true).create(true).truncate(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(mode);
    }

    let mut file = options.open(path)?;
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        file.set_permissions(fs::Permissions::from_mode(mode))?;
    }
    #[cfg(not(unix))]
    let _ = mode;

    file.write_all(contents)?;
    file.flush()
}
