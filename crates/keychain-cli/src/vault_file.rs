//! On-disk vault file.
//!
//! One JSON document holding the keychain dump and the configuration it was
//! produced under:
//!
//! ```text
//! { "dump": { "repr": ..., "checksum": ..., "salt": ... }, "config": { "kdf": { "iterations": N } } }
//! ```
//!
//! Writes go to a sibling temporary file, which is synced to disk and then
//! renamed over the vault. A failed write removes the temporary file and
//! leaves the previous vault in place.

use std::{
    fs,
    io::{self, Write},
    path::{Path, PathBuf},
};

use keychain_core::{Dump, Keychain, KeychainConfig, KeychainError, SystemEnv};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors surfaced by the command line front end.
#[derive(Debug, Error)]
pub enum CliError {
    /// Reading or writing the vault file failed
    #[error("{path}: {source}")]
    Io {
        /// File being accessed
        path: PathBuf,
        /// Underlying I/O error
        source: io::Error,
    },

    /// Vault file is not valid JSON of the expected shape
    #[error("{path}: not a vault file: {source}")]
    Parse {
        /// File being parsed
        path: PathBuf,
        /// Underlying JSON error
        source: serde_json::Error,
    },

    /// Refusing to overwrite an existing vault
    #[error("{0}: vault already exists")]
    VaultExists(PathBuf),

    /// A modifying command was asked to skip checksum verification
    #[error("refusing to rewrite a vault opened with --no-verify")]
    UnverifiedWrite,

    /// Master password environment variable not set
    #[error("master password not set: export {0}")]
    MissingPassword(String),

    /// Keychain rejected the vault contents
    #[error(transparent)]
    Keychain(#[from] KeychainError),
}

/// Persisted vault contents.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VaultFile {
    /// Keychain dump
    pub dump: Dump,
    /// Configuration the dump was produced under
    #[serde(default)]
    pub config: KeychainConfig,
}

impl VaultFile {
    /// Snapshot a keychain.
    pub fn from_keychain(keychain: &Keychain, config: KeychainConfig) -> Self {
        Self { dump: keychain.dump(), config }
    }

    /// Read a vault file.
    pub fn read(path: &Path) -> Result<Self, CliError> {
        let text = fs::read_to_string(path)
            .map_err(|source| CliError::Io { path: path.to_path_buf(), source })?;
        serde_json::from_str(&text)
            .map_err(|source| CliError::Parse { path: path.to_path_buf(), source })
    }

    /// Write the vault file, replacing any previous contents.
    pub fn write(&self, path: &Path) -> Result<(), CliError> {
        let Ok(text) = serde_json::to_string_pretty(self) else {
            unreachable!("vault files contain only strings and integers");
        };
        let staging = path.with_extension("tmp");
        let result =
            Self::stage(&staging, text.as_bytes()).and_then(|()| fs::rename(&staging, path));
        if result.is_err() {
            let _ = fs::remove_file(&staging);
        }
        result.map_err(|source| CliError::Io { path: path.to_path_buf(), source })
    }

    fn stage(staging: &Path, contents: &[u8]) -> io::Result<()> {
        let mut file = fs::File::create(staging)?;
        file.write_all(contents)?;
        file.sync_all()
    }

    /// Open the keychain, checking the stored checksum unless `verify` is
    /// false.
    pub fn open(&self, password: &str, verify: bool) -> Result<Keychain, CliError> {
        let trusted = verify.then_some(self.dump.checksum.as_str());
        let keychain = Keychain::load_with(
            password,
            &self.dump.repr,
            trusted,
            &self.dump.salt,
            self.config,
            SystemEnv::new(),
        )?;
        Ok(keychain)
    }
}
