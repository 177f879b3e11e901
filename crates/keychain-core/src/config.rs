//! Keychain configuration.

use keychain_crypto::KdfParams;
use serde::{Deserialize, Serialize};

/// Parameters a keychain is created or loaded with.
///
/// The serialized store does not record these. A dump must be loaded with
/// the same configuration it was produced under, otherwise every lookup
/// misses.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeychainConfig {
    /// Password stretching parameters
    #[serde(default)]
    pub kdf: KdfParams,
}
