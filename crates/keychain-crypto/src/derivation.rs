//! Master key derivation using PBKDF2 and HKDF

use std::num::NonZeroU32;

use hkdf::Hkdf;
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use zeroize::{Zeroize, Zeroizing};

use crate::{encoding, error::CryptoError};

/// Salt size in bytes
pub const SALT_SIZE: usize = 16;

/// Default PBKDF2 iteration count
pub const PBKDF2_ITERATIONS: NonZeroU32 = match NonZeroU32::new(100_000) {
    Some(iterations) => iterations,
    None => unreachable!(),
};

/// Label for the index (HMAC) key
const INDEX_KEY_LABEL: &[u8] = b"keychainIndexV1";

/// Label for the record (AES-GCM) key
const RECORD_KEY_LABEL: &[u8] = b"keychainRecordV1";

/// Public per-keychain salt.
///
/// Safe to disclose; it must be persisted next to the serialized store so
/// that the same password reproduces the same keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Salt([u8; SALT_SIZE]);

impl Salt {
    /// Wrap raw salt bytes.
    pub fn from_bytes(bytes: [u8; SALT_SIZE]) -> Self {
        Self(bytes)
    }

    /// Parse a base64 salt, as returned by [`Salt::encode`].
    ///
    /// # Errors
    ///
    /// - `InvalidEncoding`: not base64
    /// - `InvalidSaltLength`: decodes to anything other than 16 bytes
    pub fn from_encoded(encoded: &str) -> Result<Self, CryptoError> {
        let bytes = encoding::decode("salt", encoded)?;
        let actual = bytes.len();
        let bytes: [u8; SALT_SIZE] = bytes
            .try_into()
            .map_err(|_| CryptoError::InvalidSaltLength { expected: SALT_SIZE, actual })?;
        Ok(Self(bytes))
    }

    /// Base64 form for persistence.
    pub fn encode(&self) -> String {
        encoding::encode(&self.0)
    }

    /// Raw salt bytes.
    pub fn as_bytes(&self) -> &[u8; SALT_SIZE] {
        &self.0
    }
}

/// Password stretching parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct KdfParams {
    /// PBKDF2-HMAC-SHA256 iteration count
    pub iterations: NonZeroU32,
}

impl Default for KdfParams {
    fn default() -> Self {
        Self { iterations: PBKDF2_ITERATIONS }
    }
}

/// The two secret keys owned by one keychain.
///
/// Both keys are zeroized on drop.
#[derive(Clone)]
pub struct MasterKeys {
    /// HMAC-SHA256 key for the blinded index
    index_key: [u8; 32],
    /// AES-256-GCM key for records
    record_key: [u8; 32],
}

impl MasterKeys {
    /// 32-byte key for [`crate::compute_tag`].
    pub fn index_key(&self) -> &[u8; 32] {
        &self.index_key
    }

    /// 32-byte key for [`crate::encrypt_record`] and
    /// [`crate::decrypt_record`].
    pub fn record_key(&self) -> &[u8; 32] {
        &self.record_key
    }
}

impl std::fmt::Debug for MasterKeys {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MasterKeys").finish_non_exhaustive()
    }
}

impl Drop for MasterKeys {
    fn drop(&mut self) {
        self.index_key.zeroize();
        self.record_key.zeroize();
    }
}

/// Derive the index and record keys from a password and salt.
///
/// PBKDF2 stretches the password once; HKDF then expands two keys under
/// distinct labels, so knowing one key reveals nothing about the other.
///
/// # Security
///
/// - Deterministic: same (password, salt, params) always produce the same
///   keys
/// - Different salts produce unrelated keys for the same password
/// - The stretched secret never outlives this call
pub fn derive_keys(password: &[u8], salt: &Salt, params: KdfParams) -> MasterKeys {
    let mut stretched = Zeroizing::new([0u8; 32]);
    pbkdf2::pbkdf2_hmac::<Sha256>(
        password,
        salt.as_bytes(),
        params.iterations.get(),
        stretched.as_mut_slice(),
    );

    let hkdf = Hkdf::<Sha256>::new(None, stretched.as_slice());

    let mut index_key = [0u8; 32];
    let Ok(()) = hkdf.expand(INDEX_KEY_LABEL, &mut index_key) else {
        unreachable!("32 bytes is a valid HKDF-SHA256 output length");
    };

    let mut record_key = [0u8; 32];
    let Ok(()) = hkdf.expand(RECORD_KEY_LABEL, &mut record_key) else {
        unreachable!("32 bytes is a valid HKDF-SHA256 output length");
    };

    MasterKeys { index_key, record_key }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fast() -> KdfParams {
        KdfParams { iterations: NonZeroU32::MIN }
    }

    #[test]
    fn default_uses_100k_iterations() {
        assert_eq!(KdfParams::default().iterations.get(), 100_000);
    }

    #[test]
    fn derive_is_deterministic() {
        let salt = Salt::from_bytes([7; SALT_SIZE]);

        let a = derive_keys(b"master-password", &salt, fast());
        let b = derive_keys(b"master-password", &salt, fast());

        assert_eq!(a.index_key(), b.index_key(), "same inputs must produce same index key");
        assert_eq!(a.record_key(), b.record_key(), "same inputs must produce same record key");
    }

    #[test]
    fn index_and_record_keys_differ() {
        let keys = derive_keys(b"master-password", &Salt::from_bytes([0; SALT_SIZE]), fast());
        assert_ne!(keys.index_key(), keys.record_key());
    }

    #[test]
    fn different_salts_produce_different_keys() {
        let a = derive_keys(b"pw", &Salt::from_bytes([0; SALT_SIZE]), fast());
        let b = derive_keys(b"pw", &Salt::from_bytes([1; SALT_SIZE]), fast());

        assert_ne!(a.index_key(), b.index_key());
        assert_ne!(a.record_key(), b.record_key());
    }

    #[test]
    fn different_passwords_produce_different_keys() {
        let salt = Salt::from_bytes([3; SALT_SIZE]);
        let a = derive_keys(b"master-password", &salt, fast());
        let b = derive_keys(b"wrong-password", &salt, fast());

        assert_ne!(a.index_key(), b.index_key());
        assert_ne!(a.record_key(), b.record_key());
    }

    #[test]
    fn iteration_count_changes_keys() {
        let salt = Salt::from_bytes([3; SALT_SIZE]);
        let one = derive_keys(b"pw", &salt, fast());
        let two = derive_keys(b"pw", &salt, KdfParams { iterations: NonZeroU32::new(2).unwrap() });

        assert_ne!(one.record_key(), two.record_key());
    }

    #[test]
    fn works_with_empty_password() {
        let keys = derive_keys(b"", &Salt::from_bytes([0; SALT_SIZE]), fast());
        assert_eq!(keys.index_key().len(), 32);
    }

    #[test]
    fn salt_encoding_roundtrip() {
        let salt = Salt::from_bytes([0xAB; SALT_SIZE]);
        let parsed = Salt::from_encoded(&salt.encode()).unwrap();
        assert_eq!(parsed, salt);
    }

    #[test]
    fn short_salt_rejected() {
        let encoded = encoding::encode(&[0u8; 8]);
        assert_eq!(
            Salt::from_encoded(&encoded),
            Err(CryptoError::InvalidSaltLength { expected: SALT_SIZE, actual: 8 })
        );
    }

    #[test]
    fn long_salt_rejected() {
        let encoded = encoding::encode(&[0u8; 32]);
        assert!(matches!(
            Salt::from_encoded(&encoded),
            Err(CryptoError::InvalidSaltLength { actual: 32, .. })
        ));
    }

    #[test]
    fn malformed_salt_rejected() {
        assert!(matches!(
            Salt::from_encoded("%%%"),
            Err(CryptoError::InvalidEncoding { field: "salt", .. })
        ));
    }

    #[test]
    fn debug_does_not_print_key_bytes() {
        let keys = derive_keys(b"pw", &Salt::from_bytes([0; SALT_SIZE]), fast());
        assert_eq!(format!("{keys:?}"), "MasterKeys { .. }");
    }
}
