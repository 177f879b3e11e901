//! Record encryption using AES-256-GCM with domain binding
//!
//! All functions are pure; the IV must be provided by the caller. The
//! plaintext is `domain ‖ password`, so every record carries the domain it
//! was stored under.
//!
//! # Swap Resistance
//!
//! A record relocated under another domain's tag still passes AEAD
//! authentication. [`decrypt_record`] then compares the embedded domain
//! prefix with the domain that produced the tag and rejects the record
//! on mismatch.
//!
//! The prefix is split at the byte length of the queried domain. No length
//! or delimiter is encoded, so a relocated record whose plaintext happens to
//! start with the queried domain's bytes would be accepted. Records are only
//! ever written under the tag of their own domain, so this requires an
//! adversary who can already produce valid ciphertexts.

use aes_gcm::{
    Aes256Gcm, Nonce,
    aead::{Aead, KeyInit},
};
use serde::{Deserialize, Serialize};
use zeroize::Zeroizing;

use crate::encoding::{base64_array, base64_bytes};

/// AES-GCM nonce size (12 bytes)
pub const IV_SIZE: usize = 12;

/// GCM authentication tag size (16 bytes)
const GCM_TAG_SIZE: usize = 16;

/// One encrypted (domain, password) entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Record {
    /// The 12-byte AES-GCM nonce, unique per encryption
    #[serde(with = "base64_array")]
    pub iv: [u8; IV_SIZE],
    /// AES-GCM output over `domain ‖ password`, including the 16-byte tag
    #[serde(rename = "value", with = "base64_bytes")]
    pub ciphertext: Vec<u8>,
}

impl Record {
    /// Plaintext length (ciphertext length minus authentication tag).
    pub fn plaintext_len(&self) -> usize {
        self.ciphertext.len().saturating_sub(GCM_TAG_SIZE)
    }
}

/// Result of decrypting a record for a queried domain.
///
/// Authentication failures and domain mismatches are deliberately the same
/// `Miss`, so a caller cannot tell a tampered record from a relocated one.
#[derive(Debug, PartialEq, Eq)]
pub enum RecordOutcome {
    /// Record authenticated and is bound to the queried domain
    Found(Zeroizing<String>),
    /// Record is not usable for the queried domain
    Miss,
}

impl RecordOutcome {
    /// Recovered password, if any.
    pub fn into_password(self) -> Option<Zeroizing<String>> {
        match self {
            Self::Found(password) => Some(password),
            Self::Miss => None,
        }
    }
}

/// Encrypt `domain ‖ password` under `record_key`.
///
/// # Security
///
/// - Caller MUST provide a fresh random IV for every call; reusing an IV
///   under the same key destroys confidentiality
/// - No associated data; the domain binding lives inside the plaintext
pub fn encrypt_record(
    domain: &str,
    password: &str,
    record_key: &[u8; 32],
    iv: [u8; IV_SIZE],
) -> Record {
    let mut plaintext = Zeroizing::new(Vec::with_capacity(domain.len() + password.len()));
    plaintext.extend_from_slice(domain.as_bytes());
    plaintext.extend_from_slice(password.as_bytes());

    let cipher = Aes256Gcm::new(record_key.into());
    let Ok(ciphertext) = cipher.encrypt(Nonce::from_slice(&iv), plaintext.as_slice()) else {
        unreachable!("AES-256-GCM encryption cannot fail with valid inputs");
    };

    Record { iv, ciphertext }
}

/// Decrypt a record and check that it is bound to `expected_domain`.
///
/// Returns [`RecordOutcome::Miss`] if authentication fails, the embedded
/// domain differs from `expected_domain`, or the password is not UTF-8.
pub fn decrypt_record(
    record: &Record,
    record_key: &[u8; 32],
    expected_domain: &str,
) -> RecordOutcome {
    // Too short to embed the domain
    if record.plaintext_len() < expected_domain.len() {
        return RecordOutcome::Miss;
    }

    let cipher = Aes256Gcm::new(record_key.into());
    let Ok(plaintext) = cipher.decrypt(Nonce::from_slice(&record.iv), record.ciphertext.as_slice())
    else {
        return RecordOutcome::Miss;
    };
    let plaintext = Zeroizing::new(plaintext);

    let Some((domain, password)) = plaintext.split_at_checked(expected_domain.len()) else {
        return RecordOutcome::Miss;
    };
    if domain != expected_domain.as_bytes() {
        return RecordOutcome::Miss;
    }

    match std::str::from_utf8(password) {
        Ok(password) => RecordOutcome::Found(Zeroizing::new(password.to_owned())),
        Err(_) => RecordOutcome::Miss,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const KEY: [u8; 32] = [0x42; 32];

    fn found(outcome: RecordOutcome) -> String {
        match outcome {
            RecordOutcome::Found(password) => password.to_string(),
            RecordOutcome::Miss => panic!("expected record to decrypt"),
        }
    }

    #[test]
    fn encrypt_decrypt_roundtrip() {
        let record = encrypt_record("example.com", "securePassword123", &KEY, [0xAB; IV_SIZE]);
        let outcome = decrypt_record(&record, &KEY, "example.com");
        assert_eq!(found(outcome), "securePassword123");
    }

    #[test]
    fn empty_password_roundtrip() {
        let record = encrypt_record("example.com", "", &KEY, [0; IV_SIZE]);
        assert_eq!(found(decrypt_record(&record, &KEY, "example.com")), "");
    }

    #[test]
    fn multibyte_domain_roundtrip() {
        let record = encrypt_record("bücher.de", "pässwörd", &KEY, [1; IV_SIZE]);
        assert_eq!(found(decrypt_record(&record, &KEY, "bücher.de")), "pässwörd");
    }

    #[test]
    fn ciphertext_is_larger_than_plaintext() {
        let record = encrypt_record("a.com", "secret", &KEY, [0; IV_SIZE]);

        // domain + password + 16-byte tag
        assert_eq!(record.ciphertext.len(), 5 + 6 + GCM_TAG_SIZE);
        assert_eq!(record.plaintext_len(), 11);
    }

    #[test]
    fn record_shorter_than_domain_misses() {
        let record = encrypt_record("a.com", "", &KEY, [0; IV_SIZE]);
        assert_eq!(record.plaintext_len(), 5);

        let found = decrypt_record(&record, &KEY, "a.com");
        assert_eq!(found.into_password().as_deref().map(String::as_str), Some(""));
        assert_eq!(decrypt_record(&record, &KEY, "longer.com"), RecordOutcome::Miss);

        let stub = Record { iv: [0; IV_SIZE], ciphertext: vec![0; GCM_TAG_SIZE - 1] };
        assert_eq!(stub.plaintext_len(), 0);
        assert_eq!(decrypt_record(&stub, &KEY, "a.com"), RecordOutcome::Miss);
    }

    #[test]
    fn ciphertext_hides_domain_and_password() {
        let record = encrypt_record("example.com", "securePassword123", &KEY, [0; IV_SIZE]);
        let haystack = String::from_utf8_lossy(&record.ciphertext);
        assert!(!haystack.contains("example"));
        assert!(!haystack.contains("secure"));
    }

    #[test]
    fn different_ivs_produce_different_ciphertexts() {
        let a = encrypt_record("example.com", "pw", &KEY, [0x00; IV_SIZE]);
        let b = encrypt_record("example.com", "pw", &KEY, [0xFF; IV_SIZE]);
        assert_ne!(a.ciphertext, b.ciphertext);
    }

    #[test]
    fn wrong_key_misses() {
        let record = encrypt_record("example.com", "pw", &KEY, [0; IV_SIZE]);
        assert_eq!(decrypt_record(&record, &[0x43; 32], "example.com"), RecordOutcome::Miss);
    }

    #[test]
    fn tampered_ciphertext_misses() {
        let mut record = encrypt_record("example.com", "pw", &KEY, [0; IV_SIZE]);
        record.ciphertext[0] ^= 0x01;
        assert_eq!(decrypt_record(&record, &KEY, "example.com"), RecordOutcome::Miss);
    }

    #[test]
    fn tampered_iv_misses() {
        let mut record = encrypt_record("example.com", "pw", &KEY, [0; IV_SIZE]);
        record.iv[11] ^= 0x80;
        assert_eq!(decrypt_record(&record, &KEY, "example.com"), RecordOutcome::Miss);
    }

    #[test]
    fn truncated_ciphertext_misses() {
        let mut record = encrypt_record("example.com", "pw", &KEY, [0; IV_SIZE]);
        record.ciphertext.truncate(4);
        assert_eq!(decrypt_record(&record, &KEY, "example.com"), RecordOutcome::Miss);
    }

    #[test]
    fn record_for_other_domain_misses() {
        let record = encrypt_record("example.com", "securePassword123", &KEY, [0; IV_SIZE]);
        assert_eq!(decrypt_record(&record, &KEY, "test.com"), RecordOutcome::Miss);
    }

    #[test]
    fn domain_longer_than_plaintext_misses() {
        let record = encrypt_record("a.io", "x", &KEY, [0; IV_SIZE]);
        assert_eq!(decrypt_record(&record, &KEY, "much-longer-domain.com"), RecordOutcome::Miss);
    }

    #[test]
    fn shared_prefix_of_same_length_is_accepted() {
        // Splitting at the queried length without a delimiter: a record for
        // "example.com" carrying password "xyz" looks, to a query for
        // "example.comx", like password "yz".
        let record = encrypt_record("example.com", "xyz", &KEY, [0; IV_SIZE]);
        assert_eq!(found(decrypt_record(&record, &KEY, "example.comx")), "yz");
    }

    #[test]
    fn record_serializes_with_iv_and_value() {
        let record = encrypt_record("a.com", "pw", &KEY, [0; IV_SIZE]);
        let json = serde_json::to_value(&record).unwrap();

        assert_eq!(json["iv"], "AAAAAAAAAAAAAAAA");
        assert!(json["value"].is_string());
        assert_eq!(json.as_object().unwrap().len(), 2);
    }

    #[test]
    fn record_rejects_unknown_fields() {
        let json = r#"{"iv":"AAAAAAAAAAAAAAAA","value":"","extra":1}"#;
        assert!(serde_json::from_str::<Record>(json).is_err());
    }

    #[test]
    fn record_rejects_short_iv() {
        let json = r#"{"iv":"AAAA","value":""}"#;
        assert!(serde_json::from_str::<Record>(json).is_err());
    }

    #[test]
    fn into_password_maps_outcomes() {
        let record = encrypt_record("a.com", "pw", &KEY, [0; IV_SIZE]);
        let password = decrypt_record(&record, &KEY, "a.com").into_password().unwrap();
        assert_eq!(password.as_str(), "pw");
        assert!(RecordOutcome::Miss.into_password().is_none());
    }
}
