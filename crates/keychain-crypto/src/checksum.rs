//! Whole-store integrity checksum
//!
//! SHA-256 over the exact serialized store bytes, base64 encoded. The
//! checksum covers ciphertext only, so it is independent of the master
//! password.

use sha2::{Digest, Sha256};

use crate::encoding;

/// Compute the encoded checksum of a serialized store.
pub fn checksum(serialized: &[u8]) -> String {
    encoding::encode(&Sha256::digest(serialized))
}

/// Recompute the checksum and compare it with a trusted one.
///
/// Comparison is byte-for-byte on the encoded form, so any change to either
/// the serialized store or the trusted checksum fails verification.
pub fn verify_checksum(serialized: &[u8], trusted: &str) -> bool {
    checksum(serialized).as_bytes() == trusted.as_bytes()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matches_sha256_of_abc() {
        let digest = encoding::decode("checksum", &checksum(b"abc")).unwrap();
        assert_eq!(
            hex::encode(digest),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn checksum_is_deterministic() {
        assert_eq!(checksum(b"{\"kvs\":{}}"), checksum(b"{\"kvs\":{}}"));
    }

    #[test]
    fn verify_accepts_matching_checksum() {
        let data = b"{\"kvs\":{}}";
        assert!(verify_checksum(data, &checksum(data)));
    }

    #[test]
    fn verify_rejects_modified_data() {
        let data = b"{\"kvs\":{}}".to_vec();
        let trusted = checksum(&data);

        for bit in 0..data.len() * 8 {
            let mut tampered = data.clone();
            tampered[bit / 8] ^= 1 << (bit % 8);
            assert!(!verify_checksum(&tampered, &trusted), "bit {bit} flip must be detected");
        }
    }

    #[test]
    fn verify_rejects_modified_checksum() {
        let data = b"{\"kvs\":{}}";
        let mut trusted = checksum(data).into_bytes();
        trusted[0] ^= 0x01;
        let trusted = String::from_utf8(trusted).unwrap();

        assert!(!verify_checksum(data, &trusted));
    }

    #[test]
    fn verify_rejects_empty_checksum() {
        assert!(!verify_checksum(b"data", ""));
    }
}
