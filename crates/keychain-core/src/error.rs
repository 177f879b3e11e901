//! Error types for the keychain facade.
//!
//! Only `load` and the constructors can fail. A lookup that cannot be
//! authenticated is not an error: `get` reports it as absent, so callers
//! (and anyone watching them) learn nothing about why.

use keychain_crypto::CryptoError;
use thiserror::Error;

/// Errors that can occur while creating or loading a keychain.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum KeychainError {
    /// Trusted checksum did not match the serialized store
    #[error("integrity check failed: checksum mismatch")]
    IntegrityFailure,

    /// Serialized store is not a valid envelope
    #[error("invalid format: {reason}")]
    InvalidFormat {
        /// What was wrong with the input
        reason: String,
    },

    /// Salt was malformed
    #[error("invalid salt: {0}")]
    InvalidSalt(#[from] CryptoError),
}

impl KeychainError {
    /// Returns true if the caller supplied malformed configuration rather
    /// than malformed data.
    pub fn is_configuration_error(&self) -> bool {
        matches!(self, Self::InvalidSalt(_))
    }

    /// Returns true if retrying the same call could succeed.
    ///
    /// Always false: a corrupted blob, a bad checksum or a malformed salt
    /// fail identically on every attempt.
    pub fn is_retryable(&self) -> bool {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn salt_errors_are_configuration_errors() {
        let err = KeychainError::from(CryptoError::InvalidSaltLength { expected: 16, actual: 4 });
        assert!(err.is_configuration_error());
        assert_eq!(err.to_string(), "invalid salt: invalid salt length: expected 16, got 4");
    }

    #[test]
    fn data_errors_are_not_configuration_errors() {
        assert!(!KeychainError::IntegrityFailure.is_configuration_error());
        assert!(
            !KeychainError::InvalidFormat { reason: "missing kvs".to_string() }
                .is_configuration_error()
        );
    }

    #[test]
    fn nothing_is_retryable() {
        assert!(!KeychainError::IntegrityFailure.is_retryable());
        assert!(!KeychainError::InvalidFormat { reason: String::new() }.is_retryable());
    }

    #[test]
    fn error_display() {
        assert_eq!(
            KeychainError::IntegrityFailure.to_string(),
            "integrity check failed: checksum mismatch"
        );
        assert_eq!(
            KeychainError::InvalidFormat { reason: "missing `kvs`".to_string() }.to_string(),
            "invalid format: missing `kvs`"
        );
    }
}
