//! Error types for keychain primitives

use thiserror::Error;

/// Errors from keychain primitive operations.
///
/// Every variant describes malformed caller input. Cryptographic failures
/// during record decryption are not errors; they surface as
/// [`crate::RecordOutcome::Miss`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CryptoError {
    /// Salt decoded to the wrong number of bytes
    #[error("invalid salt length: expected {expected}, got {actual}")]
    InvalidSaltLength {
        /// Required salt length
        expected: usize,
        /// Length that was supplied
        actual: usize,
    },

    /// A byte field was not valid base64
    #[error("invalid {field} encoding: {reason}")]
    InvalidEncoding {
        /// Which field failed to decode
        field: &'static str,
        /// Decoder error message
        reason: String,
    },
}
