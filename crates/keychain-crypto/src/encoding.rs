//! Base64 transcoding for persisted byte fields
//!
//! Every byte field in the serialized store (`iv`, `value`, checksum, salt,
//! tags) uses standard base64 with padding. The serde helpers let typed
//! byte fields round-trip through JSON strings.

use base64::{Engine as _, engine::general_purpose::STANDARD};

use crate::error::CryptoError;

/// Encode bytes as standard padded base64.
pub fn encode(bytes: &[u8]) -> String {
    STANDARD.encode(bytes)
}

/// Decode standard padded base64.
///
/// `field` names the value in the returned error.
pub fn decode(field: &'static str, text: &str) -> Result<Vec<u8>, CryptoError> {
    STANDARD
        .decode(text)
        .map_err(|e| CryptoError::InvalidEncoding { field, reason: e.to_string() })
}

/// Serde adapter for `Vec<u8>` fields stored as base64 strings.
pub mod base64_bytes {
    use serde::{Deserialize, Deserializer, Serializer, de::Error as _};

    /// Serialize bytes as a base64 string.
    pub fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&super::encode(bytes))
    }

    /// Deserialize a base64 string into bytes.
    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let text = String::deserialize(deserializer)?;
        super::decode("bytes", &text).map_err(D::Error::custom)
    }
}

/// Serde adapter for fixed-size byte arrays stored as base64 strings.
///
/// Deserialization rejects strings that decode to any other length.
pub mod base64_array {
    use serde::{Deserialize, Deserializer, Serializer, de::Error as _};

    /// Serialize a fixed-size array as a base64 string.
    pub fn serialize<S: Serializer, const N: usize>(
        bytes: &[u8; N],
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&super::encode(bytes))
    }

    /// Deserialize a base64 string into a fixed-size array.
    pub fn deserialize<'de, D: Deserializer<'de>, const N: usize>(
        deserializer: D,
    ) -> Result<[u8; N], D::Error> {
        let text = String::deserialize(deserializer)?;
        let bytes = super::decode("array", &text).map_err(D::Error::custom)?;
        let len = bytes.len();
        bytes
            .try_into()
            .map_err(|_| D::Error::custom(format!("expected {N} bytes, got {len}")))
    }
}
