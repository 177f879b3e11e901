//! Blinded domain index using HMAC-SHA256
//!
//! A tag is the base64 HMAC of the domain's UTF-8 bytes under the index key.
//! Tags are stable lookup keys for the store, and reveal nothing about the
//! domain to anyone without the index key.

use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha2::Sha256;

use crate::encoding;

type HmacSha256 = Hmac<Sha256>;

/// Opaque, encoded lookup tag for one domain.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Tag(String);

impl Tag {
    /// Encoded tag text, as it appears in the serialized store.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Tag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Compute the blinded tag for `domain`.
///
/// # Security
///
/// - Deterministic: the same domain under the same key always maps to the
///   same tag
/// - Different domains collide only with negligible probability
/// - Unforgeable without `index_key`
pub fn compute_tag(domain: &str, index_key: &[u8; 32]) -> Tag {
    let Ok(mut mac) = HmacSha256::new_from_slice(index_key) else {
        unreachable!("HMAC accepts keys of any length");
    };
    mac.update(domain.as_bytes());
    Tag(encoding::encode(&mac.finalize().into_bytes()))
}
