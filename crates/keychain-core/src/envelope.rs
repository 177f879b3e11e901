//! Serialized store format.
//!
//! ```text
//! { "kvs": { "<tag>": { "iv": "<base64>", "value": "<base64>" }, ... } }
//! ```
//!
//! `kvs` is ordered by tag, so equal stores serialize to identical strings
//! and therefore identical checksums.

use std::collections::BTreeMap;

use keychain_crypto::{Record, Tag};
use serde::{Deserialize, Serialize};

use crate::error::KeychainError;

/// In-memory store: blinded tag to encrypted record.
pub type Store = BTreeMap<Tag, Record>;

#[derive(Serialize)]
struct EnvelopeRef<'a> {
    kvs: &'a Store,
}

// Unknown top-level fields are ignored; records themselves reject them.
#[derive(Deserialize)]
struct EnvelopeOwned {
    kvs: Option<Store>,
}

/// Serialize a store into its canonical envelope string.
pub fn encode_store(store: &Store) -> String {
    let Ok(repr) = serde_json::to_string(&EnvelopeRef { kvs: store }) else {
        unreachable!("string-keyed maps of plain records always serialize");
    };
    repr
}

/// Parse an envelope string back into a store.
///
/// # Errors
///
/// - `InvalidFormat`: not JSON, `kvs` missing or null, or a record with
///   malformed fields
pub fn decode_store(repr: &str) -> Result<Store, KeychainError> {
    let envelope: EnvelopeOwned = serde_json::from_str(repr)
        .map_err(|e| KeychainError::InvalidFormat { reason: e.to_string() })?;

    envelope
        .kvs
        .ok_or_else(|| KeychainError::InvalidFormat { reason: "missing `kvs` field".to_string() })
}

/// Everything needed to restore a keychain.
///
/// `repr` and `salt` are persisted together; `checksum` should be kept
/// somewhere the storage backend cannot rewrite.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dump {
    /// Canonical serialized store
    pub repr: String,
    /// Base64 SHA-256 of `repr`
    pub checksum: String,
    /// Base64 salt the keys were derived from
    pub salt: String,
}

impl Dump {
    /// Split into `(repr, checksum, salt)`.
    pub fn into_parts(self) -> (String, String, String) {
        (self.repr, self.checksum, self.salt)
    }
}
