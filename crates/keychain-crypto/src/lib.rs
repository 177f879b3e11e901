//! Keychain Cryptographic Primitives
//!
//! Cryptographic building blocks for the blinded keychain. Pure functions
//! with deterministic outputs. Callers provide the salt and every IV, so
//! the same inputs always reproduce the same bytes in tests.
//!
//! # Key Hierarchy
//!
//! ```text
//! Master password + 16-byte salt
//!        │
//!        ▼
//! PBKDF2-HMAC-SHA256 (100,000 iterations) → stretched secret
//!        │
//!        ├─ HKDF "index"  → index key  → HMAC-SHA256(domain) → tag
//!        │
//!        └─ HKDF "record" → record key → AES-256-GCM(domain ‖ password)
//! ```
//!
//! The stretched secret is zeroized as soon as both keys are expanded.
//!
//! # Security
//!
//! Blinded index:
//! - Tags are HMAC outputs; without the index key an observer cannot
//!   link a tag to a domain or forge a tag for a chosen domain
//!
//! Record binding:
//! - The domain is encrypted together with the password
//! - A record moved under another domain's tag still authenticates, but its
//!   embedded domain no longer matches, and the lookup misses
//! - AEAD failures and binding failures collapse into one `Miss` outcome
//!
//! Store integrity:
//! - SHA-256 checksum over the exact serialized store detects any bit flip
//!   when the caller supplies a trusted checksum

#![forbid(unsafe_code)]
#![deny(missing_docs)]

pub mod checksum;
pub mod derivation;
pub mod encoding;
pub mod error;
pub mod index;
pub mod record;

pub use checksum::{checksum, verify_checksum};
pub use derivation::{KdfParams, MasterKeys, PBKDF2_ITERATIONS, SALT_SIZE, Salt, derive_keys};
pub use error::CryptoError;
pub use index::{Tag, compute_tag};
pub use record::{IV_SIZE, Record, RecordOutcome, decrypt_record, encrypt_record};
