//! Keychain Core
//!
//! A password keychain that stores domain→password entries under a single
//! master password. The serialized store hides which domains are present,
//! resists record swapping, and detects tampering when checked against a
//! trusted checksum.
//!
//! # Architecture
//!
//! ```text
//! Keychain::init / Keychain::load
//!        │  PBKDF2 + HKDF (once per instance)
//!        ▼
//! MasterKeys { index_key, record_key }
//!        │
//!        ├─ set:    tag = HMAC(domain), store[tag] = AES-GCM(domain ‖ password)
//!        ├─ get:    tag = HMAC(domain), decrypt, check embedded domain
//!        ├─ remove: tag = HMAC(domain), delete
//!        └─ dump:   canonical JSON + SHA-256 checksum + salt
//! ```
//!
//! # Failure Model
//!
//! - `load` fails loudly on checksum mismatch or malformed input
//! - `get` fails quietly: absent, tampered, relocated and wrong-password
//!   entries all read as `None`
//! - A wrong master password is only visible through lookups
//!
//! # Example
//!
//! ```no_run
//! use keychain_core::Keychain;
//!
//! # fn main() -> Result<(), keychain_core::KeychainError> {
//! let mut keychain = Keychain::init("master-password", None)?;
//! keychain.set("example.com", "securePassword123");
//!
//! let (repr, checksum, salt) = keychain.dump().into_parts();
//! let restored = Keychain::load("master-password", &repr, Some(&checksum), &salt)?;
//! assert_eq!(restored.get("example.com").as_deref().map(String::as_str), Some("securePassword123"));
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![deny(missing_docs)]

pub mod config;
pub mod env;
pub mod envelope;
pub mod error;
pub mod event;
pub mod keychain;
pub mod system_env;

pub use config::KeychainConfig;
pub use env::Environment;
pub use envelope::{Dump, Store};
pub use error::KeychainError;
pub use event::{EventSink, KeychainEvent, NoopSink, Operation, Outcome, TracingSink};
pub use keychain::Keychain;
pub use keychain_crypto::{KdfParams, Salt};
pub use system_env::SystemEnv;
