//! The keychain facade.
//!
//! Owns the derived keys and the tag→record store, and composes the
//! primitives from `keychain_crypto` into `init`, `set`, `get`, `remove`,
//! `dump` and `load`.
//!
//! # Invariants
//!
//! - Keys are derived once per instance and never change
//! - Every stored record sits under the tag of the domain it embeds
//! - `get` never distinguishes "absent" from "present but unusable"
//! - Failed operations leave the store untouched

use std::sync::Arc;

use keychain_crypto::{
    MasterKeys, Record, RecordOutcome, SALT_SIZE, Salt, checksum, compute_tag, decrypt_record,
    derive_keys, encrypt_record, verify_checksum,
};
use zeroize::Zeroizing;

use crate::{
    config::KeychainConfig,
    env::Environment,
    envelope::{Dump, Store, decode_store, encode_store},
    error::KeychainError,
    event::{EventSink, KeychainEvent, Operation, Outcome, TracingSink},
    system_env::SystemEnv,
};

/// Encrypted domain→password store.
///
/// Not internally synchronized: `set` and `remove` take `&mut self`, so
/// sharing one keychain across threads requires caller-side locking.
pub struct Keychain<E: Environment = SystemEnv> {
    keys: MasterKeys,
    salt: Salt,
    store: Store,
    env: E,
    events: Arc<dyn EventSink>,
}

impl Keychain<SystemEnv> {
    /// Create an empty keychain with the default configuration.
    ///
    /// Generates a fresh salt unless `salt` (base64, as returned by
    /// [`Keychain::dump`]) is given.
    ///
    /// # Errors
    ///
    /// - `InvalidSalt`: `salt` is not base64 of exactly 16 bytes
    pub fn init(password: &str, salt: Option<&str>) -> Result<Self, KeychainError> {
        Self::init_with(password, salt, KeychainConfig::default(), SystemEnv::new())
    }

    /// Restore a keychain from [`Keychain::dump`] output with the default
    /// configuration.
    ///
    /// See [`Keychain::load_with`].
    pub fn load(
        password: &str,
        repr: &str,
        trusted_checksum: Option<&str>,
        salt: &str,
    ) -> Result<Self, KeychainError> {
        Self::load_with(
            password,
            repr,
            trusted_checksum,
            salt,
            KeychainConfig::default(),
            SystemEnv::new(),
        )
    }

    /// Restore a keychain from a [`Dump`], verifying its checksum when
    /// `verify` is set.
    pub fn load_dump(password: &str, dump: &Dump, verify: bool) -> Result<Self, KeychainError> {
        let trusted = verify.then_some(dump.checksum.as_str());
        Self::load(password, &dump.repr, trusted, &dump.salt)
    }
}

impl<E: Environment> Keychain<E> {
    /// Create an empty keychain with explicit configuration and randomness.
    ///
    /// Events go to a [`TracingSink`]; see [`Keychain::init_with_sink`].
    ///
    /// # Errors
    ///
    /// - `InvalidSalt`: `salt` is not base64 of exactly 16 bytes
    pub fn init_with(
        password: &str,
        salt: Option<&str>,
        config: KeychainConfig,
        env: E,
    ) -> Result<Self, KeychainError> {
        Self::init_with_sink(password, salt, config, env, Arc::new(TracingSink))
    }

    /// Create an empty keychain that reports every event, including its own
    /// `Init`, to `events`.
    ///
    /// # Errors
    ///
    /// - `InvalidSalt`: `salt` is not base64 of exactly 16 bytes
    pub fn init_with_sink(
        password: &str,
        salt: Option<&str>,
        config: KeychainConfig,
        env: E,
        events: Arc<dyn EventSink>,
    ) -> Result<Self, KeychainError> {
        let salt = match salt {
            Some(encoded) => Salt::from_encoded(encoded).inspect_err(|_| {
                events.record(&KeychainEvent::new(Operation::Init, Outcome::Failed));
            })?,
            None => Salt::from_bytes(env.random_array::<SALT_SIZE>()),
        };

        let keychain = Self::with_store(password, salt, Store::new(), config, env, events);
        keychain.emit(Operation::Init, Outcome::Ok);
        Ok(keychain)
    }

    /// Restore a keychain with explicit configuration and randomness.
    ///
    /// When `trusted_checksum` is given, `repr` must hash to it. When it is
    /// `None` the integrity check is skipped entirely; per-record domain
    /// binding still rejects relocated records at lookup time.
    ///
    /// The password is not checked here. A wrong password yields a
    /// keychain whose lookups all return `None`.
    ///
    /// Events go to a [`TracingSink`]; see [`Keychain::load_with_sink`].
    ///
    /// # Errors
    ///
    /// - `IntegrityFailure`: checksum given and does not match `repr`
    /// - `InvalidFormat`: `repr` is not an envelope with a `kvs` field
    /// - `InvalidSalt`: `salt` is not base64 of exactly 16 bytes
    pub fn load_with(
        password: &str,
        repr: &str,
        trusted_checksum: Option<&str>,
        salt: &str,
        config: KeychainConfig,
        env: E,
    ) -> Result<Self, KeychainError> {
        Self::load_with_sink(
            password,
            repr,
            trusted_checksum,
            salt,
            config,
            env,
            Arc::new(TracingSink),
        )
    }

    /// Restore a keychain that reports every event, including the `Load`
    /// outcome, to `events`.
    ///
    /// See [`Keychain::load_with`] for the checks performed.
    pub fn load_with_sink(
        password: &str,
        repr: &str,
        trusted_checksum: Option<&str>,
        salt: &str,
        config: KeychainConfig,
        env: E,
        events: Arc<dyn EventSink>,
    ) -> Result<Self, KeychainError> {
        match Self::restore(repr, trusted_checksum, salt) {
            Ok((store, salt)) => {
                let keychain = Self::with_store(password, salt, store, config, env, events);
                keychain.emit(Operation::Load, Outcome::Ok);
                Ok(keychain)
            },
            Err(err) => {
                events.record(&KeychainEvent::new(Operation::Load, Outcome::Failed));
                Err(err)
            },
        }
    }

    fn restore(
        repr: &str,
        trusted_checksum: Option<&str>,
        salt: &str,
    ) -> Result<(Store, Salt), KeychainError> {
        if trusted_checksum.is_some_and(|trusted| !verify_checksum(repr.as_bytes(), trusted)) {
            return Err(KeychainError::IntegrityFailure);
        }

        let store = decode_store(repr)?;
        let salt = Salt::from_encoded(salt)?;
        Ok((store, salt))
    }

    fn with_store(
        password: &str,
        salt: Salt,
        store: Store,
        config: KeychainConfig,
        env: E,
        events: Arc<dyn EventSink>,
    ) -> Self {
        let keys = derive_keys(password.as_bytes(), &salt, config.kdf);
        Self { keys, salt, store, env, events }
    }

    /// Replace the event sink for subsequent operations.
    ///
    /// Construction events already went to the sink given at construction
    /// ([`TracingSink`] unless set through `init_with_sink`/`load_with_sink`).
    #[must_use]
    pub fn with_event_sink(mut self, sink: Arc<dyn EventSink>) -> Self {
        self.events = sink;
        self
    }

    /// Store `password` for `domain`, replacing any previous entry.
    ///
    /// Every call encrypts under a fresh IV, including overwrites.
    pub fn set(&mut self, domain: &str, password: &str) {
        let tag = compute_tag(domain, self.keys.index_key());
        let iv = self.env.random_array();
        let record = encrypt_record(domain, password, self.keys.record_key(), iv);

        self.store.insert(tag, record);
        self.emit(Operation::Set, Outcome::Ok);
    }

    /// Look up the password for `domain`.
    ///
    /// Returns `None` when no entry exists and when the entry fails
    /// authentication or belongs to a different domain. The two cases are
    /// indistinguishable to the caller.
    pub fn get(&self, domain: &str) -> Option<Zeroizing<String>> {
        let tag = compute_tag(domain, self.keys.index_key());
        let Some(record) = self.store.get(&tag) else {
            self.emit(Operation::Get, Outcome::NotFound);
            return None;
        };

        match decrypt_record(record, self.keys.record_key(), domain) {
            RecordOutcome::Found(password) => {
                self.emit(Operation::Get, Outcome::Found);
                Some(password)
            },
            RecordOutcome::Miss => {
                self.emit(Operation::Get, Outcome::Rejected);
                None
            },
        }
    }

    /// Remove the entry for `domain`. Returns whether one existed.
    pub fn remove(&mut self, domain: &str) -> bool {
        let tag = compute_tag(domain, self.keys.index_key());
        let removed = self.store.remove(&tag).is_some();

        self.emit(Operation::Remove, if removed { Outcome::Found } else { Outcome::NotFound });
        removed
    }

    /// Serialize the store together with its checksum and salt.
    pub fn dump(&self) -> Dump {
        let repr = encode_store(&self.store);
        let checksum = checksum(repr.as_bytes());

        self.emit(Operation::Dump, Outcome::Ok);
        Dump { repr, checksum, salt: self.salt.encode() }
    }

    /// Salt the keys were derived from.
    pub fn salt(&self) -> &Salt {
        &self.salt
    }

    /// Number of stored entries.
    pub fn len(&self) -> usize {
        self.store.len()
    }

    /// Check if the keychain holds no entries.
    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }

    /// Stored records in tag order.
    pub fn records(&self) -> impl Iterator<Item = &Record> {
        self.store.values()
    }

    fn emit(&self, operation: Operation, outcome: Outcome) {
        self.events.record(&KeychainEvent::new(operation, outcome));
    }
}

impl<E: Environment> std::fmt::Debug for Keychain<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Keychain")
            .field("salt", &self.salt.encode())
            .field("entries", &self.store.len())
            .finish_non_exhaustive()
    }
}
