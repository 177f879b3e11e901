//! Fuzz target for loading serialized stores
//!
//! Feeds adversarial envelope text, checksums and salts into
//! `Keychain::load_with`.
//!
//! # Strategy
//!
//! - Raw arbitrary text as the envelope (mostly malformed JSON)
//! - Structured envelopes with arbitrary tags, IVs and ciphertexts
//! - Correct, corrupted and absent checksums
//!
//! # Invariants
//!
//! - Loading never panics
//! - A supplied checksum that does not match always fails with
//!   `IntegrityFailure`
//! - A loaded keychain never returns a password for a forged record

#![no_main]

use std::num::NonZeroU32;

use arbitrary::Arbitrary;
use keychain_core::{
    Environment, KdfParams, Keychain, KeychainConfig, KeychainError, NoopSink,
};
use keychain_crypto::{checksum, encoding};
use libfuzzer_sys::fuzz_target;

#[derive(Clone)]
struct FixedEnv;

impl Environment for FixedEnv {
    fn random_bytes(&self, buffer: &mut [u8]) {
        buffer.fill(0x5A);
    }
}

#[derive(Debug, Arbitrary)]
enum Envelope {
    Raw(String),
    Structured(Vec<(Vec<u8>, Vec<u8>, Vec<u8>)>),
}

impl Envelope {
    fn render(&self) -> String {
        match self {
            Envelope::Raw(text) => text.clone(),
            Envelope::Structured(records) => {
                let body: Vec<String> = records
                    .iter()
                    .map(|(tag, iv, value)| {
                        format!(
                            "\"{}\":{{\"iv\":\"{}\",\"value\":\"{}\"}}",
                            encoding::encode(tag),
                            encoding::encode(iv),
                            encoding::encode(value)
                        )
                    })
                    .collect();
                format!("{{\"kvs\":{{{}}}}}", body.join(","))
            },
        }
    }
}

#[derive(Debug, Arbitrary)]
enum Checksum {
    Absent,
    Correct,
    Arbitrary(String),
}

#[derive(Debug, Arbitrary)]
struct LoadScenario {
    envelope: Envelope,
    checksum: Checksum,
    salt: [u8; 16],
    domains: Vec<String>,
}

fuzz_target!(|scenario: LoadScenario| {
    let repr = scenario.envelope.render();
    let correct = checksum(repr.as_bytes());
    let trusted = match &scenario.checksum {
        Checksum::Absent => None,
        Checksum::Correct => Some(correct.as_str()),
        Checksum::Arbitrary(text) => Some(text.as_str()),
    };
    let config = KeychainConfig { kdf: KdfParams { iterations: NonZeroU32::MIN } };

    // INVARIANT 1: load never panics
    let result =
        Keychain::load_with("fuzz", &repr, trusted, &encoding::encode(&scenario.salt), config, FixedEnv);

    // INVARIANT 2: mismatched checksum is always an integrity failure
    if let Some(trusted) = trusted {
        if trusted != correct {
            assert!(
                matches!(result, Err(KeychainError::IntegrityFailure)),
                "mismatched checksum must fail integrity"
            );
            return;
        }
    }

    let Ok(keychain) = result else {
        return;
    };
    let keychain = keychain.with_event_sink(std::sync::Arc::new(NoopSink));

    // INVARIANT 3: forged records never decrypt
    for domain in &scenario.domains {
        assert!(keychain.get(domain).is_none(), "forged record must not decrypt");
    }
});
