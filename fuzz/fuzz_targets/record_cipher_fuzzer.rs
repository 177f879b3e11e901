//! Fuzz target for record encryption and domain binding
//!
//! # Strategy
//!
//! - Arbitrary domains and passwords (empty, multibyte, long)
//! - Arbitrary keys and IVs
//! - Single-byte corruption of IV or ciphertext
//! - Queries for a different domain
//!
//! # Invariants
//!
//! - Encrypt/decrypt roundtrip succeeds for the original domain
//! - Any corruption yields `Miss`
//! - A different domain only matches when it is a byte prefix of
//!   `domain ‖ password`

#![no_main]

use arbitrary::Arbitrary;
use keychain_crypto::{
    IV_SIZE, RecordOutcome, compute_tag, decrypt_record, encrypt_record,
};
use libfuzzer_sys::fuzz_target;

#[derive(Debug, Arbitrary)]
struct RecordScenario {
    domain: String,
    password: String,
    other_domain: String,
    key: [u8; 32],
    iv: [u8; IV_SIZE],
    corrupt_at: u16,
    corrupt_mask: u8,
}

fuzz_target!(|scenario: RecordScenario| {
    let record = encrypt_record(&scenario.domain, &scenario.password, &scenario.key, scenario.iv);

    // INVARIANT 1: roundtrip
    match decrypt_record(&record, &scenario.key, &scenario.domain) {
        RecordOutcome::Found(password) => {
            assert_eq!(password.as_str(), scenario.password, "roundtrip must recover password")
        },
        RecordOutcome::Miss => panic!("record must decrypt for its own domain"),
    }

    // INVARIANT 2: corruption is always rejected
    if scenario.corrupt_mask != 0 {
        let mut corrupted = record.clone();
        let total = IV_SIZE + corrupted.ciphertext.len();
        let at = scenario.corrupt_at as usize % total;
        if at < IV_SIZE {
            corrupted.iv[at] ^= scenario.corrupt_mask;
        } else {
            corrupted.ciphertext[at - IV_SIZE] ^= scenario.corrupt_mask;
        }
        assert_eq!(
            decrypt_record(&corrupted, &scenario.key, &scenario.domain),
            RecordOutcome::Miss,
            "corrupted record must miss"
        );
    }

    // INVARIANT 3: other domains only match through a shared byte prefix
    let plaintext = format!("{}{}", scenario.domain, scenario.password);
    let outcome = decrypt_record(&record, &scenario.key, &scenario.other_domain);
    if !plaintext.as_bytes().starts_with(scenario.other_domain.as_bytes()) {
        assert_eq!(outcome, RecordOutcome::Miss, "unrelated domain must miss");
    }

    // INVARIANT 4: tags are deterministic
    assert_eq!(
        compute_tag(&scenario.domain, &scenario.key),
        compute_tag(&scenario.domain, &scenario.key)
    );
});
