//! Production Environment implementation using the OS RNG.
//!
//! `SystemEnv` draws every salt and IV from getrandom. Output is truly
//! random and not reproducible.

use crate::env::Environment;

/// Production environment using cryptographic RNG.
///
/// # Security
///
/// The RNG uses getrandom which provides OS-level cryptographic randomness
/// (e.g., /dev/urandom on Linux, `BCryptGenRandom` on Windows).
///
/// # Panics
///
/// Panics if the OS RNG fails. A keychain without functioning randomness
/// would reuse IVs, so continuing is never an option.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemEnv;

impl SystemEnv {
    /// Create a new system environment.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl Environment for SystemEnv {
    #[allow(clippy::expect_used)]
    fn random_bytes(&self, buffer: &mut [u8]) {
        getrandom::fill(buffer)
            .expect("invariant: OS RNG failure is unrecoverable - IVs cannot be generated safely");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn system_env_random_bytes_are_random() {
        let env = SystemEnv::new();

        let a: [u8; 32] = env.random_array();
        let b: [u8; 32] = env.random_array();

        // Extremely unlikely to be equal if random
        assert_ne!(a, b, "Random bytes should differ");
    }

    #[test]
    fn system_env_random_bytes_fills_buffer() {
        let env = SystemEnv::new();

        let mut bytes = [0u8; 64];
        env.random_bytes(&mut bytes);

        let non_zero_count = bytes.iter().filter(|&&b| b != 0).count();
        assert!(non_zero_count > 32, "Most bytes should be non-zero");
    }
}
