//! Environment abstraction for deterministic testing.
//!
//! Decouples keychain logic from the OS random number generator. Production
//! code uses [`crate::SystemEnv`]; tests plug in a seeded generator so that
//! salts and IVs are reproducible.

/// Source of randomness for salts and IVs.
///
/// # Safety
///
/// Implementations MUST guarantee:
///
/// - `random_bytes()` uses cryptographically secure entropy in production
/// - Successive calls never repeat output; a repeated IV under the same
///   record key breaks AES-GCM confidentiality
/// - Methods are infallible except in exceptional circumstances (e.g., OS
///   entropy exhaustion)
pub trait Environment: Send + Sync {
    /// Fills the provided buffer with random bytes.
    fn random_bytes(&self, buffer: &mut [u8]);

    /// Generates a random fixed-size byte array.
    ///
    /// Convenience for salts and IVs.
    fn random_array<const N: usize>(&self) -> [u8; N]
    where
        Self: Sized,
    {
        let mut bytes = [0u8; N];
        self.random_bytes(&mut bytes);
        bytes
    }
}
