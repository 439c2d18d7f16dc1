//! Deterministic hashing for lockstep checks.

use std::hash::Hasher;

/// A deterministic FNV-1a 64-bit hasher.
///
/// `DefaultHasher` is randomly keyed per process, so it cannot be used to
/// compare state between replicas. This one can.
#[derive(Debug, Clone, Copy)]
pub struct FnvHasher {
    state: u64,
}

impl FnvHasher {
    const OFFSET_BASIS: u64 = 0xcbf2_9ce4_8422_2325;
    const PRIME: u64 = 0x0100_0000_01b3;

    /// Start a fresh hash.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            state: Self::OFFSET_BASIS,
        }
    }
}

impl Default for FnvHasher {
    fn default() -> Self {
        Self::new()
    }
}

impl Hasher for FnvHasher {
    fn finish(&self) -> u64 {
        self.state
    }

    fn write(&mut self, bytes: &[u8]) {
        for &byte in bytes {
            self.state ^= u64::from(byte);
            self.state = self.state.wrapping_mul(Self::PRIME);
        }
    }
}
