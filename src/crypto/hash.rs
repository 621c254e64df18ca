// Hash function abstractions used to fold reseed material

use sha2::{Digest, Sha256};

/// Digest size of every hash in this module
pub const DIGEST_LEN: usize = 32;

/// Trait for hash functions
pub trait HashFunction {
    /// Hash the concatenation of `parts` without copying them together first
    fn hash_parts(&self, parts: &[&[u8]]) -> [u8; DIGEST_LEN];

    /// Hash input data
    fn hash(&self, data: &[u8]) -> [u8; DIGEST_LEN] {
        self.hash_parts(&[data])
    }
}

/// SHA-256 hash function
#[derive(Debug, Clone, Copy, Default)]
pub struct SHA256;

impl SHA256 {
    pub fn new() -> Self {
        SHA256
    }
}

impl HashFunction for SHA256 {
    fn hash_parts(&self, parts: &[&[u8]]) -> [u8; DIGEST_LEN] {
        let mut hasher = Sha256::new();
        for part in parts {
            hasher.update(part);
        }
        hasher.finalize().into()
    }
}
