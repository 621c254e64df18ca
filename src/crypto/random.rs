// Generator collaborators guarded by the RNG service

use std::fmt;
use std::os::raw::c_int;

use rand::rngs::OsRng;
use rand::{RngCore, SeedableRng};
use rand_chacha::ChaCha20Rng;
use zeroize::Zeroize;

use crate::crypto::hash::{HashFunction, DIGEST_LEN, SHA256};

/// Sentinel returned by the built-in generators when a call cannot be honored
pub const NATIVE_ERROR: i32 = -1;

/// Upper bound on the seed material `AutoSeededPool` folds in per call
pub const MAX_RESEED_BYTES: usize = 4096;

/// The opaque generator behind an `RngService`.
///
/// Both entry points follow the native calling convention: a negative return
/// is an error code, anything else is a byte count. Implementations need not be
/// reentrant or `Sync`; the service never calls them concurrently.
pub trait NativeGenerator: Send {
    /// Mix `seed` into the generator state and return how many bytes were consumed
    fn reseed(&mut self, seed: &[u8]) -> i32;

    /// Fill `out` and return how many bytes were written
    fn generate(&mut self, out: &mut [u8]) -> i32;
}

impl<G: NativeGenerator + ?Sized> NativeGenerator for Box<G> {
    fn reseed(&mut self, seed: &[u8]) -> i32 {
        (**self).reseed(seed)
    }

    fn generate(&mut self, out: &mut [u8]) -> i32 {
        (**self).generate(out)
    }
}

/// OS-seeded generator used by the process-wide service.
///
/// Output comes from a ChaCha20 stream. Reseeding rekeys the stream with
/// `SHA256(key || stream block || seed)`, so earlier state is never discarded.
pub struct AutoSeededPool {
    key: [u8; DIGEST_LEN],
    stream: ChaCha20Rng,
}

impl AutoSeededPool {
    pub fn new() -> Result<Self, rand::Error> {
        let mut key = [0u8; DIGEST_LEN];
        OsRng.try_fill_bytes(&mut key)?;
        let pool = Self::from_key(&key);
        key.zeroize();
        Ok(pool)
    }

    /// Build a pool from fixed key material. Only sensible for tests and benches.
    pub fn from_key(key: &[u8; DIGEST_LEN]) -> Self {
        AutoSeededPool { key: *key, stream: ChaCha20Rng::from_seed(*key) }
    }
}

impl NativeGenerator for AutoSeededPool {
    fn reseed(&mut self, seed: &[u8]) -> i32 {
        if seed.is_empty() {
            return 0;
        }
        let taken = seed.len().min(MAX_RESEED_BYTES);

        let mut block = [0u8; DIGEST_LEN];
        self.stream.fill_bytes(&mut block);
        let mut next = SHA256::new().hash_parts(&[&self.key[..], &block[..], &seed[..taken]]);

        self.key.copy_from_slice(&next);
        self.stream = ChaCha20Rng::from_seed(self.key);
        block.zeroize();
        next.zeroize();

        taken as i32
    }

    fn generate(&mut self, out: &mut [u8]) -> i32 {
        let Ok(len) = i32::try_from(out.len()) else {
            return NATIVE_ERROR;
        };
        self.stream.fill_bytes(out);
        len
    }
}

impl Drop for AutoSeededPool {
    fn drop(&mut self) {
        self.key.zeroize();
    }
}

impl fmt::Debug for AutoSeededPool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AutoSeededPool").finish_non_exhaustive()
    }
}

/// Deterministic RNG for testing.
///
/// Output block `i` is `SHA256(seed || i)`. Reseeding appends to the seed and
/// keeps the counter, so feeding `A` then `B` equals starting from `A || B`.
#[derive(Debug, Clone)]
pub struct DeterministicRng {
    seed: Vec<u8>,
    counter: u64,
}

impl DeterministicRng {
    pub fn new(seed: &[u8]) -> Self {
        DeterministicRng { seed: seed.to_vec(), counter: 0 }
    }

    /// All seed material absorbed so far
    pub fn seed(&self) -> &[u8] {
        &self.seed
    }
}

impl NativeGenerator for DeterministicRng {
    fn reseed(&mut self, seed: &[u8]) -> i32 {
        let Ok(len) = i32::try_from(seed.len()) else {
            return NATIVE_ERROR;
        };
        self.seed.extend_from_slice(seed);
        len
    }

    fn generate(&mut self, out: &mut [u8]) -> i32 {
        let Ok(len) = i32::try_from(out.len()) else {
            return NATIVE_ERROR;
        };
        let hasher = SHA256::new();
        for chunk in out.chunks_mut(DIGEST_LEN) {
            let block = hasher.hash_parts(&[&self.seed[..], &self.counter.to_le_bytes()[..]]);
            self.counter += 1;
            chunk.copy_from_slice(&block[..chunk.len()]);
        }
        len
    }
}

impl Drop for DeterministicRng {
    fn drop(&mut self) {
        self.seed.zeroize();
    }
}

/// C signature of a native reseed entry point
pub type ReseedFn = unsafe extern "C" fn(seed: *const u8, len: usize) -> c_int;

/// C signature of a native output entry point
pub type GenerateFn = unsafe extern "C" fn(out: *mut u8, len: usize) -> c_int;

/// Adapter over a linked native library's two entry points
#[derive(Clone, Copy)]
pub struct ExternGenerator {
    reseed: ReseedFn,
    generate: GenerateFn,
}

impl ExternGenerator {
    /// # Safety
    ///
    /// Both functions must read (or write) at most `len` bytes from the given
    /// pointer and must not retain it after returning. They may rely on the
    /// caller for mutual exclusion.
    pub unsafe fn new(reseed: ReseedFn, generate: GenerateFn) -> Self {
        ExternGenerator { reseed, generate }
    }
}

impl NativeGenerator for ExternGenerator {
    fn reseed(&mut self, seed: &[u8]) -> i32 {
        // SAFETY: pointer and length come from one live slice; see `new`.
        unsafe { (self.reseed)(seed.as_ptr(), seed.len()) }
    }

    fn generate(&mut self, out: &mut [u8]) -> i32 {
        // SAFETY: pointer and length come from one live slice; see `new`.
        unsafe { (self.generate)(out.as_mut_ptr(), out.len()) }
    }
}

impl fmt::Debug for ExternGenerator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExternGenerator").finish_non_exhaustive()
    }
}
