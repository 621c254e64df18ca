//! Process-wide service.
//!
//! The shared generator is built on first use and lives until the process
//! exits. If building it fails, every later call reports `Uninitialized`; there
//! is no second attempt.

use std::sync::OnceLock;

use log::error;

use crate::crypto::random::AutoSeededPool;
use crate::rng::{RandomSource, RngError, RngService};

static SHARED: OnceLock<Result<RngService<AutoSeededPool>, RngError>> = OnceLock::new();

/// The process-wide service, created on first call
pub fn shared() -> Result<&'static RngService<AutoSeededPool>, RngError> {
    SHARED
        .get_or_init(|| match AutoSeededPool::new() {
            Ok(pool) => Ok(RngService::new(pool)),
            Err(e) => {
                error!("shared generator failed to load: {}", e);
                Err(RngError::Uninitialized(e.to_string()))
            }
        })
        .as_ref()
        .map_err(Clone::clone)
}

/// Reseed the process-wide generator
pub fn reseed(seed: &[u8]) -> Result<usize, RngError> {
    shared()?.reseed(seed)
}

/// Draw from the process-wide generator
pub fn generate(out: &mut [u8]) -> Result<usize, RngError> {
    shared()?.generate(out)
}

/// Raw status codes from the process-wide generator
pub fn reseed_raw(seed: &[u8]) -> Result<i32, RngError> {
    shared()?.reseed_raw(seed)
}

pub fn generate_raw(out: &mut [u8]) -> Result<i32, RngError> {
    shared()?.generate_raw(out)
}

/// Instance handle onto the process-wide generator.
///
/// Every `SharedRng` reaches the same state as the free functions above.
#[derive(Debug, Clone, Copy, Default)]
pub struct SharedRng;

impl SharedRng {
    pub fn new() -> Self {
        SharedRng
    }
}

impl RandomSource for SharedRng {
    fn reseed(&self, seed: &[u8]) -> Result<usize, RngError> {
        reseed(seed)
    }

    fn generate(&self, out: &mut [u8]) -> Result<usize, RngError> {
        generate(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shared_is_a_single_instance() {
        let a = shared().expect("shared generator") as *const _;
        let b = shared().expect("shared generator") as *const _;
        assert_eq!(a, b);
    }

    #[test]
    fn test_handle_and_free_functions_work() {
        let mut out = [0u8; 16];
        assert_eq!(SharedRng::new().generate(&mut out), Ok(16));
        assert_eq!(reseed(b"more entropy"), Ok(12));
        assert_eq!(generate(&mut out), Ok(16));
    }
}
