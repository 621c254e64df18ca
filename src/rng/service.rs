use std::sync::Mutex;

use log::{debug, warn};

use crate::crypto::random::NativeGenerator;
use crate::rng::{RandomSource, RngError};

/// Serializes every call into one generator.
///
/// The generator lives inside the lock, so nothing outside the service can
/// reach it while another caller holds it. Contended callers block; there is no
/// queue and no retry.
#[derive(Debug)]
pub struct RngService<G> {
    generator: Mutex<G>,
}

impl<G: NativeGenerator> RngService<G> {
    pub fn new(generator: G) -> Self {
        RngService { generator: Mutex::new(generator) }
    }

    /// Forward `seed` to the generator and return its status unchanged.
    ///
    /// An empty seed returns 0 without taking the lock.
    pub fn reseed_raw(&self, seed: &[u8]) -> Result<i32, RngError> {
        if seed.is_empty() {
            return Ok(0);
        }
        self.with_generator(|generator| generator.reseed(seed))
    }

    /// Forward `out` to the generator and return its status unchanged.
    ///
    /// An empty buffer returns 0 without taking the lock.
    pub fn generate_raw(&self, out: &mut [u8]) -> Result<i32, RngError> {
        if out.is_empty() {
            return Ok(0);
        }
        self.with_generator(|generator| generator.generate(out))
    }

    /// Reseed, returning the number of bytes the generator consumed
    pub fn reseed(&self, seed: &[u8]) -> Result<usize, RngError> {
        let code = self.reseed_raw(seed)?;
        match usize::try_from(code) {
            Ok(consumed) if consumed <= seed.len() => {
                debug!("reseed: consumed {} of {} bytes", consumed, seed.len());
                Ok(consumed)
            }
            _ => {
                warn!("reseed: generator returned {} for {} bytes", code, seed.len());
                Err(RngError::ReseedRejected { code })
            }
        }
    }

    /// Fill `out`. A short fill is an error, never a partial success.
    pub fn generate(&self, out: &mut [u8]) -> Result<usize, RngError> {
        let requested = out.len();
        let code = self.generate_raw(out)?;
        match usize::try_from(code) {
            Ok(written) if written == requested => {
                debug!("generate: wrote {} bytes", written);
                Ok(written)
            }
            _ => {
                warn!("generate: generator returned {} for {} bytes", code, requested);
                Err(RngError::GenerationFailed { code, requested })
            }
        }
    }

    /// Allocate and fill a fresh buffer
    pub fn generate_vec(&self, len: usize) -> Result<Vec<u8>, RngError> {
        let mut out = vec![0u8; len];
        self.generate(&mut out)?;
        Ok(out)
    }

    /// Tear the service down and hand back its generator
    pub fn into_generator(self) -> Result<G, RngError> {
        self.generator.into_inner().map_err(|_| RngError::LockPoisoned)
    }

    fn with_generator<R>(&self, call: impl FnOnce(&mut G) -> R) -> Result<R, RngError> {
        let mut guard = self.generator.lock().map_err(|_| RngError::LockPoisoned)?;
        Ok(call(&mut guard))
    }
}

impl<G: NativeGenerator> RandomSource for RngService<G> {
    fn reseed(&self, seed: &[u8]) -> Result<usize, RngError> {
        RngService::reseed(self, seed)
    }

    fn generate(&self, out: &mut [u8]) -> Result<usize, RngError> {
        RngService::generate(self, out)
    }
}
