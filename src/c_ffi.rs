//! C ABI entry points onto the process-wide generator.
//!
//! Return values follow the generator convention: non-negative is a byte
//! count, negative is an error. Generator codes are passed through unchanged;
//! the constants below are only produced by this layer.

use std::os::raw::c_int;
use std::panic::{self, AssertUnwindSafe};
use std::slice;

use crate::rng::shared::{generate_raw, reseed_raw};
use crate::rng::RngError;

pub const PRNG_ERROR_NULL_POINTER: c_int = -101;
pub const PRNG_ERROR_UNINITIALIZED: c_int = -102;
pub const PRNG_ERROR_LOCK_POISONED: c_int = -103;
pub const PRNG_ERROR_PANICKED: c_int = -104;

/// Mix `len` bytes at `seed` into the shared generator.
///
/// # Safety
///
/// `seed` must point to `len` readable bytes, or be null with `len == 0`.
#[no_mangle]
pub unsafe extern "C" fn prng_reseed(seed: *const u8, len: usize) -> c_int {
    if len == 0 {
        return 0;
    }
    if seed.is_null() {
        return PRNG_ERROR_NULL_POINTER;
    }
    let seed = slice::from_raw_parts(seed, len);
    contain(|| reseed_raw(seed))
}

/// Fill `len` bytes at `out` from the shared generator.
///
/// # Safety
///
/// `out` must point to `len` writable bytes, or be null with `len == 0`.
#[no_mangle]
pub unsafe extern "C" fn prng_get_bytes(out: *mut u8, len: usize) -> c_int {
    if len == 0 {
        return 0;
    }
    if out.is_null() {
        return PRNG_ERROR_NULL_POINTER;
    }
    let out = slice::from_raw_parts_mut(out, len);
    contain(|| generate_raw(out))
}

/// Status code reported across the C boundary for `error`
pub fn error_code(error: &RngError) -> c_int {
    match error {
        RngError::ReseedRejected { code } => *code,
        RngError::GenerationFailed { code, .. } => *code,
        RngError::Uninitialized(_) => PRNG_ERROR_UNINITIALIZED,
        RngError::LockPoisoned => PRNG_ERROR_LOCK_POISONED,
        RngError::Panicked => PRNG_ERROR_PANICKED,
    }
}

// A panic must not unwind across the C boundary.
fn contain(call: impl FnOnce() -> Result<i32, RngError>) -> c_int {
    match panic::catch_unwind(AssertUnwindSafe(call)) {
        Ok(result) => result.unwrap_or_else(|e| error_code(&e)),
        Err(_) => PRNG_ERROR_PANICKED,
    }
}
