pub mod service;
pub mod shared;

use thiserror::Error;

pub use self::service::RngService;
pub use self::shared::{generate, reseed, shared, SharedRng};

/// Errors that can occur while calling the guarded generator
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RngError {
    #[error("Generator rejected seed material (code {code})")]
    ReseedRejected { code: i32 },

    #[error("Generator failed to fill {requested} bytes (code {code})")]
    GenerationFailed { code: i32, requested: usize },

    #[error("Generator is not initialized: {0}")]
    Uninitialized(String),

    #[error("Generator lock poisoned by a panicking caller")]
    LockPoisoned,

    #[error("Generator panicked during the call")]
    Panicked,
}

/// Anything the interactive driver can draw from or reseed.
///
/// Implemented by every `RngService` and by the `SharedRng` handle, so a
/// driver does not care whether it was given an owned service or the
/// process-wide one.
pub trait RandomSource: Send + Sync {
    /// Reseed and return the number of bytes consumed
    fn reseed(&self, seed: &[u8]) -> Result<usize, RngError>;

    /// Fill `out` completely or fail
    fn generate(&self, out: &mut [u8]) -> Result<usize, RngError>;
}
