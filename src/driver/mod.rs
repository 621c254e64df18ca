pub mod config;
pub mod display;
#[allow(clippy::module_inception)]
pub mod driver;
pub mod pool;
pub mod render;

use thiserror::Error;

use crate::rng::RngError;

pub use self::config::{DriverConfig, ErrorPolicy};
pub use self::display::{DisplaySurface, MemorySurface};
pub use self::driver::Driver;
pub use self::pool::WorkerPool;

/// Errors raised by the driver itself, as opposed to generator failures
/// delivered through `DriverEvent::Failed`
#[derive(Error, Debug)]
pub enum DriverError {
    #[error("Generator warm-up failed: {0}")]
    Startup(#[source] RngError),

    #[error("Invalid driver configuration: {0}")]
    InvalidConfig(String),

    #[error("Failed to spawn worker thread: {0}")]
    WorkerSpawn(#[from] std::io::Error),

    #[error("Worker pool has shut down")]
    PoolClosed,
}

/// What `Driver::pump` observed on the interactive thread
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DriverEvent {
    /// A generate task finished and its hex line replaced the display text
    Rendered { bytes: usize },

    /// A reseed task finished
    Reseeded { consumed: usize },

    /// A generate result arrived after the surface was detached
    Discarded { bytes: usize },

    /// A task failed; only reported under `ErrorPolicy::Propagate`
    Failed(RngError),
}
