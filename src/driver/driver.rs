use std::panic::{self, AssertUnwindSafe};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::sync::Arc;
use std::time::{Duration, Instant};

use log::{debug, trace, warn};
use zeroize::Zeroize;

use crate::driver::config::{DriverConfig, ErrorPolicy};
use crate::driver::display::DisplaySurface;
use crate::driver::pool::WorkerPool;
use crate::driver::render;
use crate::driver::{DriverError, DriverEvent};
use crate::rng::{RandomSource, RngError, SharedRng};

/// Bytes drawn once at startup to force the generator to load
pub const WARM_UP_BYTES: usize = 32;

/// Result of one background task, sent back to the interactive thread
enum Completion {
    Reseeded(Result<usize, RngError>),
    Generated(Result<(String, usize), RngError>),
}

/// Runs reseed and generate requests off the interactive thread.
///
/// The driver and its surface belong to the interactive thread. Triggers read
/// the surface there, hand the generator call to the worker pool, and return at
/// once. Results come back over a channel and only touch the surface inside
/// `pump` or `wait`. Results that finish out of order are applied in arrival
/// order, so the last one to finish wins the display.
pub struct Driver<S: DisplaySurface> {
    source: Arc<dyn RandomSource>,
    surface: Option<S>,
    config: DriverConfig,
    completions: Receiver<Completion>,
    notify: Sender<Completion>,
    in_flight: usize,
    pool: WorkerPool,
}

impl<S: DisplaySurface> Driver<S> {
    pub fn new(
        source: Arc<dyn RandomSource>,
        surface: S,
        config: DriverConfig,
    ) -> Result<Self, DriverError> {
        let mut warm_up = [0u8; WARM_UP_BYTES];
        let result = source.generate(&mut warm_up);
        warm_up.zeroize();
        result.map_err(DriverError::Startup)?;

        let pool = WorkerPool::new(config.workers())?;
        let (notify, completions) = mpsc::channel();
        debug!("driver started with {} workers", pool.size());

        Ok(Driver {
            source,
            surface: Some(surface),
            config,
            completions,
            notify,
            in_flight: 0,
            pool,
        })
    }

    /// Driver over the process-wide generator
    pub fn with_shared(surface: S, config: DriverConfig) -> Result<Self, DriverError> {
        Self::new(Arc::new(SharedRng::new()), surface, config)
    }

    /// Reseed from the displayed text. Never updates the display.
    pub fn trigger_reseed(&mut self) -> Result<(), DriverError> {
        let Some(text) = self.surface.as_ref().and_then(|surface| surface.text()) else {
            trace!("reseed skipped: no surface text");
            return Ok(());
        };
        let mut seed = text.into_bytes();

        let source = Arc::clone(&self.source);
        let notify = self.notify.clone();
        self.dispatch(move || {
            let result = guarded(|| source.reseed(&seed));
            seed.zeroize();
            let _ = notify.send(Completion::Reseeded(result));
        })
    }

    /// Generate enough bytes to fill the display and render them as hex
    pub fn trigger_generate(&mut self) -> Result<(), DriverError> {
        let Some(surface) = self.surface.as_ref() else {
            trace!("generate skipped: no surface");
            return Ok(());
        };
        let chars = render::chars_per_line(
            surface.viewport_width_px(),
            surface.char_width_px(),
            self.config.fallback_chars_per_line(),
        );
        let count = render::byte_count(chars, self.config.lines());

        let source = Arc::clone(&self.source);
        let notify = self.notify.clone();
        self.dispatch(move || {
            let mut bytes = vec![0u8; count];
            let result = guarded(|| {
                let written = source.generate(&mut bytes)?;
                Ok((render::hex_line(&bytes), written))
            });
            bytes.zeroize();
            let _ = notify.send(Completion::Generated(result));
        })
    }

    /// Apply every completion that has already arrived, without blocking
    pub fn pump(&mut self) -> Vec<DriverEvent> {
        let mut events = Vec::new();
        while let Ok(completion) = self.completions.try_recv() {
            self.apply(completion, &mut events);
        }
        events
    }

    /// Block until every dispatched task has completed or `timeout` passes
    pub fn wait(&mut self, timeout: Duration) -> Vec<DriverEvent> {
        let deadline = Instant::now() + timeout;
        let mut events = Vec::new();
        while self.in_flight > 0 {
            let remaining = deadline.saturating_duration_since(Instant::now());
            match self.completions.recv_timeout(remaining) {
                Ok(completion) => self.apply(completion, &mut events),
                Err(RecvTimeoutError::Timeout) | Err(RecvTimeoutError::Disconnected) => break,
            }
        }
        events
    }

    /// Tasks dispatched whose results have not been applied yet
    pub fn in_flight(&self) -> usize {
        self.in_flight
    }

    pub fn surface(&self) -> Option<&S> {
        self.surface.as_ref()
    }

    /// Mutable access for edits made on the interactive thread
    pub fn surface_mut(&mut self) -> Option<&mut S> {
        self.surface.as_mut()
    }

    /// Drop the driver's hold on the surface. Later results are discarded.
    pub fn detach_surface(&mut self) -> Option<S> {
        self.surface.take()
    }

    pub fn config(&self) -> &DriverConfig {
        &self.config
    }

    fn dispatch<F>(&mut self, job: F) -> Result<(), DriverError>
    where
        F: FnOnce() + Send + 'static,
    {
        self.pool.execute(job)?;
        self.in_flight += 1;
        trace!("dispatched task, {} in flight", self.in_flight);
        Ok(())
    }

    fn apply(&mut self, completion: Completion, events: &mut Vec<DriverEvent>) {
        self.in_flight = self.in_flight.saturating_sub(1);
        match completion {
            Completion::Reseeded(Ok(consumed)) => events.push(DriverEvent::Reseeded { consumed }),
            Completion::Generated(Ok((line, bytes))) => match self.surface.as_mut() {
                Some(surface) => {
                    surface.set_text(line);
                    events.push(DriverEvent::Rendered { bytes });
                }
                None => {
                    debug!("discarding {} generated bytes: surface detached", bytes);
                    events.push(DriverEvent::Discarded { bytes });
                }
            },
            Completion::Reseeded(Err(e)) | Completion::Generated(Err(e)) => {
                match self.config.error_policy() {
                    ErrorPolicy::Ignore => debug!("ignoring background failure: {}", e),
                    ErrorPolicy::Propagate => events.push(DriverEvent::Failed(e)),
                }
            }
        }
    }
}

/// Run a generator call, turning a panic into `RngError::Panicked`.
///
/// Every dispatched job must send exactly one completion, or `in_flight` never
/// drains.
fn guarded<T>(call: impl FnOnce() -> Result<T, RngError>) -> Result<T, RngError> {
    panic::catch_unwind(AssertUnwindSafe(call)).unwrap_or_else(|_| {
        warn!("generator panicked in a background task");
        Err(RngError::Panicked)
    })
}
