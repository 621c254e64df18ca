use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use guarded_csprng::crypto::random::{DeterministicRng, NativeGenerator};
use guarded_csprng::driver::{
    Driver, DriverConfig, DriverError, DriverEvent, ErrorPolicy, MemorySurface,
};
use guarded_csprng::rng::{RandomSource, RngError, RngService};

const TIMEOUT: Duration = Duration::from_secs(5);

fn deterministic() -> Arc<RngService<DeterministicRng>> {
    Arc::new(RngService::new(DeterministicRng::new(b"driver tests")))
}

fn assert_hex_line(text: &str, bytes: usize) {
    assert_eq!(text.len(), bytes * 3);
    for cell in text.as_bytes().chunks(3) {
        assert!(cell[0].is_ascii_hexdigit() && !cell[0].is_ascii_lowercase());
        assert!(cell[1].is_ascii_hexdigit() && !cell[1].is_ascii_lowercase());
        assert_eq!(cell[2], b' ');
    }
}

/// Succeeds for the first `healthy` generate calls, then fails
struct Failing {
    healthy: usize,
    calls: AtomicUsize,
}

impl Failing {
    fn after(healthy: usize) -> Arc<Self> {
        Arc::new(Failing { healthy, calls: AtomicUsize::new(0) })
    }
}

impl RandomSource for Failing {
    fn reseed(&self, _seed: &[u8]) -> Result<usize, RngError> {
        Err(RngError::ReseedRejected { code: -1 })
    }

    fn generate(&self, out: &mut [u8]) -> Result<usize, RngError> {
        if self.calls.fetch_add(1, Ordering::SeqCst) < self.healthy {
            Ok(out.len())
        } else {
            Err(RngError::GenerationFailed { code: -1, requested: out.len() })
        }
    }
}

/// Serves the warm-up draw, then panics inside the generator
struct PanicsAfterWarmUp {
    generated: usize,
}

impl NativeGenerator for PanicsAfterWarmUp {
    fn reseed(&mut self, seed: &[u8]) -> i32 {
        seed.len() as i32
    }

    fn generate(&mut self, out: &mut [u8]) -> i32 {
        self.generated += 1;
        if self.generated > 1 {
            panic!("native generator crashed");
        }
        out.len() as i32
    }
}

#[test]
fn test_generate_uses_fallback_width() {
    let surface = MemorySurface::new(Some(1080.0), Some(0.0));
    let mut driver = Driver::new(deterministic(), surface, DriverConfig::default()).unwrap();

    driver.trigger_generate().unwrap();
    let events = driver.wait(TIMEOUT);

    assert_eq!(events, vec![DriverEvent::Rendered { bytes: 28 }]);
    assert_hex_line(driver.surface().unwrap().current_text(), 28);
}

#[test]
fn test_generate_sized_to_display() {
    // 720 / 12 = 60 characters per line, 20 bytes per line, 4 lines
    let surface = MemorySurface::new(Some(720.0), Some(12.0));
    let mut driver = Driver::new(deterministic(), surface, DriverConfig::default()).unwrap();

    driver.trigger_generate().unwrap();
    assert_eq!(driver.wait(TIMEOUT), vec![DriverEvent::Rendered { bytes: 80 }]);
    assert_hex_line(driver.surface().unwrap().current_text(), 80);
}

#[test]
fn test_reseed_leaves_display_untouched() {
    let service = deterministic();
    let surface = MemorySurface::new(Some(720.0), Some(12.0)).with_text("hello");
    let mut driver = Driver::new(service.clone(), surface, DriverConfig::default()).unwrap();

    driver.trigger_reseed().unwrap();
    assert_eq!(driver.wait(TIMEOUT), vec![DriverEvent::Reseeded { consumed: 5 }]);

    let surface = driver.surface().unwrap();
    assert_eq!(surface.current_text(), "hello");
    assert_eq!(surface.writes(), 0);

    drop(driver);
    let generator = Arc::try_unwrap(service).ok().unwrap().into_generator().unwrap();
    assert!(generator.seed().ends_with(b"hello"));
}

#[test]
fn test_many_taps_all_render() {
    let config = DriverConfig::new(4, 21, 4);
    let mut driver =
        Driver::new(deterministic(), MemorySurface::new(None, None), config).unwrap();

    for _ in 0..10 {
        driver.trigger_generate().unwrap();
        driver.trigger_reseed().unwrap();
    }
    let events = driver.wait(TIMEOUT);

    assert_eq!(driver.in_flight(), 0);
    assert_eq!(events.len(), 20);
    let rendered =
        events.iter().filter(|e| matches!(e, DriverEvent::Rendered { bytes: 28 })).count();
    assert_eq!(rendered, 10);
    assert_eq!(driver.surface().unwrap().writes(), 10);
}

#[test]
fn test_propagate_reports_failures_and_keeps_display() {
    let config = DriverConfig::default().with_error_policy(ErrorPolicy::Propagate);
    let surface = MemorySurface::new(Some(720.0), Some(12.0)).with_text("prior");
    let mut driver = Driver::new(Failing::after(1), surface, config).unwrap();

    driver.trigger_generate().unwrap();
    driver.trigger_reseed().unwrap();
    let events = driver.wait(TIMEOUT);

    assert_eq!(events.len(), 2);
    assert!(events.contains(&DriverEvent::Failed(RngError::GenerationFailed {
        code: -1,
        requested: 80
    })));
    assert!(events.contains(&DriverEvent::Failed(RngError::ReseedRejected { code: -1 })));
    assert_eq!(driver.surface().unwrap().current_text(), "prior");
}

#[test]
fn test_ignore_swallows_failures() {
    let surface = MemorySurface::new(Some(720.0), Some(12.0)).with_text("prior");
    let mut driver = Driver::new(Failing::after(1), surface, DriverConfig::default()).unwrap();

    driver.trigger_generate().unwrap();
    driver.trigger_reseed().unwrap();

    assert!(driver.wait(TIMEOUT).is_empty());
    assert_eq!(driver.in_flight(), 0);
    assert_eq!(driver.surface().unwrap().current_text(), "prior");
    assert_eq!(driver.surface().unwrap().writes(), 0);
}

#[test]
fn test_warm_up_failure_is_fatal() {
    let result = Driver::new(Failing::after(0), MemorySurface::default(), DriverConfig::default());
    match result {
        Err(DriverError::Startup(RngError::GenerationFailed { requested, .. })) => {
            assert_eq!(requested, 32)
        }
        Err(other) => panic!("unexpected error: {}", other),
        Ok(_) => panic!("driver started without a working generator"),
    }
}

#[test]
fn test_detached_surface_discards_results() {
    let mut driver =
        Driver::new(deterministic(), MemorySurface::new(None, None), DriverConfig::default())
            .unwrap();

    driver.trigger_generate().unwrap();
    let surface = driver.detach_surface().unwrap();
    assert_eq!(driver.wait(TIMEOUT), vec![DriverEvent::Discarded { bytes: 28 }]);
    assert_eq!(surface.writes(), 0);

    // Without a surface the triggers do nothing.
    driver.trigger_generate().unwrap();
    driver.trigger_reseed().unwrap();
    assert_eq!(driver.in_flight(), 0);
}

#[test]
fn test_shared_generator_driver() {
    let mut driver =
        Driver::with_shared(MemorySurface::new(None, Some(9.5)), DriverConfig::default()).unwrap();

    driver.trigger_generate().unwrap();
    assert_eq!(driver.wait(TIMEOUT), vec![DriverEvent::Rendered { bytes: 28 }]);
    assert_hex_line(driver.surface().unwrap().current_text(), 28);
}

#[test]
fn test_panicking_generator_is_reported_once() {
    let service = Arc::new(RngService::new(PanicsAfterWarmUp { generated: 0 }));
    let config = DriverConfig::default().with_error_policy(ErrorPolicy::Propagate);
    let surface = MemorySurface::new(None, None).with_text("prior");
    let mut driver = Driver::new(service, surface, config).unwrap();

    driver.trigger_generate().unwrap();
    let started = Instant::now();
    let events = driver.wait(TIMEOUT);

    assert_eq!(events, vec![DriverEvent::Failed(RngError::Panicked)]);
    assert_eq!(driver.in_flight(), 0);
    assert!(started.elapsed() < TIMEOUT, "wait ran to its deadline");
    assert_eq!(driver.surface().unwrap().current_text(), "prior");

    // The crash poisoned the service lock; later calls report that instead.
    driver.trigger_generate().unwrap();
    driver.trigger_reseed().unwrap();
    let events = driver.wait(TIMEOUT);
    assert_eq!(events, vec![DriverEvent::Failed(RngError::LockPoisoned); 2]);
    assert_eq!(driver.in_flight(), 0);
}

#[test]
fn test_panicking_generator_ignored_still_drains() {
    let service = Arc::new(RngService::new(PanicsAfterWarmUp { generated: 0 }));
    let mut driver =
        Driver::new(service, MemorySurface::new(None, None), DriverConfig::default()).unwrap();

    driver.trigger_generate().unwrap();
    assert!(driver.wait(TIMEOUT).is_empty());
    assert_eq!(driver.in_flight(), 0);
}
