use std::env;
use std::str::FromStr;

use crate::driver::DriverError;

/// Characters per line assumed when display geometry is unusable
pub const FALLBACK_CHARS_PER_LINE: usize = 21;

/// Lines of hex filled by one generate request
pub const DEFAULT_LINES: usize = 4;

pub const DEFAULT_WORKERS: usize = 2;

/// Environment variable overriding the worker count
pub const WORKERS_ENV: &str = "PRNG_WORKERS";

/// Environment variable selecting `ErrorPolicy` (`ignore` or `propagate`)
pub const ERROR_POLICY_ENV: &str = "PRNG_ERROR_POLICY";

/// What the driver does with a failed background task
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ErrorPolicy {
    /// Log at debug level and leave the display as it was
    #[default]
    Ignore,
    /// Also hand the error back from `Driver::pump`
    Propagate,
}

impl FromStr for ErrorPolicy {
    type Err = DriverError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "ignore" => Ok(ErrorPolicy::Ignore),
            "propagate" => Ok(ErrorPolicy::Propagate),
            other => Err(DriverError::InvalidConfig(format!("unknown error policy '{}'", other))),
        }
    }
}

#[derive(Debug, Clone)]
pub struct DriverConfig {
    workers: usize,
    fallback_chars_per_line: usize,
    lines: usize,
    error_policy: ErrorPolicy,
}

impl DriverConfig {
    pub fn new(workers: usize, fallback_chars_per_line: usize, lines: usize) -> Self {
        assert!(workers > 0, "Worker count must be positive");
        assert!(fallback_chars_per_line > 0, "Fallback line width must be positive");
        assert!(lines > 0, "Line count must be positive");

        DriverConfig { workers, fallback_chars_per_line, lines, error_policy: ErrorPolicy::Ignore }
    }

    /// Defaults overridden by `PRNG_WORKERS` and `PRNG_ERROR_POLICY`
    pub fn from_env() -> Result<Self, DriverError> {
        let mut config = DriverConfig::default();

        if let Ok(raw) = env::var(WORKERS_ENV) {
            let workers = raw
                .trim()
                .parse::<usize>()
                .ok()
                .filter(|&n| n > 0)
                .ok_or_else(|| DriverError::InvalidConfig(format!("{}='{}'", WORKERS_ENV, raw)))?;
            config.workers = workers;
        }
        if let Ok(raw) = env::var(ERROR_POLICY_ENV) {
            config.error_policy = raw.parse()?;
        }

        Ok(config)
    }

    pub fn with_error_policy(mut self, policy: ErrorPolicy) -> Self {
        self.error_policy = policy;
        self
    }

    pub fn workers(&self) -> usize {
        self.workers
    }

    pub fn fallback_chars_per_line(&self) -> usize {
        self.fallback_chars_per_line
    }

    pub fn lines(&self) -> usize {
        self.lines
    }

    pub fn error_policy(&self) -> ErrorPolicy {
        self.error_policy
    }
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self::new(DEFAULT_WORKERS, FALLBACK_CHARS_PER_LINE, DEFAULT_LINES)
    }
}
