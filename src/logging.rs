// Stderr backend for the `log` facade

use std::env;
use std::io::{self, Write};
use std::str::FromStr;
use std::time::{SystemTime, UNIX_EPOCH};

use log::{LevelFilter, Log, Metadata, Record, SetLoggerError};

/// Environment variable holding the maximum level (`error` .. `trace`, or `off`)
pub const LOG_ENV: &str = "PRNG_LOG";

pub const DEFAULT_LEVEL: LevelFilter = LevelFilter::Warn;

struct StderrLogger;

static LOGGER: StderrLogger = StderrLogger;

impl Log for StderrLogger {
    fn enabled(&self, metadata: &Metadata<'_>) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record<'_>) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let millis = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_millis();
        let thread = std::thread::current();
        let name = thread.name().unwrap_or("unnamed");

        // The stderr lock keeps lines from different threads whole.
        let mut out = io::stderr().lock();
        let _ = writeln!(
            out,
            "[{}] [{}] [{}] {}: {}",
            millis,
            record.level(),
            name,
            record.target(),
            record.args()
        );
    }

    fn flush(&self) {
        let _ = io::stderr().flush();
    }
}

/// Level named by `raw`, or the default when it is missing or unknown
pub fn parse_level(raw: Option<&str>) -> LevelFilter {
    raw.and_then(|s| LevelFilter::from_str(s.trim()).ok()).unwrap_or(DEFAULT_LEVEL)
}

/// Install the stderr logger at the level given by `PRNG_LOG`.
///
/// Fails if another logger is already installed.
pub fn init() -> Result<(), SetLoggerError> {
    let level = parse_level(env::var(LOG_ENV).ok().as_deref());
    log::set_logger(&LOGGER)?;
    log::set_max_level(level);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_level() {
        assert_eq!(parse_level(Some("debug")), LevelFilter::Debug);
        assert_eq!(parse_level(Some(" TRACE ")), LevelFilter::Trace);
        assert_eq!(parse_level(Some("off")), LevelFilter::Off);
        assert_eq!(parse_level(Some("chatty")), DEFAULT_LEVEL);
        assert_eq!(parse_level(None), DEFAULT_LEVEL);
    }
}
