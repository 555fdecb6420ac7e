//! Logging setup.
//!
//! The library logs through the `log` facade (skip-malformed warnings,
//! lifecycle notes); this module installs a stderr backend for it and
//! maps the CLI's verbosity flags onto filter levels.

use std::env;
use std::fmt;
use std::str::FromStr;

use log::{LevelFilter, Log, Metadata, Record};

/// Environment variable consulted when no verbosity flag is given.
pub const LOG_MODE_ENV: &str = "SKIFF_LOG_MODE";

/// Output verbosity, from least to most.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogLevel {
    /// Errors only.
    Quiet,
    /// Errors and warnings.
    Normal,
    /// Everything, debug output included.
    Verbose,
}

impl LogLevel {
    fn filter(self) -> LevelFilter {
        match self {
            Self::Quiet => LevelFilter::Error,
            Self::Normal => LevelFilter::Warn,
            Self::Verbose => LevelFilter::Debug,
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Quiet => write!(f, "quiet"),
            Self::Normal => write!(f, "normal"),
            Self::Verbose => write!(f, "verbose"),
        }
    }
}

impl FromStr for LogLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "quiet" => Ok(Self::Quiet),
            "normal" => Ok(Self::Normal),
            "verbose" => Ok(Self::Verbose),
            _ => Err(format!("invalid log level: {s}")),
        }
    }
}

struct StderrLogger;

impl Log for StderrLogger {
    fn enabled(&self, metadata: &Metadata<'_>) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record<'_>) {
        if self.enabled(record.metadata()) {
            eprintln!("{}: {}", record.level(), record.args());
        }
    }

    fn flush(&self) {}
}

static LOGGER: StderrLogger = StderrLogger;

/// Install the stderr logger and set the verbosity.
///
/// Precedence: `verbose` flag, then `quiet` flag, then the
/// [`LOG_MODE_ENV`] environment variable, then normal. Calling this more
/// than once only adjusts the level.
pub fn init_logger(verbose: bool, quiet: bool) -> LogLevel {
    let level = if verbose {
        LogLevel::Verbose
    } else if quiet {
        LogLevel::Quiet
    } else {
        env::var(LOG_MODE_ENV)
            .ok()
            .and_then(|value| value.parse().ok())
            .unwrap_or(LogLevel::Normal)
    };

    // Fails if a logger is already installed, which is fine: tests and
    // repeated calls just keep the existing backend.
    let _ = log::set_logger(&LOGGER);
    log::set_max_level(level.filter());
    level
}
