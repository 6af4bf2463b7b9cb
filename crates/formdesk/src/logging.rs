//! Logging setup for formdesk.
//!
//! Diagnostics go through `tracing` and are written to stderr, so command
//! output on stdout stays clean for piping (`formdesk data --format json`).

use tracing::Level;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// How much diagnostic output to show.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Verbosity {
    /// Errors only.
    Quiet,
    /// Lifecycle events: forms created, submissions saved, files exported.
    #[default]
    Normal,
    /// Commands as they are applied and storage reads/writes.
    Verbose,
    /// Everything.
    Trace,
}

impl Verbosity {
    /// Derive verbosity from `-q` and the number of `-v` flags.
    ///
    /// `-q` wins over any number of `-v`.
    #[must_use]
    pub fn from_flags(quiet: bool, verbose: u8) -> Self {
        match (quiet, verbose) {
            (true, _) => Self::Quiet,
            (false, 0) => Self::Normal,
            (false, 1) => Self::Verbose,
            (false, _) => Self::Trace,
        }
    }

    /// The most detailed level shown.
    #[must_use]
    pub fn level(self) -> Level {
        match self {
            Self::Quiet => Level::ERROR,
            Self::Normal => Level::INFO,
            Self::Verbose => Level::DEBUG,
            Self::Trace => Level::TRACE,
        }
    }

    /// `EnvFilter` directive scoping this level to the crate.
    #[must_use]
    pub fn directive(self) -> String {
        format!("formdesk={}", self.level())
    }
}

/// Install the global subscriber.
///
/// `RUST_LOG` takes precedence over `verbosity`. Calling this more than once
/// is harmless; only the first call installs a subscriber.
///
/// ```no_run
/// use formdesk::{init_logging, logging::Verbosity};
///
/// init_logging(Verbosity::from_flags(false, 1));
/// ```
pub fn init_logging(verbosity: Verbosity) {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(verbosity.directive()));

    let subscriber = tracing_subscriber::registry().with(env_filter).with(
        fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(false)
            .without_time(),
    );

    let _ = subscriber.try_init();
}

/// Warnings and errors only, captured by the test harness.
#[cfg(test)]
pub fn init_test_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("warn")
        .with_test_writer()
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_flags() {
        assert_eq!(Verbosity::from_flags(false, 0), Verbosity::Normal);
        assert_eq!(Verbosity::from_flags(false, 1), Verbosity::Verbose);
        assert_eq!(Verbosity::from_flags(false, 2), Verbosity::Trace);
        assert_eq!(Verbosity::from_flags(false, 9), Verbosity::Trace);
        assert_eq!(Verbosity::from_flags(true, 2), Verbosity::Quiet);
    }

    #[test]
    fn test_level() {
        assert_eq!(Verbosity::Quiet.level(), Level::ERROR);
        assert_eq!(Verbosity::Normal.level(), Level::INFO);
        assert_eq!(Verbosity::Verbose.level(), Level::DEBUG);
        assert_eq!(Verbosity::Trace.level(), Level::TRACE);
    }

    #[test]
    fn test_directive() {
        assert_eq!(Verbosity::Normal.directive(), "formdesk=INFO");
        assert!(EnvFilter::try_new(Verbosity::Verbose.directive()).is_ok());
    }

    #[test]
    fn test_init_logging_is_idempotent() {
        init_logging(Verbosity::Quiet);
        init_logging(Verbosity::Trace);
        init_test_logging();
    }
}
