//! Verbosity configuration and tracing subscriber setup.
//!
//! The library never stores a log level of its own: the binary builds a
//! [`Verbosity`] from its flags and hands it to [`init_tracing`] once.

use std::io::IsTerminal;

use thiserror::Error;
use tracing::Level;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::writer::MakeWriterExt;

/// Quiet and verbose were both requested.
#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
#[error("--quiet and --verbose cannot be used together")]
pub struct VerbosityConflict;

/// How much the run reports.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Verbosity {
    /// Errors only.
    Quiet,
    /// Progress, warnings and errors.
    #[default]
    Normal,
    /// Everything, including a trace of every request.
    Verbose,
}

impl Verbosity {
    /// Builds the verbosity from the two command-line flags.
    ///
    /// # Errors
    ///
    /// Returns [`VerbosityConflict`] if both flags are set.
    pub fn from_flags(quiet: bool, verbose: bool) -> Result<Self, VerbosityConflict> {
        match (quiet, verbose) {
            (true, true) => Err(VerbosityConflict),
            (true, false) => Ok(Self::Quiet),
            (false, true) => Ok(Self::Verbose),
            (false, false) => Ok(Self::Normal),
        }
    }

    /// Default filter directive, used when `RUST_LOG` is not set.
    #[must_use]
    pub fn default_directive(self) -> &'static str {
        match self {
            Self::Quiet => "error",
            Self::Normal => "info",
            Self::Verbose => "debug",
        }
    }
}

/// Installs the global subscriber.
///
/// Warnings and errors go to stderr, everything else to stdout. `RUST_LOG`
/// takes priority over `verbosity`. Calling this twice is a no-op.
pub fn init_tracing(verbosity: Verbosity) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(verbosity.default_directive()));
    let writer = std::io::stderr
        .with_max_level(Level::WARN)
        .or_else(std::io::stdout);

    let _ = tracing_subscriber::fmt()
        .with_writer(writer)
        .with_ansi(std::io::stdout().is_terminal() && std::io::stderr().is_terminal())
        .with_target(false)
        .with_env_filter(filter)
        .try_init();
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_from_flags() {
        assert_eq!(Verbosity::from_flags(false, false).unwrap(), Verbosity::Normal);
        assert_eq!(Verbosity::from_flags(true, false).unwrap(), Verbosity::Quiet);
        assert_eq!(Verbosity::from_flags(false, true).unwrap(), Verbosity::Verbose);
        assert_eq!(Verbosity::from_flags(true, true), Err(VerbosityConflict));
    }

    #[test]
    fn test_default_directives() {
        assert_eq!(Verbosity::Quiet.default_directive(), "error");
        assert_eq!(Verbosity::Normal.default_directive(), "info");
        assert_eq!(Verbosity::Verbose.default_directive(), "debug");
    }

    #[test]
    fn test_init_tracing_twice_does_not_panic() {
        init_tracing(Verbosity::Quiet);
        init_tracing(Verbosity::Verbose);
    }
}
