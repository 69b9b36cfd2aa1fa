//! Logging setup for Earthie
//!
//! Installs a `tracing` subscriber writing to stderr so stdout stays free
//! for chat output and API responses.
//!
//! `RUST_LOG` overrides the verbosity-derived level, e.g.
//! `RUST_LOG=earthie::rag=debug`.

use std::sync::OnceLock;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

use crate::cli::Verbosity;

static LOGGING_INITIALIZED: OnceLock<()> = OnceLock::new();

/// Error type for logging initialization
#[derive(Debug, thiserror::Error)]
pub enum LogError {
    #[error("logging already initialized")]
    AlreadyInitialized,

    #[error("failed to set global subscriber: {0}")]
    SetSubscriber(#[from] tracing::subscriber::SetGlobalDefaultError),
}

/// Build the filter for a verbosity level, honouring `RUST_LOG`
pub fn env_filter(verbosity: Verbosity) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(verbosity.log_level()))
}

/// Install the global subscriber. Call once at startup.
pub fn init_logging(verbosity: Verbosity, color: bool) -> Result<(), LogError> {
    if LOGGING_INITIALIZED.get().is_some() {
        return Err(LogError::AlreadyInitialized);
    }

    let subscriber = tracing_subscriber::registry().with(env_filter(verbosity)).with(
        fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(verbosity == Verbosity::VeryVerbose)
            .with_ansi(color),
    );

    tracing::subscriber::set_global_default(subscriber)?;
    let _ = LOGGING_INITIALIZED.set(());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_levels_by_verbosity() {
        assert_eq!(Verbosity::Quiet.log_level(), "error");
        assert_eq!(Verbosity::Normal.log_level(), "warn");
        assert_eq!(Verbosity::Verbose.log_level(), "info");
        assert_eq!(Verbosity::VeryVerbose.log_level(), "debug");
    }

    #[test]
    fn test_second_init_is_rejected() {
        let first = init_logging(Verbosity::Quiet, false);
        let second = init_logging(Verbosity::Quiet, false);
        // Another test may have initialized first; either way the second call fails.
        assert!(first.is_ok() || matches!(first, Err(LogError::AlreadyInitialized)));
        assert!(second.is_err());
    }
}
