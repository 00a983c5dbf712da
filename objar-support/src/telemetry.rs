//! Tracing subscriber installation.
//!
//! The container itself only emits `tracing` events. Binaries, demos and
//! tests that want to see them call [`init_tracing`] once at startup.

use tracing_subscriber::EnvFilter;
use tracing_subscriber::filter::ParseError;

/// Errors raised while installing the global subscriber.
#[derive(Debug, thiserror::Error)]
pub enum TelemetryError {
    /// The fallback filter directive could not be parsed.
    #[error("Invalid log filter directive: {0}")]
    Directive(#[from] ParseError),

    /// A global subscriber is already installed.
    #[error("Failed to install tracing subscriber: {0}")]
    Install(#[source] Box<dyn std::error::Error + Send + Sync>),
}

/// Installs a `fmt` subscriber filtered by `RUST_LOG`.
///
/// When `RUST_LOG` is unset or unparsable, `default_directive`
/// (e.g. `"objar=debug"`) is used instead.
///
/// # Errors
/// Returns [`TelemetryError::Install`] if a global subscriber was already set.
pub fn init_tracing(default_directive: &str) -> Result<(), TelemetryError> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(default_directive)?,
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .try_init()
        .map_err(TelemetryError::Install)?;

    tracing::debug!(default_directive, "Tracing subscriber installed");
    Ok(())
}
