//! Tracing subscriber bootstrap for hosts embedding the content core.

use tracing_subscriber::{EnvFilter, fmt};

/// Failure to install the global subscriber.
#[derive(Debug, thiserror::Error)]
pub enum TelemetryError {
    #[error("tracing init failed: {message}")]
    Init { message: String },
}

/// Install a JSON formatter filtered by `RUST_LOG`.
///
/// Returns an error instead of panicking when a global subscriber is
/// already installed, so hosts and tests may call it more than once.
pub fn init_tracing() -> Result<(), TelemetryError> {
    fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
        .map_err(|err| TelemetryError::Init {
            message: err.to_string(),
        })
}
