//! Telemetry errors.

use thiserror::Error;

/// An error raised while initializing telemetry.
#[derive(Debug, Error)]
pub enum TelemetryError {
    /// Logging could not be initialized.
    #[error("logging initialization failed: {0}")]
    LoggingInit(String),
}
