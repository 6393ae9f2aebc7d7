//! I/O error types.

use thiserror::Error;

/// Result type for I/O operations.
pub type Result<T> = std::result::Result<T, Error>;

/// I/O error types.
#[derive(Error, Debug)]
pub enum Error {
    /// File I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Core library error.
    #[error("core error: {0}")]
    Core(#[from] ruststrip_core::Error),

    /// Malformed frame file line.
    #[error("invalid frame format at line {line}: {reason}")]
    InvalidFormat { line: usize, reason: String },

    /// No stored calibration for the requested run.
    #[error("no calibration stored for run '{0}'")]
    MissingCalibration(String),

    /// Stored calibration does not match the requested topology.
    #[error("calibration for run '{run}' has a different topology")]
    TopologyMismatch { run: String },
}
