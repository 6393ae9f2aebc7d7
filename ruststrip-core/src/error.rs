//! Error types for ruststrip-core.

use thiserror::Error;

/// Result type alias for ruststrip operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Core error types for ruststrip operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// Malformed channel-range string.
    #[error("invalid channel range '{0}': expected 'chip:first-last'")]
    InvalidRange(String),

    /// Chip index outside the readout topology.
    #[error("chip index {chip} out of range (topology has {chips} chips)")]
    ChipOutOfRange { chip: usize, chips: usize },

    /// Channel index outside the readout topology.
    #[error("channel index {channel} out of range (topology has {channels} channels)")]
    ChannelOutOfRange { channel: usize, channels: usize },

    /// Unparsable common-mode mode name.
    #[error("unknown common-mode mode '{0}': expected 'constant' or 'slope'")]
    InvalidMode(String),

    /// Frame sample count does not match the topology.
    #[error("frame shape mismatch: expected {expected} samples, got {actual}")]
    ShapeMismatch { expected: usize, actual: usize },
}
