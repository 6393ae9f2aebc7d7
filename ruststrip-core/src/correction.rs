//! Per-event common-mode correction vectors.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Common-mode correction for one (event, chip) pair.
///
/// One correction value per channel: identical across channels in constant
/// mode, linear in channel index in slope mode. Created fresh per event and
/// discarded after subtraction (persistence belongs to the host pipeline).
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct CommonModeCorrection {
    /// Correction value per channel.
    pub values: Vec<f64>,
    /// Scalar error estimate: the spread of the final included channel set.
    pub error: f64,
}

impl CommonModeCorrection {
    /// Creates a new correction vector.
    #[must_use]
    pub fn new(values: Vec<f64>, error: f64) -> Self {
        Self { values, error }
    }

    /// Correction value for one channel.
    #[inline]
    #[must_use]
    pub fn value(&self, channel: usize) -> f64 {
        self.values[channel]
    }

    /// Number of channels covered.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns true if the correction covers no channels.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}
