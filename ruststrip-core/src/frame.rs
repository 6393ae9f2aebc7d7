//! Raw sample frames from the readout.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::topology::Topology;

/// One event's worth of raw ADC samples for a single chip.
///
/// Sample order is channel order. The frame is read-only to the pipeline;
/// it is produced by the upstream data source.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct RawFrame {
    /// Event number this frame belongs to.
    pub event: u64,
    /// Chip the samples were read from.
    pub chip: usize,
    /// ADC samples, one per channel.
    pub samples: Vec<f64>,
}

impl RawFrame {
    /// Creates a new raw frame.
    #[must_use]
    pub fn new(event: u64, chip: usize, samples: Vec<f64>) -> Self {
        Self {
            event,
            chip,
            samples,
        }
    }

    /// Number of samples in the frame.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// Returns true if the frame holds no samples.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Checks the frame against the readout topology.
    ///
    /// The chip index must exist and the sample count must equal the
    /// channel count; a mismatch is reported, never silently truncated
    /// or padded.
    pub fn validate(&self, topology: Topology) -> Result<()> {
        topology.check_chip(self.chip)?;
        if self.samples.len() != topology.channels {
            return Err(Error::ShapeMismatch {
                expected: topology.channels,
                actual: self.samples.len(),
            });
        }
        Ok(())
    }
}
