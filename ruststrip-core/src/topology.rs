//! Readout topology: fixed chip and channel counts.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Fixed shape of the readout: number of chips and channels per chip.
///
/// Every per-channel array in the pipeline has exactly
/// `chips * channels` logical slots, addressed by (chip, channel).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Topology {
    /// Number of readout chips.
    pub chips: usize,
    /// Number of channels per chip.
    pub channels: usize,
}

impl Topology {
    /// Creates a new topology.
    #[inline]
    #[must_use]
    pub fn new(chips: usize, channels: usize) -> Self {
        Self { chips, channels }
    }

    /// Total number of (chip, channel) slots.
    #[inline]
    #[must_use]
    pub fn total(&self) -> usize {
        self.chips * self.channels
    }

    /// Flat index of a (chip, channel) pair.
    #[inline]
    #[must_use]
    pub fn index(&self, chip: usize, channel: usize) -> usize {
        chip * self.channels + channel
    }

    /// Checks that a chip index lies inside the topology.
    pub fn check_chip(&self, chip: usize) -> Result<()> {
        if chip < self.chips {
            Ok(())
        } else {
            Err(Error::ChipOutOfRange {
                chip,
                chips: self.chips,
            })
        }
    }

    /// Checks that a channel index lies inside the topology.
    pub fn check_channel(&self, channel: usize) -> Result<()> {
        if channel < self.channels {
            Ok(())
        } else {
            Err(Error::ChannelOutOfRange {
                channel,
                channels: self.channels,
            })
        }
    }
}
