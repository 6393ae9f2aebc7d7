//! Channel masking: which (chip, channel) slots are usable.

use std::str::FromStr;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::topology::Topology;

/// Inclusive range of usable channels on one chip.
///
/// Parsed from `"chip:first-last"`, e.g. `"0:2-125"`. A single channel
/// may be written as `"1:64-64"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ChannelRange {
    /// Chip index.
    pub chip: usize,
    /// First usable channel (inclusive).
    pub first: usize,
    /// Last usable channel (inclusive).
    pub last: usize,
}

impl ChannelRange {
    /// Creates a new channel range.
    pub fn new(chip: usize, first: usize, last: usize) -> Result<Self> {
        if first > last {
            return Err(Error::InvalidRange(format!("{chip}:{first}-{last}")));
        }
        Ok(Self { chip, first, last })
    }
}

impl FromStr for ChannelRange {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let invalid = || Error::InvalidRange(s.to_string());
        let (chip, span) = s.split_once(':').ok_or_else(invalid)?;
        let (first, last) = span.split_once('-').ok_or_else(invalid)?;
        let chip = chip.trim().parse().map_err(|_| invalid())?;
        let first = first.trim().parse().map_err(|_| invalid())?;
        let last = last.trim().parse().map_err(|_| invalid())?;
        Self::new(chip, first, last)
    }
}

/// Per-channel usable/masked flags for the whole readout.
///
/// `true` means the channel is masked: it is excluded from every statistic
/// and from cluster membership. Built once per run and immutable afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ChannelMask {
    topology: Topology,
    masked: Vec<bool>,
}

impl ChannelMask {
    /// Creates a mask with every channel usable.
    ///
    /// This is the safe fallback when no valid range configuration exists.
    #[must_use]
    pub fn none(topology: Topology) -> Self {
        Self {
            topology,
            masked: vec![false; topology.total()],
        }
    }

    /// Creates a mask with every channel masked.
    #[must_use]
    pub fn all(topology: Topology) -> Self {
        Self {
            topology,
            masked: vec![true; topology.total()],
        }
    }

    /// Builds a mask from inclusive usable-channel ranges.
    ///
    /// Channels not covered by any range are masked. Ranges referring to a
    /// chip or channel outside the topology are rejected.
    pub fn from_ranges(topology: Topology, ranges: &[ChannelRange]) -> Result<Self> {
        let mut mask = Self::all(topology);
        for range in ranges {
            topology.check_chip(range.chip)?;
            topology.check_channel(range.last)?;
            for channel in range.first..=range.last {
                let idx = topology.index(range.chip, channel);
                mask.masked[idx] = false;
            }
        }
        Ok(mask)
    }

    /// Returns the topology this mask was built for.
    #[inline]
    #[must_use]
    pub fn topology(&self) -> Topology {
        self.topology
    }

    /// Returns true if the channel is masked.
    #[inline]
    #[must_use]
    pub fn is_masked(&self, chip: usize, channel: usize) -> bool {
        self.masked[self.topology.index(chip, channel)]
    }

    /// Returns the mask flags for one chip, indexed by channel.
    #[inline]
    #[must_use]
    pub fn row(&self, chip: usize) -> &[bool] {
        let start = self.topology.index(chip, 0);
        &self.masked[start..start + self.topology.channels]
    }

    /// Number of masked channels across the whole readout.
    #[must_use]
    pub fn masked_count(&self) -> usize {
        self.masked.iter().filter(|&&m| m).count()
    }
}
