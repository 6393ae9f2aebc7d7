//! Per-channel calibration tables (pedestal and noise).

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::topology::Topology;

/// Per (chip, channel) table of calibration values.
///
/// Used for both the pedestal table (per-channel baseline mean) and the
/// noise table (per-channel RMS spread). Entries for masked channels are
/// fixed at 0 and must never feed statistics. Computed once per run and
/// immutable afterwards.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct CalibrationTable {
    topology: Topology,
    values: Vec<f64>,
}

impl CalibrationTable {
    /// Creates a table with every entry set to 0.
    #[must_use]
    pub fn zeros(topology: Topology) -> Self {
        Self {
            topology,
            values: vec![0.0; topology.total()],
        }
    }

    /// Creates a table from a flat value vector.
    ///
    /// Returns `None` if the vector length does not match the topology.
    #[must_use]
    pub fn from_values(topology: Topology, values: Vec<f64>) -> Option<Self> {
        if values.len() == topology.total() {
            Some(Self { topology, values })
        } else {
            None
        }
    }

    /// Returns the topology this table was built for.
    #[inline]
    #[must_use]
    pub fn topology(&self) -> Topology {
        self.topology
    }

    /// Value for one (chip, channel).
    #[inline]
    #[must_use]
    pub fn get(&self, chip: usize, channel: usize) -> f64 {
        self.values[self.topology.index(chip, channel)]
    }

    /// Sets the value for one (chip, channel).
    #[inline]
    pub fn set(&mut self, chip: usize, channel: usize, value: f64) {
        let idx = self.topology.index(chip, channel);
        self.values[idx] = value;
    }

    /// Values for one chip, indexed by channel.
    #[inline]
    #[must_use]
    pub fn row(&self, chip: usize) -> &[f64] {
        let start = self.topology.index(chip, 0);
        &self.values[start..start + self.topology.channels]
    }

    /// Flat view of all values, chip-major.
    #[inline]
    #[must_use]
    pub fn values(&self) -> &[f64] {
        &self.values
    }
}
