//! Run configuration for the processing components.

use std::str::FromStr;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::cluster::Polarity;
use crate::error::Error;

/// Configuration for the seeded clusterer.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ClusteringConfig {
    /// Minimum SNR for a channel to seed a cluster.
    pub seed_cut: f64,
    /// Minimum SNR for a channel to join any cluster.
    pub neighbor_cut: f64,
    /// Expected signal polarity.
    pub polarity: Polarity,
    /// True if the sensitive axis of the sensor is X.
    pub sensitive_axis_x: bool,
}

impl Default for ClusteringConfig {
    fn default() -> Self {
        Self {
            seed_cut: 3.0,
            neighbor_cut: 2.0,
            polarity: Polarity::Negative,
            sensitive_axis_x: true,
        }
    }
}

impl ClusteringConfig {
    /// Creates a clustering configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the seed cut.
    #[must_use]
    pub fn with_seed_cut(mut self, cut: f64) -> Self {
        self.seed_cut = cut;
        self
    }

    /// Sets the neighbor cut.
    #[must_use]
    pub fn with_neighbor_cut(mut self, cut: f64) -> Self {
        self.neighbor_cut = cut;
        self
    }

    /// Sets the signal polarity.
    #[must_use]
    pub fn with_polarity(mut self, polarity: Polarity) -> Self {
        self.polarity = polarity;
        self
    }

    /// Sets the sensitive-axis flag.
    #[must_use]
    pub fn with_sensitive_axis_x(mut self, x: bool) -> Self {
        self.sensitive_axis_x = x;
        self
    }
}

/// Shape of the common-mode correction across a chip.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum CommonModeMode {
    /// One constant correction for every channel.
    Constant,
    /// Correction linear in channel index.
    #[default]
    Slope,
}

impl FromStr for CommonModeMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Error> {
        match s {
            "constant" => Ok(Self::Constant),
            "slope" => Ok(Self::Slope),
            other => Err(Error::InvalidMode(other.to_string())),
        }
    }
}

/// Configuration for the common-mode estimator.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct CommonModeConfig {
    /// Number of outlier-rejection iterations.
    pub iterations: usize,
    /// Rejection threshold in standard deviations from the previous mean.
    pub noise_deviation: f64,
    /// Correction shape.
    pub mode: CommonModeMode,
}

impl Default for CommonModeConfig {
    fn default() -> Self {
        Self {
            iterations: 3,
            noise_deviation: 2.5,
            mode: CommonModeMode::Slope,
        }
    }
}

impl CommonModeConfig {
    /// Creates a common-mode configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the iteration count.
    #[must_use]
    pub fn with_iterations(mut self, iterations: usize) -> Self {
        self.iterations = iterations;
        self
    }

    /// Sets the rejection threshold.
    #[must_use]
    pub fn with_noise_deviation(mut self, deviation: f64) -> Self {
        self.noise_deviation = deviation;
        self
    }

    /// Sets the correction shape.
    #[must_use]
    pub fn with_mode(mut self, mode: CommonModeMode) -> Self {
        self.mode = mode;
        self
    }
}
