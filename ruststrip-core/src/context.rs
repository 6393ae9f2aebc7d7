//! Immutable per-run pipeline context.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::config::{ClusteringConfig, CommonModeConfig};
use crate::mask::ChannelMask;
use crate::topology::Topology;

/// Everything a processing component needs that is fixed for one run:
/// topology, channel mask, and configuration.
///
/// Built once at run start and passed by reference into every component
/// call; components keep no event-to-event mutable state of their own.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PipelineContext {
    topology: Topology,
    mask: ChannelMask,
    clustering: ClusteringConfig,
    common_mode: CommonModeConfig,
}

impl PipelineContext {
    /// Creates a context with default configuration.
    #[must_use]
    pub fn new(topology: Topology, mask: ChannelMask) -> Self {
        Self {
            topology,
            mask,
            clustering: ClusteringConfig::default(),
            common_mode: CommonModeConfig::default(),
        }
    }

    /// Sets the clustering configuration.
    #[must_use]
    pub fn with_clustering(mut self, config: ClusteringConfig) -> Self {
        self.clustering = config;
        self
    }

    /// Sets the common-mode configuration.
    #[must_use]
    pub fn with_common_mode(mut self, config: CommonModeConfig) -> Self {
        self.common_mode = config;
        self
    }

    /// Readout topology for this run.
    #[inline]
    #[must_use]
    pub fn topology(&self) -> Topology {
        self.topology
    }

    /// Channel mask for this run.
    #[inline]
    #[must_use]
    pub fn mask(&self) -> &ChannelMask {
        &self.mask
    }

    /// Clustering configuration.
    #[inline]
    #[must_use]
    pub fn clustering(&self) -> &ClusteringConfig {
        &self.clustering
    }

    /// Common-mode configuration.
    #[inline]
    #[must_use]
    pub fn common_mode(&self) -> &CommonModeConfig {
        &self.common_mode
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cluster::Polarity;

    #[test]
    fn test_context_construction() {
        let topo = Topology::new(2, 128);
        let ctx = PipelineContext::new(topo, ChannelMask::none(topo))
            .with_clustering(ClusteringConfig::new().with_polarity(Polarity::Positive));

        assert_eq!(ctx.topology().chips, 2);
        assert_eq!(ctx.clustering().polarity, Polarity::Positive);
        assert_eq!(ctx.common_mode().iterations, 3);
        assert_eq!(ctx.mask().masked_count(), 0);
    }
}
