//! Cluster records produced by the seeded clusterer.

use std::str::FromStr;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::Error;

/// Expected signal polarity of the sensor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Polarity {
    /// Signals go positive (electrons collected).
    Positive,
    /// Signals go negative (holes collected); the usual strip-sensor case.
    #[default]
    Negative,
}

impl Polarity {
    /// Sign factor applied to samples before significance tests.
    #[inline]
    #[must_use]
    pub fn sign(self) -> f64 {
        match self {
            Self::Positive => 1.0,
            Self::Negative => -1.0,
        }
    }
}

impl FromStr for Polarity {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Error> {
        match s {
            "+1" | "+" | "positive" => Ok(Self::Positive),
            "-1" | "-" | "negative" => Ok(Self::Negative),
            other => Err(Error::InvalidMode(other.to_string())),
        }
    }
}

/// One cluster of contiguous channels with significant, correlated signal.
///
/// Member order is construction order: the seed first, then channels added
/// growing left, then channels added growing right. The order is not
/// geometric; member channel indices always form a contiguous run
/// containing the seed.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct StripCluster {
    /// Chip the cluster was found on.
    pub chip: usize,
    /// Seed channel that initiated the cluster.
    pub seed: usize,
    /// Cluster ID, sequential from 0 within one (event, chip).
    pub id: u32,
    /// Member (channel, corrected signal) pairs in construction order.
    pub members: Vec<(usize, f64)>,
    /// Charge-sharing ratio between the seed and its dominant neighbor.
    ///
    /// Nominally in [0, 1]; -1 when both neighbors are absent.
    pub eta: f64,
    /// True if the sensitive axis of this sensor is X.
    pub sensitive_axis_x: bool,
    /// Signal polarity the cluster was found with.
    pub polarity: Polarity,
}

impl StripCluster {
    /// Number of member channels.
    #[inline]
    #[must_use]
    pub fn size(&self) -> usize {
        self.members.len()
    }

    /// Iterator over member channel indices.
    pub fn channels(&self) -> impl Iterator<Item = usize> + '_ {
        self.members.iter().map(|&(channel, _)| channel)
    }

    /// Returns true if the channel belongs to this cluster.
    #[must_use]
    pub fn contains(&self, channel: usize) -> bool {
        self.channels().any(|c| c == channel)
    }

    /// Sum of member signals.
    #[must_use]
    pub fn total_signal(&self) -> f64 {
        self.members.iter().map(|&(_, signal)| signal).sum()
    }

    /// Signal of the seed channel.
    ///
    /// The seed is always the first member.
    #[must_use]
    pub fn seed_signal(&self) -> f64 {
        self.members.first().map_or(0.0, |&(_, signal)| signal)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_polarity_sign() {
        assert!((Polarity::Positive.sign() - 1.0).abs() < f64::EPSILON);
        assert!((Polarity::Negative.sign() + 1.0).abs() < f64::EPSILON);
        assert_eq!(Polarity::default(), Polarity::Negative);
    }

    #[test]
    fn test_polarity_parse() {
        assert_eq!("+1".parse::<Polarity>().unwrap(), Polarity::Positive);
        assert_eq!("negative".parse::<Polarity>().unwrap(), Polarity::Negative);
        assert!("0".parse::<Polarity>().is_err());
    }

    #[test]
    fn test_cluster_accessors() {
        let cluster = StripCluster {
            chip: 1,
            seed: 60,
            id: 0,
            members: vec![(60, 40.0), (59, 10.0), (61, 25.0)],
            eta: 0.5,
            sensitive_axis_x: true,
            polarity: Polarity::Positive,
        };
        assert_eq!(cluster.size(), 3);
        assert!(cluster.contains(59));
        assert!(!cluster.contains(62));
        assert!((cluster.total_signal() - 75.0).abs() < f64::EPSILON);
        assert!((cluster.seed_signal() - 40.0).abs() < f64::EPSILON);
    }
}
