//! Seeded clustering of corrected strip signals.
//!
//! Channels passing the neighbor cut are grown greedily around seeds in
//! descending-SNR order. A cluster whose growth runs into a masked channel
//! or off the array edge touches a non-bonded region and is discarded;
//! its channels stay consumed so no later seed can claim them.

use ruststrip_core::{ClusteringConfig, StripCluster};

/// Why growth stopped in one direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum GrowthStop {
    /// The next channel failed the usable test or was already consumed.
    Clean,
    /// The next channel is masked or lies outside the array.
    NonBonded,
}

/// Seeded clusterer for one chip of one event.
///
/// Stateless across events: each call works only on the signals, noise
/// row and mask row it is given.
#[derive(Debug, Clone)]
pub struct SeededClusterer {
    config: ClusteringConfig,
}

impl SeededClusterer {
    /// Creates a clusterer with the given configuration.
    #[must_use]
    pub fn new(config: ClusteringConfig) -> Self {
        Self { config }
    }

    /// Current configuration.
    #[must_use]
    pub fn config(&self) -> &ClusteringConfig {
        &self.config
    }

    /// Clusters one chip's corrected signals.
    ///
    /// `signals` are fully corrected (pedestal and common mode removed),
    /// `noise` is the noise-table row and `mask` the mask row for the same
    /// chip. Returns the surviving clusters; an empty list is a normal
    /// outcome (no seeds, all-masked chip, missing noise).
    #[must_use]
    pub fn cluster(
        &self,
        signals: &[f64],
        noise: &[f64],
        mask: &[bool],
        chip: usize,
    ) -> Vec<StripCluster> {
        debug_assert_eq!(signals.len(), noise.len());
        debug_assert_eq!(signals.len(), mask.len());

        let channels = signals.len();
        let sign = self.config.polarity.sign();

        // SNR pre-filter: a channel below the neighbor cut is permanently
        // excluded this event, even if it could have seeded a cluster.
        // Channels without a noise estimate are never usable.
        let mut snr = vec![0.0; channels];
        let mut usable = vec![false; channels];
        for channel in 0..channels {
            if mask[channel] || noise[channel] <= 0.0 {
                continue;
            }
            snr[channel] = sign * signals[channel] / noise[channel];
            usable[channel] = snr[channel] >= self.config.neighbor_cut;
        }

        let mut seeds: Vec<usize> = (0..channels)
            .filter(|&ch| usable[ch] && snr[ch] >= self.config.seed_cut)
            .collect();
        // Stable sort by descending SNR; exact tie order does not affect
        // the emitted cluster sets.
        seeds.sort_by(|&a, &b| snr[b].partial_cmp(&snr[a]).unwrap_or(std::cmp::Ordering::Equal));

        let mut consumed = vec![false; channels];
        let mut clusters = Vec::new();
        let mut next_id = 0u32;

        for &seed in &seeds {
            if consumed[seed] {
                continue;
            }
            consumed[seed] = true;
            let mut members = vec![(seed, signals[seed])];

            let left_stop = grow(
                seed,
                Direction::Left,
                signals,
                mask,
                &usable,
                &mut consumed,
                &mut members,
            );
            let right_stop = grow(
                seed,
                Direction::Right,
                signals,
                mask,
                &usable,
                &mut consumed,
                &mut members,
            );

            if left_stop == GrowthStop::NonBonded || right_stop == GrowthStop::NonBonded {
                // Discard the cluster; its channels stay consumed so they
                // cannot be claimed twice.
                continue;
            }

            let eta = self.eta(&members, signals, mask, &consumed, seed);
            clusters.push(StripCluster {
                chip,
                seed,
                id: next_id,
                members,
                eta,
                sensitive_axis_x: self.config.sensitive_axis_x,
                polarity: self.config.polarity,
            });
            next_id += 1;
        }

        clusters
    }

    /// Charge-sharing eta between the seed and its dominant neighbor.
    ///
    /// The comparison reads the first non-member channel on each side of
    /// the cluster (for a single-member cluster these are seed-1 and
    /// seed+1). A side that is off the array, masked, or consumed by
    /// another cluster has no signal to share and drops out of the
    /// comparison; with both sides gone eta is -1.
    fn eta(
        &self,
        members: &[(usize, f64)],
        signals: &[f64],
        mask: &[bool],
        consumed: &[bool],
        seed: usize,
    ) -> f64 {
        let sign = self.config.polarity.sign();
        let seed_signal = sign * signals[seed];

        let low = members.iter().map(|&(ch, _)| ch).min().unwrap_or(seed);
        let high = members.iter().map(|&(ch, _)| ch).max().unwrap_or(seed);

        let side = |channel: Option<usize>| -> Option<f64> {
            let ch = channel?;
            if ch >= signals.len() || mask[ch] || consumed[ch] {
                None
            } else {
                Some(sign * signals[ch])
            }
        };
        let left = side(low.checked_sub(1));
        let right = side(if high + 1 < signals.len() {
            Some(high + 1)
        } else {
            None
        });

        match (left, right) {
            (None, None) => -1.0,
            (Some(l), None) => l / (l + seed_signal),
            (None, Some(r)) => seed_signal / (seed_signal + r),
            (Some(l), Some(r)) => {
                if l > r {
                    l / (l + seed_signal)
                } else {
                    seed_signal / (seed_signal + r)
                }
            }
        }
    }
}

impl Default for SeededClusterer {
    fn default() -> Self {
        Self::new(ClusteringConfig::default())
    }
}

#[derive(Debug, Clone, Copy)]
enum Direction {
    Left,
    Right,
}

/// Grows a cluster outward from the seed in one direction.
///
/// Channels are added while they are in range, unmasked, usable and not
/// yet consumed. Hitting a masked channel or the array edge is a
/// non-bonded stop; a usable-but-consumed channel or a channel failing
/// the usable test stops growth cleanly.
fn grow(
    seed: usize,
    direction: Direction,
    signals: &[f64],
    mask: &[bool],
    usable: &[bool],
    consumed: &mut [bool],
    members: &mut Vec<(usize, f64)>,
) -> GrowthStop {
    let mut current = seed;
    loop {
        let next = match direction {
            Direction::Left => match current.checked_sub(1) {
                Some(ch) => ch,
                None => return GrowthStop::NonBonded,
            },
            Direction::Right => {
                if current + 1 < signals.len() {
                    current + 1
                } else {
                    return GrowthStop::NonBonded;
                }
            }
        };
        if mask[next] {
            return GrowthStop::NonBonded;
        }
        if !usable[next] || consumed[next] {
            return GrowthStop::Clean;
        }
        consumed[next] = true;
        members.push((next, signals[next]));
        current = next;
    }
}
