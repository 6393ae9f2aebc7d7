//! Common-mode noise estimation and subtraction.
//!
//! The common mode is the event-wide, chip-wide baseline shift left over
//! after pedestal subtraction. It is estimated with a fixed number of
//! outlier-rejecting iterations; alongside the plain mean, a least-squares
//! line across channel index is fitted so the correction can follow a
//! linear trend over the chip.

use ruststrip_core::{CommonModeConfig, CommonModeCorrection, CommonModeMode};

/// Statistics of one inclusion iteration.
///
/// Kept across iterations so an iteration that rejects every channel can
/// fall back to the previous estimate instead of dividing by zero.
#[derive(Debug, Clone, Copy, Default)]
struct IterationFit {
    mean: f64,
    sigma: f64,
    intercept: f64,
    slope: f64,
}

/// Common-mode estimator and subtractor for one chip of one event.
///
/// Stateless across events: each call works only on the samples it is
/// given plus the run configuration.
#[derive(Debug, Clone)]
pub struct CommonModeEstimator {
    config: CommonModeConfig,
}

impl CommonModeEstimator {
    /// Creates an estimator with the given configuration.
    #[must_use]
    pub fn new(config: CommonModeConfig) -> Self {
        Self { config }
    }

    /// Current configuration.
    #[must_use]
    pub fn config(&self) -> &CommonModeConfig {
        &self.config
    }

    /// Estimates the common-mode correction for one chip.
    ///
    /// `samples` are pedestal-subtracted signals in channel order; `mask`
    /// holds the per-channel masked flags for the same chip. Iteration 0
    /// includes every non-masked channel; later iterations include only
    /// channels within `noise_deviation` standard deviations of the
    /// previous mean. A fully-masked chip yields an all-zero correction.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn estimate(&self, samples: &[f64], mask: &[bool]) -> CommonModeCorrection {
        debug_assert_eq!(samples.len(), mask.len());

        let mut fit = IterationFit::default();
        for iteration in 0..self.config.iterations {
            let mut n = 0usize;
            let mut sum = 0.0;
            let mut sum_sq = 0.0;
            let mut idx_sum = 0.0;
            let mut idx_sq_sum = 0.0;
            let mut idx_signal_sum = 0.0;

            for (channel, (&signal, &masked)) in samples.iter().zip(mask).enumerate() {
                if masked {
                    continue;
                }
                if iteration > 0
                    && (signal - fit.mean).abs() >= self.config.noise_deviation * fit.sigma
                {
                    continue;
                }
                let index = channel as f64;
                n += 1;
                sum += signal;
                sum_sq += signal * signal;
                idx_sum += index;
                idx_sq_sum += index * index;
                idx_signal_sum += index * signal;
            }

            if n == 0 {
                // Everything rejected: keep the previous estimate.
                continue;
            }

            let count = n as f64;
            let mean = sum / count;
            let sigma = (sum_sq / count - mean * mean).max(0.0).sqrt();
            let delta = count * idx_sq_sum - idx_sum * idx_sum;
            let (intercept, slope) = if delta.abs() > f64::EPSILON {
                (
                    (idx_sq_sum * sum - idx_sum * idx_signal_sum) / delta,
                    (count * idx_signal_sum - idx_sum * sum) / delta,
                )
            } else {
                // Fewer than two distinct indices: the line degenerates.
                (mean, 0.0)
            };

            fit = IterationFit {
                mean,
                sigma,
                intercept,
                slope,
            };
        }

        let values = match self.config.mode {
            CommonModeMode::Constant => vec![fit.mean; samples.len()],
            CommonModeMode::Slope => (0..samples.len())
                .map(|i| fit.intercept + fit.slope * i as f64)
                .collect(),
        };
        CommonModeCorrection::new(values, fit.sigma)
    }

    /// Subtracts a correction from the samples.
    ///
    /// Masked channels are forced to 0 in the output rather than corrected.
    #[must_use]
    pub fn subtract(
        &self,
        samples: &[f64],
        mask: &[bool],
        correction: &CommonModeCorrection,
    ) -> Vec<f64> {
        samples
            .iter()
            .zip(mask)
            .zip(&correction.values)
            .map(|((&signal, &masked), &value)| if masked { 0.0 } else { signal - value })
            .collect()
    }

    /// Estimates and subtracts in one step.
    #[must_use]
    pub fn correct(&self, samples: &[f64], mask: &[bool]) -> (Vec<f64>, CommonModeCorrection) {
        let correction = self.estimate(samples, mask);
        let corrected = self.subtract(samples, mask, &correction);
        (corrected, correction)
    }
}

impl Default for CommonModeEstimator {
    fn default() -> Self {
        Self::new(CommonModeConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_constant_mode_on_flat_event() {
        let estimator =
            CommonModeEstimator::new(CommonModeConfig::new().with_mode(CommonModeMode::Constant));
        let samples = vec![12.5; 16];
        let mask = vec![false; 16];

        let (corrected, correction) = estimator.correct(&samples, &mask);
        for value in &correction.values {
            assert_abs_diff_eq!(*value, 12.5, epsilon = 1e-12);
        }
        for signal in &corrected {
            assert_abs_diff_eq!(*signal, 0.0, epsilon = 1e-12);
        }
        assert_abs_diff_eq!(correction.error, 0.0, epsilon = 1e-12);
    }

    #[test]
    fn test_slope_mode_recovers_exact_line() {
        let estimator = CommonModeEstimator::new(
            CommonModeConfig::new()
                .with_mode(CommonModeMode::Slope)
                .with_iterations(1),
        );
        let (a0, b0) = (3.25, -0.125);
        #[allow(clippy::cast_precision_loss)]
        let samples: Vec<f64> = (0..128).map(|i| a0 + b0 * i as f64).collect();
        let mask = vec![false; 128];

        let correction = estimator.estimate(&samples, &mask);
        for (i, value) in correction.values.iter().enumerate() {
            #[allow(clippy::cast_precision_loss)]
            let expected = a0 + b0 * i as f64;
            assert_abs_diff_eq!(*value, expected, epsilon = 1e-9);
        }

        let corrected = estimator.subtract(&samples, &mask, &correction);
        for signal in &corrected {
            assert_abs_diff_eq!(*signal, 0.0, epsilon = 1e-9);
        }
    }

    #[test]
    fn test_slope_fit_survives_full_iteration_count() {
        // A pure ramp keeps every channel within the rejection band, so
        // repeated iterations reproduce the same exact fit.
        let estimator = CommonModeEstimator::default();
        #[allow(clippy::cast_precision_loss)]
        let samples: Vec<f64> = (0..128).map(|i| 1.0 + 0.5 * i as f64).collect();
        let mask = vec![false; 128];

        let correction = estimator.estimate(&samples, &mask);
        assert_abs_diff_eq!(correction.value(0), 1.0, epsilon = 1e-9);
        assert_abs_diff_eq!(correction.value(127), 1.0 + 0.5 * 127.0, epsilon = 1e-9);
    }

    #[test]
    fn test_outlier_is_rejected_after_first_iteration() {
        let estimator =
            CommonModeEstimator::new(CommonModeConfig::new().with_mode(CommonModeMode::Constant));
        // 31 channels near 10, one wild outlier.
        let mut samples = vec![10.0; 32];
        samples[0] = 9.0;
        samples[1] = 11.0;
        samples[5] = 500.0;
        let mask = vec![false; 32];

        let correction = estimator.estimate(&samples, &mask);
        // With the outlier rejected the mean settles near 10, far from the
        // iteration-0 mean of ~25.3.
        assert_abs_diff_eq!(correction.value(0), 10.0, epsilon = 0.1);
    }

    #[test]
    fn test_fully_masked_chip_yields_zero() {
        let estimator = CommonModeEstimator::default();
        let samples = vec![42.0; 8];
        let mask = vec![true; 8];

        let (corrected, correction) = estimator.correct(&samples, &mask);
        for value in &correction.values {
            assert_abs_diff_eq!(*value, 0.0);
        }
        assert_abs_diff_eq!(correction.error, 0.0);
        // Masked channels are forced to 0 in the output.
        for signal in &corrected {
            assert_abs_diff_eq!(*signal, 0.0);
        }
    }

    #[test]
    fn test_single_channel_degenerates_to_constant() {
        let estimator = CommonModeEstimator::new(
            CommonModeConfig::new()
                .with_mode(CommonModeMode::Slope)
                .with_iterations(1),
        );
        let samples = vec![7.0, 0.0, 0.0];
        let mask = vec![false, true, true];

        let correction = estimator.estimate(&samples, &mask);
        // One included channel: slope is 0 and the intercept is the mean.
        assert_abs_diff_eq!(correction.value(0), 7.0, epsilon = 1e-12);
        assert_abs_diff_eq!(correction.value(2), 7.0, epsilon = 1e-12);
    }

    #[test]
    fn test_masked_channels_excluded_from_estimate() {
        let estimator =
            CommonModeEstimator::new(CommonModeConfig::new().with_mode(CommonModeMode::Constant));
        let samples = vec![10.0, 10.0, 1000.0, 10.0];
        let mask = vec![false, false, true, false];

        let correction = estimator.estimate(&samples, &mask);
        assert_abs_diff_eq!(correction.value(0), 10.0, epsilon = 1e-12);
    }
}
