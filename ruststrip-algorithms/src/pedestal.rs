//! Pedestal and noise calibration from a full run of raw frames.

use ruststrip_core::{CalibrationTable, PipelineContext, RawFrame, Result};

/// Pedestal and noise tables produced by one calibration pass.
#[derive(Debug, Clone, PartialEq)]
pub struct CalibrationTables {
    /// Per-channel baseline mean.
    pub pedestals: CalibrationTable,
    /// Per-channel RMS spread.
    pub noise: CalibrationTable,
}

/// Accumulator for per-channel sample statistics over a calibration run.
///
/// Feed every raw frame of the run through [`accumulate`], then call
/// [`finalize`] to obtain the pedestal (mean) and noise (standard
/// deviation) tables. Masked channels never contribute and end up with
/// pedestal = noise = 0, as does any channel that saw no samples.
///
/// This is the only component with state across events; the accumulation
/// buffers are explicit and consumed by the finalize step.
///
/// [`accumulate`]: PedestalAccumulator::accumulate
/// [`finalize`]: PedestalAccumulator::finalize
#[derive(Debug, Clone)]
pub struct PedestalAccumulator {
    count: Vec<u64>,
    sum: Vec<f64>,
    sum_sq: Vec<f64>,
}

impl PedestalAccumulator {
    /// Creates an empty accumulator for the context's topology.
    #[must_use]
    pub fn new(ctx: &PipelineContext) -> Self {
        let total = ctx.topology().total();
        Self {
            count: vec![0; total],
            sum: vec![0.0; total],
            sum_sq: vec![0.0; total],
        }
    }

    /// Accumulates one raw frame.
    ///
    /// The frame is shape-checked against the topology first; a mismatched
    /// frame contributes nothing and the error is returned for the caller
    /// to report.
    pub fn accumulate(&mut self, frame: &RawFrame, ctx: &PipelineContext) -> Result<()> {
        frame.validate(ctx.topology())?;

        let mask = ctx.mask().row(frame.chip);
        let base = ctx.topology().index(frame.chip, 0);
        for (channel, (&sample, &masked)) in frame.samples.iter().zip(mask).enumerate() {
            if masked {
                continue;
            }
            let idx = base + channel;
            self.count[idx] += 1;
            self.sum[idx] += sample;
            self.sum_sq[idx] += sample * sample;
        }
        Ok(())
    }

    /// Total number of samples accumulated for one (chip, channel).
    #[must_use]
    pub fn samples(&self, ctx: &PipelineContext, chip: usize, channel: usize) -> u64 {
        self.count[ctx.topology().index(chip, channel)]
    }

    /// Produces the pedestal and noise tables.
    ///
    /// The mean and standard deviation come from the running sums; the
    /// variance is clamped at 0 before the square root so rounding can
    /// never produce NaN.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn finalize(self, ctx: &PipelineContext) -> CalibrationTables {
        let topology = ctx.topology();
        let mut pedestals = CalibrationTable::zeros(topology);
        let mut noise = CalibrationTable::zeros(topology);

        for chip in 0..topology.chips {
            for channel in 0..topology.channels {
                let idx = topology.index(chip, channel);
                if self.count[idx] == 0 {
                    continue;
                }
                let n = self.count[idx] as f64;
                let mean = self.sum[idx] / n;
                let variance = (self.sum_sq[idx] / n - mean * mean).max(0.0);
                pedestals.set(chip, channel, mean);
                noise.set(chip, channel, variance.sqrt());
            }
        }

        CalibrationTables { pedestals, noise }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use ruststrip_core::{ChannelMask, ChannelRange, Topology};

    fn context(topology: Topology, mask: ChannelMask) -> PipelineContext {
        PipelineContext::new(topology, mask)
    }

    #[test]
    fn test_mean_and_rms() {
        let topo = Topology::new(1, 2);
        let ctx = context(topo, ChannelMask::none(topo));
        let mut acc = PedestalAccumulator::new(&ctx);

        // Channel 0: constant 100. Channel 1: alternating 90/110.
        for event in 0..100u64 {
            let s1 = if event % 2 == 0 { 90.0 } else { 110.0 };
            acc.accumulate(&RawFrame::new(event, 0, vec![100.0, s1]), &ctx)
                .unwrap();
        }

        let tables = acc.finalize(&ctx);
        assert_abs_diff_eq!(tables.pedestals.get(0, 0), 100.0, epsilon = 1e-9);
        assert_abs_diff_eq!(tables.noise.get(0, 0), 0.0, epsilon = 1e-9);
        assert_abs_diff_eq!(tables.pedestals.get(0, 1), 100.0, epsilon = 1e-9);
        assert_abs_diff_eq!(tables.noise.get(0, 1), 10.0, epsilon = 1e-9);
    }

    #[test]
    fn test_masked_channels_are_zero() {
        let topo = Topology::new(1, 4);
        let ranges = [ChannelRange::new(0, 0, 1).unwrap()];
        let ctx = context(topo, ChannelMask::from_ranges(topo, &ranges).unwrap());
        let mut acc = PedestalAccumulator::new(&ctx);

        for event in 0..10u64 {
            acc.accumulate(&RawFrame::new(event, 0, vec![50.0; 4]), &ctx)
                .unwrap();
        }

        // Channels 2 and 3 are masked: nothing accumulated.
        assert_eq!(acc.samples(&ctx, 0, 1), 10);
        assert_eq!(acc.samples(&ctx, 0, 2), 0);

        let tables = acc.finalize(&ctx);
        assert_abs_diff_eq!(tables.pedestals.get(0, 0), 50.0, epsilon = 1e-9);
        assert_abs_diff_eq!(tables.pedestals.get(0, 2), 0.0);
        assert_abs_diff_eq!(tables.noise.get(0, 3), 0.0);
    }

    #[test]
    fn test_no_samples_yields_zero_not_nan() {
        let topo = Topology::new(1, 2);
        let ctx = context(topo, ChannelMask::none(topo));
        let acc = PedestalAccumulator::new(&ctx);
        let tables = acc.finalize(&ctx);

        assert!(!tables.pedestals.get(0, 0).is_nan());
        assert_abs_diff_eq!(tables.pedestals.get(0, 0), 0.0);
        assert_abs_diff_eq!(tables.noise.get(0, 1), 0.0);
    }

    #[test]
    fn test_bad_frame_is_rejected_and_skipped() {
        let topo = Topology::new(1, 4);
        let ctx = context(topo, ChannelMask::none(topo));
        let mut acc = PedestalAccumulator::new(&ctx);

        assert!(acc
            .accumulate(&RawFrame::new(0, 0, vec![1.0, 2.0]), &ctx)
            .is_err());
        acc.accumulate(&RawFrame::new(1, 0, vec![5.0; 4]), &ctx)
            .unwrap();

        let tables = acc.finalize(&ctx);
        // Only the well-shaped frame contributed.
        assert_abs_diff_eq!(tables.pedestals.get(0, 0), 5.0, epsilon = 1e-9);
    }

    #[test]
    fn test_determinism() {
        let topo = Topology::new(2, 8);
        let ctx = context(topo, ChannelMask::none(topo));

        let frames: Vec<RawFrame> = (0..50u64)
            .flat_map(|event| {
                (0..2).map(move |chip| {
                    let samples = (0..8)
                        .map(|ch| f64::from(ch) * 3.0 + (event % 7) as f64)
                        .collect();
                    RawFrame::new(event, chip, samples)
                })
            })
            .collect();

        let run = |frames: &[RawFrame]| {
            let mut acc = PedestalAccumulator::new(&ctx);
            for frame in frames {
                acc.accumulate(frame, &ctx).unwrap();
            }
            acc.finalize(&ctx)
        };

        let first = run(&frames);
        let second = run(&frames);
        assert_eq!(first, second);
    }
}
