//! Event-level driver combining pedestal subtraction, common-mode
//! correction and clustering.

use rayon::prelude::*;

use ruststrip_core::{
    CalibrationTable, CommonModeCorrection, Error, PipelineContext, RawFrame, StripCluster,
};

use crate::clusterer::SeededClusterer;
use crate::common_mode::CommonModeEstimator;
use crate::pedestal::{CalibrationTables, PedestalAccumulator};

/// Per-chip output of one processed event.
#[derive(Debug, Clone, PartialEq)]
pub struct ChipOutput {
    /// Chip the output belongs to.
    pub chip: usize,
    /// Common-mode correction applied to this chip.
    pub correction: CommonModeCorrection,
    /// Clusters found on this chip.
    pub clusters: Vec<StripCluster>,
}

/// Result of processing one event.
///
/// Chips whose frames fail the shape check are reported in `skipped` and
/// contribute nothing; the rest of the event is processed normally.
#[derive(Debug, Clone, PartialEq)]
pub struct EventOutput {
    /// Event number the frames belonged to.
    pub event: u64,
    /// Per-chip outputs, ordered by chip index.
    pub chips: Vec<ChipOutput>,
    /// Chips skipped with the reason.
    pub skipped: Vec<(usize, Error)>,
}

impl EventOutput {
    /// Iterator over all clusters of the event.
    pub fn clusters(&self) -> impl Iterator<Item = &StripCluster> {
        self.chips.iter().flat_map(|chip| chip.clusters.iter())
    }

    /// Total number of clusters in the event.
    #[must_use]
    pub fn cluster_count(&self) -> usize {
        self.chips.iter().map(|chip| chip.clusters.len()).sum()
    }
}

/// Processes one event: pedestal subtraction, common-mode correction and
/// clustering for every frame.
///
/// `frames` holds the event's frames, one per chip in any order; chips are
/// independent and are processed in parallel. The order of `frames` is
/// irrelevant to correctness; outputs are returned sorted by chip index.
#[must_use]
pub fn process_event(
    frames: &[RawFrame],
    pedestals: &CalibrationTable,
    noise: &CalibrationTable,
    ctx: &PipelineContext,
) -> EventOutput {
    let estimator = CommonModeEstimator::new(*ctx.common_mode());
    let clusterer = SeededClusterer::new(*ctx.clustering());

    let results: Vec<Result<ChipOutput, (usize, Error)>> = frames
        .par_iter()
        .map(|frame| {
            frame
                .validate(ctx.topology())
                .map_err(|err| (frame.chip, err))?;
            Ok(process_chip(frame, pedestals, noise, ctx, &estimator, &clusterer))
        })
        .collect();

    let mut chips = Vec::with_capacity(frames.len());
    let mut skipped = Vec::new();
    for result in results {
        match result {
            Ok(output) => chips.push(output),
            Err(skip) => skipped.push(skip),
        }
    }
    chips.sort_by_key(|output| output.chip);

    EventOutput {
        event: frames.first().map_or(0, |frame| frame.event),
        chips,
        skipped,
    }
}

fn process_chip(
    frame: &RawFrame,
    pedestals: &CalibrationTable,
    noise: &CalibrationTable,
    ctx: &PipelineContext,
    estimator: &CommonModeEstimator,
    clusterer: &SeededClusterer,
) -> ChipOutput {
    let mask = ctx.mask().row(frame.chip);
    let pedestal_row = pedestals.row(frame.chip);

    let subtracted: Vec<f64> = frame
        .samples
        .iter()
        .zip(pedestal_row)
        .map(|(&sample, &pedestal)| sample - pedestal)
        .collect();

    let (corrected, correction) = estimator.correct(&subtracted, mask);
    let clusters = clusterer.cluster(&corrected, noise.row(frame.chip), mask, frame.chip);

    ChipOutput {
        chip: frame.chip,
        correction,
        clusters,
    }
}

/// Summary of one calibration pass.
#[derive(Debug, Clone, PartialEq)]
pub struct CalibrationSummary {
    /// The pedestal and noise tables.
    pub tables: CalibrationTables,
    /// Number of frames accumulated.
    pub frames_used: usize,
    /// Frames skipped for shape mismatches, with the reason.
    pub skipped: Vec<(u64, Error)>,
}

/// Runs the calibration pass over a full run of raw frames.
///
/// Every frame of the run must be available before the returned tables
/// are valid; per-event processing must not start earlier. Mis-shaped
/// frames are skipped and reported, never silently truncated.
pub fn calibrate_run<I>(frames: I, ctx: &PipelineContext) -> CalibrationSummary
where
    I: IntoIterator<Item = RawFrame>,
{
    let mut accumulator = PedestalAccumulator::new(ctx);
    let mut frames_used = 0;
    let mut skipped = Vec::new();

    for frame in frames {
        match accumulator.accumulate(&frame, ctx) {
            Ok(()) => frames_used += 1,
            Err(err) => skipped.push((frame.event, err)),
        }
    }

    CalibrationSummary {
        tables: accumulator.finalize(ctx),
        frames_used,
        skipped,
    }
}
