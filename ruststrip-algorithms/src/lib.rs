//! ruststrip-algorithms: Signal processing for silicon-strip readout.
//!
//! This crate implements the three processing stages of the strip pipeline:
//! - **Pedestal & noise calibration** - per-channel baseline mean and RMS
//!   from a full calibration run
//! - **Common-mode subtraction** - iterative outlier-rejecting estimate of
//!   the chip-wide baseline shift, constant or linear in channel index
//! - **Seeded clustering** - greedy neighbor growth around high-SNR seeds
//!   with boundary rejection
//!
#![warn(missing_docs)]

mod clusterer;
mod common_mode;
mod pedestal;
mod pipeline;

pub use clusterer::SeededClusterer;
pub use common_mode::CommonModeEstimator;
pub use pedestal::{CalibrationTables, PedestalAccumulator};
pub use pipeline::{calibrate_run, process_event, CalibrationSummary, ChipOutput, EventOutput};

// Re-export the core configuration types used throughout.
pub use ruststrip_core::{ClusteringConfig, CommonModeConfig, CommonModeMode, PipelineContext};
