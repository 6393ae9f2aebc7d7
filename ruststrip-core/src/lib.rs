//! ruststrip-core: Core types for silicon-strip readout signal processing.
//!
//! This crate provides the foundational data model for the strip pipeline:
//! readout topology, channel masking, raw sample frames, calibration tables,
//! common-mode corrections, cluster records, and the run configuration.
//!

pub mod cluster;
pub mod config;
pub mod context;
pub mod correction;
pub mod error;
pub mod frame;
pub mod mask;
pub mod table;
pub mod topology;

pub use cluster::{Polarity, StripCluster};
pub use config::{ClusteringConfig, CommonModeConfig, CommonModeMode};
pub use context::PipelineContext;
pub use correction::CommonModeCorrection;
pub use error::{Error, Result};
pub use frame::RawFrame;
pub use mask::{ChannelMask, ChannelRange};
pub use table::CalibrationTable;
pub use topology::Topology;
