//! ruststrip-io: File I/O for the strip pipeline.
//!
//! Calibration tables are persisted as JSON keyed by an opaque run
//! identifier; clusters are written as CSV or little-endian binary
//! records; raw frames are read from a plain-text format so a host
//! pipeline or the CLI can feed the processing stages.
//!

mod error;
mod reader;
mod store;
mod writer;

pub use error::{Error, Result};
pub use reader::FrameReader;
pub use store::CalibrationStore;
pub use writer::ClusterWriter;
