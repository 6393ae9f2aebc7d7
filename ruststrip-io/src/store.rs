//! Calibration table persistence.

use std::fs::{self, File};
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use ruststrip_core::{CalibrationTable, Topology};

use crate::error::{Error, Result};

/// On-disk calibration record for one run.
#[derive(Debug, Serialize, Deserialize)]
struct CalibrationRecord {
    topology: Topology,
    pedestals: Vec<f64>,
    noise: Vec<f64>,
}

/// Directory-backed store for pedestal and noise tables, keyed by an
/// opaque run identifier.
///
/// Tables are written as one JSON file per run. The run identifier is
/// sanitized into the file name; any character outside `[A-Za-z0-9._-]`
/// becomes `_`.
#[derive(Debug, Clone)]
pub struct CalibrationStore {
    dir: PathBuf,
}

impl CalibrationStore {
    /// Opens a store rooted at `dir`, creating the directory if needed.
    pub fn open<P: AsRef<Path>>(dir: P) -> Result<Self> {
        fs::create_dir_all(&dir)?;
        Ok(Self {
            dir: dir.as_ref().to_path_buf(),
        })
    }

    fn path_for(&self, run: &str) -> PathBuf {
        let sanitized: String = run
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
                    c
                } else {
                    '_'
                }
            })
            .collect();
        self.dir.join(format!("{sanitized}.calib.json"))
    }

    /// Persists the pedestal and noise tables for a run.
    pub fn put(
        &self,
        run: &str,
        pedestals: &CalibrationTable,
        noise: &CalibrationTable,
    ) -> Result<()> {
        let record = CalibrationRecord {
            topology: pedestals.topology(),
            pedestals: pedestals.values().to_vec(),
            noise: noise.values().to_vec(),
        };
        let file = File::create(self.path_for(run))?;
        serde_json::to_writer_pretty(BufWriter::new(file), &record)?;
        Ok(())
    }

    /// Loads the pedestal and noise tables for a run.
    ///
    /// The stored topology must match the requested one.
    pub fn get(
        &self,
        run: &str,
        topology: Topology,
    ) -> Result<(CalibrationTable, CalibrationTable)> {
        let path = self.path_for(run);
        if !path.exists() {
            return Err(Error::MissingCalibration(run.to_string()));
        }
        let file = File::open(path)?;
        let record: CalibrationRecord = serde_json::from_reader(BufReader::new(file))?;

        if record.topology != topology {
            return Err(Error::TopologyMismatch {
                run: run.to_string(),
            });
        }
        let pedestals = CalibrationTable::from_values(topology, record.pedestals);
        let noise = CalibrationTable::from_values(topology, record.noise);
        match (pedestals, noise) {
            (Some(pedestals), Some(noise)) => Ok((pedestals, noise)),
            _ => Err(Error::TopologyMismatch {
                run: run.to_string(),
            }),
        }
    }

    /// Returns true if a calibration exists for the run.
    #[must_use]
    pub fn contains(&self, run: &str) -> bool {
        self.path_for(run).exists()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_put_get_round_trip() {
        let dir = TempDir::new().unwrap();
        let store = CalibrationStore::open(dir.path()).unwrap();

        let topo = Topology::new(2, 8);
        let mut pedestals = CalibrationTable::zeros(topo);
        pedestals.set(1, 3, 101.25);
        let mut noise = CalibrationTable::zeros(topo);
        noise.set(0, 7, 4.5);

        store.put("run-042", &pedestals, &noise).unwrap();
        assert!(store.contains("run-042"));

        let (loaded_pedestals, loaded_noise) = store.get("run-042", topo).unwrap();
        assert_eq!(loaded_pedestals, pedestals);
        assert_eq!(loaded_noise, noise);
    }

    #[test]
    fn test_missing_run() {
        let dir = TempDir::new().unwrap();
        let store = CalibrationStore::open(dir.path()).unwrap();
        let result = store.get("nope", Topology::new(1, 8));
        assert!(matches!(result, Err(Error::MissingCalibration(_))));
    }

    #[test]
    fn test_topology_mismatch() {
        let dir = TempDir::new().unwrap();
        let store = CalibrationStore::open(dir.path()).unwrap();

        let topo = Topology::new(1, 8);
        let table = CalibrationTable::zeros(topo);
        store.put("run", &table, &table).unwrap();

        let result = store.get("run", Topology::new(2, 8));
        assert!(matches!(result, Err(Error::TopologyMismatch { .. })));
    }

    #[test]
    fn test_run_id_sanitized() {
        let dir = TempDir::new().unwrap();
        let store = CalibrationStore::open(dir.path()).unwrap();

        let topo = Topology::new(1, 2);
        let table = CalibrationTable::zeros(topo);
        store.put("run/2024 #7", &table, &table).unwrap();
        assert!(store.contains("run/2024 #7"));
        assert!(dir.path().join("run_2024__7.calib.json").exists());
    }
}
