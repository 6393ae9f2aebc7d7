//! Cluster record output.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use ruststrip_core::{Polarity, StripCluster};

use crate::error::Result;

/// Buffered writer for cluster records.
pub struct ClusterWriter {
    writer: BufWriter<File>,
    wrote_header: bool,
}

impl ClusterWriter {
    /// Creates a new cluster writer.
    pub fn create<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::create(path)?;
        Ok(Self {
            writer: BufWriter::new(file),
            wrote_header: false,
        })
    }

    /// Writes one event's clusters as CSV.
    ///
    /// Member channels and signals are `;`-joined in construction order.
    /// The header line is written once, before the first record.
    pub fn write_event_csv(&mut self, event: u64, clusters: &[StripCluster]) -> Result<()> {
        if !self.wrote_header {
            writeln!(
                self.writer,
                "event,chip,cluster_id,seed,size,eta,polarity,axis,channels,signals"
            )?;
            self.wrote_header = true;
        }

        for cluster in clusters {
            let channels: Vec<String> = cluster.channels().map(|ch| ch.to_string()).collect();
            let signals: Vec<String> = cluster
                .members
                .iter()
                .map(|&(_, signal)| format!("{signal}"))
                .collect();
            writeln!(
                self.writer,
                "{},{},{},{},{},{},{},{},{},{}",
                event,
                cluster.chip,
                cluster.id,
                cluster.seed,
                cluster.size(),
                cluster.eta,
                match cluster.polarity {
                    Polarity::Positive => "+1",
                    Polarity::Negative => "-1",
                },
                if cluster.sensitive_axis_x { "x" } else { "y" },
                channels.join(";"),
                signals.join(";"),
            )?;
        }

        self.writer.flush()?;
        Ok(())
    }

    /// Writes one event's clusters as little-endian binary records.
    ///
    /// Per cluster: u64 event + u32 chip + u32 id + u32 seed + u32 size +
    /// f64 eta, then size pairs of u32 channel + f64 signal.
    #[allow(clippy::cast_possible_truncation)]
    pub fn write_event_binary(&mut self, event: u64, clusters: &[StripCluster]) -> Result<()> {
        for cluster in clusters {
            self.writer.write_all(&event.to_le_bytes())?;
            self.writer.write_all(&(cluster.chip as u32).to_le_bytes())?;
            self.writer.write_all(&cluster.id.to_le_bytes())?;
            self.writer.write_all(&(cluster.seed as u32).to_le_bytes())?;
            self.writer
                .write_all(&(cluster.size() as u32).to_le_bytes())?;
            self.writer.write_all(&cluster.eta.to_le_bytes())?;
            for &(channel, signal) in &cluster.members {
                self.writer.write_all(&(channel as u32).to_le_bytes())?;
                self.writer.write_all(&signal.to_le_bytes())?;
            }
        }

        self.writer.flush()?;
        Ok(())
    }

    /// Flushes the writer.
    pub fn flush(&mut self) -> Result<()> {
        self.writer.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    fn sample_cluster() -> StripCluster {
        StripCluster {
            chip: 1,
            seed: 60,
            id: 0,
            members: vec![(60, 40.0), (61, 25.0)],
            eta: 1.0,
            sensitive_axis_x: true,
            polarity: Polarity::Positive,
        }
    }

    #[test]
    fn test_write_csv() {
        let file = NamedTempFile::new().unwrap();
        let mut writer = ClusterWriter::create(file.path()).unwrap();

        writer.write_event_csv(5, &[sample_cluster()]).unwrap();
        writer.write_event_csv(6, &[]).unwrap();

        let content = std::fs::read_to_string(file.path()).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(
            lines[0],
            "event,chip,cluster_id,seed,size,eta,polarity,axis,channels,signals"
        );
        assert_eq!(lines[1], "5,1,0,60,2,1,+1,x,60;61,40;25");
    }

    #[test]
    fn test_write_binary_record_size() {
        let file = NamedTempFile::new().unwrap();
        let mut writer = ClusterWriter::create(file.path()).unwrap();

        writer.write_event_binary(5, &[sample_cluster()]).unwrap();

        let data = std::fs::read(file.path()).unwrap();
        // 8 + 4 + 4 + 4 + 4 + 8 header = 32, plus 2 members of 4 + 8.
        assert_eq!(data.len(), 32 + 2 * 12);
    }
}
