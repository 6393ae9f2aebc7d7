//! Plain-text raw-frame reader.

use std::fs::File;
use std::io::{BufRead, BufReader, Lines};
use std::path::Path;

use ruststrip_core::{RawFrame, Topology};

use crate::error::{Error, Result};

/// Reader for the plain-text frame format.
///
/// One frame per line: `event chip sample0 sample1 ... sampleN`,
/// whitespace-separated. Blank lines and lines starting with `#` are
/// ignored. Frames are shape-checked against the topology as they are
/// read.
pub struct FrameReader {
    lines: Lines<BufReader<File>>,
    topology: Topology,
    line_number: usize,
}

impl FrameReader {
    /// Opens a frame file.
    pub fn open<P: AsRef<Path>>(path: P, topology: Topology) -> Result<Self> {
        let file = File::open(path)?;
        Ok(Self {
            lines: BufReader::new(file).lines(),
            topology,
            line_number: 0,
        })
    }

    fn parse_line(&self, line: &str) -> Result<RawFrame> {
        let invalid = |reason: &str| Error::InvalidFormat {
            line: self.line_number,
            reason: reason.to_string(),
        };

        let mut fields = line.split_whitespace();
        let event = fields
            .next()
            .ok_or_else(|| invalid("missing event number"))?
            .parse()
            .map_err(|_| invalid("unparsable event number"))?;
        let chip = fields
            .next()
            .ok_or_else(|| invalid("missing chip number"))?
            .parse()
            .map_err(|_| invalid("unparsable chip number"))?;

        let samples: Vec<f64> = fields
            .map(|field| field.parse().map_err(|_| invalid("unparsable sample")))
            .collect::<Result<_>>()?;

        let frame = RawFrame::new(event, chip, samples);
        frame.validate(self.topology)?;
        Ok(frame)
    }

    /// Reads every remaining frame into a vector.
    pub fn read_all(self) -> Result<Vec<RawFrame>> {
        self.collect()
    }
}

impl Iterator for FrameReader {
    type Item = Result<RawFrame>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let line = match self.lines.next()? {
                Ok(line) => line,
                Err(err) => return Some(Err(err.into())),
            };
            self.line_number += 1;
            let trimmed = line.trim();
            if trimmed.is_empty() || trimmed.starts_with('#') {
                continue;
            }
            return Some(self.parse_line(trimmed));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_file(contents: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_read_frames() {
        let file = write_file(
            "# event chip samples\n\
             0 0 100.5 101.0 99.5 100.0\n\
             \n\
             0 1 200.0 201.0 199.0 200.5\n\
             1 0 100.0 100.0 100.0 100.0\n",
        );
        let reader = FrameReader::open(file.path(), Topology::new(2, 4)).unwrap();
        let frames = reader.read_all().unwrap();

        assert_eq!(frames.len(), 3);
        assert_eq!(frames[0].event, 0);
        assert_eq!(frames[0].chip, 0);
        assert!((frames[0].samples[0] - 100.5).abs() < f64::EPSILON);
        assert_eq!(frames[1].chip, 1);
        assert_eq!(frames[2].event, 1);
    }

    #[test]
    fn test_malformed_line_is_reported_with_number() {
        let file = write_file("0 0 1.0 2.0\n0 zero 1.0 2.0\n");
        let mut reader = FrameReader::open(file.path(), Topology::new(1, 2)).unwrap();

        assert!(reader.next().unwrap().is_ok());
        let err = reader.next().unwrap().unwrap_err();
        assert!(matches!(err, Error::InvalidFormat { line: 2, .. }));
    }

    #[test]
    fn test_wrong_sample_count_is_shape_error() {
        let file = write_file("0 0 1.0 2.0 3.0\n");
        let mut reader = FrameReader::open(file.path(), Topology::new(1, 2)).unwrap();
        let err = reader.next().unwrap().unwrap_err();
        assert!(matches!(err, Error::Core(_)));
    }
}
