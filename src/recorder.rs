//! In-memory row buffer and spreadsheet flush.
//!
//! Samples accumulate in memory for the whole run and are written out
//! exactly once, when the run terminates. There is no mid-run
//! persistence.

use std::path::Path;

use rust_xlsxwriter::{Workbook, XlsxError};
use thiserror::Error;

use crate::sample::Sample;

/// Column headers, matching the recorded sample fields in order.
pub const HEADERS: [&str; 5] = [
    "Timestamp",
    "CPU Usage (%)",
    "Memory (MB)",
    "Block IO Read (MB)",
    "Block IO Write (MB)",
];

/// Errors from flushing the buffer to a workbook.
#[derive(Debug, Error)]
pub enum RecorderError {
    #[error("failed to encode workbook: {0}")]
    Xlsx(#[from] XlsxError),
}

/// Append-only sample buffer, flushed to a workbook at shutdown.
#[derive(Debug, Default)]
pub struct StatsRecorder {
    samples: Vec<Sample>,
}

impl StatsRecorder {
    /// Create an empty buffer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a sample. Rows are written in append order.
    pub fn append(&mut self, sample: Sample) {
        self.samples.push(sample);
    }

    /// Number of buffered samples.
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Encode the buffer as an `.xlsx` workbook at `path`.
    ///
    /// Timestamps are written as RFC 3339 text cells, metrics as number
    /// cells. An empty buffer still produces a workbook with the header
    /// row.
    pub fn flush_to_file(&self, path: &Path) -> Result<(), RecorderError> {
        let mut workbook = Workbook::new();
        let worksheet = workbook.add_worksheet();

        for (col, header) in HEADERS.iter().enumerate() {
            worksheet.write_string(0, col as u16, *header)?;
        }

        for (i, sample) in self.samples.iter().enumerate() {
            let row = (i + 1) as u32;
            worksheet.write_string(row, 0, sample.timestamp.to_rfc3339())?;
            worksheet.write_number(row, 1, sample.cpu_percent)?;
            worksheet.write_number(row, 2, sample.memory_mib)?;
            worksheet.write_number(row, 3, sample.block_read_mib)?;
            worksheet.write_number(row, 4, sample.block_write_mib)?;
        }

        workbook.save(path)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use chrono::Local;
    use tempfile::TempDir;

    use super::*;

    fn sample(cpu: f64) -> Sample {
        Sample {
            timestamp: Local::now(),
            cpu_percent: cpu,
            memory_mib: 512.0,
            block_read_mib: 4.1,
            block_write_mib: 0.9,
        }
    }

    #[test]
    fn test_append_preserves_order() {
        let mut recorder = StatsRecorder::new();
        assert!(recorder.is_empty());

        recorder.append(sample(1.0));
        recorder.append(sample(2.0));
        recorder.append(sample(3.0));

        assert_eq!(recorder.len(), 3);
        assert_eq!(recorder.samples[0].cpu_percent, 1.0);
        assert_eq!(recorder.samples[2].cpu_percent, 3.0);
    }

    #[test]
    fn test_flush_writes_workbook() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("stats.xlsx");

        let mut recorder = StatsRecorder::new();
        recorder.append(sample(0.25));
        recorder.append(sample(0.50));
        recorder.flush_to_file(&path).unwrap();

        let metadata = std::fs::metadata(&path).unwrap();
        assert!(metadata.len() > 0);
    }

    #[test]
    fn test_flush_empty_buffer_still_writes_headers() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("empty.xlsx");

        StatsRecorder::new().flush_to_file(&path).unwrap();
        assert!(path.exists());
    }

    #[test]
    fn test_flush_to_unwritable_path_errors() {
        let recorder = StatsRecorder::new();
        let result = recorder.flush_to_file(Path::new("/nonexistent/dir/stats.xlsx"));
        assert!(result.is_err());
    }
}
