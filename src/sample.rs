//! Parsed stat samples, one per recorded spreadsheet row.

use chrono::{DateTime, Local};

use crate::docker::RawStats;
use crate::units::{self, ParseError};

/// One fully-parsed stat sample.
#[derive(Debug, Clone, PartialEq)]
pub struct Sample {
    /// Wall-clock time the record was observed.
    pub timestamp: DateTime<Local>,
    /// CPU usage in percent.
    pub cpu_percent: f64,
    /// Memory usage in mebibytes (usage side of `"usage / limit"`).
    pub memory_mib: f64,
    /// Cumulative block IO read in mebibytes.
    pub block_read_mib: f64,
    /// Cumulative block IO write in mebibytes.
    pub block_write_mib: f64,
}

impl Sample {
    /// Parse a raw stat record into a sample.
    ///
    /// A record converts completely or not at all: any unparsable field,
    /// including the runtime's `"--"` placeholder for values it cannot
    /// report, fails the whole record.
    pub fn from_raw(raw: &RawStats, timestamp: DateTime<Local>) -> Result<Self, ParseError> {
        let cpu_percent = units::parse_percent(&raw.cpu)?;
        let memory_mib = units::parse_size(units::usage_part(&raw.mem_usage))?;
        let (read, write) = units::split_pair(&raw.block_io)?;

        Ok(Self {
            timestamp,
            cpu_percent,
            memory_mib,
            block_read_mib: units::parse_size(read)?,
            block_write_mib: units::parse_size(write)?,
        })
    }
}
