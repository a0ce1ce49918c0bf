//! Container resource recording to a spreadsheet.
//!
//! This crate provides a tool that polls a container runtime's
//! human-readable stat records, normalizes their size and percent strings,
//! and buffers the parsed samples in memory until the run is interrupted,
//! at which point the buffer is written out as an `.xlsx` workbook.
//!
//! ## Architecture
//!
//! The recorder consists of three main components:
//!
//! 1. **Stats Source** (`docker` module) - Invokes `docker stats` once per
//!    sampling tick and decodes its JSON output into raw string records.
//!
//! 2. **Unit Conversion** (`units` module) - Normalizes size strings
//!    (`"512MiB"`, `"1.2GB"`, `"930kB"`) to mebibytes and percent strings
//!    to plain floats.
//!
//! 3. **Recorder** (`sample` and `recorder` modules) - Converts raw
//!    records to typed rows, buffers them in append order, and flushes
//!    the buffer to the workbook on termination.
//!
//! ## Usage
//!
//! Run against a container until Ctrl-C:
//!
//! ```bash
//! container-stats-recorder \
//!   --container-id 4f7b9c2d1e0a \
//!   --interval-ms 1000 \
//!   --output-dir ./captures
//! ```

pub mod docker;
pub mod recorder;
pub mod sample;
pub mod units;
