//! Stats source: a thin wrapper around the `docker stats` CLI.
//!
//! One poll is one `docker stats --no-stream --format '{{json .}}'`
//! invocation. Every output line is a JSON object of display strings,
//! which is exactly the shape the conversion pipeline consumes. The
//! runtime itself stays a black box behind this module.

use serde::Deserialize;
use thiserror::Error;
use tokio::process::Command;

/// A single stat record as printed by the container runtime.
///
/// All fields are human-readable display strings; normalization happens
/// later in the pipeline. Fields the recorder does not consume (memory
/// percent and friends) are ignored during decoding.
#[derive(Debug, Clone, Deserialize)]
pub struct RawStats {
    /// Short container ID.
    #[serde(rename = "Container", default)]
    pub container: String,

    /// Container ID (may equal `container` depending on engine version).
    #[serde(rename = "ID", default)]
    pub id: String,

    /// Container name.
    #[serde(rename = "Name", default)]
    pub name: String,

    /// CPU usage, e.g. `"0.25%"`.
    #[serde(rename = "CPUPerc", default)]
    pub cpu: String,

    /// Memory usage and limit, e.g. `"88KiB / 7.66GiB"`.
    #[serde(rename = "MemUsage", default)]
    pub mem_usage: String,

    /// Block IO read and write totals, e.g. `"4.1MB / 0B"`.
    #[serde(rename = "BlockIO", default)]
    pub block_io: String,

    /// Network IO, e.g. `"1.45kB / 0B"`.
    #[serde(rename = "NetIO", default)]
    pub net_io: String,

    /// Process count, e.g. `"2"`.
    #[serde(rename = "PIDs", default)]
    pub pids: String,
}

impl RawStats {
    /// Whether this record belongs to the monitored container.
    ///
    /// Accepts the container name, or a prefix of the short or full ID,
    /// so truncated IDs work the same way they do on the docker CLI.
    pub fn matches(&self, target: &str) -> bool {
        if target.is_empty() {
            return false;
        }
        self.name == target || self.container.starts_with(target) || self.id.starts_with(target)
    }
}

/// Errors from a single stats poll.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("failed to spawn {binary:?}")]
    Spawn {
        binary: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{binary:?} exited with {status}: {stderr}")]
    Command {
        binary: String,
        status: std::process::ExitStatus,
        stderr: String,
    },
}

/// Polls the container runtime for stat records, one snapshot per call.
#[derive(Debug, Clone)]
pub struct DockerStatsSource {
    binary: String,
}

impl DockerStatsSource {
    /// Create a source that invokes the given CLI binary (normally
    /// `docker`; `podman` speaks the same stats format).
    pub fn new(binary: impl Into<String>) -> Self {
        Self {
            binary: binary.into(),
        }
    }

    /// Collect one snapshot of stat records for all running containers.
    pub async fn poll(&self) -> Result<Vec<RawStats>, SourceError> {
        let output = Command::new(&self.binary)
            .args(["stats", "--no-stream", "--format", "{{json .}}"])
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|source| SourceError::Spawn {
                binary: self.binary.clone(),
                source,
            })?;

        if !output.status.success() {
            return Err(SourceError::Command {
                binary: self.binary.clone(),
                status: output.status,
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        Ok(decode_records(&String::from_utf8_lossy(&output.stdout)))
    }
}

/// Decode one record per non-empty line.
///
/// Lines that fail to decode are logged and skipped so a single garbled
/// record cannot poison the whole poll.
fn decode_records(stdout: &str) -> Vec<RawStats> {
    let mut records = Vec::new();
    for line in stdout.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        match serde_json::from_str::<RawStats>(line) {
            Ok(record) => records.push(record),
            Err(error) => {
                tracing::warn!(%error, line, "Skipping undecodable stats record");
            }
        }
    }
    records
}
