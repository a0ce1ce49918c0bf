//! Record a container's resource usage to a spreadsheet.
//!
//! Polls `docker stats` at a fixed interval, normalizes the
//! human-readable size and percent strings, and buffers one row per
//! sample in memory. When the run is interrupted (SIGINT/SIGTERM) the
//! buffer is written out as an `.xlsx` workbook named after the
//! container and the start of the run.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context;
use chrono::Local;
use clap::Parser;
use serde::Serialize;
use tokio::signal::unix::{signal, SignalKind};
use tokio::sync::watch;
use uuid::Uuid;

use container_stats_recorder::docker::DockerStatsSource;
use container_stats_recorder::recorder::StatsRecorder;
use container_stats_recorder::sample::Sample;

/// Cap on buffered samples before the run flushes and exits. At the
/// default 1s interval this is well over a week of recording.
const MAX_SAMPLES: usize = 1_000_000;

/// Container resource usage recorder
#[derive(Parser, Debug, Clone)]
#[command(name = "container-stats-recorder")]
#[command(about = "Record container CPU, memory and block IO to an .xlsx workbook")]
struct Args {
    /// Container to monitor (name, or any unique ID prefix)
    #[arg(long, env = "CONTAINER_ID")]
    container_id: String,

    /// Name used for the output filename (defaults to the container ID)
    #[arg(long, env = "CONTAINER_NAME")]
    container_name: Option<String>,

    /// Sampling interval in milliseconds
    #[arg(short, long, default_value = "1000")]
    interval_ms: u64,

    /// Output directory for the workbook and session manifest
    #[arg(short, long, default_value = ".")]
    output_dir: PathBuf,

    /// Container CLI binary used to read stats
    #[arg(long, env = "DOCKER_BIN", default_value = "docker")]
    docker_bin: String,
}

/// Session manifest written on startup for run context
#[derive(Serialize)]
struct SessionManifest {
    run_id: String,
    container_id: String,
    container_name: String,
    start_time: String,
    config: SessionConfig,
}

#[derive(Serialize)]
struct SessionConfig {
    sampling_interval_ms: u64,
    docker_bin: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing - RUST_LOG takes precedence, fallback to info
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();

    tracing::info!(
        container_id = %args.container_id,
        interval_ms = args.interval_ms,
        output_dir = %args.output_dir.display(),
        docker_bin = %args.docker_bin,
        "Starting container-stats-recorder"
    );

    run(args).await
}

/// Generate the workbook filename for this run. Local time, matching the
/// timestamps recorded in the rows.
fn generate_filename(container_name: &str) -> String {
    format!(
        "{}-{}-stats.xlsx",
        Local::now().format("%Y%m%d-%H%M%S"),
        container_name
    )
}

/// Write session manifest to the output directory
async fn write_session_manifest(
    args: &Args,
    container_name: &str,
    run_id: &str,
) -> anyhow::Result<()> {
    let manifest = SessionManifest {
        run_id: run_id.to_string(),
        container_id: args.container_id.clone(),
        container_name: container_name.to_string(),
        start_time: Local::now().to_rfc3339(),
        config: SessionConfig {
            sampling_interval_ms: args.interval_ms,
            docker_bin: args.docker_bin.clone(),
        },
    };

    let manifest_path = args.output_dir.join("session.json");
    let json = serde_json::to_string_pretty(&manifest)?;
    tokio::fs::write(&manifest_path, json).await?;

    tracing::info!(path = %manifest_path.display(), "Wrote session manifest");
    Ok(())
}

async fn run(args: Args) -> anyhow::Result<()> {
    // Ensure output directory exists
    tokio::fs::create_dir_all(&args.output_dir)
        .await
        .context("Failed to create output directory")?;

    let run_id = Uuid::new_v4().to_string();
    let container_name = args
        .container_name
        .clone()
        .unwrap_or_else(|| args.container_id.clone());

    tracing::info!(
        run_id = %run_id,
        container = %container_name,
        "Configured run identifiers"
    );

    write_session_manifest(&args, &container_name, &run_id).await?;

    // Workbook is named for the start of the run, like the row timestamps
    let output_path = args.output_dir.join(generate_filename(&container_name));

    // Set up shutdown coordination
    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    // Set up OS signal handlers
    let mut sigint = signal(SignalKind::interrupt())?;
    let mut sigterm = signal(SignalKind::terminate())?;

    // Spawn signal handler task
    let shutdown_tx_clone = shutdown_tx.clone();
    tokio::spawn(async move {
        tokio::select! {
            _ = sigint.recv() => {
                tracing::info!("Received SIGINT, initiating graceful shutdown");
            }
            _ = sigterm.recv() => {
                tracing::info!("Received SIGTERM, initiating graceful shutdown");
            }
        }
        let _ = shutdown_tx_clone.send(true);
    });

    let recorder = sampling_loop(&args, shutdown_rx).await;

    // Flush the buffer exactly once, after the loop has exited
    recorder
        .flush_to_file(&output_path)
        .with_context(|| format!("Failed to save workbook to {}", output_path.display()))?;

    tracing::info!(
        rows = recorder.len(),
        file = %output_path.display(),
        "Workbook saved, shutdown complete"
    );
    Ok(())
}

/// Main sampling loop: polls the stats source at the configured interval
/// and buffers rows for the monitored container until shutdown.
async fn sampling_loop(args: &Args, mut shutdown_rx: watch::Receiver<bool>) -> StatsRecorder {
    let source = DockerStatsSource::new(&args.docker_bin);
    let mut recorder = StatsRecorder::new();
    let mut interval = tokio::time::interval(Duration::from_millis(args.interval_ms));

    loop {
        tokio::select! {
            _ = interval.tick() => {
                let records = match source.poll().await {
                    Ok(records) => records,
                    Err(error) => {
                        tracing::warn!(%error, "Stats poll failed, retrying next tick");
                        continue;
                    }
                };

                let observed = Local::now();
                let mut matched = false;
                for raw in records.iter().filter(|r| r.matches(&args.container_id)) {
                    matched = true;
                    match Sample::from_raw(raw, observed) {
                        Ok(sample) => {
                            tracing::debug!(
                                cpu_percent = sample.cpu_percent,
                                memory_mib = sample.memory_mib,
                                block_read_mib = sample.block_read_mib,
                                block_write_mib = sample.block_write_mib,
                                "Recorded sample"
                            );
                            recorder.append(sample);
                        }
                        Err(error) => {
                            tracing::warn!(
                                %error,
                                container = %raw.name,
                                "Skipping unparsable stats record"
                            );
                        }
                    }
                }

                if !matched {
                    tracing::debug!(
                        target_container = %args.container_id,
                        "No stats record for target container"
                    );
                }

                if recorder.len() >= MAX_SAMPLES {
                    tracing::warn!(
                        samples = recorder.len(),
                        limit = MAX_SAMPLES,
                        "Sample limit reached, initiating shutdown"
                    );
                    break;
                }
            }

            _ = shutdown_rx.changed() => {
                if *shutdown_rx.borrow() {
                    tracing::info!("Shutdown requested, exiting sampling loop");
                    break;
                }
            }
        }
    }

    recorder
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_filename_shape() {
        let name = generate_filename("web-1");
        assert!(name.ends_with("-web-1-stats.xlsx"));
        // "YYYYMMDD-HHMMSS-" prefix
        assert_eq!(name.as_bytes()[8], b'-');
        assert_eq!(name.as_bytes()[15], b'-');
    }
}
