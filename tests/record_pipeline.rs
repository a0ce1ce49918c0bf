//! End-to-end pipeline test: raw stat records through unit conversion
//! into the row buffer and out to a workbook file.

use chrono::Local;
use tempfile::TempDir;

use container_stats_recorder::docker::RawStats;
use container_stats_recorder::recorder::StatsRecorder;
use container_stats_recorder::sample::Sample;

fn record(cpu: &str, mem_usage: &str, block_io: &str) -> RawStats {
    serde_json::from_str(&format!(
        r#"{{"Container":"4f7b9c2d1e0a","ID":"4f7b9c2d1e0a93c1","Name":"web-1",
            "CPUPerc":"{cpu}","MemUsage":"{mem_usage}","BlockIO":"{block_io}",
            "NetIO":"1.45kB / 0B","PIDs":"12"}}"#
    ))
    .unwrap()
}

#[test]
fn records_flow_from_raw_strings_to_workbook() {
    let raws = [
        record("0.25%", "88.5MiB / 7.66GiB", "4.1MB / 0B"),
        record("101.50%", "1.2GiB / 7.66GiB", "12MB / 930kB"),
        record("0.00%", "512kB / 7.66GiB", "0B / 0B"),
    ];

    let mut recorder = StatsRecorder::new();
    for raw in &raws {
        let sample = Sample::from_raw(raw, Local::now()).unwrap();
        recorder.append(sample);
    }
    assert_eq!(recorder.len(), 3);

    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("run-stats.xlsx");
    recorder.flush_to_file(&path).unwrap();

    let metadata = std::fs::metadata(&path).unwrap();
    assert!(metadata.len() > 0);
}

#[test]
fn unparsable_records_are_rejected_not_zeroed() {
    // A paused container reports "--" for everything it cannot measure;
    // those records must fail conversion rather than append zero rows.
    let raw = record("--", "-- / --", "-- / --");
    assert!(Sample::from_raw(&raw, Local::now()).is_err());

    let mut recorder = StatsRecorder::new();
    if let Ok(sample) = Sample::from_raw(&raw, Local::now()) {
        recorder.append(sample);
    }
    assert!(recorder.is_empty());
}

#[test]
fn mixed_unit_families_normalize_to_mebibytes() {
    let raw = record("3.14%", "2GiB / 4GiB", "1.2GB / 512KiB");
    let sample = Sample::from_raw(&raw, Local::now()).unwrap();

    assert_eq!(sample.memory_mib, 2048.0);
    assert!((sample.block_read_mib - 1228.8).abs() < 1e-9);
    assert!((sample.block_write_mib - 0.5).abs() < 1e-9);
}
