//! Reconstruction over JSON files on disk

mod common;

use std::io::Write;

use common::*;
use sensor_snapshots::adapters::{FileRegistry, FileStore};
use sensor_snapshots::core::{AlignConfig, FallbackPolicy};
use sensor_snapshots::service::{ServiceError, SnapshotRequest, SnapshotService};
use tempfile::NamedTempFile;

fn write(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file
}

#[test]
fn test_reconstruct_from_files() {
    let devices = write(r#"["kitchen", "office", "cellar"]"#);
    let records = write(
        r#"[
        {"controllerID": "office", "timeStampISO": "2024-01-01T00:35:00.000Z",
         "data": {"pm2_5": 8, "pm10": 12, "co2": 900, "temperature": 22.5, "humidity": 38}},
        {"deviceId": "kitchen", "timestamp": "2024-01-01T00:05:00Z",
         "reading": {"pm2_5": 30, "pm10": 45, "co2": 650, "temperature": 24, "humidity": 55}},
        {"deviceId": "kitchen", "timestamp": "2024-01-01T00:25:00Z",
         "reading": {"pm2_5": 20, "pm10": 35, "co2": 600, "temperature": 23, "humidity": 50}}
    ]"#,
    );

    let svc = SnapshotService::new(
        FileRegistry::new(devices.path()).page_size(1),
        FileStore::new(records.path()),
        AlignConfig::new(FallbackPolicy::ZeroBaseline),
    );

    let snapshots = svc
        .reconstruct_at(&SnapshotRequest::new(at(0, 0), 3), at(1, 0))
        .unwrap();

    let kitchen: Vec<_> = snapshots.iter().map(|s| s.get(&id("kitchen")).unwrap().co2).collect();
    let office: Vec<_> = snapshots.iter().map(|s| s.get(&id("office")).unwrap().co2).collect();
    let cellar: Vec<_> = snapshots.iter().map(|s| s.get(&id("cellar")).unwrap().co2).collect();

    assert_eq!(kitchen, vec![650.0, 650.0, 600.0]);
    assert_eq!(office, vec![900.0, 900.0, 900.0]);
    assert_eq!(cellar, vec![0.0, 0.0, 0.0]);
}

#[test]
fn test_malformed_record_fails_request() {
    let devices = write(r#"["a"]"#);
    let records = write(
        r#"[{"deviceId": "a", "timestamp": "not-a-time",
             "reading": {"pm2_5": 1, "pm10": 1, "co2": 1, "temperature": 1, "humidity": 1}}]"#,
    );

    let svc = SnapshotService::new(
        FileRegistry::new(devices.path()),
        FileStore::new(records.path()),
        AlignConfig::default(),
    );

    let err = svc
        .reconstruct_at(&SnapshotRequest::new(at(0, 0), 3), at(1, 0))
        .unwrap_err();

    // a bad store payload is the collaborator's fault, not the caller's
    assert!(matches!(err, ServiceError::Store(_)));
    assert_eq!(err.status_code(), 500);
}
