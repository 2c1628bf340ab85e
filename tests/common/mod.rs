//! Shared fixtures for the reconstruction suites

#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};

use chrono::{DateTime, TimeZone, Utc};

use sensor_snapshots::adapters::{MemoryRegistry, MemoryStore};
use sensor_snapshots::core::{AlignConfig, DeviceId, FallbackPolicy, MeasurementRecord, Reading};
use sensor_snapshots::ports::{
    DevicePage, DeviceRegistry, MeasurementStore, RegistryError, RegistryResult, StoreError,
    StoreResult,
};
use sensor_snapshots::service::SnapshotService;

pub fn at(h: u32, m: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, 1, h, m, 0).unwrap()
}

pub fn id(s: &str) -> DeviceId {
    DeviceId::new(s).unwrap()
}

/// A reading whose fields are all derived from `v`
pub fn reading(v: f64) -> Reading {
    Reading::new(v, v + 1.0, 400.0 + v, 20.0 + v / 10.0, 40.0).unwrap()
}

pub fn record(device: &str, ts: DateTime<Utc>, v: f64) -> MeasurementRecord {
    MeasurementRecord::new(id(device), ts, reading(v))
}

/// Service over in-memory collaborators, registry paged two at a time
pub fn service(
    devices: &[&str],
    records: Vec<MeasurementRecord>,
    fallback: FallbackPolicy,
) -> SnapshotService<MemoryRegistry, MemoryStore> {
    let registry = MemoryRegistry::with_page_size(devices.iter().map(|d| id(d)).collect(), 2);
    SnapshotService::new(
        registry,
        MemoryStore::new(records),
        AlignConfig::new(fallback),
    )
}

/// Registry that counts calls
pub struct CountingRegistry {
    pub inner: MemoryRegistry,
    pub calls: AtomicUsize,
}

impl CountingRegistry {
    pub fn new(devices: &[&str]) -> Self {
        Self {
            inner: MemoryRegistry::new(devices.iter().map(|d| id(d)).collect()),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl DeviceRegistry for CountingRegistry {
    fn list_page(&self, token: Option<&str>) -> RegistryResult<DevicePage> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.inner.list_page(token)
    }
}

/// Store that counts calls
pub struct CountingStore {
    pub inner: MemoryStore,
    pub calls: AtomicUsize,
}

impl CountingStore {
    pub fn new(records: Vec<MeasurementRecord>) -> Self {
        Self {
            inner: MemoryStore::new(records),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl MeasurementStore for CountingStore {
    fn query_range(
        &self,
        until: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> StoreResult<Vec<MeasurementRecord>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.inner.query_range(until, now)
    }
}

pub struct DownRegistry;

impl DeviceRegistry for DownRegistry {
    fn list_page(&self, _token: Option<&str>) -> RegistryResult<DevicePage> {
        Err(RegistryError::Connection("registry unreachable".into()))
    }
}

pub struct DownStore;

impl MeasurementStore for DownStore {
    fn query_range(
        &self,
        _until: DateTime<Utc>,
        _now: DateTime<Utc>,
    ) -> StoreResult<Vec<MeasurementRecord>> {
        Err(StoreError::Request("access denied".into()))
    }
}
