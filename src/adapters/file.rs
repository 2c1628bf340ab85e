//! # JSON File Adapters
//!
//! Registry and store read from JSON files on disk.
//!
//! - Registry file: `["device-a", "device-b", ...]`
//! - Records file: `[{"deviceId": .., "timestamp": .., "reading": {..}}, ...]`
//!   (legacy `controllerID` / `timeStampISO` / `data` names are accepted)
//!
//! Files are re-read on every call, so edits show up in the next request.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use tracing::debug;

use super::memory::{slice_page, DEFAULT_PAGE_SIZE};
use crate::core::{validate_all, DeviceId, MeasurementRecord, RawRecord};
use crate::ports::{
    within_range, DevicePage, DeviceRegistry, MeasurementStore, RegistryError, RegistryResult,
    StoreError, StoreResult,
};

/// Registry listing the devices of a JSON file
pub struct FileRegistry {
    path: PathBuf,
    page_size: usize,
}

impl FileRegistry {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            page_size: DEFAULT_PAGE_SIZE,
        }
    }

    /// Set the number of devices per page
    pub fn page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> RegistryResult<Vec<DeviceId>> {
        let text = std::fs::read_to_string(&self.path).map_err(|e| {
            RegistryError::Connection(format!("{}: {}", self.path.display(), e))
        })?;
        serde_json::from_str(&text)
            .map_err(|e| RegistryError::MalformedPage(format!("{}: {}", self.path.display(), e)))
    }
}

impl DeviceRegistry for FileRegistry {
    fn list_page(&self, token: Option<&str>) -> RegistryResult<DevicePage> {
        let devices = self.load()?;
        debug!(path = %self.path.display(), total = devices.len(), "loaded device file");
        slice_page(&devices, token, self.page_size)
    }
}

/// Store reading records from a JSON file
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load and validate every record in the file
    pub fn load(&self) -> StoreResult<Vec<MeasurementRecord>> {
        let text = std::fs::read_to_string(&self.path)?;
        let raw: Vec<RawRecord> = serde_json::from_str(&text)
            .map_err(|e| StoreError::Decode(format!("{}: {}", self.path.display(), e)))?;
        Ok(validate_all(raw)?)
    }
}

impl MeasurementStore for FileStore {
    fn query_range(
        &self,
        until: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> StoreResult<Vec<MeasurementRecord>> {
        let all = self.load()?;
        let total = all.len();
        let records = within_range(all, until, now);
        debug!(
            path = %self.path.display(),
            total,
            in_range = records.len(),
            "loaded record file"
        );
        Ok(records)
    }
}
