//! # Memory Adapters
//!
//! In-process registry and store backed by plain vectors.
//!
//! Good for:
//! - Testing the reconstruction without network access
//! - Demos and fixtures
//!
//! The registry still pages its listing, so callers exercise the same
//! continuation-token loop they would against a remote registry.

use chrono::{DateTime, Utc};

use crate::core::{DeviceId, MeasurementRecord};
use crate::ports::{
    within_range, DevicePage, DeviceRegistry, MeasurementStore, RegistryError, RegistryResult,
    StoreResult,
};

/// Default number of devices per page
pub const DEFAULT_PAGE_SIZE: usize = 50;

/// Cut one page out of a device list
///
/// Continuation tokens are decimal offsets into the list.
pub(crate) fn slice_page(
    devices: &[DeviceId],
    token: Option<&str>,
    page_size: usize,
) -> RegistryResult<DevicePage> {
    let start = match token {
        None => 0,
        Some(t) => t
            .parse::<usize>()
            .map_err(|_| RegistryError::Request(format!("Invalid continuation token '{}'", t)))?,
    };

    let start = start.min(devices.len());
    let end = start.saturating_add(page_size.max(1)).min(devices.len());
    let next_token = (end < devices.len()).then(|| end.to_string());

    Ok(DevicePage::new(devices[start..end].to_vec(), next_token))
}

/// Registry over a fixed device list
pub struct MemoryRegistry {
    devices: Vec<DeviceId>,
    page_size: usize,
}

impl MemoryRegistry {
    /// Create a registry with the default page size
    pub fn new(devices: Vec<DeviceId>) -> Self {
        Self::with_page_size(devices, DEFAULT_PAGE_SIZE)
    }

    /// Create a registry that serves `page_size` devices per page
    pub fn with_page_size(devices: Vec<DeviceId>, page_size: usize) -> Self {
        Self {
            devices,
            page_size: page_size.max(1),
        }
    }

    pub fn len(&self) -> usize {
        self.devices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.devices.is_empty()
    }
}

impl DeviceRegistry for MemoryRegistry {
    fn list_page(&self, token: Option<&str>) -> RegistryResult<DevicePage> {
        slice_page(&self.devices, token, self.page_size)
    }
}

/// Store over a fixed record list
#[derive(Default)]
pub struct MemoryStore {
    records: Vec<MeasurementRecord>,
}

impl MemoryStore {
    pub fn new(records: Vec<MeasurementRecord>) -> Self {
        Self { records }
    }

    /// Append a record
    pub fn push(&mut self, record: MeasurementRecord) {
        self.records.push(record);
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl MeasurementStore for MemoryStore {
    fn query_range(
        &self,
        until: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> StoreResult<Vec<MeasurementRecord>> {
        Ok(within_range(self.records.iter().cloned(), until, now))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Reading;
    use crate::ports::Pages;
    use chrono::TimeZone;

    fn ids(n: usize) -> Vec<DeviceId> {
        (0..n)
            .map(|i| DeviceId::new(format!("dev-{:02}", i)).unwrap())
            .collect()
    }

    #[test]
    fn test_memory_registry_pages() {
        let registry = MemoryRegistry::with_page_size(ids(5), 2);

        let pages: Vec<_> = Pages::new(&registry).map(|p| p.unwrap()).collect();

        assert_eq!(pages.len(), 3);
        assert_eq!(pages[0].devices.len(), 2);
        assert_eq!(pages[0].next_token.as_deref(), Some("2"));
        assert_eq!(pages[2].devices.len(), 1);
        assert_eq!(pages[2].next_token, None);
        assert_eq!(registry.list_all().unwrap().len(), 5);
    }

    #[test]
    fn test_memory_registry_exact_multiple() {
        let registry = MemoryRegistry::with_page_size(ids(4), 2);
        assert_eq!(Pages::new(&registry).count(), 2);
    }

    #[test]
    fn test_memory_registry_empty() {
        let registry = MemoryRegistry::new(vec![]);
        let page = registry.list_page(None).unwrap();
        assert!(page.devices.is_empty());
        assert!(page.next_token.is_none());
        assert!(registry.list_all().unwrap().is_empty());
    }

    #[test]
    fn test_memory_registry_bad_token() {
        let registry = MemoryRegistry::new(ids(3));
        assert!(matches!(
            registry.list_page(Some("abc")),
            Err(RegistryError::Request(_))
        ));
    }

    #[test]
    fn test_memory_store_range() {
        let d = DeviceId::new("d").unwrap();
        let at = |m| Utc.with_ymd_and_hms(2024, 1, 1, 0, m, 0).unwrap();
        let mut store = MemoryStore::default();
        for m in [0, 10, 20, 30] {
            store.push(MeasurementRecord::new(d.clone(), at(m), Reading::zero()));
        }

        let found = store.query_range(at(10), at(20)).unwrap();
        assert_eq!(found.len(), 2);
        assert_eq!(store.len(), 4);
    }
}
