//! HTTP Integration
//!
//! Blocking clients for a remote device registry and measurement store:
//! - `GET {base}/devices?maxResults=N[&nextToken=T]` -> `{"devices": [..], "nextToken": ".."}`
//! - `GET {base}/measurements?from=ISO&to=ISO` -> `[record, ..]`
//!
//! # Example
//! ```rust,ignore
//! let registry = HttpRegistry::new("http://localhost:8080", Duration::from_secs(30))?;
//! let devices = registry.list_all()?;
//! ```

use std::time::Duration;

use chrono::{DateTime, SecondsFormat, Utc};
use serde::Deserialize;
use tracing::debug;

use super::memory::DEFAULT_PAGE_SIZE;
use crate::core::{validate_all, DeviceId, MeasurementRecord, RawRecord};
use crate::ports::{
    DevicePage, DeviceRegistry, MeasurementStore, RegistryError, RegistryResult, StoreError,
    StoreResult,
};

/// Default request timeout
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

fn build_client(timeout: Duration) -> reqwest::Result<reqwest::blocking::Client> {
    reqwest::blocking::Client::builder().timeout(timeout).build()
}

fn trim_host(base_url: &str) -> String {
    base_url.trim_end_matches('/').to_string()
}

/// Device page as returned by the registry
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct PageResponse {
    #[serde(default)]
    devices: Vec<DeviceId>,
    #[serde(default)]
    next_token: Option<String>,
}

/// Registry client
pub struct HttpRegistry {
    host: String,
    client: reqwest::blocking::Client,
    page_size: usize,
}

impl HttpRegistry {
    /// Create a new registry client
    ///
    /// # Arguments
    /// * `base_url` - Registry API root (e.g., "http://localhost:8080")
    /// * `timeout` - Per-request timeout
    pub fn new(base_url: &str, timeout: Duration) -> RegistryResult<Self> {
        let client = build_client(timeout)
            .map_err(|e| RegistryError::Connection(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            host: trim_host(base_url),
            client,
            page_size: DEFAULT_PAGE_SIZE,
        })
    }

    /// Set the number of devices requested per page
    pub fn page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    /// Get the host URL
    pub fn host(&self) -> &str {
        &self.host
    }
}

impl DeviceRegistry for HttpRegistry {
    fn list_page(&self, token: Option<&str>) -> RegistryResult<DevicePage> {
        let mut query = vec![("maxResults", self.page_size.to_string())];
        if let Some(token) = token {
            query.push(("nextToken", token.to_string()));
        }

        let response = self
            .client
            .get(format!("{}/devices", self.host))
            .query(&query)
            .send()
            .map_err(|e| {
                if e.is_connect() || e.is_timeout() {
                    RegistryError::Connection(format!("{}: {}", self.host, e))
                } else {
                    RegistryError::Request(e.to_string())
                }
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().unwrap_or_default();
            return Err(RegistryError::Request(format!("Status {}: {}", status, text)));
        }

        let page: PageResponse = response
            .json()
            .map_err(|e| RegistryError::MalformedPage(e.to_string()))?;

        debug!(
            devices = page.devices.len(),
            more = page.next_token.is_some(),
            "fetched registry page"
        );

        Ok(DevicePage::new(page.devices, page.next_token))
    }
}

/// Measurement store client
pub struct HttpStore {
    host: String,
    client: reqwest::blocking::Client,
}

impl HttpStore {
    /// Create a new store client
    pub fn new(base_url: &str, timeout: Duration) -> StoreResult<Self> {
        let client = build_client(timeout)
            .map_err(|e| StoreError::Connection(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            host: trim_host(base_url),
            client,
        })
    }

    /// Get the host URL
    pub fn host(&self) -> &str {
        &self.host
    }
}

impl MeasurementStore for HttpStore {
    fn query_range(
        &self,
        until: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> StoreResult<Vec<MeasurementRecord>> {
        let response = self
            .client
            .get(format!("{}/measurements", self.host))
            .query(&[
                ("from", until.to_rfc3339_opts(SecondsFormat::AutoSi, true)),
                ("to", now.to_rfc3339_opts(SecondsFormat::AutoSi, true)),
            ])
            .send()
            .map_err(|e| {
                if e.is_connect() || e.is_timeout() {
                    StoreError::Connection(format!("{}: {}", self.host, e))
                } else {
                    StoreError::Request(e.to_string())
                }
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().unwrap_or_default();
            return Err(StoreError::Request(format!("Status {}: {}", status, text)));
        }

        let raw: Vec<RawRecord> = response
            .json()
            .map_err(|e| StoreError::Decode(e.to_string()))?;

        debug!(records = raw.len(), "fetched measurement records");

        Ok(validate_all(raw)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_creation() {
        let registry = HttpRegistry::new("http://localhost:8080/", DEFAULT_TIMEOUT)
            .unwrap()
            .page_size(10);
        assert_eq!(registry.host(), "http://localhost:8080");
        assert_eq!(registry.page_size, 10);
    }

    #[test]
    fn test_store_creation() {
        let store = HttpStore::new("http://localhost:8080", DEFAULT_TIMEOUT).unwrap();
        assert_eq!(store.host(), "http://localhost:8080");
    }

    #[test]
    fn test_page_response_decoding() {
        let page: PageResponse =
            serde_json::from_str(r#"{"devices": ["a", "b"], "nextToken": "t1"}"#).unwrap();
        assert_eq!(page.devices.len(), 2);
        assert_eq!(page.next_token.as_deref(), Some("t1"));

        let last: PageResponse = serde_json::from_str(r#"{"devices": []}"#).unwrap();
        assert!(last.next_token.is_none());
    }

    #[test]
    fn test_unreachable_registry() {
        // Port 9 (discard) is closed on test machines
        let registry =
            HttpRegistry::new("http://127.0.0.1:9", Duration::from_millis(500)).unwrap();
        assert!(registry.list_all().is_err());
    }
}
