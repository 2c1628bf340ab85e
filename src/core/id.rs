//! # DeviceId
//!
//! Identifier of a registered sensor device.
//!
//! Issued and owned by the device registry. The core never generates or
//! rewrites one; it only compares them.
//! - Opaque string, never empty
//! - Totally ordered so snapshot entries come out in a stable order
//! - Serializes as a bare JSON string

use serde::{Deserialize, Serialize};

use super::error::ValidationError;

/// Identifier of a registered device
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Debug, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct DeviceId(String);

impl DeviceId {
    /// Create a DeviceId, rejecting the empty string
    pub fn new(id: impl Into<String>) -> Result<Self, ValidationError> {
        let id = id.into();
        if id.is_empty() {
            return Err(ValidationError::EmptyDeviceId);
        }
        Ok(Self(id))
    }

    /// Borrow the raw identifier
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for DeviceId {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<DeviceId> for String {
    fn from(id: DeviceId) -> Self {
        id.0
    }
}

impl AsRef<str> for DeviceId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for DeviceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_device_id_creation() {
        let id = DeviceId::new("sensor-01").unwrap();
        assert_eq!(id.as_str(), "sensor-01");
    }

    #[test]
    fn test_device_id_empty_rejected() {
        assert_eq!(DeviceId::new(""), Err(ValidationError::EmptyDeviceId));
    }

    #[test]
    fn test_device_id_ordering() {
        let a = DeviceId::new("a").unwrap();
        let b = DeviceId::new("b").unwrap();
        assert!(a < b);
    }

    #[test]
    fn test_device_id_display() {
        let id = DeviceId::new("kitchen").unwrap();
        assert_eq!(format!("{}", id), "kitchen");
    }

    #[test]
    fn test_device_id_serde() {
        let id: DeviceId = serde_json::from_str("\"hall\"").unwrap();
        assert_eq!(id.as_str(), "hall");
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"hall\"");

        let empty: Result<DeviceId, _> = serde_json::from_str("\"\"");
        assert!(empty.is_err());
    }
}
