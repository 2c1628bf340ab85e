//! # Measurement records
//!
//! Raw, irregularly sampled readings as returned by the measurement store.
//!
//! Records reach the core in two steps:
//! - `RawRecord` mirrors the wire payload 1:1 (untrusted)
//! - `MeasurementRecord` is the validated, typed value the engine consumes
//!
//! Conversion happens once, at the store boundary.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::error::ValidationResult;
use super::window::parse_instant;
use super::{DeviceId, Reading};

/// Stored entry as found on the wire
///
/// Accepts the legacy field names (`controllerID`, `timeStampISO`, `data`)
/// alongside the current ones.
#[derive(Debug, Clone, Deserialize)]
pub struct RawRecord {
    #[serde(rename = "deviceId", alias = "controllerID")]
    pub device_id: String,

    #[serde(alias = "timeStampISO")]
    pub timestamp: String,

    #[serde(alias = "data")]
    pub reading: Reading,
}

/// A validated reading of one device at one instant
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MeasurementRecord {
    pub device_id: DeviceId,
    pub timestamp: DateTime<Utc>,
    pub reading: Reading,
}

impl MeasurementRecord {
    pub fn new(device_id: DeviceId, timestamp: DateTime<Utc>, reading: Reading) -> Self {
        Self {
            device_id,
            timestamp,
            reading,
        }
    }
}

impl RawRecord {
    /// Validate into a typed record
    pub fn validate(self) -> ValidationResult<MeasurementRecord> {
        let device_id = DeviceId::new(self.device_id)?;
        let timestamp = parse_instant(&self.timestamp)?;
        self.reading.validate()?;

        Ok(MeasurementRecord {
            device_id,
            timestamp,
            reading: self.reading,
        })
    }
}

impl TryFrom<RawRecord> for MeasurementRecord {
    type Error = super::ValidationError;

    fn try_from(raw: RawRecord) -> Result<Self, Self::Error> {
        raw.validate()
    }
}

/// Validate a batch, failing on the first bad record
pub fn validate_all(raw: Vec<RawRecord>) -> ValidationResult<Vec<MeasurementRecord>> {
    raw.into_iter().map(RawRecord::validate).collect()
}
