//! # Snapshots
//!
//! The output of a reconstruction: one snapshot per segment instant.
//!
//! JSON shape:
//!
//! ```text
//! {
//!   "timestamp": "2024-01-01T00:20:00Z",
//!   "entries": [ { "deviceId": "A", "reading": { "pm2_5": .., ... } }, ... ]
//! }
//! ```
//!
//! Entries are ordered by device id.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use super::align::Alignment;
use super::{DeviceId, Reading};

/// Best-known reading of every device at one instant
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub timestamp: DateTime<Utc>,

    #[serde(serialize_with = "entries_out", deserialize_with = "entries_in")]
    pub entries: BTreeMap<DeviceId, Reading>,
}

impl Snapshot {
    /// Create an empty snapshot for an instant
    pub fn new(timestamp: DateTime<Utc>) -> Self {
        Self {
            timestamp,
            entries: BTreeMap::new(),
        }
    }

    /// Reading of a device, if present
    pub fn get(&self, device: &DeviceId) -> Option<&Reading> {
        self.entries.get(device)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// One device-reading pair on the wire
#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Entry<'a> {
    device_id: std::borrow::Cow<'a, DeviceId>,
    reading: Reading,
}

fn entries_out<S: Serializer>(
    entries: &BTreeMap<DeviceId, Reading>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    serializer.collect_seq(entries.iter().map(|(device_id, reading)| Entry {
        device_id: std::borrow::Cow::Borrowed(device_id),
        reading: *reading,
    }))
}

fn entries_in<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<BTreeMap<DeviceId, Reading>, D::Error> {
    let entries: Vec<Entry<'static>> = Vec::deserialize(deserializer)?;
    Ok(entries
        .into_iter()
        .map(|e| (e.device_id.into_owned(), e.reading))
        .collect())
}

/// Package alignment results as snapshots, preserving instant order
///
/// Every alignment becomes a snapshot, even when it selected nothing.
pub fn assemble(alignments: Vec<Alignment>) -> Vec<Snapshot> {
    alignments
        .into_iter()
        .map(|alignment| Snapshot {
            timestamp: alignment.instant,
            entries: alignment
                .selections
                .into_iter()
                .map(|(device, selection)| (device, selection.reading))
                .collect(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::align::{Selection, Source};
    use chrono::TimeZone;

    fn at(m: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 1, 0, m, 0).unwrap()
    }

    #[test]
    fn test_assemble_keeps_order_and_empty() {
        let a = DeviceId::new("A").unwrap();
        let mut selections = BTreeMap::new();
        selections.insert(
            a.clone(),
            Selection {
                reading: Reading::guiding(),
                source: Source::Baseline,
            },
        );

        let snapshots = assemble(vec![
            Alignment {
                instant: at(0),
                selections: BTreeMap::new(),
            },
            Alignment {
                instant: at(20),
                selections,
            },
        ]);

        assert_eq!(snapshots.len(), 2);
        assert_eq!(snapshots[0].timestamp, at(0));
        assert!(snapshots[0].is_empty());
        assert_eq!(snapshots[1].timestamp, at(20));
        assert_eq!(snapshots[1].get(&a), Some(&Reading::guiding()));
    }

    #[test]
    fn test_snapshot_json_shape() {
        let mut snapshot = Snapshot::new(at(20));
        snapshot
            .entries
            .insert(DeviceId::new("b").unwrap(), Reading::zero());
        snapshot
            .entries
            .insert(DeviceId::new("a").unwrap(), Reading::guiding());

        let json = serde_json::to_value(&snapshot).unwrap();

        assert_eq!(json["timestamp"], "2024-01-01T00:20:00Z");
        let entries = json["entries"].as_array().unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0]["deviceId"], "a");
        assert_eq!(entries[0]["reading"]["co2"], 750.0);
        assert_eq!(entries[1]["deviceId"], "b");

        let back: Snapshot = serde_json::from_value(json).unwrap();
        assert_eq!(back, snapshot);
    }
}
