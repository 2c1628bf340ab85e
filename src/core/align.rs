//! # Alignment
//!
//! Resampling of independent per-device streams onto shared instants.
//!
//! For every segment instant `t` and every registered device `d`:
//!
//! 1. **Forward-fill**: the latest record of `d` with `timestamp <= t`
//! 2. **Look-ahead**: if `d` has nothing at or before `t`, the earliest
//!    record after `t`. Only happens before the device's first observation.
//! 3. **Fallback**: if `d` has no records at all, apply the configured
//!    [`FallbackPolicy`].
//!
//! Equal timestamps are resolved first-seen-wins: among records sharing the
//! selected timestamp, the one that came first in the input is chosen.
//!
//! The engine is a pure function of its inputs. Consecutive instants may
//! select the same record again; that is the forward-fill.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use chrono::{DateTime, Utc};

use super::config::{AlignConfig, FallbackPolicy};
use super::{DeviceId, MeasurementRecord, Reading};

/// How a reading was chosen for an instant
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Source {
    /// Latest record at or before the instant
    AtOrBefore { observed_at: DateTime<Utc> },

    /// Earliest record after the instant (no earlier record exists)
    LookAhead { observed_at: DateTime<Utc> },

    /// Fabricated baseline, the device has no records
    Baseline,
}

/// The reading chosen for one device at one instant
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Selection {
    pub reading: Reading,
    pub source: Source,
}

/// All selections for one segment instant
#[derive(Debug, Clone, PartialEq)]
pub struct Alignment {
    pub instant: DateTime<Utc>,
    pub selections: BTreeMap<DeviceId, Selection>,
}

impl Alignment {
    /// Count selections of each kind: (forward-fill, look-ahead, baseline)
    pub fn source_counts(&self) -> (usize, usize, usize) {
        self.selections
            .values()
            .fold((0, 0, 0), |(f, l, b), s| match s.source {
                Source::AtOrBefore { .. } => (f + 1, l, b),
                Source::LookAhead { .. } => (f, l + 1, b),
                Source::Baseline => (f, l, b + 1),
            })
    }
}

/// Records of a single device, sorted by timestamp
///
/// The sort is stable, so equal timestamps keep their input order.
struct History<'a> {
    records: Vec<&'a MeasurementRecord>,
}

impl<'a> History<'a> {
    fn select(&self, instant: DateTime<Utc>) -> Option<Selection> {
        let end = self.records.partition_point(|r| r.timestamp <= instant);

        if end > 0 {
            let latest = self.records[end - 1].timestamp;
            // first-seen among the records sharing the latest timestamp
            let first = self.records[..end].partition_point(|r| r.timestamp < latest);
            let record = self.records[first];
            return Some(Selection {
                reading: record.reading,
                source: Source::AtOrBefore {
                    observed_at: record.timestamp,
                },
            });
        }

        // nothing at or before: every record is after, the first one is the nearest
        self.records.first().map(|record| Selection {
            reading: record.reading,
            source: Source::LookAhead {
                observed_at: record.timestamp,
            },
        })
    }
}

/// Resampling engine
#[derive(Debug, Clone, Copy, Default)]
pub struct AlignmentEngine {
    fallback: FallbackPolicy,
}

impl AlignmentEngine {
    /// Create an engine with the given fallback policy
    pub fn new(fallback: FallbackPolicy) -> Self {
        Self { fallback }
    }

    /// Create an engine from an alignment configuration
    pub fn from_config(config: &AlignConfig) -> Self {
        Self::new(config.fallback)
    }

    /// The fallback policy in use
    pub fn fallback(&self) -> FallbackPolicy {
        self.fallback
    }

    /// Select one reading per (instant, device) pair
    ///
    /// Returns one `Alignment` per instant, in the order given. Records of
    /// devices outside `devices` are never selected.
    pub fn align(
        &self,
        instants: &[DateTime<Utc>],
        devices: &BTreeSet<DeviceId>,
        records: &[MeasurementRecord],
    ) -> Vec<Alignment> {
        let histories = index_by_device(devices, records);

        instants
            .iter()
            .map(|&instant| {
                let selections = devices
                    .iter()
                    .filter_map(|device| {
                        let selection = match histories.get(device) {
                            Some(history) => history.select(instant),
                            None => self.baseline(),
                        };
                        selection.map(|s| (device.clone(), s))
                    })
                    .collect();

                Alignment {
                    instant,
                    selections,
                }
            })
            .collect()
    }

    fn baseline(&self) -> Option<Selection> {
        match self.fallback {
            FallbackPolicy::Omit => None,
            FallbackPolicy::ZeroBaseline => Some(Selection {
                reading: Reading::zero(),
                source: Source::Baseline,
            }),
        }
    }
}

/// Group records by registered device and sort each group by timestamp
fn index_by_device<'a>(
    devices: &BTreeSet<DeviceId>,
    records: &'a [MeasurementRecord],
) -> HashMap<&'a DeviceId, History<'a>> {
    let mut histories: HashMap<&DeviceId, History> = HashMap::new();

    for record in records.iter().filter(|r| devices.contains(&r.device_id)) {
        histories
            .entry(&record.device_id)
            .or_insert_with(|| History {
                records: Vec::new(),
            })
            .records
            .push(record);
    }

    for history in histories.values_mut() {
        history.records.sort_by_key(|r| r.timestamp);
    }

    histories
}

/// Count records that reference a device outside the registered set
pub fn count_orphans(devices: &BTreeSet<DeviceId>, records: &[MeasurementRecord]) -> usize {
    records
        .iter()
        .filter(|r| !devices.contains(&r.device_id))
        .count()
}
