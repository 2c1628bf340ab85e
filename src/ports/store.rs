//! # Store Port
//!
//! Trait for fetching raw measurement records.
//!
//! `Query: fn(until, now) -> records` - what did the devices report?
//!
//! Implemented by storage adapters (Memory, JSON file, HTTP, etc.)

use chrono::{DateTime, Utc};

use crate::core::{MeasurementRecord, ValidationError};

/// Result type for store operations
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors that can occur while querying records
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Store connection error: {0}")]
    Connection(String),

    #[error("Store request failed: {0}")]
    Request(String),

    #[error("Malformed record: {0}")]
    Malformed(#[from] ValidationError),

    #[error("Undecodable store response: {0}")]
    Decode(String),

    #[error("Store I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Trait for querying measurement records by time
///
/// Storage adapters implement this trait.
pub trait MeasurementStore: Send + Sync {
    /// All records with `until <= timestamp <= now`
    ///
    /// No ordering guarantee. An empty result is not an error.
    fn query_range(
        &self,
        until: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> StoreResult<Vec<MeasurementRecord>>;
}

impl<T: MeasurementStore + ?Sized> MeasurementStore for Box<T> {
    fn query_range(
        &self,
        until: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> StoreResult<Vec<MeasurementRecord>> {
        (**self).query_range(until, now)
    }
}

impl<T: MeasurementStore + ?Sized> MeasurementStore for &T {
    fn query_range(
        &self,
        until: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> StoreResult<Vec<MeasurementRecord>> {
        (**self).query_range(until, now)
    }
}

/// Keep only records inside the closed interval `[until, now]`
pub fn within_range(
    records: impl IntoIterator<Item = MeasurementRecord>,
    until: DateTime<Utc>,
    now: DateTime<Utc>,
) -> Vec<MeasurementRecord> {
    records
        .into_iter()
        .filter(|r| r.timestamp >= until && r.timestamp <= now)
        .collect()
}
