//! # Core Domain
//!
//! Pure resampling, no I/O.
//!
//! This module contains the fundamental types and operations:
//! - `DeviceId`, `Reading`, `MeasurementRecord` - the data model
//! - `TimeWindow` / `plan_segments` - the segment planner
//! - `AlignmentEngine` - per-device selection at each instant
//! - `assemble` - packaging into ordered `Snapshot`s
//!
//! ## Design Principles
//!
//! - All functions are pure (deterministic, no side effects)
//! - No I/O operations, collaborators live behind `ports`
//! - Input is validated once at the boundary, never inside the algorithm
//! - Fully testable in isolation

mod id;
mod reading;
mod record;
mod error;
pub mod window;
pub mod align;
pub mod snapshot;
pub mod config;

use std::collections::BTreeSet;

// Re-exports
pub use id::DeviceId;
pub use reading::Reading;
pub use record::{validate_all, MeasurementRecord, RawRecord};
pub use error::{ValidationError, ValidationResult};
pub use window::{parse_instant, plan_segments, TimeWindow};
pub use align::{Alignment, AlignmentEngine, Selection, Source};
pub use snapshot::{assemble, Snapshot};
pub use config::{AlignConfig, FallbackPolicy};

/// Snapshots of one reconstruction, with how their entries were selected
#[derive(Debug, Clone, PartialEq)]
pub struct Reconstruction {
    pub snapshots: Vec<Snapshot>,
    /// Entries taken from a record at or before their instant
    pub filled: usize,
    /// Entries taken from the device's earliest later record
    pub look_ahead: usize,
    /// Entries fabricated by the fallback policy
    pub baseline: usize,
}

/// Plan, align and assemble in one step
///
/// Output has exactly `window.segment_count` snapshots in ascending order.
pub fn reconstruct(
    window: &TimeWindow,
    devices: &BTreeSet<DeviceId>,
    records: &[MeasurementRecord],
    engine: &AlignmentEngine,
) -> Reconstruction {
    let alignments = engine.align(&window.instants(), devices, records);

    let (filled, look_ahead, baseline) = alignments
        .iter()
        .map(Alignment::source_counts)
        .fold((0, 0, 0), |(f, l, b), (df, dl, db)| (f + df, l + dl, b + db));

    Reconstruction {
        snapshots: assemble(alignments),
        filled,
        look_ahead,
        baseline,
    }
}
