//! # Snapshot Service
//!
//! The single request operation: reconstruct snapshots for a window.
//!
//! ```text
//!   request ──validate──> TimeWindow ──┬── registry.list_all()  ─┐
//!                                      └── store.query_range()  ─┴─> align ─> assemble
//! ```
//!
//! - Input is validated before any collaborator is called
//! - The two collaborator reads run concurrently; either failing aborts the
//!   whole request, no partial result is ever returned
//! - No state survives between requests

use std::collections::BTreeSet;
use std::time::Instant;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, info, info_span, warn};

use crate::core::align::count_orphans;
use crate::core::{
    parse_instant, reconstruct, AlignConfig, AlignmentEngine, DeviceId, MeasurementRecord,
    Snapshot, TimeWindow, ValidationError, ValidationResult,
};
use crate::ports::{DeviceRegistry, MeasurementStore, RegistryError, StoreError};

/// Result type for service operations
pub type ServiceResult<T> = Result<T, ServiceError>;

/// Request-level failure
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    /// Bad input, the caller's fault
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Failed to fetch all device ids: {0}")]
    Registry(#[from] RegistryError),

    #[error("Failed to get the data entries: {0}")]
    Store(#[from] StoreError),
}

impl ServiceError {
    /// HTTP-style status code for this error
    pub fn status_code(&self) -> u16 {
        match self {
            ServiceError::Validation(_) => 400,
            ServiceError::Registry(_) | ServiceError::Store(_) => 500,
        }
    }

    /// Whether the caller is at fault
    pub fn is_client_error(&self) -> bool {
        self.status_code() < 500
    }

    /// JSON error body
    pub fn body(&self) -> ErrorBody {
        ErrorBody {
            message: self.to_string(),
        }
    }
}

/// Error payload returned to callers
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ErrorBody {
    pub message: String,
}

/// A parsed reconstruction request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SnapshotRequest {
    /// Earlier window bound
    pub until: DateTime<Utc>,
    /// Requested number of snapshots (checked against the window later)
    pub segment_count: i64,
}

impl SnapshotRequest {
    pub fn new(until: DateTime<Utc>, segment_count: i64) -> Self {
        Self {
            until,
            segment_count,
        }
    }

    /// Parse raw query parameters
    ///
    /// `until` is an ISO-8601 instant, `segments` an integer in decimal.
    pub fn parse(until: Option<&str>, segments: Option<&str>) -> ValidationResult<Self> {
        let until = until
            .filter(|s| !s.trim().is_empty())
            .ok_or(ValidationError::MissingParameter("untilTimestamp"))?;
        let segments = segments
            .filter(|s| !s.trim().is_empty())
            .ok_or(ValidationError::MissingParameter("segments"))?;

        let segment_count =
            segments
                .trim()
                .parse::<i64>()
                .map_err(|_| ValidationError::NotANumber {
                    name: "segments",
                    value: segments.to_string(),
                })?;

        Ok(Self {
            until: parse_instant(until)?,
            segment_count,
        })
    }

    /// Validate against a window end and a segment limit
    pub fn window(&self, now: DateTime<Utc>, max_segments: usize) -> ValidationResult<TimeWindow> {
        let window = TimeWindow::new(self.until, now, self.segment_count)?;
        if window.segment_count > max_segments {
            return Err(ValidationError::TooManySegments {
                got: self.segment_count,
                max: max_segments,
            });
        }
        Ok(window)
    }
}

/// Reconstruction over injected collaborators
pub struct SnapshotService<R, S> {
    registry: R,
    store: S,
    config: AlignConfig,
}

impl<R: DeviceRegistry, S: MeasurementStore> SnapshotService<R, S> {
    pub fn new(registry: R, store: S, config: AlignConfig) -> Self {
        Self {
            registry,
            store,
            config,
        }
    }

    /// Active alignment configuration
    pub fn config(&self) -> &AlignConfig {
        &self.config
    }

    /// Reconstruct snapshots from `request.until` to the current instant
    pub fn reconstruct(&self, request: &SnapshotRequest) -> ServiceResult<Vec<Snapshot>> {
        self.reconstruct_at(request, Utc::now())
    }

    /// Reconstruct snapshots for `[request.until, now]`
    pub fn reconstruct_at(
        &self,
        request: &SnapshotRequest,
        now: DateTime<Utc>,
    ) -> ServiceResult<Vec<Snapshot>> {
        let span = info_span!(
            "reconstruct",
            until = %request.until,
            now = %now,
            segments = request.segment_count,
            fallback = %self.config.fallback,
        );
        let _enter = span.enter();
        let started = Instant::now();

        let window = request.window(now, self.config.max_segments)?;
        let (devices, records) = self.fetch(&window)?;

        let orphans = count_orphans(&devices, &records);
        if orphans > 0 {
            warn!(orphans, "records reference devices missing from the registry");
        }

        let engine = AlignmentEngine::from_config(&self.config);
        let result = reconstruct(&window, &devices, &records, &engine);
        debug!(
            filled = result.filled,
            look_ahead = result.look_ahead,
            baseline = result.baseline,
            "alignment finished"
        );
        if result.baseline > 0 {
            warn!(
                baseline = result.baseline,
                fallback = %engine.fallback(),
                "devices without records were filled by the fallback policy"
            );
        }

        let snapshots = result.snapshots;
        info!(
            snapshots = snapshots.len(),
            devices = devices.len(),
            records = records.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "reconstructed snapshots"
        );

        Ok(snapshots)
    }

    /// Every device the registry knows about
    pub fn devices(&self) -> ServiceResult<BTreeSet<DeviceId>> {
        Ok(self.registry.list_all()?)
    }

    /// Run both collaborator reads concurrently
    fn fetch(
        &self,
        window: &TimeWindow,
    ) -> ServiceResult<(BTreeSet<DeviceId>, Vec<MeasurementRecord>)> {
        let (devices, records) = std::thread::scope(|scope| {
            let listing = scope.spawn(|| self.registry.list_all());
            let records = self.store.query_range(window.until, window.now);
            let devices = listing
                .join()
                .unwrap_or_else(|panic| std::panic::resume_unwind(panic));
            (devices, records)
        });

        let devices = devices.map_err(|e| {
            warn!(error = %e, "device listing failed");
            e
        })?;
        let records = records.map_err(|e| {
            warn!(error = %e, "record query failed");
            e
        })?;

        debug!(
            devices = devices.len(),
            records = records.len(),
            "collaborators answered"
        );
        Ok((devices, records))
    }
}
