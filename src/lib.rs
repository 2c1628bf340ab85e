//! # Sensor Snapshots
//!
//! Synchronized telemetry snapshots for a fleet of environmental sensors.
//!
//! ## Overview
//!
//! Every device reports air quality readings at its own cadence. Charts and
//! dashboards need the fleet's values at a handful of evenly spaced instants.
//! This crate reconstructs them: split a time window into segments, then pick
//! the best-known reading of every registered device at every segment instant.
//!
//! ## Key Features
//!
//! - **Forward-fill**: the latest reading at or before an instant wins
//! - **Look-ahead**: before a device's first reading, its earliest one is used
//! - **Explicit fallback**: silent devices are omitted or zero-filled, by config
//! - **Deterministic**: same inputs, byte-identical output
//! - **Pluggable sources**: registry and store are traits (memory, file, HTTP)
//!
//! ## Rust Usage
//!
//! ```rust,ignore
//! use sensor_snapshots::adapters::{MemoryRegistry, MemoryStore};
//! use sensor_snapshots::core::AlignConfig;
//! use sensor_snapshots::service::{SnapshotRequest, SnapshotService};
//!
//! let service = SnapshotService::new(registry, store, AlignConfig::default());
//! let request = SnapshotRequest::parse(Some("2024-01-01T00:00:00Z"), Some("3"))?;
//! let snapshots = service.reconstruct(&request)?;
//! println!("{}", serde_json::to_string_pretty(&snapshots)?);
//! ```

pub mod core;
pub mod ports;
pub mod adapters;
pub mod service;
pub mod config;

// Re-exports for convenience
pub use crate::core::{AlignConfig, DeviceId, FallbackPolicy, MeasurementRecord, Reading, Snapshot};
pub use crate::ports::{DeviceRegistry, MeasurementStore};
pub use crate::service::{ServiceError, SnapshotRequest, SnapshotService};
