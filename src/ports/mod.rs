//! # Ports
//!
//! Trait definitions for adapters. Contracts only, no implementations.
//!
//! This is the hexagonal architecture boundary:
//! - Ports define WHAT the reconstruction needs from the outside world
//! - Adapters define HOW it is fetched
//!
//! The CORE doesn't know about adapters.
//! Adapters implement these port traits.

mod registry;
mod store;

// Re-export traits
pub use registry::DeviceRegistry;
pub use store::MeasurementStore;

// Re-export types from registry
pub use registry::{DevicePage, Pages, RegistryError, RegistryResult};

// Re-export types from store
pub use store::{within_range, StoreError, StoreResult};
