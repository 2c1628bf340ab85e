//! Adapters - Swappable implementations of port interfaces

pub mod memory;
pub mod file;
pub mod http;

pub use memory::{MemoryRegistry, MemoryStore};
pub use file::{FileRegistry, FileStore};
pub use http::{HttpRegistry, HttpStore};
