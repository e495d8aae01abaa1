//! Progress persistence for Stepwise.
//!
//! This module provides storage for the single progress record,
//! with file-based and in-memory backends.

pub mod file;
pub mod memory;
pub mod traits;

pub use file::{FileProgressStore, ProgressRecord, SCHEMA_VERSION};
pub use memory::MemoryProgressStore;
pub use traits::ProgressStore;
