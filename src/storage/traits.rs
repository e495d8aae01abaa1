//! Progress storage traits for Stepwise.
//!
//! This module defines the `ProgressStore` trait: an opaque store holding a
//! single serialized progress record.

use std::sync::Arc;

use crate::core::UserProgress;
use crate::error::Result;

/// Trait for progress storage backends.
///
/// Each store owns exactly one named record. Every save replaces the whole
/// record, so a reader always sees one complete snapshot.
pub trait ProgressStore: Send + Sync {
    /// Load the stored progress.
    ///
    /// Returns `Ok(None)` if nothing has been saved yet.
    fn load(&self) -> Result<Option<UserProgress>>;

    /// Replace the stored progress with `progress`.
    fn save(&self, progress: &UserProgress) -> Result<()>;

    /// Remove the stored record.
    ///
    /// Returns `Ok(())` even if nothing was stored.
    fn clear(&self) -> Result<()>;

    /// Check if a record exists.
    fn exists(&self) -> Result<bool> {
        Ok(self.load()?.is_some())
    }
}

/// Blanket implementation of ProgressStore for Arc-wrapped stores.
///
/// Lets a test keep a handle on the store it hands to a controller.
impl<T: ProgressStore + ?Sized> ProgressStore for Arc<T> {
    fn load(&self) -> Result<Option<UserProgress>> {
        (**self).load()
    }

    fn save(&self, progress: &UserProgress) -> Result<()> {
        (**self).save(progress)
    }

    fn clear(&self) -> Result<()> {
        (**self).clear()
    }
}
