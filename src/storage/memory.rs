//! In-memory progress storage for testing.
//!
//! This module provides a thread-safe in-memory implementation of the
//! ProgressStore trait. It counts saves and can be told to fail writes,
//! which lets tests observe exactly when the controller persists.

use std::io;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{PoisonError, RwLock};

use crate::core::UserProgress;
use crate::error::{Result, StepwiseError};
use crate::storage::ProgressStore;

/// In-memory progress store.
///
/// The record is lost when the store is dropped.
#[derive(Debug, Default)]
pub struct MemoryProgressStore {
    record: RwLock<Option<UserProgress>>,
    saves: AtomicUsize,
    fail_writes: AtomicBool,
}

impl MemoryProgressStore {
    /// Create a new empty in-memory store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store already holding `progress`.
    pub fn with_progress(progress: UserProgress) -> Self {
        Self {
            record: RwLock::new(Some(progress)),
            ..Self::default()
        }
    }

    /// Create a store whose saves and clears always fail.
    pub fn failing() -> Self {
        let store = Self::new();
        store.set_failing(true);
        store
    }

    /// Make subsequent saves and clears fail (or succeed again).
    pub fn set_failing(&self, failing: bool) {
        self.fail_writes.store(failing, Ordering::SeqCst);
    }

    /// Number of successful saves so far.
    pub fn save_count(&self) -> usize {
        self.saves.load(Ordering::SeqCst)
    }

    /// The stored record, if any.
    pub fn snapshot(&self) -> Option<UserProgress> {
        self.record
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl MemoryProgressStore {
    fn check_writable(&self, reason: &str) -> Result<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StepwiseError::storage(
                PathBuf::from("<memory>"),
                io::Error::other(reason.to_string()),
            ));
        }
        Ok(())
    }
}

impl ProgressStore for MemoryProgressStore {
    fn load(&self) -> Result<Option<UserProgress>> {
        Ok(self.snapshot())
    }

    fn save(&self, progress: &UserProgress) -> Result<()> {
        self.check_writable("simulated save failure")?;

        *self.record.write().unwrap_or_else(PoisonError::into_inner) = Some(progress.clone());
        self.saves.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        self.check_writable("simulated clear failure")?;
        *self.record.write().unwrap_or_else(PoisonError::into_inner) = None;
        Ok(())
    }
}
