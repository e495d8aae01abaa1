//! File-based progress storage for Stepwise.
//!
//! The record is stored as `<dir>/<record_name>.json`, by default under
//! `~/.stepwise/`. Atomic writes are achieved via temp file + rename.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::config::stepwise_home;
use crate::core::UserProgress;
use crate::error::{Result, StepwiseError};
use crate::storage::ProgressStore;
use crate::util::{read_to_string_limited, write_atomic};

/// Version of the on-disk envelope.
pub const SCHEMA_VERSION: u32 = 1;

/// On-disk envelope around the progress snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgressRecord {
    pub schema_version: u32,
    pub saved_at: DateTime<Utc>,
    pub progress: UserProgress,
}

impl ProgressRecord {
    /// Wrap a snapshot stamped with the current time.
    pub fn new(progress: UserProgress) -> Self {
        Self {
            schema_version: SCHEMA_VERSION,
            saved_at: Utc::now(),
            progress,
        }
    }
}

/// File-based progress storage.
#[derive(Debug, Clone)]
pub struct FileProgressStore {
    /// Directory holding the record.
    dir: PathBuf,
    /// Record name, without extension.
    record_name: String,
}

impl FileProgressStore {
    /// Create a store for `record_name` in the default directory.
    ///
    /// Uses `~/.stepwise/` or `$STEPWISE_HOME/`.
    pub fn new(record_name: &str) -> Result<Self> {
        let dir = stepwise_home().ok_or_else(|| {
            StepwiseError::config("Could not determine progress directory (no home directory)")
        })?;
        Self::with_dir(dir, record_name)
    }

    /// Create a store for `record_name` in a custom directory.
    ///
    /// An unusable directory is not an error here: loads find no record and
    /// saves fail, which the controller treats as in-memory operation.
    pub fn with_dir(dir: impl Into<PathBuf>, record_name: &str) -> Result<Self> {
        let dir = dir.into();
        validate_record_name(record_name)?;

        if let Err(e) = ensure_dir(&dir) {
            tracing::warn!(
                error = %e,
                "progress directory unavailable, progress will not be saved"
            );
        }

        Ok(Self {
            dir,
            record_name: record_name.to_string(),
        })
    }

    /// Path of the record file.
    pub fn path(&self) -> PathBuf {
        self.dir.join(format!("{}.json", self.record_name))
    }

    fn temp_path(&self) -> PathBuf {
        self.dir.join(format!(".{}.json.tmp", self.record_name))
    }

    /// Read the full envelope, including its timestamp.
    pub fn load_record(&self) -> Result<Option<ProgressRecord>> {
        let path = self.path();
        if !path.exists() {
            return Ok(None);
        }

        let content = read_to_string_limited(&path)?;
        let record: ProgressRecord = serde_json::from_str(&content)?;

        if record.schema_version > SCHEMA_VERSION {
            tracing::warn!(
                path = %path.display(),
                version = record.schema_version,
                "progress record was written by a newer version"
            );
        }

        Ok(Some(record))
    }
}

fn ensure_dir(dir: &Path) -> Result<()> {
    if !dir.is_dir() {
        fs::create_dir_all(dir).map_err(|e| StepwiseError::storage(dir, e))?;
    }
    Ok(())
}

fn validate_record_name(name: &str) -> Result<()> {
    let bad = name.trim().is_empty()
        || name.starts_with('.')
        || name.contains(['/', '\\'])
        || Path::new(name).components().count() != 1;
    if bad {
        return Err(StepwiseError::config(format!(
            "invalid record name '{}': must be a plain file name",
            name
        )));
    }
    Ok(())
}

impl ProgressStore for FileProgressStore {
    fn load(&self) -> Result<Option<UserProgress>> {
        Ok(self.load_record()?.map(|record| record.progress))
    }

    fn save(&self, progress: &UserProgress) -> Result<()> {
        let record = ProgressRecord::new(progress.clone());
        let json = serde_json::to_string_pretty(&record)?;
        ensure_dir(&self.dir)?;
        write_atomic(&self.path(), &self.temp_path(), json.as_bytes())?;
        tracing::debug!(path = %self.path().display(), "saved progress");
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        let path = self.path();
        if path.exists() {
            fs::remove_file(&path).map_err(|e| StepwiseError::storage(&path, e))?;
        }

        // Also clean up any temp file
        let temp_path = self.temp_path();
        if temp_path.exists() {
            let _ = fs::remove_file(&temp_path);
        }

        Ok(())
    }
}
